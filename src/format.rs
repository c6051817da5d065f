//! Display rules shared by the HTML and terminal renderers.
//!
//! Nothing in here performs I/O; every function maps a wire value to the
//! string or style the views show for it.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use colored::Color;
use serde::Serialize;

use crate::models::{ClusterState, Domain, LensType};

/// Placeholder shown for a time that is missing or cannot be parsed.
pub const TIME_PLACEHOLDER: &str = "--:--";

/// Placeholder shown for a missing numeric value.
pub const VALUE_PLACEHOLDER: &str = "--";

/// Lens text shown when the backend has no summary for a cluster.
pub const SUMMARY_FALLBACK: &str =
    "Analysis indicates high variance in reporting sources. Secondary structure suggests evolving narrative.";

const CLAIM_PREFIX: &str = "ASSERTION: ";

/// Color family of a badge, card accent or evidence border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    Purple,
    Emerald,
    Orange,
    Red,
    Cyan,
    Pink,
    Green,
    Blue,
    Yellow,
    Gray,
}

impl Tone {
    pub fn name(self) -> &'static str {
        match self {
            Tone::Purple => "purple",
            Tone::Emerald => "emerald",
            Tone::Orange => "orange",
            Tone::Red => "red",
            Tone::Cyan => "cyan",
            Tone::Pink => "pink",
            Tone::Green => "green",
            Tone::Blue => "blue",
            Tone::Yellow => "yellow",
            Tone::Gray => "gray",
        }
    }

    /// Closest ANSI color for terminal output.
    pub fn color(self) -> Color {
        match self {
            Tone::Purple | Tone::Pink => Color::Magenta,
            Tone::Emerald | Tone::Green => Color::Green,
            Tone::Orange | Tone::Yellow => Color::Yellow,
            Tone::Red => Color::Red,
            Tone::Cyan => Color::Cyan,
            Tone::Blue => Color::Blue,
            Tone::Gray => Color::BrightBlack,
        }
    }
}

pub fn domain_tone(domain: &Domain) -> Tone {
    match domain {
        Domain::Universe => Tone::Purple,
        Domain::Earth => Tone::Emerald,
        Domain::Human => Tone::Orange,
        Domain::Power => Tone::Red,
        Domain::Tech => Tone::Cyan,
        Domain::Culture => Tone::Pink,
        Domain::Other(_) => Tone::Gray,
    }
}

/// Lifecycle badge for a listing card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateBadge {
    pub label: String,
    pub tone: Tone,
    /// `CR 0.31` marker, only for disputed clusters with a known ratio.
    pub contradiction: Option<String>,
}

pub fn state_badge(raw_state: &str, contradiction_ratio: Option<f64>) -> StateBadge {
    let state = ClusterState::parse(raw_state);
    let tone = match state {
        ClusterState::Active => Tone::Green,
        ClusterState::Disputed => Tone::Red,
        _ => Tone::Gray,
    };
    let contradiction = match state {
        ClusterState::Disputed => contradiction_ratio.map(|ratio| format!("CR {:.2}", ratio)),
        _ => None,
    };

    StateBadge {
        label: raw_state.to_uppercase(),
        tone,
        contradiction,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LensBadge {
    pub label: &'static str,
    pub active: bool,
}

/// The OBS/ANTH pair; at most one of them is active.
pub fn lens_badges(lens: Option<&LensType>) -> [LensBadge; 2] {
    [
        LensBadge {
            label: "OBS",
            active: matches!(lens, Some(LensType::Observer)),
        },
        LensBadge {
            label: "ANTH",
            active: matches!(lens, Some(LensType::Anthropic)),
        },
    ]
}

/// Border and background treatment of an evidence card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LevelStyle {
    Green,
    Blue,
    Yellow,
    RedDimmed,
    Neutral,
}

impl LevelStyle {
    pub fn key(self) -> &'static str {
        match self {
            LevelStyle::Green => "green",
            LevelStyle::Blue => "blue",
            LevelStyle::Yellow => "yellow",
            LevelStyle::RedDimmed => "red-dimmed",
            LevelStyle::Neutral => "neutral",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            LevelStyle::Green => Tone::Green,
            LevelStyle::Blue => Tone::Blue,
            LevelStyle::Yellow => Tone::Yellow,
            LevelStyle::RedDimmed => Tone::Red,
            LevelStyle::Neutral => Tone::Gray,
        }
    }

    pub fn is_dimmed(self) -> bool {
        self == LevelStyle::RedDimmed
    }
}

pub fn level_style(level: Option<i64>) -> LevelStyle {
    match level {
        Some(5) => LevelStyle::Green,
        Some(4) => LevelStyle::Blue,
        Some(3) => LevelStyle::Yellow,
        Some(level) if level <= 2 => LevelStyle::RedDimmed,
        _ => LevelStyle::Neutral,
    }
}

/// `0.873` -> `87.3%`. Ties round away from zero (`0.8125` -> `81.3%`).
pub fn percent_one_decimal(fraction: f64) -> String {
    format!("{:.1}%", (fraction * 1000.0).round() / 10.0)
}

/// `0.873` -> `87%`. Ties round away from zero (`0.625` -> `63%`).
pub fn percent_whole(fraction: f64) -> String {
    format!("{:.0}%", (fraction * 100.0).round())
}

pub fn percent_one_decimal_or_placeholder(fraction: Option<f64>) -> String {
    fraction
        .map(percent_one_decimal)
        .unwrap_or_else(|| VALUE_PLACEHOLDER.to_string())
}

pub fn percent_whole_or_placeholder(fraction: Option<f64>) -> String {
    fraction
        .map(percent_whole)
        .unwrap_or_else(|| VALUE_PLACEHOLDER.to_string())
}

/// Risk above one half switches the risk tile to its alert style.
pub fn risk_is_elevated(risk: f64) -> bool {
    risk > 0.5
}

/// Evidence-weighted delta, always signed.
pub fn signed_delta(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Parse a backend timestamp. Offset-less timestamps are taken as local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Local time of day, `HH:MM:SS`, or `--:--`.
pub fn format_clock(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| TIME_PLACEHOLDER.to_string())
}

/// Local date and time for tables, falling back to the raw text.
pub fn format_datetime(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => parse_timestamp(raw)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => TIME_PLACEHOLDER.to_string(),
    }
}

/// Coarse age of a timestamp relative to `now`: `just now`, `12m ago`, `3h ago`, `2d ago`.
pub fn format_relative(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(then) = raw.and_then(parse_timestamp) else {
        return TIME_PLACEHOLDER.to_string();
    };
    let age = now.signed_duration_since(then.with_timezone(&Utc));
    if age.num_minutes() < 1 {
        "just now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h ago", age.num_hours())
    } else {
        format!("{}d ago", age.num_days())
    }
}

/// Human label for a published version's reason code.
pub fn version_reason_label(reason: &str) -> String {
    match reason {
        "auto_60m" => "Scheduled publish (60 min cycle).".to_string(),
        "active_30m" => "Active publish (30 min cycle).".to_string(),
        "rapid_15m" => "Rapid publish (15 min cycle).".to_string(),
        "correction" => "Correction issued.".to_string(),
        "retraction" => "Retraction issued.".to_string(),
        "" => "Published.".to_string(),
        other => other.to_string(),
    }
}

/// The header's system clock.
pub fn utc_clock(now: DateTime<Utc>) -> String {
    now.format("%H:%M:%S").to_string()
}

pub fn strip_claim_prefix(content: &str) -> String {
    content.replacen(CLAIM_PREFIX, "", 1)
}

pub fn summary_or_fallback(summary: Option<&str>) -> &str {
    match summary {
        Some(summary) if !summary.trim().is_empty() => summary,
        _ => SUMMARY_FALLBACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_tones() {
        assert_eq!(domain_tone(&Domain::Universe), Tone::Purple);
        assert_eq!(domain_tone(&Domain::Earth), Tone::Emerald);
        assert_eq!(domain_tone(&Domain::Human), Tone::Orange);
        assert_eq!(domain_tone(&Domain::Power), Tone::Red);
        assert_eq!(domain_tone(&Domain::Tech), Tone::Cyan);
        assert_eq!(domain_tone(&Domain::Culture), Tone::Pink);
        assert_eq!(domain_tone(&Domain::parse("Sports")), Tone::Gray);
    }

    #[test]
    fn test_state_badge() {
        let active = state_badge("Active", Some(0.9));
        assert_eq!(active.label, "ACTIVE");
        assert_eq!(active.tone, Tone::Green);
        assert!(active.contradiction.is_none());

        let disputed = state_badge("Disputed", Some(0.314));
        assert_eq!(disputed.tone, Tone::Red);
        assert_eq!(disputed.contradiction.as_deref(), Some("CR 0.31"));

        let emerging = state_badge("Emerging", None);
        assert_eq!(emerging.label, "EMERGING");
        assert_eq!(emerging.tone, Tone::Gray);
    }

    #[test]
    fn test_lens_badges() {
        let [obs, anth] = lens_badges(Some(&LensType::Observer));
        assert!(obs.active);
        assert!(!anth.active);

        let [obs, anth] = lens_badges(None);
        assert!(!obs.active && !anth.active);
    }

    #[test]
    fn test_level_styles_in_order() {
        let styles: Vec<LevelStyle> = [5, 3, 1].iter().map(|l| level_style(Some(*l))).collect();
        assert_eq!(
            styles,
            vec![LevelStyle::Green, LevelStyle::Yellow, LevelStyle::RedDimmed]
        );
        assert_eq!(level_style(Some(4)), LevelStyle::Blue);
        assert_eq!(level_style(Some(0)), LevelStyle::RedDimmed);
        assert_eq!(level_style(Some(9)), LevelStyle::Neutral);
        assert_eq!(level_style(None), LevelStyle::Neutral);
        assert!(LevelStyle::RedDimmed.is_dimmed());
        assert!(!LevelStyle::Yellow.is_dimmed());
    }

    #[test]
    fn test_percentages() {
        assert_eq!(percent_one_decimal(0.873), "87.3%");
        assert_eq!(percent_whole(0.873), "87%");
        assert_eq!(percent_one_decimal(1.0), "100.0%");
        assert_eq!(percent_whole(0.0), "0%");
        assert_eq!(percent_whole_or_placeholder(None), "--");
        assert_eq!(percent_one_decimal_or_placeholder(Some(0.5)), "50.0%");
    }

    #[test]
    fn test_percent_ties_round_up() {
        assert_eq!(percent_whole(0.625), "63%");
        assert_eq!(percent_whole(0.125), "13%");
        assert_eq!(percent_whole(0.005), "1%");
        assert_eq!(percent_one_decimal(0.8125), "81.3%");
        assert_eq!(percent_one_decimal(0.0625), "6.3%");
    }

    #[test]
    fn test_risk_threshold() {
        assert!(risk_is_elevated(0.8));
        assert!(!risk_is_elevated(0.5));
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(signed_delta(3.0), "+3");
        assert_eq!(signed_delta(2.5), "+2.5");
        assert_eq!(signed_delta(-1.5), "-1.5");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Some("2026-10-17T09:30:05")), "09:30:05");
        assert_eq!(format_clock(Some("2026-10-17T09:30:05.123456")), "09:30:05");
        assert_eq!(format_clock(Some("2026-10-17T09:30:05Z")).len(), 8);
        assert_eq!(format_clock(Some("yesterday")), TIME_PLACEHOLDER);
        assert_eq!(format_clock(None), TIME_PLACEHOLDER);
    }

    #[test]
    fn test_format_datetime_falls_back_to_raw() {
        assert_eq!(format_datetime(Some("2026-10-17T09:30:05")), "2026-10-17 09:30");
        assert_eq!(format_datetime(Some("soon")), "soon");
    }

    #[test]
    fn test_format_relative() {
        let now = Utc::now();
        let stamp = |minutes: i64| (now - chrono::Duration::minutes(minutes)).to_rfc3339();

        assert_eq!(format_relative(Some(&stamp(0)), now), "just now");
        assert_eq!(format_relative(Some(&stamp(12)), now), "12m ago");
        assert_eq!(format_relative(Some(&stamp(180)), now), "3h ago");
        assert_eq!(format_relative(Some(&stamp(2 * 24 * 60)), now), "2d ago");
        assert_eq!(format_relative(None, now), TIME_PLACEHOLDER);
    }

    #[test]
    fn test_version_reason_label() {
        assert_eq!(version_reason_label("rapid_15m"), "Rapid publish (15 min cycle).");
        assert_eq!(version_reason_label("manual"), "manual");
    }

    #[test]
    fn test_claim_prefix_and_summary() {
        assert_eq!(
            strip_claim_prefix("ASSERTION: Inflation stabilized at 2.1%"),
            "Inflation stabilized at 2.1%"
        );
        assert_eq!(strip_claim_prefix("No prefix here"), "No prefix here");
        assert_eq!(summary_or_fallback(Some("Known facts.")), "Known facts.");
        assert_eq!(summary_or_fallback(Some("  ")), SUMMARY_FALLBACK);
        assert_eq!(summary_or_fallback(None), SUMMARY_FALLBACK);
    }
}
