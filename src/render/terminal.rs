//! Terminal rendering for `civ-cli` and `civ-watch`.

use colored::Colorize;
use prettytable::{Cell, Row, Table};

use crate::format::{
    domain_tone, format_clock, format_datetime, signed_delta, state_badge, Tone,
    TIME_PLACEHOLDER,
};
use crate::models::{ClusterDetail, ClusterSummary, SystemState};
use crate::render::detail::{DetailPage, EvidenceCard};
use crate::view_state::ViewState;

pub const LISTING_LOADING: &str = "Initializing Neural Link...";
pub const DETAIL_LOADING: &str = "Loading Data Stream...";

/// prettytable color flags for a tone.
fn style_spec(tone: Tone) -> &'static str {
    match tone {
        Tone::Purple | Tone::Pink => "Fm",
        Tone::Emerald | Tone::Green => "Fg",
        Tone::Orange | Tone::Yellow => "Fy",
        Tone::Red => "Fr",
        Tone::Cyan => "Fc",
        Tone::Blue => "Fb",
        Tone::Gray => "Fw",
    }
}

/// One row per cluster, in backend order.
pub fn cluster_table(clusters: &[ClusterSummary]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Domain"),
        Cell::new("State"),
        Cell::new("Title"),
        Cell::new("L5/L4/L3"),
        Cell::new("ΔE / ΔU / ΔC"),
        Cell::new("Tick"),
        Cell::new("Published"),
        Cell::new("Updated"),
    ]));

    for cluster in clusters {
        let badge = state_badge(
            &cluster.cluster_state,
            cluster.scores.as_ref().map(|s| s.contradiction_ratio),
        );
        let state = match &badge.contradiction {
            Some(cr) => format!("{} {}", badge.label, cr),
            None => badge.label.clone(),
        };
        let counts = cluster.evidence_counts.clone().unwrap_or_default();
        let deltas = cluster
            .deltas
            .as_ref()
            .map(|d| {
                format!(
                    "{} / {} / {}",
                    signed_delta(d.evidence_weighted),
                    d.uncertainty,
                    d.claims
                )
            })
            .unwrap_or_else(|| "-".to_string());
        let times = cluster.times.clone().unwrap_or_default();
        let published = match times.published.as_deref() {
            Some(published) => format!(
                "{} v{}",
                format_clock(Some(published)),
                times.seq.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
            ),
            None => "pending".to_string(),
        };

        table.add_row(Row::new(vec![
            Cell::new(&cluster.cluster_id.to_string()),
            Cell::new(&cluster.domain).style_spec(style_spec(domain_tone(&cluster.domain()))),
            Cell::new(&state).style_spec(style_spec(badge.tone)),
            Cell::new(&cluster.title),
            Cell::new(&format!("{}/{}/{}", counts.l5, counts.l4, counts.l3)),
            Cell::new(&deltas),
            Cell::new(&format_clock(times.tick.as_deref())),
            Cell::new(&published),
            Cell::new(&format_datetime(cluster.last_updated_at.as_deref())),
        ]));
    }

    table
}

/// Message lines for a listing that has no table to show.
pub fn listing_notice(state: &ViewState<Vec<ClusterSummary>>) -> Option<String> {
    match state {
        ViewState::Loading => Some(LISTING_LOADING.to_string()),
        ViewState::Loaded(_) => None,
        ViewState::Empty => Some(empty_listing(None)),
        ViewState::Failed(reason) => Some(empty_listing(Some(reason))),
    }
}

fn empty_listing(failure: Option<&str>) -> String {
    let mut text = format!(
        "{}\n{}",
        "No active clusters observed.",
        "Connect Ingestor to begin observation.".dimmed()
    );
    if let Some(reason) = failure {
        text.push_str(&format!("\n{}", format!("Upstream unavailable: {}", reason).red()));
    }
    text
}

pub fn system_line(system: &SystemState) -> String {
    format!(
        "heartbeat {} | {} clusters | {} evidence",
        system.heartbeat, system.cluster_count, system.evidence_count
    )
}

fn evidence_block(card: &EvidenceCard) -> String {
    let color = card.style.tone().color();
    let chip = if card.bright {
        card.level_label.bold().color(color)
    } else {
        card.level_label.color(color)
    };
    let mut extract = format!("\"{}\"", card.extract).normal();
    if card.style.is_dimmed() {
        extract = extract.dimmed();
    }
    let source = card
        .source_url
        .as_deref()
        .map(|url| format!("  {}", url.cyan()))
        .unwrap_or_default();
    let kind = card
        .kind
        .as_deref()
        .map(|kind| format!(" [{}]", kind))
        .unwrap_or_default();

    let mut block = format!("{}{} {}{}", chip, kind, extract, source);
    if let Some(highlight) = &card.highlight {
        block.push_str(&format!("\n    MATCH: \"{}\"", highlight));
    }
    block.push_str(&format!("\n    {}", format!("REL: {}", card.reliability).dimmed()));
    block
}

/// Three sections mirroring the web panes: evidence, analysis, timeline.
pub fn render_detail(id: &str, replay: Option<u32>, state: &ViewState<ClusterDetail>) -> String {
    match state {
        ViewState::Loading => return DETAIL_LOADING.to_string(),
        ViewState::Failed(reason) => {
            return format!("{} {}", format!("CLUSTER_{}", id).cyan(), reason.red())
        }
        ViewState::Empty | ViewState::Loaded(_) => {}
    }

    let page = DetailPage::new(id, replay, state);
    let mut out = Vec::new();

    let mut header = format!("CLUSTER_{}", id).cyan().to_string();
    if let Some(version) = replay {
        header.push_str(&format!(" (replay v{})", version));
    }
    out.push(header);

    if let Some(analysis) = &page.analysis {
        out.push(format!("[{}] {}", analysis.state, analysis.title.bold()));
        if let Some(scores) = &analysis.scores {
            let risk = if scores.risk_elevated {
                scores.risk.red()
            } else {
                scores.risk.green()
            };
            out.push(format!("CONSISTENCY {}   RISK LEVEL {}", scores.consistency, risk));
        }
        if let Some(claims) = &analysis.claims {
            out.push(String::new());
            out.push("CORE ASSERTION (Claim Layer)".magenta().bold().to_string());
            for claim in claims {
                out.push(format!("  \"{}\"", claim.content.italic()));
                out.push(format!(
                    "  STATUS: {}  CONFIDENCE: {}",
                    claim.status, claim.confidence
                ));
            }
        }
        if !analysis.gaps.is_empty() {
            out.push(String::new());
            out.push("Open Gaps".bold().to_string());
            for gap in &analysis.gaps {
                out.push(format!("  [{}] {}", gap.level.yellow(), gap.description));
            }
        }
        if !analysis.observations.is_empty() {
            out.push(String::new());
            out.push("Observations".bold().to_string());
            for observation in &analysis.observations {
                let mut line = format!("  {} {}", observation.kind.cyan(), observation.state);
                if let Some(content) = &observation.content {
                    line.push_str(&format!(" {}", content));
                }
                out.push(line);
            }
        }
        out.push(String::new());
        out.push("Observer Lens Active".blue().bold().to_string());
        out.push(analysis.summary.clone());
    }

    out.push(String::new());
    out.push(format!(
        "{} ({} Records Verified)",
        "EVIDENCE LOG".bold(),
        page.evidence.len()
    ));
    for card in &page.evidence {
        out.push(evidence_block(card));
    }
    out.push("End of Verified Log".dimmed().to_string());

    out.push(String::new());
    out.push("SYSTEM TICKS".bold().to_string());
    for entry in &page.timeline {
        let label = if entry.live {
            entry.label.cyan().to_string()
        } else {
            entry.label.dimmed().to_string()
        };
        out.push(format!("  {}  {}", label, entry.text));
    }

    out.join("\n")
}

/// Single status line for the follow mode.
pub fn follow_status(id: &str, state: &ViewState<ClusterDetail>) -> String {
    match state {
        ViewState::Loading => format!("CLUSTER_{} {}", id, DETAIL_LOADING),
        ViewState::Failed(reason) => format!("CLUSTER_{} failed: {}", id, reason),
        ViewState::Empty => format!("CLUSTER_{} {}", id, TIME_PLACEHOLDER),
        ViewState::Loaded(detail) => format!(
            "CLUSTER_{} {} · {} evidence · updated {}",
            id,
            detail.event_cluster.cluster_state.to_uppercase(),
            detail.evidence.len(),
            format_clock(detail.event_cluster.last_updated_at.as_deref())
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain() {
        colored::control::set_override(false);
    }

    fn clusters() -> Vec<ClusterSummary> {
        serde_json::from_value(json!([
            {"cluster_id": 101, "title": "Federal Reserve Report", "domain": "Power", "cluster_state": "Active",
             "evidence_counts": {"L5": 2, "L4": 1, "L3": 0},
             "times": {"tick": "2026-10-17T09:30:00", "published": "2026-10-17T09:00:00", "seq": 4}},
            {"cluster_id": 102, "title": "Rumor: Tech Giant collapsing?", "domain": "Tech", "cluster_state": "Disputed",
             "scores": {"consistency": 0.1, "contradiction_ratio": 0.55, "risk": 0.8}}
        ]))
        .unwrap()
    }

    #[test]
    fn test_cluster_table_rows() {
        let table = cluster_table(&clusters());
        assert_eq!(table.len(), 3);

        let text = table.to_string();
        assert!(text.contains("Federal Reserve Report"));
        assert!(text.contains("DISPUTED CR 0.55"));
        assert!(text.contains("2/1/0"));
        assert!(text.contains("09:00:00 v4"));
        assert!(text.contains("pending"));
    }

    #[test]
    fn test_listing_notices() {
        plain();
        assert!(listing_notice(&ViewState::Loaded(clusters())).is_none());
        assert_eq!(
            listing_notice(&ViewState::Loading).as_deref(),
            Some(LISTING_LOADING)
        );
        let empty = listing_notice(&ViewState::Empty).unwrap();
        assert!(empty.starts_with("No active clusters observed."));
        let failed = listing_notice(&ViewState::Failed("connection refused".to_string())).unwrap();
        assert!(failed.starts_with("No active clusters observed."));
        assert!(failed.contains("Upstream unavailable: connection refused"));
    }

    #[test]
    fn test_render_detail_sections() {
        plain();
        let detail: ClusterDetail = serde_json::from_value(json!({
            "event_cluster": {"cluster_id": 102, "title": "Rumor", "domain": "Tech", "cluster_state": "Disputed"},
            "evidence": [
                {"evidence_id": 3, "level": 2, "extract": "My cousin says so.", "reliability_score": 0.2,
                 "pointer": {"url": "https://x.com/user123"}},
                {"evidence_id": 4, "level": 5, "extract": "Filing confirms solvency.", "reliability_score": 0.625,
                 "evidence_kind": "regulatory_filing",
                 "pointer": {"url": "https://sec.example.gov", "match_text": "confirms solvency"}}
            ],
            "observations": [{"observation_id": 1, "observation_type": "source_conflict", "state": "open",
                              "content": "Filing contradicts the rumor."}],
            "latest_score": {"consistency": 0.0, "risk": 0.8},
            "claims": [{"claim_id": 1, "content": "ASSERTION: It is over", "claim_status": "contested", "confidence_score": 0.3}]
        }))
        .unwrap();

        let text = render_detail("102", None, &ViewState::Loaded(detail));
        assert!(text.starts_with("CLUSTER_102"));
        assert!(text.contains("[DISPUTED] Rumor"));
        assert!(text.contains("CONSISTENCY 0.0%   RISK LEVEL 80.0%"));
        assert!(text.contains("\"It is over\""));
        assert!(text.contains("STATUS: CONTESTED  CONFIDENCE: 30%"));
        assert!(text.contains("L2 \"My cousin says so.\"  https://x.com/user123"));
        assert!(text.contains("REL: 20%"));
        assert!(text.contains("L5 [REGULATORY FILING] \"Filing confirms solvency.\"  https://sec.example.gov"));
        assert!(text.contains("    MATCH: \"confirms solvency\""));
        assert!(text.contains("REL: 63%"));
        assert!(text.contains("  SOURCE CONFLICT OPEN Filing contradicts the rumor."));
        assert!(text.contains("NOW (LIVE)"));
    }

    #[test]
    fn test_render_detail_states() {
        plain();
        assert_eq!(render_detail("1", None, &ViewState::Loading), DETAIL_LOADING);
        let failed = render_detail("1", None, &ViewState::Failed("status 404".to_string()));
        assert!(failed.contains("status 404"));
    }

    #[test]
    fn test_follow_status() {
        let detail: ClusterDetail = serde_json::from_value(json!({
            "event_cluster": {"cluster_state": "Active", "last_updated_at": "2026-10-17T09:30:00"},
            "evidence": [{"evidence_id": 1}, {"evidence_id": 2}]
        }))
        .unwrap();
        assert_eq!(
            follow_status("7", &ViewState::Loaded(detail)),
            "CLUSTER_7 ACTIVE · 2 evidence · updated 09:30:00"
        );
    }
}
