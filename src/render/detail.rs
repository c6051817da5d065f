use serde::Serialize;

use crate::format::{
    format_clock, level_style, percent_one_decimal_or_placeholder, percent_whole_or_placeholder,
    risk_is_elevated, strip_claim_prefix, summary_or_fallback, version_reason_label, LevelStyle,
};
use crate::models::{
    Claim, ClusterDetail, Evidence, Gap, Observation, PublishedVersion, Score,
};
use crate::render::status_name;
use crate::render::templates::render_template;
use crate::view_state::ViewState;

/// Number of published versions listed in the timeline pane.
const TIMELINE_VERSIONS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceCard {
    pub id: i64,
    pub level_label: String,
    pub style: LevelStyle,
    /// Level 4 and 5 get the bright chip.
    pub bright: bool,
    pub source_url: Option<String>,
    /// e.g. `OFFICIAL STATEMENT` from `official_statement`.
    pub kind: Option<String>,
    pub extract: String,
    /// Passage of the source the extract was matched against.
    pub highlight: Option<String>,
    pub reliability: String,
}

impl From<&Evidence> for EvidenceCard {
    fn from(evidence: &Evidence) -> Self {
        Self {
            id: evidence.evidence_id,
            level_label: match evidence.level {
                Some(level) => format!("L{}", level),
                None => "L?".to_string(),
            },
            style: level_style(evidence.level),
            bright: evidence.level.is_some_and(|level| level >= 4),
            source_url: evidence.source_url().map(str::to_string),
            kind: evidence.kind().map(|kind| kind.replace('_', " ").to_uppercase()),
            extract: evidence.extract.clone(),
            highlight: evidence
                .match_text()
                .filter(|text| *text != evidence.extract.trim())
                .map(str::to_string),
            reliability: percent_whole_or_placeholder(evidence.reliability_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTiles {
    pub consistency: String,
    pub risk: String,
    pub risk_elevated: bool,
}

impl From<&Score> for ScoreTiles {
    fn from(score: &Score) -> Self {
        Self {
            consistency: percent_one_decimal_or_placeholder(score.consistency),
            risk: percent_one_decimal_or_placeholder(score.risk),
            risk_elevated: score.risk.is_some_and(risk_is_elevated),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimCard {
    pub content: String,
    pub status: String,
    pub confidence: String,
}

impl From<&Claim> for ClaimCard {
    fn from(claim: &Claim) -> Self {
        Self {
            content: strip_claim_prefix(&claim.content),
            status: claim.claim_status.to_uppercase(),
            confidence: percent_whole_or_placeholder(claim.confidence_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapLine {
    pub level: String,
    pub description: String,
}

impl From<&Gap> for GapLine {
    fn from(gap: &Gap) -> Self {
        Self {
            level: gap.gap_level.clone(),
            description: gap.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationLine {
    pub kind: String,
    pub state: String,
    pub content: Option<String>,
}

impl From<&Observation> for ObservationLine {
    fn from(observation: &Observation) -> Self {
        Self {
            kind: observation.observation_type.replace('_', " ").to_uppercase(),
            state: observation.state.to_uppercase(),
            content: observation
                .content
                .as_deref()
                .map(str::trim)
                .filter(|content| !content.is_empty())
                .map(str::to_string),
        }
    }
}

/// Center pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisPane {
    pub state: String,
    pub title: String,
    pub scores: Option<ScoreTiles>,
    pub claims: Option<Vec<ClaimCard>>,
    pub gaps: Vec<GapLine>,
    pub observations: Vec<ObservationLine>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub label: String,
    pub text: String,
    pub live: bool,
    /// Opacity step for history entries: 1 is recent, 2 is older.
    pub fade: u8,
}

impl TimelineEntry {
    fn history(label: impl Into<String>, text: impl Into<String>, fade: u8) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            live: false,
            fade,
        }
    }
}

/// The live marker, then published versions when the backend sent any, or
/// the fixed history otherwise.
pub fn timeline(versions: &[PublishedVersion]) -> Vec<TimelineEntry> {
    let mut entries = vec![TimelineEntry {
        label: "NOW (LIVE)".to_string(),
        text: "Monitoring incoming streams...".to_string(),
        live: true,
        fade: 0,
    }];

    if versions.is_empty() {
        entries.push(TimelineEntry::history(
            "T-10 MIN",
            "Internal Tick: Consistency check passed.",
            1,
        ));
        entries.push(TimelineEntry::history(
            "T-20 MIN",
            "New Evidence (L5) ingested.",
            2,
        ));
        return entries;
    }

    for (index, version) in versions.iter().take(TIMELINE_VERSIONS).enumerate() {
        let label = match version.version_label.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("v{}", version.version_seq),
        };
        entries.push(TimelineEntry::history(
            format!("{} · {}", label, format_clock(version.published_at.as_deref())),
            version_reason_label(&version.reason),
            if index == 0 { 1 } else { 2 },
        ));
    }

    entries
}

/// Everything the detail template needs.
#[derive(Debug, Clone, Serialize)]
pub struct DetailPage {
    pub status: &'static str,
    pub id: String,
    pub replay: Option<u32>,
    pub failure: Option<String>,
    pub evidence: Vec<EvidenceCard>,
    pub analysis: Option<AnalysisPane>,
    pub timeline: Vec<TimelineEntry>,
}

impl DetailPage {
    pub fn new(id: &str, replay: Option<u32>, state: &ViewState<ClusterDetail>) -> Self {
        let detail = state.loaded();

        let evidence = detail
            .map(|detail| detail.evidence.iter().map(EvidenceCard::from).collect())
            .unwrap_or_default();

        let analysis = detail.map(|detail| {
            let cluster = &detail.event_cluster;
            AnalysisPane {
                state: cluster.cluster_state.to_uppercase(),
                title: cluster.title.clone(),
                scores: detail.latest_score.as_ref().map(ScoreTiles::from),
                claims: detail
                    .visible_claims()
                    .map(|claims| claims.iter().map(ClaimCard::from).collect()),
                gaps: detail.gaps.iter().map(GapLine::from).collect(),
                observations: detail
                    .observations
                    .iter()
                    .map(ObservationLine::from)
                    .collect(),
                summary: summary_or_fallback(cluster.summary.as_deref()).to_string(),
            }
        });

        Self {
            status: status_name(state),
            id: id.to_string(),
            replay,
            failure: state.failure().map(str::to_string),
            evidence,
            analysis,
            timeline: timeline(detail.map(|d| d.versions.as_slice()).unwrap_or_default()),
        }
    }

    pub fn render(&self) -> Result<String, minijinja::Error> {
        render_template("detail.html", self)
    }
}
