//! Wire-format view models served by the observation backend.
//!
//! These records are read-only snapshots. Every field is either optional or has
//! a defined default, and malformed values are swallowed by [`lenient`], so a
//! partially broken payload still renders with placeholders.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Deserialize a field, falling back to `T::default()` when the value is null
/// or has the wrong shape.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// The six observation domains, plus whatever else the backend sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    Universe,
    Earth,
    Human,
    Power,
    Tech,
    Culture,
    Other(String),
}

impl Domain {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Universe" => Domain::Universe,
            "Earth" => Domain::Earth,
            "Human" => Domain::Human,
            "Power" => Domain::Power,
            "Tech" => Domain::Tech,
            "Culture" => Domain::Culture,
            other => Domain::Other(other.to_string()),
        }
    }

    /// Wire name of a known domain; `None` for `Other`.
    pub fn known_name(&self) -> Option<&'static str> {
        match self {
            Domain::Universe => Some("Universe"),
            Domain::Earth => Some("Earth"),
            Domain::Human => Some("Human"),
            Domain::Power => Some("Power"),
            Domain::Tech => Some("Tech"),
            Domain::Culture => Some("Culture"),
            Domain::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Domain::Other(other) => other,
            known => known.known_name().unwrap_or_default(),
        }
    }

    /// Domains offered by the listing filter control.
    pub const KNOWN: [Domain; 6] = [
        Domain::Universe,
        Domain::Earth,
        Domain::Human,
        Domain::Power,
        Domain::Tech,
        Domain::Culture,
    ];
}

/// Cluster lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterState {
    Emerging,
    Active,
    Stabilizing,
    Disputed,
    Retracted,
    Other(String),
}

impl ClusterState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Emerging" => ClusterState::Emerging,
            "Active" => ClusterState::Active,
            "Stabilizing" => ClusterState::Stabilizing,
            "Disputed" => ClusterState::Disputed,
            "Retracted" => ClusterState::Retracted,
            other => ClusterState::Other(other.to_string()),
        }
    }
}

/// Scoring perspective applied to a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LensType {
    Observer,
    Anthropic,
    Other(String),
}

impl LensType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "OBS" => LensType::Observer,
            "ANTH" => LensType::Anthropic,
            other => LensType::Other(other.to_string()),
        }
    }
}

/// Aggregate scores attached to a listing entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterScores {
    #[serde(deserialize_with = "lenient")]
    pub consistency: f64,
    #[serde(deserialize_with = "lenient")]
    pub contradiction_ratio: f64,
    #[serde(deserialize_with = "lenient")]
    pub risk: f64,
}

/// Evidence counts by reliability level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceCounts {
    #[serde(deserialize_with = "lenient")]
    pub total: i64,
    #[serde(rename = "L5", deserialize_with = "lenient")]
    pub l5: i64,
    #[serde(rename = "L4", deserialize_with = "lenient")]
    pub l4: i64,
    #[serde(rename = "L3", deserialize_with = "lenient")]
    pub l3: i64,
}

/// Change since the previous tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deltas {
    #[serde(deserialize_with = "lenient")]
    pub evidence_weighted: f64,
    #[serde(deserialize_with = "lenient")]
    pub uncertainty: f64,
    #[serde(deserialize_with = "lenient")]
    pub claims: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Times {
    #[serde(deserialize_with = "lenient")]
    pub tick: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub published: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub seq: Option<i64>,
}

/// Secondary score pair produced by the Anthropic lens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicScores {
    #[serde(deserialize_with = "lenient")]
    pub aix: f64,
    #[serde(deserialize_with = "lenient")]
    pub aud: f64,
}

/// One entry of `GET /api/clusters`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSummary {
    #[serde(deserialize_with = "lenient")]
    pub cluster_id: i64,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub domain: String,
    #[serde(deserialize_with = "lenient")]
    pub cluster_state: String,
    #[serde(deserialize_with = "lenient")]
    pub last_updated_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scores: Option<ClusterScores>,
    #[serde(deserialize_with = "lenient")]
    pub evidence_counts: Option<EvidenceCounts>,
    #[serde(deserialize_with = "lenient")]
    pub deltas: Option<Deltas>,
    #[serde(deserialize_with = "lenient")]
    pub times: Option<Times>,
    #[serde(deserialize_with = "lenient")]
    pub lens_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub anthropic_scores: Option<AnthropicScores>,
}

impl ClusterSummary {
    pub fn domain(&self) -> Domain {
        Domain::parse(&self.domain)
    }

    pub fn state(&self) -> ClusterState {
        ClusterState::parse(&self.cluster_state)
    }

    pub fn lens(&self) -> Option<LensType> {
        self.lens_type.as_deref().map(LensType::parse)
    }
}

/// The `event_cluster` record of a detail response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterRecord {
    #[serde(deserialize_with = "lenient")]
    pub cluster_id: i64,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub domain: String,
    #[serde(deserialize_with = "lenient")]
    pub cluster_state: String,
    #[serde(deserialize_with = "lenient")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub first_observed_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub last_updated_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub corrected_flag: bool,
    #[serde(deserialize_with = "lenient")]
    pub retraction_flag: bool,
}

impl ClusterRecord {
    pub fn state(&self) -> ClusterState {
        ClusterState::parse(&self.cluster_state)
    }
}

/// Where an evidence extract was taken from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidencePointer {
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub match_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    #[serde(deserialize_with = "lenient")]
    pub evidence_id: i64,
    /// Reliability level, 1 (rumor) to 5 (primary source).
    #[serde(deserialize_with = "lenient")]
    pub level: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub extract: String,
    #[serde(deserialize_with = "lenient")]
    pub reliability_score: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub pointer: Option<EvidencePointer>,
    #[serde(deserialize_with = "lenient")]
    pub evidence_kind: Option<String>,
}

impl Evidence {
    /// Pointer URL, only when it is an absolute http(s) link.
    pub fn source_url(&self) -> Option<&str> {
        self.pointer
            .as_ref()
            .and_then(|pointer| pointer.url.as_deref())
            .map(str::trim)
            .filter(|url| {
                Url::parse(url)
                    .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
                    .unwrap_or(false)
            })
    }

    /// Passage of the source the extract was matched against.
    pub fn match_text(&self) -> Option<&str> {
        self.pointer
            .as_ref()
            .and_then(|pointer| pointer.match_text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn kind(&self) -> Option<&str> {
        self.evidence_kind
            .as_deref()
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Claim {
    #[serde(deserialize_with = "lenient")]
    pub claim_id: i64,
    #[serde(deserialize_with = "lenient")]
    pub content: String,
    #[serde(deserialize_with = "lenient")]
    pub claim_status: String,
    #[serde(deserialize_with = "lenient")]
    pub confidence_score: Option<f64>,
}

/// Latest score snapshot of a cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    #[serde(deserialize_with = "lenient")]
    pub consistency: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub risk: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub contradiction_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub mechanism_uncertainty: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub computed_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub method_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Observation {
    #[serde(deserialize_with = "lenient")]
    pub observation_id: i64,
    #[serde(deserialize_with = "lenient")]
    pub observation_type: String,
    #[serde(deserialize_with = "lenient")]
    pub state: String,
    #[serde(deserialize_with = "lenient")]
    pub content: Option<String>,
}

/// Known missing evidence for a cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gap {
    #[serde(deserialize_with = "lenient")]
    pub gap_id: i64,
    #[serde(deserialize_with = "lenient")]
    pub gap_level: String,
    #[serde(deserialize_with = "lenient")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishedVersion {
    #[serde(deserialize_with = "lenient")]
    pub version_id: i64,
    #[serde(deserialize_with = "lenient")]
    pub version_seq: i64,
    #[serde(deserialize_with = "lenient")]
    pub version_label: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub published_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub reason: String,
}

/// Body of `GET /api/cluster/{id}`, both live and replay (`?v=`) modes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterDetail {
    #[serde(deserialize_with = "lenient")]
    pub mode: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub event_cluster: ClusterRecord,
    #[serde(deserialize_with = "lenient")]
    pub evidence: Vec<Evidence>,
    // Replay snapshots carry the score under `scores`.
    #[serde(alias = "scores", deserialize_with = "lenient")]
    pub latest_score: Option<Score>,
    #[serde(deserialize_with = "lenient")]
    pub claims: Option<Vec<Claim>>,
    #[serde(deserialize_with = "lenient")]
    pub observations: Vec<Observation>,
    #[serde(deserialize_with = "lenient")]
    pub gaps: Vec<Gap>,
    #[serde(deserialize_with = "lenient")]
    pub versions: Vec<PublishedVersion>,
}

impl ClusterDetail {
    /// Claims worth rendering: present and non-empty.
    pub fn visible_claims(&self) -> Option<&[Claim]> {
        self.claims.as_deref().filter(|claims| !claims.is_empty())
    }

    pub fn is_replay(&self) -> bool {
        self.mode.as_deref() == Some("replay")
    }
}

/// Body of `GET /api/state`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemState {
    #[serde(deserialize_with = "lenient")]
    pub heartbeat: String,
    #[serde(deserialize_with = "lenient")]
    pub cluster_count: i64,
    #[serde(deserialize_with = "lenient")]
    pub evidence_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_v1_summary() {
        let summary: ClusterSummary = serde_json::from_value(json!({
            "cluster_id": 101,
            "title": "Federal Reserve Report: Inflation Stabilizing",
            "domain": "Power",
            "cluster_state": "Active",
            "last_updated_at": "2026-10-17T09:30:00"
        }))
        .unwrap();

        assert_eq!(summary.cluster_id, 101);
        assert_eq!(summary.domain(), Domain::Power);
        assert_eq!(summary.state(), ClusterState::Active);
        assert!(summary.scores.is_none());
        assert!(summary.deltas.is_none());
        assert!(summary.lens().is_none());
    }

    #[test]
    fn test_full_v2_summary() {
        let summary: ClusterSummary = serde_json::from_value(json!({
            "cluster_id": 7,
            "title": "Orbital debris event",
            "domain": "Universe",
            "cluster_state": "Disputed",
            "last_updated_at": "2026-10-17T09:30:00Z",
            "scores": {"consistency": 0.4, "contradiction_ratio": 0.31, "risk": 0.7},
            "evidence_counts": {"total": 9, "L5": 2, "L4": 3, "L3": 4},
            "deltas": {"evidence_weighted": 2.5, "uncertainty": -0.1, "claims": 1},
            "times": {"tick": "2026-10-17T09:30:00Z", "published": null, "seq": 4},
            "lens_type": "ANTH",
            "anthropic_scores": {"aix": 0.2, "aud": 0.9}
        }))
        .unwrap();

        assert_eq!(summary.state(), ClusterState::Disputed);
        assert_eq!(summary.lens(), Some(LensType::Anthropic));
        let counts = summary.evidence_counts.unwrap();
        assert_eq!((counts.l5, counts.l4, counts.l3), (2, 3, 4));
        assert_eq!(summary.deltas.unwrap().claims, 1.0);
        let times = summary.times.unwrap();
        assert!(times.published.is_none());
        assert_eq!(times.seq, Some(4));
    }

    #[test]
    fn test_malformed_fields_degrade_to_defaults() {
        let summary: ClusterSummary = serde_json::from_value(json!({
            "cluster_id": "not-a-number",
            "title": null,
            "domain": "Tech",
            "cluster_state": "Active",
            "scores": "broken",
            "evidence_counts": {"L5": "many"}
        }))
        .unwrap();

        assert_eq!(summary.cluster_id, 0);
        assert_eq!(summary.title, "");
        assert!(summary.scores.is_none());
        assert_eq!(summary.evidence_counts.unwrap().l5, 0);
    }

    #[test]
    fn test_unknown_enums_are_preserved() {
        assert_eq!(
            Domain::parse("Oceans"),
            Domain::Other("Oceans".to_string())
        );
        assert_eq!(Domain::parse("Oceans").as_str(), "Oceans");
        assert_eq!(
            ClusterState::parse("Dormant"),
            ClusterState::Other("Dormant".to_string())
        );
        assert_eq!(LensType::parse("OBS"), LensType::Observer);
    }

    #[test]
    fn test_detail_without_claims() {
        let detail: ClusterDetail = serde_json::from_value(json!({
            "event_cluster": {"cluster_id": 102, "title": "Rumor", "domain": "Tech", "cluster_state": "Disputed"},
            "evidence": [
                {"evidence_id": 3, "level": 2, "extract": "It might be over.", "reliability_score": 0.2,
                 "pointer": {"url": "https://x.com/user123", "match_text": "might be over"}}
            ],
            "latest_score": {"consistency": 0.0, "risk": 0.8, "mechanism_uncertainty": 0.9}
        }))
        .unwrap();

        assert!(detail.claims.is_none());
        assert!(detail.visible_claims().is_none());
        assert_eq!(detail.evidence[0].source_url(), Some("https://x.com/user123"));
        assert_eq!(detail.latest_score.unwrap().risk, Some(0.8));
    }

    #[test]
    fn test_detail_empty_claims_are_hidden() {
        let detail: ClusterDetail =
            serde_json::from_value(json!({"event_cluster": {}, "evidence": [], "claims": []}))
                .unwrap();
        assert!(detail.claims.is_some());
        assert!(detail.visible_claims().is_none());
    }

    #[test]
    fn test_replay_scores_alias() {
        let detail: ClusterDetail = serde_json::from_value(json!({
            "mode": "replay",
            "evidence": [],
            "scores": {"consistency": 0.5, "risk": 0.1},
            "gaps": [{"gap_id": 1, "gap_level": "high", "description": "No official statement"}]
        }))
        .unwrap();

        assert!(detail.is_replay());
        assert_eq!(detail.latest_score.unwrap().consistency, Some(0.5));
        assert_eq!(detail.gaps.len(), 1);
        assert_eq!(detail.event_cluster, ClusterRecord::default());
    }

    #[test]
    fn test_evidence_without_pointer_has_no_source() {
        let evidence: Evidence =
            serde_json::from_value(json!({"evidence_id": 1, "level": 5, "extract": "x"})).unwrap();
        assert!(evidence.source_url().is_none());

        let evidence: Evidence = serde_json::from_value(
            json!({"evidence_id": 1, "level": 5, "extract": "x", "pointer": {"url": ""}}),
        )
        .unwrap();
        assert!(evidence.source_url().is_none());
    }

    #[test]
    fn test_source_url_requires_web_scheme() {
        let pointer = |url: &str| -> Evidence {
            serde_json::from_value(json!({"evidence_id": 1, "pointer": {"url": url}})).unwrap()
        };

        assert_eq!(
            pointer("https://gov.federalreserve.org").source_url(),
            Some("https://gov.federalreserve.org")
        );
        assert_eq!(
            pointer("http://example.org/a?b=1").source_url(),
            Some("http://example.org/a?b=1")
        );
        assert!(pointer("javascript:alert(1)").source_url().is_none());
        assert!(pointer("JavaScript:alert(1)").source_url().is_none());
        assert!(pointer("data:text/html,<b>x</b>").source_url().is_none());
        assert!(pointer("/relative/path").source_url().is_none());
    }

    #[test]
    fn test_match_text_and_kind() {
        let evidence: Evidence = serde_json::from_value(json!({
            "evidence_id": 1,
            "evidence_kind": "official_statement",
            "pointer": {"url": "https://x.com/user123", "match_text": "  might be over "}
        }))
        .unwrap();
        assert_eq!(evidence.match_text(), Some("might be over"));
        assert_eq!(evidence.kind(), Some("official_statement"));

        let bare: Evidence =
            serde_json::from_value(json!({"evidence_id": 2, "evidence_kind": "", "pointer": {}}))
                .unwrap();
        assert!(bare.match_text().is_none());
        assert!(bare.kind().is_none());
    }

    #[test]
    fn test_known_domain_names() {
        assert_eq!(Domain::Tech.known_name(), Some("Tech"));
        assert_eq!(Domain::Other("Oceans".to_string()).known_name(), None);
        let names: Vec<_> = Domain::KNOWN.iter().filter_map(Domain::known_name).collect();
        assert_eq!(names, ["Universe", "Earth", "Human", "Power", "Tech", "Culture"]);
        assert_eq!(Domain::Power.as_str(), "Power");
    }
}
