use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::ClusterQuery;
use crate::format::{
    domain_tone, format_clock, format_relative, lens_badges, signed_delta, state_badge,
    utc_clock, LensBadge, StateBadge, Tone,
};
use crate::models::{ClusterState, ClusterSummary, Domain, SystemState};
use crate::render::status_name;
use crate::render::templates::render_template;
use crate::view_state::ViewState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCounts {
    pub l5: i64,
    pub l4: i64,
    pub l3: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaStrip {
    pub evidence_weighted: String,
    pub uncertainty: String,
    pub uncertainty_tone: Tone,
    /// Only set when the claims delta is positive.
    pub claims: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedStamp {
    pub time: String,
    pub seq: String,
}

/// One card of the event matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterCard {
    pub id: i64,
    pub title: String,
    pub domain: String,
    pub domain_tone: Tone,
    pub accent: Tone,
    pub lens: [LensBadge; 2],
    pub cluster_state: String,
    pub state: StateBadge,
    pub disputed: bool,
    pub counts: LevelCounts,
    pub deltas: Option<DeltaStrip>,
    pub tick: String,
    pub published: Option<PublishedStamp>,
    pub updated: String,
}

impl ClusterCard {
    pub fn from_summary(summary: &ClusterSummary, now: DateTime<Utc>) -> Self {
        let domain = summary.domain();
        let counts = summary.evidence_counts.clone().unwrap_or_default();
        let times = summary.times.clone().unwrap_or_default();

        let deltas = summary.deltas.as_ref().map(|deltas| DeltaStrip {
            evidence_weighted: signed_delta(deltas.evidence_weighted),
            uncertainty: deltas.uncertainty.to_string(),
            uncertainty_tone: if deltas.uncertainty < 0.0 {
                Tone::Green
            } else {
                Tone::Gray
            },
            claims: (deltas.claims > 0.0).then(|| deltas.claims.to_string()),
        });

        let published = times.published.as_deref().map(|published| PublishedStamp {
            time: format_clock(Some(published)),
            seq: times
                .seq
                .map(|seq| seq.to_string())
                .unwrap_or_else(|| "-".to_string()),
        });

        Self {
            id: summary.cluster_id,
            title: summary.title.clone(),
            domain: summary.domain.clone(),
            domain_tone: domain_tone(&domain),
            accent: if domain == Domain::Power {
                Tone::Red
            } else {
                Tone::Cyan
            },
            lens: lens_badges(summary.lens().as_ref()),
            cluster_state: summary.cluster_state.clone(),
            state: state_badge(
                &summary.cluster_state,
                summary.scores.as_ref().map(|s| s.contradiction_ratio),
            ),
            disputed: summary.state() == ClusterState::Disputed,
            counts: LevelCounts {
                l5: counts.l5,
                l4: counts.l4,
                l3: counts.l3,
            },
            deltas,
            tick: format_clock(times.tick.as_deref()),
            published,
            updated: format_relative(summary.last_updated_at.as_deref(), now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Everything the listing template needs.
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub status: &'static str,
    pub cards: Vec<ClusterCard>,
    pub failure: Option<String>,
    pub clock: String,
    pub domains: Vec<DomainOption>,
    pub query: ClusterQuery,
    pub system: Option<SystemState>,
}

impl ListingPage {
    pub fn new(
        state: &ViewState<Vec<ClusterSummary>>,
        query: ClusterQuery,
        system: Option<SystemState>,
        now: DateTime<Utc>,
    ) -> Self {
        let cards = state
            .loaded()
            .map(|clusters| {
                clusters
                    .iter()
                    .map(|summary| ClusterCard::from_summary(summary, now))
                    .collect()
            })
            .unwrap_or_default();

        let domains = Domain::KNOWN
            .iter()
            .filter_map(Domain::known_name)
            .map(|value| DomainOption {
                value,
                selected: query.domain.as_deref() == Some(value),
            })
            .collect();

        Self {
            status: status_name(state),
            cards,
            failure: state.failure().map(str::to_string),
            clock: utc_clock(now),
            domains,
            query,
            system,
        }
    }

    pub fn render(&self) -> Result<String, minijinja::Error> {
        render_template("listing.html", self)
    }
}
