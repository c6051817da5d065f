//! HTTP client for the observation backend.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};
use url::Url;

use crate::environment::DashboardConfig;
use crate::error::FetchError;
use crate::models::{ClusterDetail, ClusterSummary, SystemState};
use crate::TARGET_WEB_REQUEST;

/// Filters forwarded to `GET /api/clusters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterQuery {
    pub domain: Option<String>,
    pub state: Option<String>,
    pub limit: Option<u32>,
}

impl ClusterQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            pairs.push(("domain", domain.to_string()));
        }
        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("state", state.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Read-only client. One request per call: no caching, no retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(api_base: &str, request_timeout: Duration) -> Result<Self, FetchError> {
        let base = Url::parse(api_base)
            .map_err(|e| FetchError::InvalidBase(api_base.to_string(), e))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(FetchError::InvalidBase(
                api_base.to_string(),
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let http = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!("civ-observer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Request(api_base.to_string(), e))?;

        debug!(target: TARGET_WEB_REQUEST, "Created API client for {}", base);

        Ok(Self {
            http,
            base,
            timeout: request_timeout,
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, FetchError> {
        Self::new(&config.api_base, config.request_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base can always take path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let target = url.to_string();
        info!(target: TARGET_WEB_REQUEST, "GET {}", target);

        let request = async {
            let response = self
                .http
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| FetchError::Request(target.clone(), e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(target.clone(), status));
            }

            response
                .text()
                .await
                .map_err(|e| FetchError::Request(target.clone(), e))
        };

        let body = match timeout(self.timeout, request).await {
            Ok(Ok(body)) => body,
            Ok(Err(err)) => {
                warn!(target: TARGET_WEB_REQUEST, "{}", err);
                return Err(err);
            }
            Err(_) => {
                let err = FetchError::Timeout(target, self.timeout.as_secs());
                warn!(target: TARGET_WEB_REQUEST, "{}", err);
                return Err(err);
            }
        };

        debug!(target: TARGET_WEB_REQUEST, "Received {} bytes from {}", body.len(), target);

        serde_json::from_str(&body).map_err(|e| {
            let err = FetchError::Decode(target, e.to_string());
            warn!(target: TARGET_WEB_REQUEST, "{}", err);
            err
        })
    }

    /// `GET /api/clusters`, in backend order.
    pub async fn fetch_clusters(
        &self,
        query: &ClusterQuery,
    ) -> Result<Vec<ClusterSummary>, FetchError> {
        let mut url = self.endpoint(&["clusters"]);
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        self.get_json(url).await
    }

    /// `GET /api/cluster/{id}`; `version` selects a published snapshot.
    pub async fn fetch_cluster(
        &self,
        id: &str,
        version: Option<u32>,
    ) -> Result<ClusterDetail, FetchError> {
        let mut url = self.endpoint(&["cluster", id]);
        if let Some(version) = version {
            url.query_pairs_mut()
                .append_pair("v", &version.to_string());
        }
        self.get_json(url).await
    }

    /// `GET /api/state`
    pub async fn fetch_state(&self) -> Result<SystemState, FetchError> {
        self.get_json(self.endpoint(&["state"])).await
    }
}
