use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Backend used when neither `CIV_API_URL` nor `--api-url` is given.
pub const DEFAULT_API_BASE: &str = "http://localhost:8001";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Runtime settings shared by the dashboard server and the CLI tools.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api_base: String,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub log_dir: String,
    /// Forwarded as `limit` to the listing endpoint when set.
    pub cluster_limit: Option<u32>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_dir: DEFAULT_LOG_DIR.to_string(),
            cluster_limit: None,
        }
    }
}

impl DashboardConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparsable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base = get("CIV_API_URL")
            .or_else(|| get("NEXT_PUBLIC_API_URL"))
            .unwrap_or(defaults.api_base);

        let port = get("PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let ip = get("BIND_ADDR")
            .and_then(|a| a.parse::<IpAddr>().ok())
            .unwrap_or(defaults.bind_addr.ip());

        let request_timeout = get("REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            api_base,
            bind_addr: SocketAddr::new(ip, port),
            request_timeout,
            log_dir: get("LOG_DIR").unwrap_or(defaults.log_dir),
            cluster_limit: get("CLUSTER_LIMIT").and_then(|l| l.parse::<u32>().ok()),
        }
    }
}

/// Version string reported by `/healthz` and the page footer.
pub fn build_info() -> String {
    format!(
        "{} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    )
}
