use anyhow::Result;
use clap::Parser;
use std::net::IpAddr;
use tracing::info;

use civ_observer::environment::{build_info, DashboardConfig};
use civ_observer::logging::configure_logging;
use civ_observer::web;

#[derive(Parser)]
#[clap(name = "civ-observer", about = "Serve the AI Civilization News dashboard")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[clap(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides BIND_ADDR)
    #[clap(short, long)]
    bind: Option<IpAddr>,

    /// Observation backend base URL (overrides CIV_API_URL)
    #[clap(short, long)]
    api_url: Option<String>,

    /// Directory for the daily rolling log file
    #[clap(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = DashboardConfig::from_env();
    if let Some(port) = args.port {
        config.bind_addr.set_port(port);
    }
    if let Some(ip) = args.bind {
        config.bind_addr.set_ip(ip);
    }
    if let Some(api_url) = args.api_url {
        config.api_base = api_url;
    }
    if let Some(log_dir) = args.log_dir {
        config.log_dir = log_dir;
    }

    let _guard = configure_logging("civ-observer", &config.log_dir);
    info!("civ-observer {}", build_info());

    web::serve(config).await
}
