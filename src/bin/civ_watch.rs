//! Follows one cluster at a time. Type a cluster id and press enter to switch;
//! the current cluster is refetched on every interval.
//!
//! Fetches run concurrently, so a slow response for a cluster the user has
//! already left can arrive after the newer one. Every fetch carries a ticket
//! and only the newest ticket may update the view. A refresh is skipped while
//! the previous fetch of the same cluster is still outstanding.

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use civ_observer::client::ApiClient;
use civ_observer::environment::DashboardConfig;
use civ_observer::logging::configure_cli_logging;
use civ_observer::models::ClusterDetail;
use civ_observer::render::terminal::{follow_status, render_detail};
use civ_observer::view_state::{Ticket, ViewSlot, ViewState};

#[derive(Parser)]
#[clap(name = "civ-watch", about = "Follow a cluster as it changes")]
struct Args {
    /// Cluster to start with
    id: Option<String>,

    /// Seconds between refreshes
    #[clap(short, long, default_value = "10")]
    interval: u64,

    /// Observation backend base URL (overrides CIV_API_URL)
    #[clap(short, long)]
    api_url: Option<String>,

    /// Print the full detail view instead of a status line
    #[clap(short, long)]
    full: bool,

    /// Log requests to stderr
    #[clap(short, long)]
    verbose: bool,
}

struct Response {
    ticket: Ticket,
    id: String,
    state: ViewState<ClusterDetail>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    configure_cli_logging(args.verbose);

    let mut config = DashboardConfig::from_env();
    if let Some(api_url) = args.api_url {
        config.api_base = api_url;
    }
    let client = ApiClient::from_config(&config)?;

    let (tx, mut rx) = mpsc::channel::<Response>(16);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(Duration::from_secs(args.interval.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut slot: ViewSlot<ClusterDetail> = ViewSlot::new();
    let mut current = args.id.filter(|id| !id.trim().is_empty());
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => {
                        let id = line.trim().to_string();
                        if id.is_empty() {
                            continue;
                        }
                        let ticket = slot.begin();
                        spawn_fetch(client.clone(), id.clone(), ticket, tx.clone());
                        current = Some(id);
                        ticker.reset();
                    }
                    Ok(None) | Err(_) => {
                        debug!("stdin closed, following {:?}", current);
                        stdin_open = false;
                    }
                }
            }
            _ = ticker.tick() => {
                if let Some(id) = current.clone() {
                    match slot.refresh() {
                        Some(ticket) => spawn_fetch(client.clone(), id, ticket, tx.clone()),
                        None => debug!("Cluster {} still loading, skipping refresh", id),
                    }
                }
            }
            Some(response) = rx.recv() => {
                let Response { ticket, id, state } = response;
                if !slot.apply(ticket, state) {
                    debug!("Dropped stale response for cluster {}", id);
                    continue;
                }
                if args.full {
                    println!("{}\n", render_detail(&id, None, slot.state()));
                } else {
                    println!("{}", follow_status(&id, slot.state()));
                }
            }
        }
    }

    Ok(())
}

fn spawn_fetch(client: ApiClient, id: String, ticket: Ticket, tx: mpsc::Sender<Response>) {
    tokio::spawn(async move {
        let state = client.fetch_cluster(&id, None).await.into();
        let _ = tx.send(Response { ticket, id, state }).await;
    });
}
