use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use civ_observer::client::{ApiClient, ClusterQuery};
use civ_observer::environment::DashboardConfig;
use civ_observer::logging::configure_cli_logging;
use civ_observer::render::terminal::{cluster_table, listing_notice, render_detail, system_line};
use civ_observer::view_state::ViewState;

#[derive(Parser)]
#[clap(name = "civ-cli", about = "Read the observation backend from a terminal")]
struct Cli {
    /// Observation backend base URL (overrides CIV_API_URL)
    #[clap(short, long, global = true)]
    api_url: Option<String>,

    /// Log requests to stderr
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List observed clusters in backend order
    List {
        /// Only clusters in this domain
        #[clap(short, long)]
        domain: Option<String>,

        /// Only clusters in this state
        #[clap(short, long)]
        state: Option<String>,

        /// Maximum number of clusters
        #[clap(short, long)]
        limit: Option<u32>,
    },

    /// Show the evidence, analysis and timeline of one cluster
    Show {
        /// Cluster ID
        #[clap(required = true)]
        id: String,

        /// Replay a published version instead of the live cluster
        #[clap(short = 'V', long)]
        version: Option<u32>,
    },

    /// Show the backend heartbeat and totals
    State,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    configure_cli_logging(args.verbose);

    let mut config = DashboardConfig::from_env();
    if let Some(api_url) = args.api_url {
        config.api_base = api_url;
    }
    let client = ApiClient::from_config(&config)?;

    match args.command {
        Commands::List {
            domain,
            state,
            limit,
        } => {
            let query = ClusterQuery {
                domain,
                state,
                limit: limit.or(config.cluster_limit),
            };
            list_clusters(&client, &query).await;
        }
        Commands::Show { id, version } => {
            show_cluster(&client, &id, version).await?;
        }
        Commands::State => {
            let system = client.fetch_state().await?;
            println!("{}", system_line(&system));
        }
    }

    Ok(())
}

/// A failed listing prints the empty placeholder, like the dashboard.
async fn list_clusters(client: &ApiClient, query: &ClusterQuery) {
    let view = ViewState::from_collection(client.fetch_clusters(query).await);
    match view.loaded() {
        Some(clusters) => {
            cluster_table(clusters).printstd();
            println!("{} clusters", clusters.len());
        }
        None => {
            if let Some(notice) = listing_notice(&view) {
                println!("{}", notice);
            }
        }
    }
}

async fn show_cluster(client: &ApiClient, id: &str, version: Option<u32>) -> Result<()> {
    match client.fetch_cluster(id, version).await {
        Ok(detail) => {
            println!("{}", render_detail(id, version, &ViewState::Loaded(detail)));
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            println!("{}", format!("Cluster {} not found", id).red());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
