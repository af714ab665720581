#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the Gyeonggi flood map.
//!
//! Looks up live flood statistics, trace and weak facility details, and
//! ranked mitigation solutions for any of the province's 31 cities and
//! counties, or starts the API server. Without a subcommand it runs an
//! interactive region picker.
//!
//! Uses `indicatif-log-bridge` (via [`flood_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod interactive;
mod output;

use clap::{Parser, Subcommand};
use flood_map_cli_utils::{MultiProgress, with_spinner};
use flood_map_recommend::rank;
use flood_map_region_models::{Region, all_regions, resolve};
use flood_map_wfs::{
    WfsClient, WfsConfig, fetch_facility_details, fetch_region_stats, fetch_trace_details,
};

/// Gyeonggi-do flood risk lookups.
#[derive(Parser)]
#[command(name = "flood_map_cli")]
#[command(about = "Gyeonggi-do flood risk lookups")]
struct Cli {
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand to execute. Runs the interactive picker when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List all cities and counties.
    Regions,

    /// Show aggregated flood statistics for a region.
    Stats {
        /// Region slug, administrative code or name.
        region: String,
    },

    /// List recorded flood traces in a region.
    Traces {
        /// Region slug, administrative code or name.
        region: String,
    },

    /// List flood-vulnerable facilities in a region.
    Facilities {
        /// Region slug, administrative code or name.
        region: String,
    },

    /// Rank mitigation solutions for a region.
    Recommend {
        /// Region slug, administrative code or name.
        region: String,
    },

    /// Start the API server.
    Serve,
}

fn find_region(input: &str) -> Result<&'static Region, Box<dyn std::error::Error>> {
    resolve(input).ok_or_else(|| format!("Unknown region: {input}").into())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let multi = flood_map_cli_utils::init_logger();

    let Some(command) = cli.command else {
        let client = WfsClient::new(&WfsConfig::from_env())?;
        return interactive::run(&multi, &client).await;
    };

    match command {
        Commands::Regions => {
            if cli.json {
                print_json(all_regions())?;
            } else {
                print!("{}", output::regions(all_regions()));
            }
        }
        Commands::Stats { region } => {
            let region = find_region(&region)?;
            let client = WfsClient::new(&WfsConfig::from_env())?;
            let stats = load_stats(&multi, &client, region).await;
            if cli.json {
                print_json(&stats)?;
            } else {
                print!("{}", output::stats(region, &stats));
            }
        }
        Commands::Traces { region } => {
            let region = find_region(&region)?;
            let client = WfsClient::new(&WfsConfig::from_env())?;
            let traces = with_spinner(
                &multi,
                &format!("Loading flood traces for {}", region.name),
                fetch_trace_details(&client, &region.code),
            )
            .await;
            if cli.json {
                print_json(&traces)?;
            } else {
                print!("{}", output::traces(&traces));
            }
        }
        Commands::Facilities { region } => {
            let region = find_region(&region)?;
            let client = WfsClient::new(&WfsConfig::from_env())?;
            let facilities = with_spinner(
                &multi,
                &format!("Loading weak facilities for {}", region.name),
                fetch_facility_details(&client, &region.code),
            )
            .await;
            if cli.json {
                print_json(&facilities)?;
            } else {
                print!("{}", output::facilities(&facilities));
            }
        }
        Commands::Recommend { region } => {
            let region = find_region(&region)?;
            let client = WfsClient::new(&WfsConfig::from_env())?;
            let stats = load_stats(&multi, &client, region).await;
            let ranking = rank(&stats);
            if cli.json {
                print_json(&ranking)?;
            } else {
                print!("{}", output::recommendations(&ranking));
            }
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(flood_map_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

async fn load_stats(
    multi: &MultiProgress,
    client: &WfsClient,
    region: &Region,
) -> flood_map_flood_models::RegionStats {
    with_spinner(
        multi,
        &format!("Loading flood statistics for {}", region.name),
        fetch_region_stats(client, &region.name, &region.code),
    )
    .await
}
