#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `airzone` command-line tool.
//!
//! Lists the known airspace datasets and runs the restriction pipeline for
//! one or all of them, printing the result as JSON on stdout. Logs and the
//! progress bar go to stderr through
//! [`airzone_cli_utils::init_logger`].

use std::path::PathBuf;

use airzone_cli_utils::{IndicatifProgress, MultiProgress};
use airzone_geocoder::vworld::VworldGeocoder;
use airzone_geocoder::{NullGeocoder, ReverseGeocoder};
use airzone_pipeline::config::AirzoneConfig;
use airzone_pipeline::{PipelineOutput, run};
use airzone_source::registry::{self, DEFAULT_DATASET_ID};
use airzone_source::vworld::VworldFetcher;
use airzone_source_models::{BoundingBox, Credentials, DatasetDefinition, FeatureQuery};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "airzone", about = "Airspace restriction zone pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured airspace datasets
    Datasets,
    /// Fetch, classify, and summarize restriction zones
    Run {
        /// Dataset id or upstream code (e.g. "prohibited", "`LT_C_AISRESC`")
        #[arg(long, default_value = DEFAULT_DATASET_ID, conflicts_with = "all")]
        dataset: String,
        /// Run every enabled dataset and merge the results
        #[arg(long)]
        all: bool,
        /// Query box, "BOX(lng1,lat1,lng2,lat2)" or "lng1,lat1,lng2,lat2".
        /// Defaults to the Seoul metropolitan area.
        #[arg(long)]
        bbox: Option<BoundingBox>,
        /// Skip reverse geocoding (zones keep placeholder addresses)
        #[arg(long)]
        no_geocode: bool,
        /// TOML settings file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print every zone, not just the summary
        #[arg(long)]
        zones: bool,
        /// Data API key
        #[arg(long, env = "VWORLD_API_KEY", hide_env_values = true)]
        key: String,
        /// Domain registered with the API key
        #[arg(long, env = "VWORLD_DOMAIN", default_value = "")]
        domain: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = airzone_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Datasets => {
            println!("{:<14} {:<14} {:<8} NAME", "ID", "DATASET", "ENABLED");
            println!("{}", "-".repeat(60));
            for dataset in registry::all_datasets() {
                println!(
                    "{:<14} {:<14} {:<8} {}",
                    dataset.id, dataset.dataset, dataset.enabled, dataset.name
                );
            }
        }
        Commands::Run {
            dataset,
            all,
            bbox,
            no_geocode,
            config,
            zones,
            key,
            domain,
        } => {
            let datasets = if all {
                registry::enabled_datasets()
            } else {
                vec![
                    registry::find_dataset(&dataset)
                        .ok_or_else(|| format!("Unknown dataset: {dataset}"))?,
                ]
            };

            let mut config = match config {
                Some(path) => AirzoneConfig::load(&path)?,
                None => AirzoneConfig::default(),
            };
            if no_geocode {
                config.pipeline.geocode_delay_ms = 0;
            }

            let credentials = Credentials::new(key, domain);
            let output = run_datasets(
                &multi,
                &datasets,
                bbox.unwrap_or_default(),
                &credentials,
                &config,
                no_geocode,
            )
            .await?;

            for row in airzone_analytics::ranked_types(&output.summary) {
                log::info!("{}: {} zones", row.name, row.count);
            }
            for row in airzone_analytics::ranked_districts(&output.summary, Some(5)) {
                log::info!("{}: {} zones", row.name, row.count);
            }

            let json = if zones {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string_pretty(&output.summary)?
            };
            println!("{json}");
        }
    }

    Ok(())
}

/// Runs the pipeline for each dataset in turn and merges the zones.
async fn run_datasets(
    multi: &MultiProgress,
    datasets: &[DatasetDefinition],
    bbox: BoundingBox,
    credentials: &Credentials,
    config: &AirzoneConfig,
    no_geocode: bool,
) -> Result<PipelineOutput, Box<dyn std::error::Error>> {
    let fetcher = VworldFetcher::new(config.fetch.clone())?;
    let geocoder: Box<dyn ReverseGeocoder> = if no_geocode {
        Box::new(NullGeocoder)
    } else {
        Box::new(VworldGeocoder::new(
            config.geocoder.clone(),
            credentials.clone(),
        )?)
    };

    let mut zones = Vec::new();
    for dataset in datasets {
        log::info!("Running {} ({})", dataset.name, dataset.dataset);
        let query = FeatureQuery::new(&dataset.dataset, bbox, credentials.clone());
        let progress = IndicatifProgress::features_bar(multi, &dataset.name);
        let output = run(
            &fetcher,
            geocoder.as_ref(),
            &query,
            &config.pipeline,
            progress,
        )
        .await;
        zones.extend(output.zones);
    }

    let summary = airzone_analytics::aggregate(&zones);
    Ok(PipelineOutput { zones, summary })
}
