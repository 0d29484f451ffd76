#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the MLS point locator.
//!
//! Each subcommand runs one scripted operation against the backend. With
//! no subcommand an interactive menu drives a live dashboard session.
//!
//! Uses `indicatif-log-bridge` (via [`mls_locator_cli_utils::init_logger`])
//! so `log` output and the reload progress bars share the terminal.

mod commands;
mod interactive;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mls_locator_client::RemoteDataClient;
use mls_locator_config::LocatorConfig;
use mls_locator_point_models::PointStatus;
use mls_locator_report::ReportKind;

use crate::commands::LoadArgs;

/// Locate and report on MLS points.
#[derive(Parser)]
#[command(name = "mls_locator")]
#[command(about = "Locate and report on MLS points")]
struct Cli {
    /// TOML config file (defaults to `MLS_LOCATOR_CONFIG`, then built-in
    /// defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute. Omit for the interactive session.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List districts.
    Districts,

    /// List the mandals of a district.
    Mandals {
        /// District code.
        district: String,
    },

    /// List the points of one district/mandal pair.
    Points {
        /// District code.
        district: String,
        /// Mandal code.
        mandal: String,
    },

    /// Look up a single MLS point by code.
    Search {
        code: String,
    },

    /// Suggest MLS codes containing a query.
    Suggest {
        query: String,
    },

    /// Check backend connectivity.
    Health,

    /// Load a district (or the all-districts sample) and print the
    /// dashboard.
    Load {
        /// District code or name. Omit for all districts.
        #[arg(long)]
        district: Option<String>,

        /// Free-text table search.
        #[arg(long)]
        search: Option<String>,

        /// Status filter ("active" or "inactive").
        #[arg(long, value_parser = parse_status)]
        status: Option<PointStatus>,

        /// Mandal name filter.
        #[arg(long)]
        mandal: Option<String>,

        /// 1-based table page.
        #[arg(long)]
        page: Option<usize>,

        /// Write map markers as GeoJSON to this file.
        #[arg(long)]
        markers: Option<PathBuf>,

        /// Print the projected dashboard as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate a report.
    Report {
        /// district-summary, active-points, or point-detail.
        #[arg(value_parser = parse_report_kind)]
        kind: ReportKind,

        /// District code or name for the multi-point reports.
        #[arg(long)]
        district: Option<String>,

        /// Point code for point-detail reports.
        #[arg(long)]
        code: Option<String>,

        /// Print a text preview instead of writing a PDF.
        #[arg(long)]
        preview: bool,
    },
}

fn parse_status(value: &str) -> Result<PointStatus, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "active" => Ok(PointStatus::Active),
        "inactive" => Ok(PointStatus::Inactive),
        other => Err(format!("unknown status '{other}' (expected active or inactive)")),
    }
}

fn parse_report_kind(value: &str) -> Result<ReportKind, String> {
    value.parse().map_err(|_| {
        let kinds: Vec<String> = ReportKind::ALL.iter().map(ToString::to_string).collect();
        format!("unknown report '{value}' (expected one of {})", kinds.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = mls_locator_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = LocatorConfig::load(cli.config.as_deref())?;
    let api = RemoteDataClient::new(&config.api)?;
    log::debug!("Using backend {}", api.base_url());

    match cli.command {
        None => interactive::run(&api, &config, &multi).await,
        Some(Commands::Districts) => commands::districts(&api).await,
        Some(Commands::Mandals { district }) => commands::mandals(&api, &district).await,
        Some(Commands::Points { district, mandal }) => {
            commands::points(&api, &district, &mandal).await
        }
        Some(Commands::Search { code }) => commands::search(&api, &config, &code).await,
        Some(Commands::Suggest { query }) => commands::suggest(&api, &query).await,
        Some(Commands::Health) => commands::health(&api).await,
        Some(Commands::Load {
            district,
            search,
            status,
            mandal,
            page,
            markers,
            json,
        }) => {
            let args = LoadArgs {
                district,
                search,
                status,
                mandal,
                page,
                markers,
                json,
            };
            commands::load(&api, &config, &multi, args).await
        }
        Some(Commands::Report {
            kind,
            district,
            code,
            preview,
        }) => {
            commands::report(
                &api,
                &config,
                &multi,
                kind,
                district.as_deref(),
                code.as_deref(),
                preview,
            )
            .await
        }
    }
}
