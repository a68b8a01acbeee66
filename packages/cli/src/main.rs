#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the pincode sales map.
//!
//! Every subcommand loads a sales CSV, geocodes each pincode through the
//! configured geocoding service and either writes the map to disk (`run`)
//! or serves it over HTTP (`serve`). Without a subcommand an interactive
//! menu is shown.
//!
//! Uses `indicatif-log-bridge` (via [`pincode_sales_cli_utils::init_logger`])
//! so log lines and the geocoding progress bar share the terminal.

mod interactive;
mod pipeline;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pincode_sales_models::LocationKey;

use crate::pipeline::LoadConfig;

#[derive(Parser)]
#[command(name = "pincode_sales", about = "Map device sales by pincode")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command that loads a CSV.
#[derive(Args)]
struct LoadArgs {
    /// Sales CSV: a local path or an `http(s)://` URL
    #[arg(long, short)]
    input: String,
    /// How sales are grouped under "Top Locations" (`city` or `city-state`)
    #[arg(long, default_value_t = LocationKey::City)]
    location_key: LocationKey,
    /// Delay between geocode requests in milliseconds (defaults to the
    /// service's `rate_limit_ms`)
    #[arg(long)]
    rate_limit_ms: Option<u64>,
    /// CSV field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,
    /// Geocoding service ID (defaults to the highest-priority enabled one)
    #[arg(long)]
    service: Option<String>,
}

impl LoadArgs {
    fn into_config(self) -> Result<LoadConfig, Box<dyn std::error::Error>> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                format!(
                    "Delimiter must be a single ASCII character, got '{}'",
                    self.delimiter
                )
            })?;

        Ok(LoadConfig {
            input: self.input,
            location_key: self.location_key,
            rate_limit_ms: self.rate_limit_ms,
            delimiter,
            service: self.service,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the map and write `markers.geojson`, `stats.json` and `index.html`
    Run {
        #[command(flatten)]
        load: LoadArgs,
        /// Directory the output files are written to
        #[arg(long, short, default_value = "output")]
        output: PathBuf,
        /// On a load or parse failure, write an `index.html` showing the error
        #[arg(long)]
        error_page: bool,
    },
    /// Build the map and serve it over HTTP
    Serve {
        #[command(flatten)]
        load: LoadArgs,
        /// Bind address (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Look up a single pincode
    Geocode {
        pincode: String,
        /// Geocoding service ID
        #[arg(long)]
        service: Option<String>,
    },
    /// List configured geocoding services
    Services,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = pincode_sales_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi).await;
    };

    match command {
        Commands::Run {
            load,
            output,
            error_page,
        } => {
            pipeline::build_map(&multi, load.into_config()?, &output, error_page).await?;
        }
        Commands::Serve { load, bind, port } => {
            let (env_bind, env_port) = pincode_sales_server::bind_from_env();
            pipeline::serve_map(
                &multi,
                load.into_config()?,
                bind.unwrap_or(env_bind),
                port.unwrap_or(env_port),
            )
            .await?;
        }
        Commands::Geocode { pincode, service } => {
            pipeline::geocode_one(&pincode, service.as_deref()).await?;
        }
        Commands::Services => pipeline::list_services(),
    }

    Ok(())
}
