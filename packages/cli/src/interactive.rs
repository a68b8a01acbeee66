//! Interactive menu shown when no subcommand is given.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use pincode_sales_cli_utils::MultiProgress;
use pincode_sales_geocoder::service_registry;
use pincode_sales_models::LocationKey;

use crate::pipeline::{self, LoadConfig};

/// Top-level actions available in the menu.
enum Action {
    BuildMap,
    ServeMap,
    GeocodePincode,
    ListServices,
}

impl Action {
    const ALL: &[Self] = &[
        Self::BuildMap,
        Self::ServeMap,
        Self::GeocodePincode,
        Self::ListServices,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::BuildMap => "Build sales map",
            Self::ServeMap => "Build and serve sales map",
            Self::GeocodePincode => "Look up a pincode",
            Self::ListServices => "List geocoding services",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected action fails.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Pincode Sales Map");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::BuildMap => {
            let config = prompt_load_config()?;
            let output: String = Input::new()
                .with_prompt("Output directory")
                .default("output".to_string())
                .interact_text()?;
            let error_page = Confirm::new()
                .with_prompt("Write an error page if the CSV can't be loaded?")
                .default(true)
                .interact()?;

            pipeline::build_map(multi, config, &PathBuf::from(output), error_page).await?;
        }
        Action::ServeMap => {
            let config = prompt_load_config()?;
            let (default_bind, default_port) = pincode_sales_server::bind_from_env();

            let bind_addr: String = Input::new()
                .with_prompt("Bind address")
                .default(default_bind)
                .interact_text()?;
            let port: u16 = Input::new()
                .with_prompt("Port")
                .default(default_port)
                .interact_text()?;

            pipeline::serve_map(multi, config, bind_addr, port).await?;
        }
        Action::GeocodePincode => {
            let pincode: String = Input::new().with_prompt("Pincode").interact_text()?;
            pipeline::geocode_one(&pincode, None).await?;
        }
        Action::ListServices => pipeline::list_services(),
    }

    Ok(())
}

/// Prompts for the CSV source and the load settings.
fn prompt_load_config() -> Result<LoadConfig, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt("Sales CSV (path or URL)")
        .default("sales_data.csv".to_string())
        .interact_text()?;

    let keys = [LocationKey::City, LocationKey::CityState];
    let key_labels = ["City", "City and state"];
    let key_idx = Select::new()
        .with_prompt("Group top locations by")
        .items(&key_labels)
        .default(0)
        .interact()?;

    let services = service_registry::enabled_services();
    let service = match services.len() {
        0 => return Err("No geocoding service is enabled".into()),
        1 => services[0].clone(),
        _ => {
            let labels: Vec<String> = services
                .iter()
                .map(|s| format!("{} ({})", s.name, s.id))
                .collect();
            let idx = Select::new()
                .with_prompt("Geocoding service")
                .items(&labels)
                .default(0)
                .interact()?;
            services[idx].clone()
        }
    };

    let rate_limit_ms: u64 = Input::new()
        .with_prompt("Delay between geocode requests (ms)")
        .default(service.rate_limit_ms())
        .interact_text()?;

    Ok(LoadConfig {
        input,
        location_key: keys[key_idx],
        rate_limit_ms: Some(rate_limit_ms),
        delimiter: b',',
        service: Some(service.id),
    })
}
