//! Fakes shared by the engine and session tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pincode_sales_geocoder::Geocoder;
use pincode_sales_models::{DeviceCategory, GeocodeOutcome, SalesRecord};

/// Geocoder answering from a fixed table; unknown postal codes are
/// [`GeocodeOutcome::NotFound`].
pub struct ScriptedGeocoder {
    outcomes: BTreeMap<String, GeocodeOutcome>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGeocoder {
    pub fn new(outcomes: &[(&str, GeocodeOutcome)]) -> Self {
        Self {
            outcomes: outcomes
                .iter()
                .map(|(code, outcome)| ((*code).to_string(), outcome.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_outcome(mut self, postal_code: &str, outcome: GeocodeOutcome) -> Self {
        self.outcomes.insert(postal_code.to_string(), outcome);
        self
    }

    /// Postal codes looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of lookups that were running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn resolve(&self, postal_code: &str) -> GeocodeOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(postal_code.to_string());

        tokio::task::yield_now().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outcomes
            .get(postal_code)
            .cloned()
            .unwrap_or(GeocodeOutcome::NotFound)
    }
}

pub const fn found(latitude: f64, longitude: f64) -> GeocodeOutcome {
    GeocodeOutcome::Found {
        latitude,
        longitude,
    }
}

pub fn record(
    postal_code: &str,
    city: &str,
    state: &str,
    device: &str,
    quantity: &str,
) -> SalesRecord {
    SalesRecord {
        postal_code: postal_code.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        device_category: DeviceCategory::from_label(device),
        quantity_sold: quantity.to_string(),
    }
}
