use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar month being checked for activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Self {
        Self { month, year }
    }
}

/// A CHW as supplied by the caller
///
/// `identification_number` is only echoed back in the response; matching
/// against activity records always goes through `provider_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    #[serde(rename = "NationalIdentificationNumber", default)]
    pub identification_number: String,
    #[serde(rename = "OpenmrsProviderId", default)]
    pub provider_id: String,
}

impl WorkerRecord {
    pub fn new(identification_number: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            identification_number: identification_number.into(),
            provider_id: provider_id.into(),
        }
    }
}

/// Validated eligibility check for a batch of workers
#[derive(Debug, Clone)]
pub struct EligibilityRequest {
    pub period: Period,
    pub workers: Vec<WorkerRecord>,
}

/// Eligibility flag for one input worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    #[serde(rename = "NationalIdentificationNumber")]
    pub identification_number: String,
    #[serde(rename = "Eligible")]
    pub eligible: bool,
}

/// Half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// One table contributing activity rows to the eligibility check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySource {
    pub table: String,
    #[serde(default = "default_provider_column")]
    pub provider_column: String,
    #[serde(default = "default_date_column")]
    pub date_column: String,
}

impl ActivitySource {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            provider_column: default_provider_column(),
            date_column: default_date_column(),
        }
    }
}

fn default_provider_column() -> String { "provider_id".to_string() }
fn default_date_column() -> String { "event_date".to_string() }

/// The service tables tracked by HPS
pub fn default_activity_sources() -> Vec<ActivitySource> {
    vec![
        ActivitySource::new("hps_client_services"),
        ActivitySource::new("hps_household_services"),
        ActivitySource::new("hps_death_registrations"),
        ActivitySource::new("hps_mobilization_services"),
    ]
}
