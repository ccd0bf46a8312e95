//! CHW Status Check - monthly activity eligibility for community health workers
//!
//! Given a calendar month and a batch of CHWs, reports for each worker whether
//! any service activity was recorded against their provider ID in that month,
//! across all tracked HPS service tables.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{EligibilityEvaluator, EvaluationError, ValidationError, month_range};
pub use crate::models::{DateRange, EligibilityRequest, EligibilityResult, Period, WorkerRecord};
pub use crate::services::{ActivityStore, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let range = month_range(&Period::new(12, 2024)).unwrap();
        assert_eq!(range.end.to_string(), "2025-01-01");
    }
}
