// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ActivitySource, DateRange, EligibilityRequest, EligibilityResult, Period, WorkerRecord, default_activity_sources};
pub use requests::{MonthlyStatusRequest, PeriodPayload};
pub use responses::{ErrorResponse, HealthResponse};
