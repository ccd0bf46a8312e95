// Core algorithm exports
pub mod evaluator;
pub mod period;

pub use evaluator::{EligibilityEvaluator, EvaluationError, collect_provider_ids, remap_results};
pub use period::{ValidationError, month_range, parse_period, validate_period};
