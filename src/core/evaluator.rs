use std::collections::HashSet;
use thiserror::Error;
use tracing::Instrument;

use crate::core::period::{month_range, ValidationError};
use crate::models::{EligibilityRequest, EligibilityResult, WorkerRecord};
use crate::services::{ActivityStore, StoreError};

/// Reasons an eligibility check can fail as a whole
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Activity store error: {0}")]
    Store(#[from] StoreError),
}

/// Decides whether each worker recorded any activity during a month
///
/// # Steps
/// 1. Turn the period into a `[first of month, first of next month)` range
/// 2. Collect the distinct, non-blank provider IDs
/// 3. Ask the store which of them were active in the range (one query)
/// 4. Map the answer back onto every input worker, in order
///
/// The evaluator holds no state; a failure at any step fails the whole batch.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEvaluator;

impl EligibilityEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub async fn evaluate<S>(
        &self,
        request: &EligibilityRequest,
        store: &S,
    ) -> Result<Vec<EligibilityResult>, EvaluationError>
    where
        S: ActivityStore + ?Sized,
    {
        let range = month_range(&request.period)?;
        let provider_ids = collect_provider_ids(&request.workers);

        let span = tracing::info_span!(
            "evaluate",
            request_id = %uuid::Uuid::new_v4(),
            month = request.period.month,
            year = request.period.year,
        );

        async move {
            let active = if provider_ids.is_empty() {
                tracing::debug!("No provider IDs to look up, skipping activity query");
                HashSet::new()
            } else {
                store
                    .find_active_provider_ids(&provider_ids, &range)
                    .await
                    .map_err(|e| {
                        tracing::error!("Activity lookup failed: {}", e);
                        e
                    })?
            };

            let results = remap_results(&request.workers, &active);

            tracing::info!(
                "Checked {} workers ({} distinct providers) for [{}, {}): {} eligible",
                results.len(),
                provider_ids.len(),
                range.start,
                range.end,
                results.iter().filter(|r| r.eligible).count()
            );

            Ok::<_, EvaluationError>(results)
        }
        .instrument(span)
        .await
    }
}

/// Distinct provider IDs worth querying; blank IDs can never be eligible
///
/// Non-blank IDs are opaque keys and are passed through byte for byte.
pub fn collect_provider_ids(workers: &[WorkerRecord]) -> HashSet<String> {
    workers
        .iter()
        .filter(|worker| !is_blank(&worker.provider_id))
        .map(|worker| worker.provider_id.clone())
        .collect()
}

/// One result per worker, in input order, keyed by identification number
pub fn remap_results(workers: &[WorkerRecord], active: &HashSet<String>) -> Vec<EligibilityResult> {
    workers
        .iter()
        .map(|worker| EligibilityResult {
            identification_number: worker.identification_number.clone(),
            eligible: !is_blank(&worker.provider_id) && active.contains(&worker.provider_id),
        })
        .collect()
}

fn is_blank(provider_id: &str) -> bool {
    provider_id.trim().is_empty()
}
