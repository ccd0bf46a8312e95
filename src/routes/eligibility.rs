use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::core::{parse_period, EligibilityEvaluator, EvaluationError};
use crate::models::{EligibilityRequest, ErrorResponse, HealthResponse, MonthlyStatusRequest};
use crate::services::{ActivityStore, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ActivityStore>,
    pub evaluator: EligibilityEvaluator,
    pub request_timeout: Duration,
}

/// Configure the eligibility routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/chw/monthly-status", web::post().to(check_monthly_status));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Monthly status endpoint
///
/// POST /chw/monthly-status
///
/// Request body:
/// ```json
/// {
///   "period": { "month": "6", "year": "2024" },
///   "chws": [{ "NationalIdentificationNumber": "string", "OpenmrsProviderId": "string" }]
/// }
/// ```
///
/// Responds with one `{ "NationalIdentificationNumber", "Eligible" }` entry per
/// submitted CHW, in submission order.
async fn check_monthly_status(
    state: web::Data<AppState>,
    req: web::Json<MonthlyStatusRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for monthly status request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let req = req.into_inner();
    let period = match parse_period(&req.period) {
        Ok(period) => period,
        Err(e) => return error_response(EvaluationError::from(e)),
    };

    let request = EligibilityRequest {
        period,
        workers: req.chws,
    };

    let evaluation = state.evaluator.evaluate(&request, state.store.as_ref());
    let outcome = match tokio::time::timeout(state.request_timeout, evaluation).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(
                "Eligibility check for {} workers timed out after {:?}",
                request.workers.len(),
                state.request_timeout
            );
            Err(StoreError::TimedOut(state.request_timeout).into())
        }
    };

    match outcome {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => error_response(e),
    }
}

fn error_response(err: EvaluationError) -> HttpResponse {
    match err {
        EvaluationError::Validation(e) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid period".to_string(),
            message: e.to_string(),
            status_code: 400,
        }),
        EvaluationError::Store(e) => {
            tracing::error!("Eligibility check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Activity store unavailable".to_string(),
                message: e.to_string(),
                status_code: 503,
            })
        }
    }
}
