use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::models::{ActivitySource, DateRange};

/// Errors raised while looking up worker activity
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Activity query timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Invalid activity source: {0}")]
    InvalidSource(String),

    #[error("Activity store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of provider IDs with recorded service activity
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Return the subset of `provider_ids` with at least one activity record,
    /// in any tracked source, dated inside `range`
    async fn find_active_provider_ids(
        &self,
        provider_ids: &HashSet<String>,
        range: &DateRange,
    ) -> Result<HashSet<String>, StoreError>;

    /// Whether the backing store currently answers queries
    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// SQL for the union of all activity sources
///
/// Table and column names come from configuration and are validated and
/// quoted once here. Provider IDs and dates are always bound as `$1`
/// (`text[]`), `$2` and `$3`.
#[derive(Debug, Clone)]
pub struct ActivityQuery {
    sql: String,
    source_count: usize,
}

impl ActivityQuery {
    pub fn new(sources: &[ActivitySource]) -> Result<Self, StoreError> {
        if sources.is_empty() {
            return Err(StoreError::InvalidSource(
                "at least one activity source must be configured".to_string(),
            ));
        }

        let selects = sources
            .iter()
            .map(|source| {
                Ok(format!(
                    "SELECT {}::text AS provider_id, {} AS event_date FROM {}",
                    quote_identifier(&source.provider_column)?,
                    quote_identifier(&source.date_column)?,
                    quote_identifier(&source.table)?,
                ))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let sql = format!(
            "SELECT DISTINCT provider_id FROM ({}) activity \
             WHERE provider_id = ANY($1) AND event_date >= $2 AND event_date < $3",
            selects.join(" UNION ALL "),
        );

        Ok(Self {
            sql,
            source_count: sources.len(),
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn source_count(&self) -> usize {
        self.source_count
    }
}

/// Quote a possibly schema-qualified identifier such as `public.hps_client_services`
fn quote_identifier(name: &str) -> Result<String, StoreError> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(StoreError::InvalidSource(name.to_string()));
    }

    let mut quoted = Vec::with_capacity(parts.len());
    for part in parts {
        let mut chars = part.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StoreError::InvalidSource(name.to_string()));
        }
        quoted.push(format!("\"{}\"", part));
    }

    Ok(quoted.join("."))
}
