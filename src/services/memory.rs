use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::models::{ActivitySource, DateRange, default_activity_sources};
use crate::services::activity_store::{ActivityStore, StoreError};

/// One activity row: who did something, and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub source: String,
    pub provider_id: String,
    pub event_date: NaiveDate,
}

/// Activity store held in memory
///
/// Applies the same union/range semantics as the PostgreSQL store: only rows
/// from configured sources count. Also counts the queries it receives, and can
/// be switched into a failing or slow mode to exercise error paths.
#[derive(Debug)]
pub struct InMemoryActivityStore {
    sources: Vec<ActivitySource>,
    records: Vec<ActivityRecord>,
    queries: AtomicUsize,
    unavailable: AtomicBool,
    latency: Option<Duration>,
}

impl Default for InMemoryActivityStore {
    fn default() -> Self {
        Self {
            sources: default_activity_sources(),
            records: Vec::new(),
            queries: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
            latency: None,
        }
    }
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracked source tables
    pub fn with_sources(mut self, sources: Vec<ActivitySource>) -> Self {
        self.sources = sources;
        self
    }

    /// Add an activity row from the given source table
    pub fn with_record(mut self, source: &str, provider_id: &str, event_date: NaiveDate) -> Self {
        self.records.push(ActivityRecord {
            source: source.to_string(),
            provider_id: provider_id.to_string(),
            event_date,
        });
        self
    }

    /// Delay every query by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make subsequent queries fail as if the database were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of activity queries received so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn is_tracked(&self, table: &str) -> bool {
        self.sources.iter().any(|source| source.table == table)
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn find_active_provider_ids(
        &self,
        provider_ids: &HashSet<String>,
        range: &DateRange,
    ) -> Result<HashSet<String>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }

        Ok(self
            .records
            .iter()
            .filter(|record| self.is_tracked(&record.source))
            .filter(|record| provider_ids.contains(&record.provider_id))
            .filter(|record| range.contains(record.event_date))
            .map(|record| record.provider_id.clone())
            .collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}
