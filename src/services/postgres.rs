use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Row};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::DatabaseSettings;
use crate::models::{ActivitySource, DateRange};
use crate::services::activity_store::{ActivityQuery, ActivityStore, StoreError};

/// Hands out PostgreSQL connections for the activity database
///
/// The pool connects lazily, so an unreachable server surfaces as a
/// `StoreError` on the first query instead of failing startup. Checked-out
/// connections go back to the pool when dropped, on success and error alike.
#[derive(Clone)]
pub struct ConnectionProvider {
    pool: PgPool,
}

impl ConnectionProvider {
    /// Open a provider for the given server and credentials
    pub fn open(
        server_name: &str,
        port: u16,
        database_name: &str,
        username: &str,
        password: &str,
    ) -> Self {
        Self::with_pool_options(
            connect_options(server_name, port, database_name, username, password),
            PgPoolOptions::new(),
        )
    }

    /// Open a provider from settings, applying the configured pool limits
    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        tracing::info!(
            "Configuring PostgreSQL pool for {}:{}/{} as {}",
            settings.server_name,
            settings.port,
            settings.database_name,
            settings.username
        );

        let pool_options = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
            .test_before_acquire(true);

        Self::with_pool_options(
            connect_options(
                &settings.server_name,
                settings.port,
                &settings.database_name,
                &settings.username,
                &settings.password,
            ),
            pool_options,
        )
    }

    fn with_pool_options(options: PgConnectOptions, pool_options: PgPoolOptions) -> Self {
        Self {
            pool: pool_options.connect_lazy_with(options),
        }
    }

    /// Check out one connection from the pool
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        Ok(self.pool.acquire().await?)
    }
}

fn connect_options(
    server_name: &str,
    port: u16,
    database_name: &str,
    username: &str,
    password: &str,
) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(server_name)
        .port(port)
        .database(database_name)
        .username(username)
        .password(password)
        .application_name(env!("CARGO_PKG_NAME"))
}

/// Activity store backed by the HPS service tables in PostgreSQL
pub struct PostgresActivityStore {
    connections: ConnectionProvider,
    query: ActivityQuery,
}

impl PostgresActivityStore {
    pub fn new(connections: ConnectionProvider, sources: &[ActivitySource]) -> Result<Self, StoreError> {
        let query = ActivityQuery::new(sources)?;
        tracing::debug!("Activity query over {} sources: {}", query.source_count(), query.sql());

        Ok(Self { connections, query })
    }
}

#[async_trait]
impl ActivityStore for PostgresActivityStore {
    async fn find_active_provider_ids(
        &self,
        provider_ids: &HashSet<String>,
        range: &DateRange,
    ) -> Result<HashSet<String>, StoreError> {
        let ids: Vec<String> = provider_ids.iter().cloned().collect();
        let start: NaiveDate = range.start;
        let end: NaiveDate = range.end;

        let mut conn = self.connections.acquire().await?;

        let rows = sqlx::query(self.query.sql())
            .bind(&ids[..])
            .bind(start)
            .bind(end)
            .fetch_all(&mut *conn)
            .await?;

        let active = rows
            .iter()
            .map(|row| row.try_get::<String, _>("provider_id"))
            .collect::<Result<HashSet<String>, _>>()?;

        tracing::debug!(
            "{} of {} providers active between {} and {}",
            active.len(),
            ids.len(),
            start,
            end
        );

        Ok(active)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let mut conn = self.connections.acquire().await?;

        sqlx::query("SELECT 1")
            .fetch_one(&mut *conn)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_activity_sources;

    #[tokio::test]
    async fn test_store_builds_without_connecting() {
        let connections = ConnectionProvider::open("localhost", 5432, "hps", "hps", "secret");
        let store = PostgresActivityStore::new(connections, &default_activity_sources()).unwrap();

        assert_eq!(store.query.source_count(), 4);
    }

    #[tokio::test]
    async fn test_store_rejects_bad_source() {
        let connections = ConnectionProvider::open("localhost", 5432, "hps", "hps", "secret");
        let result = PostgresActivityStore::new(connections, &[ActivitySource::new("bad table")]);

        assert!(matches!(result, Err(StoreError::InvalidSource(_))));
    }

    fn env_or(name: &str, default: &str) -> String {
        std::env::var(name).unwrap_or_else(|_| default.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server reachable via PGHOST/PGPORT/PGDATABASE/PGUSER/PGPASSWORD"]
    async fn test_find_active_provider_ids_against_postgres() {
        // Temp tables are per-connection, so keep the pool to one connection.
        let connections = ConnectionProvider::with_pool_options(
            connect_options(
                &env_or("PGHOST", "localhost"),
                env_or("PGPORT", "5432").parse().unwrap(),
                &env_or("PGDATABASE", "postgres"),
                &env_or("PGUSER", "postgres"),
                &env_or("PGPASSWORD", ""),
            ),
            PgPoolOptions::new().max_connections(1),
        );

        {
            let mut conn = connections.acquire().await.unwrap();
            for source in default_activity_sources() {
                let ddl = format!(
                    "CREATE TEMP TABLE {} (provider_id TEXT NOT NULL, event_date TIMESTAMP NOT NULL)",
                    source.table
                );
                sqlx::query(&ddl).execute(&mut *conn).await.unwrap();
            }

            let rows = [
                ("hps_client_services", "P100", "2024-06-01 00:00:00"),
                ("hps_household_services", "P200", "2024-06-30 23:59:59"),
                ("hps_death_registrations", "P300", "2024-07-01 00:00:00"),
                ("hps_mobilization_services", "P400 ", "2024-06-15 08:30:00"),
                ("hps_client_services", "P500", "2024-05-31 23:59:59"),
            ];
            for (table, provider_id, event_date) in rows {
                let insert = format!(
                    "INSERT INTO {} (provider_id, event_date) VALUES ($1, $2::timestamp)",
                    table
                );
                sqlx::query(&insert)
                    .bind(provider_id)
                    .bind(event_date)
                    .execute(&mut *conn)
                    .await
                    .unwrap();
            }
        }

        let store = PostgresActivityStore::new(connections, &default_activity_sources()).unwrap();
        let range = DateRange { start: date(2024, 6, 1), end: date(2024, 7, 1) };
        let ids: HashSet<String> = ["P100", "P200", "P300", "P400 ", "P400", "P500", "P999"]
            .iter()
            .map(|id| id.to_string())
            .collect();

        let active = store.find_active_provider_ids(&ids, &range).await.unwrap();

        let expected: HashSet<String> = ["P100", "P200", "P400 "].iter().map(|id| id.to_string()).collect();
        assert_eq!(active, expected);
        assert!(store.health_check().await.unwrap());
    }
}
