use forum_votes_core::{AggregatorConfig, CounterAuditor, ForumService, VoteAggregator};
use forum_votes_repository::postgres::MIGRATOR;
use forum_votes_repository::{
    PostgresAuditRepository, PostgresForumRepository, PostgresVoteRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{Config, ConnectionMode};
use crate::errors::ServiceError;

/// `Dependencies` struct holds the services of the forum votes backend.
///
/// All of them share one PostgreSQL pool whose schema has been migrated.
pub struct Dependencies {
    pub pool: PgPool,
    pub aggregator: VoteAggregator,
    pub forum: ForumService,
    pub auditor: CounterAuditor,
}

impl Dependencies {
    /// Creates a new `Dependencies` instance.
    ///
    /// Connects to PostgreSQL according to the configured connection mode,
    /// applies pending migrations and wires the repositories into the
    /// vote aggregator, the forum service and the counter auditor.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or a
    /// `ServiceError` if any dependency fails to initialize.
    pub async fn new(config: &Config) -> Result<Self, ServiceError> {
        let pool = Self::connect_to_postgres(
            &config.database_url,
            config.max_connections,
            config.connection_mode,
            config.retry_interval,
        )
        .await?;

        MIGRATOR.run(&pool).await?;
        info!("Database migrations applied");

        let votes_repository = Arc::new(PostgresVoteRepository::new(pool.clone()).await?);
        let forum_repository = Arc::new(PostgresForumRepository::new(pool.clone()).await?);
        let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()).await?);

        let aggregator = VoteAggregator::new(
            votes_repository,
            AggregatorConfig {
                max_retries: config.vote_max_retries,
                ..AggregatorConfig::default()
            },
        );

        Ok(Self {
            pool,
            aggregator,
            forum: ForumService::new(forum_repository),
            auditor: CounterAuditor::new(audit_repository),
        })
    }

    /// Connect to PostgreSQL with retry logic based on connection mode.
    async fn connect_to_postgres(
        url: &str,
        max_connections: u32,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<PgPool, ServiceError> {
        loop {
            match PgPoolOptions::new()
                .max_connections(max_connections)
                .connect(url)
                .await
            {
                Ok(pool) => {
                    info!(max_connections, "Connected to PostgreSQL");
                    return Ok(pool);
                }
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(ServiceError::config(format!(
                            "Failed to connect to PostgreSQL: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to PostgreSQL, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fail_fast_reports_config_error() {
        let result = Dependencies::connect_to_postgres(
            "not a database url",
            1,
            ConnectionMode::FailFast,
            Duration::from_millis(10),
        )
        .await;

        match result {
            Err(ServiceError::Config(message)) => {
                assert!(message.starts_with("Failed to connect to PostgreSQL"));
            }
            other => panic!("expected a configuration error, got {:?}", other.map(|_| ())),
        }
    }
}
