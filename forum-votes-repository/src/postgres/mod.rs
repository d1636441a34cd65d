//! PostgreSQL implementation of the forum data store.
//!
//! All repositories share one `sqlx::PgPool`. Every write that touches more
//! than one row runs inside a single transaction so that vote records,
//! item counters and author reputation never diverge.
//!
//! ## Database Tables
//!
//! - `forum_posts`: Questions with their denormalized counters
//! - `forum_answers`: Answers, nested under a post
//! - `user_item_votes`: At most one vote per (user, item)
//! - `author_reputation`: Running totals per content author
mod audit_repository;
pub(crate) mod codec;
mod forum_repository;
mod votes_repository;

pub use audit_repository::PostgresAuditRepository;
pub use forum_repository::PostgresForumRepository;
pub use votes_repository::PostgresVoteRepository;

use forum_votes_shared::types::VoteDelta;
use sqlx::migrate::Migrator;

/// Schema migrations embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("src/postgres/migrations");

/// Adds `delta` to the reputation totals of `author_id` within `tx`.
///
/// Zero deltas are skipped so retractions of nothing never create empty rows.
pub(crate) async fn apply_reputation_delta(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    author_id: &str,
    delta: VoteDelta,
) -> Result<(), sqlx::Error> {
    if delta.is_zero() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO author_reputation (user_id, total_helpful_votes, total_not_helpful_votes)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id)
        DO UPDATE SET
            total_helpful_votes = author_reputation.total_helpful_votes + EXCLUDED.total_helpful_votes,
            total_not_helpful_votes = author_reputation.total_not_helpful_votes + EXCLUDED.total_not_helpful_votes
        "#,
    )
    .bind(author_id)
    .bind(delta.helpful)
    .bind(delta.not_helpful)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
