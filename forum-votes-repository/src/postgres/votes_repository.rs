//! PostgreSQL implementation of `VoteRepository`.
//!
//! A changeset is applied in one transaction that locks rows in a fixed
//! order: the item row, then the vote record, then the author's reputation
//! row. The vote record write is conditioned on the record state the
//! changeset was planned from and runs before the counters move, so a stale
//! changeset is refused as a conflict. Counters are only ever changed
//! relative to their current value.
use async_trait::async_trait;
use forum_votes_shared::types::{
    AuthorReputation, ItemRef, ItemType, RecordWrite, VotableItem, VoteChangeset, VoteKey, VoteRecord,
    VotesCount,
};
use sqlx::Row;
use tracing::{debug, instrument};
use crate::errors::CodecError;
use crate::postgres::apply_reputation_delta;
use crate::postgres::codec::{
    CHECK_VIOLATION, counts_from_row, has_sql_state, item_type_to_i16, to_timestamp,
    vote_record_from_row, vote_type_to_i16,
};
use crate::{VoteRepository, VoteRepositoryError};

/// PostgreSQL implementation of the vote repository.
pub struct PostgresVoteRepository {
    pool: sqlx::PgPool,
}

impl PostgresVoteRepository {
    /// Creates a new repository over a pool whose schema is already migrated.
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VoteRepositoryError> {
        Ok(Self { pool })
    }

    /// Locks the item row and returns its author.
    ///
    /// This is the first statement of the transaction.
    async fn lock_item_tx(
        &self,
        item: &ItemRef,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<String, VoteRepositoryError> {
        let query = match item {
            ItemRef::Post { post_id } => {
                sqlx::query("SELECT author_id FROM forum_posts WHERE id = $1 FOR UPDATE")
                    .bind(post_id.as_str())
            }
            ItemRef::Answer { post_id, answer_id } => sqlx::query(
                "SELECT author_id FROM forum_answers WHERE id = $1 AND post_id = $2 FOR UPDATE",
            )
            .bind(answer_id.as_str())
            .bind(post_id.as_str()),
        };

        let row = query
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| VoteRepositoryError::item_not_found(item))?;
        Ok(row.try_get("author_id")?)
    }

    /// Applies the counter delta to the locked item row and returns the new counters.
    async fn update_item_counters_tx(
        &self,
        changeset: &VoteChangeset,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<VotesCount, VoteRepositoryError> {
        let query = match &changeset.item {
            ItemRef::Post { post_id } => sqlx::query(
                r#"
                UPDATE forum_posts
                SET helpful_count = helpful_count + $1,
                    not_helpful_count = not_helpful_count + $2
                WHERE id = $3
                RETURNING helpful_count, not_helpful_count
                "#,
            )
            .bind(changeset.delta.helpful)
            .bind(changeset.delta.not_helpful)
            .bind(post_id.as_str()),
            ItemRef::Answer { post_id, answer_id } => sqlx::query(
                r#"
                UPDATE forum_answers
                SET helpful_count = helpful_count + $1,
                    not_helpful_count = not_helpful_count + $2
                WHERE id = $3 AND post_id = $4
                RETURNING helpful_count, not_helpful_count
                "#,
            )
            .bind(changeset.delta.helpful)
            .bind(changeset.delta.not_helpful)
            .bind(answer_id.as_str())
            .bind(post_id.as_str()),
        };

        let row = match query.fetch_optional(&mut **tx).await {
            Ok(row) => row,
            Err(err) => {
                let underflow = has_sql_state(&err, CHECK_VIOLATION);
                if underflow {
                    return Err(VoteRepositoryError::CounterUnderflow(
                        changeset.item.item_id().to_string(),
                    ));
                }
                return Err(err.into());
            }
        };

        let row = row.ok_or_else(|| VoteRepositoryError::item_not_found(&changeset.item))?;
        Ok(counts_from_row(&row)?)
    }

    /// Writes the vote record only if the stored record still matches `changeset.expected`.
    async fn write_vote_record_tx(
        &self,
        changeset: &VoteChangeset,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), VoteRepositoryError> {
        let key = &changeset.key;
        let rows_affected = match (&changeset.record, changeset.expected) {
            (RecordWrite::Upsert(record), None) => {
                if record.item_type == ItemType::Answer
                    && record.post_id.is_none()
                {
                    return Err(CodecError::MissingParentPost(record.item_id.clone()).into());
                }
                sqlx::query(
                    r#"
                    INSERT INTO user_item_votes (user_id, item_id, item_type, post_id, vote_type, voted_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (user_id, item_id) DO NOTHING
                    "#,
                )
                .bind(record.user_id.as_str())
                .bind(record.item_id.as_str())
                .bind(item_type_to_i16(record.item_type))
                .bind(record.post_id.as_deref())
                .bind(vote_type_to_i16(record.vote_type))
                .bind(to_timestamp(record.voted_at)?)
                .execute(&mut **tx)
                .await?
                .rows_affected()
            }
            (RecordWrite::Upsert(record), Some(expected)) => sqlx::query(
                r#"
                UPDATE user_item_votes
                SET vote_type = $3, voted_at = $4
                WHERE user_id = $1 AND item_id = $2 AND vote_type = $5
                "#,
            )
            .bind(key.user_id.as_str())
            .bind(key.item_id.as_str())
            .bind(vote_type_to_i16(record.vote_type))
            .bind(to_timestamp(record.voted_at)?)
            .bind(vote_type_to_i16(expected))
            .execute(&mut **tx)
            .await?
            .rows_affected(),
            (RecordWrite::Delete, Some(expected)) => sqlx::query(
                r#"
                DELETE FROM user_item_votes
                WHERE user_id = $1 AND item_id = $2 AND vote_type = $3
                "#,
            )
            .bind(key.user_id.as_str())
            .bind(key.item_id.as_str())
            .bind(vote_type_to_i16(expected))
            .execute(&mut **tx)
            .await?
            .rows_affected(),
            (RecordWrite::Delete, None) => 0,
        };

        if rows_affected != 1 {
            return Err(VoteRepositoryError::conflict(key));
        }
        Ok(())
    }
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn get_user_vote(
        &self,
        key: &VoteKey,
    ) -> Result<Option<VoteRecord>, VoteRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, item_id, item_type, post_id, vote_type, voted_at
            FROM user_item_votes
            WHERE user_id = $1 AND item_id = $2
            "#,
        )
        .bind(key.user_id.as_str())
        .bind(key.item_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(vote_record_from_row).transpose()?)
    }

    async fn get_item(
        &self,
        item: &ItemRef,
    ) -> Result<Option<VotableItem>, VoteRepositoryError> {
        let query = match item {
            ItemRef::Post { post_id } => sqlx::query(
                "SELECT author_id, helpful_count, not_helpful_count FROM forum_posts WHERE id = $1",
            )
            .bind(post_id.as_str()),
            ItemRef::Answer { post_id, answer_id } => sqlx::query(
                r#"
                SELECT author_id, helpful_count, not_helpful_count
                FROM forum_answers
                WHERE id = $1 AND post_id = $2
                "#,
            )
            .bind(answer_id.as_str())
            .bind(post_id.as_str()),
        };

        let Some(row) = query.fetch_optional(&self.pool).await? else {
            return Ok(None);
        };

        Ok(Some(VotableItem {
            item: item.clone(),
            author_id: row.try_get("author_id")?,
            counts: counts_from_row(&row)?,
        }))
    }

    async fn get_author_reputation(
        &self,
        user_id: &str,
    ) -> Result<AuthorReputation, VoteRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT total_helpful_votes, total_not_helpful_votes
            FROM author_reputation
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(AuthorReputation {
                user_id: user_id.to_string(),
                total_helpful_votes: row.try_get("total_helpful_votes")?,
                total_not_helpful_votes: row.try_get("total_not_helpful_votes")?,
            }),
            None => Ok(AuthorReputation::empty(user_id)),
        }
    }

    /// Persists a changeset in one transaction.
    ///
    /// Any error drops the transaction before commit, which rolls back every
    /// statement already executed.
    #[instrument(skip(self, changeset), fields(key = %changeset.key))]
    async fn persist_changeset(
        &self,
        changeset: &VoteChangeset,
    ) -> Result<VotesCount, VoteRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let author_id = self.lock_item_tx(&changeset.item, &mut tx).await?;
        self.write_vote_record_tx(changeset, &mut tx).await?;
        let counts = self.update_item_counters_tx(changeset, &mut tx).await?;
        apply_reputation_delta(&mut tx, &author_id, changeset.delta).await?;

        tx.commit().await?;
        debug!(helpful = counts.helpful, not_helpful = counts.not_helpful, "changeset committed");
        Ok(counts)
    }
}
