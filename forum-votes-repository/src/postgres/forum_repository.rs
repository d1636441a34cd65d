//! PostgreSQL implementation of `ForumRepository`.
use std::collections::BTreeMap;
use async_trait::async_trait;
use forum_votes_shared::types::{
    DeletionSummary, ForumAnswer, ForumPost, PostQuery, PostSort, VoteDelta,
};
use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::debug;
use crate::postgres::apply_reputation_delta;
use crate::postgres::codec::{
    UNIQUE_VIOLATION, answer_from_row, counts_from_row, has_sql_state, post_from_row, to_timestamp,
};
use crate::{ForumRepository, ForumRepositoryError};

const POST_COLUMNS: &str = "id, title, content, tags, author_id, author_display_name, \
    helpful_count, not_helpful_count, answer_count, created_at";

const ANSWER_COLUMNS: &str = "id, post_id, content, author_id, author_display_name, \
    helpful_count, not_helpful_count, created_at";

/// PostgreSQL implementation of the forum repository.
pub struct PostgresForumRepository {
    pool: sqlx::PgPool,
}

impl PostgresForumRepository {
    /// Creates a new repository over a pool whose schema is already migrated.
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, ForumRepositoryError> {
        Ok(Self { pool })
    }

    /// Locks the post row; every write touching a post's answers starts here.
    async fn lock_post_tx(
        &self,
        post_id: &str,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Option<PgRow>, ForumRepositoryError> {
        let row = sqlx::query(
            "SELECT author_id, helpful_count, not_helpful_count FROM forum_posts WHERE id = $1 FOR UPDATE",
        )
        .bind(post_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row)
    }

    async fn fetch_posts(
        &self,
        sql: String,
        bind: Option<String>,
    ) -> Result<Vec<ForumPost>, ForumRepositoryError> {
        let rows = sqlx::query(&sql).bind(bind).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(post_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

fn duplicate_or(err: sqlx::Error, id: &str) -> ForumRepositoryError {
    let duplicate = has_sql_state(&err, UNIQUE_VIOLATION);
    if duplicate {
        ForumRepositoryError::DuplicateId(id.to_string())
    } else {
        ForumRepositoryError::DatabaseError(err)
    }
}

#[async_trait]
impl ForumRepository for PostgresForumRepository {
    async fn insert_post(&self, post: &ForumPost) -> Result<(), ForumRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO forum_posts (id, title, content, tags, author_id, author_display_name,
                                     helpful_count, not_helpful_count, answer_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(post.id.as_str())
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.tags.as_slice())
        .bind(post.author_id.as_str())
        .bind(post.author_display_name.as_str())
        .bind(post.counts.helpful)
        .bind(post.counts.not_helpful)
        .bind(post.answer_count)
        .bind(to_timestamp(post.created_at)?)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_or(e, &post.id))?;
        Ok(())
    }

    async fn insert_answer(&self, answer: &ForumAnswer) -> Result<(), ForumRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE forum_posts SET answer_count = answer_count + 1 WHERE id = $1")
            .bind(answer.post_id.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(ForumRepositoryError::PostNotFound(answer.post_id.clone()));
        }

        sqlx::query(
            r#"
            INSERT INTO forum_answers (id, post_id, content, author_id, author_display_name,
                                       helpful_count, not_helpful_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(answer.id.as_str())
        .bind(answer.post_id.as_str())
        .bind(answer.content.as_str())
        .bind(answer.author_id.as_str())
        .bind(answer.author_display_name.as_str())
        .bind(answer.counts.helpful)
        .bind(answer.counts.not_helpful)
        .bind(to_timestamp(answer.created_at)?)
        .execute(&mut *tx)
        .await
        .map_err(|e| duplicate_or(e, &answer.id))?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<ForumPost>, ForumRepositoryError> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM forum_posts WHERE id = $1"))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(post_from_row).transpose()?)
    }

    async fn get_answer(
        &self,
        post_id: &str,
        answer_id: &str,
    ) -> Result<Option<ForumAnswer>, ForumRepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {ANSWER_COLUMNS} FROM forum_answers WHERE id = $1 AND post_id = $2"
        ))
        .bind(answer_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(answer_from_row).transpose()?)
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<ForumPost>, ForumRepositoryError> {
        let order = match query.sort {
            PostSort::Newest => "created_at DESC, id DESC",
            PostSort::MostHelpful => "helpful_count DESC, created_at DESC, id DESC",
        };
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM forum_posts \
             WHERE ($1::TEXT IS NULL OR $1 = ANY(tags)) ORDER BY {order}"
        );
        let tag = query.tag.as_deref().map(|t| t.trim().to_lowercase());
        self.fetch_posts(sql, tag).await
    }

    async fn list_answers(&self, post_id: &str) -> Result<Vec<ForumAnswer>, ForumRepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ANSWER_COLUMNS} FROM forum_answers WHERE post_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(answer_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn posts_by_author(&self, author_id: &str) -> Result<Vec<ForumPost>, ForumRepositoryError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM forum_posts WHERE author_id = $1 ORDER BY created_at DESC, id DESC"
        );
        self.fetch_posts(sql, Some(author_id.to_string())).await
    }

    async fn delete_answer(
        &self,
        post_id: &str,
        answer_id: &str,
    ) -> Result<DeletionSummary, ForumRepositoryError> {
        let not_found = || ForumRepositoryError::AnswerNotFound {
            post_id: post_id.to_string(),
            answer_id: answer_id.to_string(),
        };
        let mut tx = self.pool.begin().await?;

        if self.lock_post_tx(post_id, &mut tx).await?.is_none() {
            return Err(not_found());
        }

        let row = sqlx::query(
            r#"
            DELETE FROM forum_answers
            WHERE id = $1 AND post_id = $2
            RETURNING author_id, helpful_count, not_helpful_count
            "#,
        )
        .bind(answer_id)
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(not_found)?;
        let author_id: String = row.try_get("author_id")?;
        let counts = counts_from_row(&row)?;

        let votes_removed = sqlx::query("DELETE FROM user_item_votes WHERE item_type = 1 AND item_id = $1")
            .bind(answer_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        apply_reputation_delta(&mut tx, &author_id, VoteDelta::removing(counts)).await?;

        sqlx::query("UPDATE forum_posts SET answer_count = GREATEST(answer_count - 1, 0) WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(post_id, answer_id, votes_removed, "answer deleted");
        Ok(DeletionSummary { answers_removed: 1, votes_removed })
    }

    async fn delete_post(&self, post_id: &str) -> Result<DeletionSummary, ForumRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let post = self
            .lock_post_tx(post_id, &mut tx)
            .await?
            .ok_or_else(|| ForumRepositoryError::PostNotFound(post_id.to_string()))?;

        // Per-author reputation to take back, applied in key order.
        let mut deltas: BTreeMap<String, VoteDelta> = BTreeMap::new();
        deltas.insert(
            post.try_get("author_id")?,
            VoteDelta::removing(counts_from_row(&post)?),
        );

        let answers = sqlx::query(
            "DELETE FROM forum_answers WHERE post_id = $1 RETURNING author_id, helpful_count, not_helpful_count",
        )
        .bind(post_id)
        .fetch_all(&mut *tx)
        .await?;
        for answer in &answers {
            let delta = VoteDelta::removing(counts_from_row(answer)?);
            let entry = deltas.entry(answer.try_get("author_id")?).or_default();
            *entry = entry.combine(delta);
        }

        let votes_removed = sqlx::query(
            r#"
            DELETE FROM user_item_votes
            WHERE (item_type = 0 AND item_id = $1) OR (item_type = 1 AND post_id = $1)
            "#,
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for (author_id, delta) in &deltas {
            apply_reputation_delta(&mut tx, author_id, *delta).await?;
        }

        sqlx::query("DELETE FROM forum_posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(post_id, answers = answers.len(), votes_removed, "post deleted");
        Ok(DeletionSummary {
            answers_removed: answers.len() as u64,
            votes_removed,
        })
    }
}
