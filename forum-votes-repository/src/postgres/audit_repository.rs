//! PostgreSQL implementation of `AuditRepository`.
use async_trait::async_trait;
use forum_votes_shared::types::{ItemRef, ItemTally, ItemType, RepairPlan, VoteKey, VotesCount};
use sqlx::Row;
use tracing::info;
use crate::postgres::codec::{counts_from_row, item_type_from_i16};
use crate::{AuditRepository, VoteRepositoryError};

/// PostgreSQL implementation of the counter audit queries.
pub struct PostgresAuditRepository {
    pool: sqlx::PgPool,
}

impl PostgresAuditRepository {
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VoteRepositoryError> {
        Ok(Self { pool })
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn tally_items(&self) -> Result<Vec<ItemTally>, VoteRepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT 0::SMALLINT AS item_type, p.id AS item_id, p.id AS post_id, p.author_id,
                   p.helpful_count, p.not_helpful_count,
                   COUNT(v.user_id) FILTER (WHERE v.vote_type = 0) AS recounted_helpful,
                   COUNT(v.user_id) FILTER (WHERE v.vote_type = 1) AS recounted_not_helpful
            FROM forum_posts p
            LEFT JOIN user_item_votes v ON v.item_type = 0 AND v.item_id = p.id
            GROUP BY p.id
            UNION ALL
            SELECT 1::SMALLINT, a.id, a.post_id, a.author_id,
                   a.helpful_count, a.not_helpful_count,
                   COUNT(v.user_id) FILTER (WHERE v.vote_type = 0),
                   COUNT(v.user_id) FILTER (WHERE v.vote_type = 1)
            FROM forum_answers a
            LEFT JOIN user_item_votes v
                   ON v.item_type = 1 AND v.item_id = a.id AND v.post_id = a.post_id
            GROUP BY a.id
            ORDER BY item_type, item_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<ItemTally, VoteRepositoryError> {
                let item_type: i16 = row.try_get("item_type")?;
                let item_id: String = row.try_get("item_id")?;
                let post_id: String = row.try_get("post_id")?;
                let item = match item_type_from_i16(item_type)? {
                    ItemType::Post => ItemRef::post(post_id),
                    ItemType::Answer => ItemRef::answer(post_id, item_id),
                };
                Ok(ItemTally {
                    item,
                    author_id: row.try_get("author_id")?,
                    stored: counts_from_row(row)?,
                    recounted: VotesCount::new(
                        row.try_get("recounted_helpful")?,
                        row.try_get("recounted_not_helpful")?,
                    ),
                })
            })
            .collect()
    }

    async fn find_orphan_votes(&self) -> Result<Vec<VoteKey>, VoteRepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT v.user_id, v.item_id
            FROM user_item_votes v
            WHERE (v.item_type = 0
                   AND NOT EXISTS (SELECT 1 FROM forum_posts p WHERE p.id = v.item_id))
               OR (v.item_type = 1
                   AND NOT EXISTS (SELECT 1 FROM forum_answers a
                                   WHERE a.id = v.item_id AND a.post_id = v.post_id))
            ORDER BY v.user_id, v.item_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<VoteKey, VoteRepositoryError> {
                Ok(VoteKey::new(
                    row.try_get::<String, _>("user_id")?,
                    row.try_get::<String, _>("item_id")?,
                ))
            })
            .collect()
    }

    /// Repairs counters, orphans and reputation in one transaction.
    ///
    /// Drifted item rows are locked first, in a fixed order, and recounted by
    /// a later statement so votes committed while waiting for a lock are
    /// included. The reputation table is locked against concurrent vote
    /// transactions before it is rebuilt from the committed counters.
    async fn apply_repair(&self, plan: &RepairPlan) -> Result<(), VoteRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut items: Vec<&ItemRef> = plan.items.iter().collect();
        items.sort_by(|a, b| {
            (a.item_type() == ItemType::Answer, a.item_id())
                .cmp(&(b.item_type() == ItemType::Answer, b.item_id()))
        });

        for item in &items {
            let lock = match item {
                ItemRef::Post { post_id } => {
                    sqlx::query("SELECT id FROM forum_posts WHERE id = $1 FOR UPDATE")
                        .bind(post_id.as_str())
                }
                ItemRef::Answer { post_id, answer_id } => sqlx::query(
                    "SELECT id FROM forum_answers WHERE id = $1 AND post_id = $2 FOR UPDATE",
                )
                .bind(answer_id.as_str())
                .bind(post_id.as_str()),
            };
            lock.fetch_optional(&mut *tx).await?;
        }

        for item in &items {
            let recount = match item {
                ItemRef::Post { post_id } => sqlx::query(
                    r#"
                    UPDATE forum_posts p
                    SET helpful_count = (SELECT COUNT(*) FROM user_item_votes v
                                         WHERE v.item_type = 0 AND v.item_id = p.id
                                           AND v.vote_type = 0),
                        not_helpful_count = (SELECT COUNT(*) FROM user_item_votes v
                                             WHERE v.item_type = 0 AND v.item_id = p.id
                                               AND v.vote_type = 1)
                    WHERE p.id = $1
                    "#,
                )
                .bind(post_id.as_str()),
                ItemRef::Answer { post_id, answer_id } => sqlx::query(
                    r#"
                    UPDATE forum_answers a
                    SET helpful_count = (SELECT COUNT(*) FROM user_item_votes v
                                         WHERE v.item_type = 1 AND v.item_id = a.id
                                           AND v.post_id = a.post_id AND v.vote_type = 0),
                        not_helpful_count = (SELECT COUNT(*) FROM user_item_votes v
                                             WHERE v.item_type = 1 AND v.item_id = a.id
                                               AND v.post_id = a.post_id AND v.vote_type = 1)
                    WHERE a.id = $1 AND a.post_id = $2
                    "#,
                )
                .bind(answer_id.as_str())
                .bind(post_id.as_str()),
            };
            recount.execute(&mut *tx).await?;
        }

        for key in &plan.orphans {
            sqlx::query(
                r#"
                DELETE FROM user_item_votes v
                WHERE v.user_id = $1 AND v.item_id = $2
                  AND ((v.item_type = 0
                        AND NOT EXISTS (SELECT 1 FROM forum_posts p WHERE p.id = v.item_id))
                    OR (v.item_type = 1
                        AND NOT EXISTS (SELECT 1 FROM forum_answers a
                                        WHERE a.id = v.item_id AND a.post_id = v.post_id)))
                "#,
            )
                .bind(key.user_id.as_str())
                .bind(key.item_id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("LOCK TABLE author_reputation IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM author_reputation")
            .execute(&mut *tx)
            .await?;
        let rebuilt = sqlx::query(
            r#"
            INSERT INTO author_reputation (user_id, total_helpful_votes, total_not_helpful_votes)
            SELECT author_id, SUM(helpful_count)::BIGINT, SUM(not_helpful_count)::BIGINT
            FROM (
                SELECT author_id, helpful_count, not_helpful_count FROM forum_posts
                UNION ALL
                SELECT author_id, helpful_count, not_helpful_count FROM forum_answers
            ) items
            GROUP BY author_id
            "#,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        info!(
            recounted = plan.items.len(),
            orphans = plan.orphans.len(),
            authors = rebuilt,
            "repair applied"
        );
        Ok(())
    }
}
