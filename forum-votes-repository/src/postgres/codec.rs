//! Column encodings shared by the PostgreSQL repositories.
use forum_votes_shared::types::{ForumAnswer, ForumPost, ItemType, VoteRecord, VoteType, VotesCount};
use sqlx::Row;
use sqlx::postgres::PgRow;
use time::OffsetDateTime;
use crate::errors::CodecError;

/// SQLSTATE raised when a CHECK constraint (such as `helpful_count >= 0`) fails.
pub(crate) const CHECK_VIOLATION: &str = "23514";

/// SQLSTATE raised on primary key collisions.
pub(crate) const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn vote_type_to_i16(vote: VoteType) -> i16 {
    match vote {
        VoteType::Helpful => 0,
        VoteType::NotHelpful => 1,
    }
}

pub(crate) fn vote_type_from_i16(value: i16) -> Result<VoteType, CodecError> {
    match value {
        0 => Ok(VoteType::Helpful),
        1 => Ok(VoteType::NotHelpful),
        other => Err(CodecError::InvalidVoteType(other)),
    }
}

pub(crate) fn item_type_to_i16(item_type: ItemType) -> i16 {
    match item_type {
        ItemType::Post => 0,
        ItemType::Answer => 1,
    }
}

pub(crate) fn item_type_from_i16(value: i16) -> Result<ItemType, CodecError> {
    match value {
        0 => Ok(ItemType::Post),
        1 => Ok(ItemType::Answer),
        other => Err(CodecError::InvalidItemType(other)),
    }
}

pub(crate) fn to_timestamp(seconds: u64) -> Result<OffsetDateTime, CodecError> {
    i64::try_from(seconds)
        .ok()
        .and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok())
        .ok_or(CodecError::InvalidTimestamp(seconds))
}

pub(crate) fn from_timestamp(at: OffsetDateTime) -> u64 {
    at.unix_timestamp().max(0) as u64
}

/// Whether `err` was raised by the database with the given SQLSTATE.
pub(crate) fn has_sql_state(err: &sqlx::Error, state: &str) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == state)
}

pub(crate) fn vote_record_from_row(row: &PgRow) -> Result<VoteRecord, sqlx::Error> {
    let vote_type: i16 = row.try_get("vote_type")?;
    let item_type: i16 = row.try_get("item_type")?;
    let voted_at: OffsetDateTime = row.try_get("voted_at")?;
    Ok(VoteRecord {
        user_id: row.try_get("user_id")?,
        item_id: row.try_get("item_id")?,
        item_type: item_type_from_i16(item_type).map_err(decode_error)?,
        post_id: row.try_get("post_id")?,
        vote_type: vote_type_from_i16(vote_type).map_err(decode_error)?,
        voted_at: from_timestamp(voted_at),
    })
}

pub(crate) fn counts_from_row(row: &PgRow) -> Result<VotesCount, sqlx::Error> {
    Ok(VotesCount::new(
        row.try_get("helpful_count")?,
        row.try_get("not_helpful_count")?,
    ))
}

pub(crate) fn post_from_row(row: &PgRow) -> Result<ForumPost, sqlx::Error> {
    let created_at: OffsetDateTime = row.try_get("created_at")?;
    Ok(ForumPost {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        tags: row.try_get("tags")?,
        author_id: row.try_get("author_id")?,
        author_display_name: row.try_get("author_display_name")?,
        counts: counts_from_row(row)?,
        answer_count: row.try_get("answer_count")?,
        created_at: from_timestamp(created_at),
    })
}

pub(crate) fn answer_from_row(row: &PgRow) -> Result<ForumAnswer, sqlx::Error> {
    let created_at: OffsetDateTime = row.try_get("created_at")?;
    Ok(ForumAnswer {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        content: row.try_get("content")?,
        author_id: row.try_get("author_id")?,
        author_display_name: row.try_get("author_display_name")?,
        counts: counts_from_row(row)?,
        created_at: from_timestamp(created_at),
    })
}

fn decode_error(err: CodecError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
