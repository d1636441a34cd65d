//! Forum service, vote cascade and counter audit against the in-memory store.

use std::sync::Arc;
use forum_votes_core::errors::ForumError;
use forum_votes_core::{
    AggregatorConfig, CastVote, CounterAuditor, ForumService, NewAnswer, NewPost, VoteAggregator,
};
use forum_votes_repository::{MemoryStore, VoteRepository};
use forum_votes_shared::types::{
    DeletionSummary, ItemRef, ItemType, PostQuery, PostSort, Viewer, VoteRecord, VoteType,
    VotesCount,
};

struct Harness {
    store: Arc<MemoryStore>,
    forum: ForumService,
    votes: VoteAggregator,
    auditor: CounterAuditor,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    Harness {
        forum: ForumService::new(store.clone()),
        votes: VoteAggregator::new(store.clone(), AggregatorConfig::default()),
        auditor: CounterAuditor::new(store.clone()),
        store,
    }
}

fn new_post(author: &str, title: &str, tags: &[&str]) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: "Looking for advice.".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        author: Viewer::new(author).with_display_name(author.to_uppercase()),
    }
}

fn new_answer(post_id: &str, author: &str) -> NewAnswer {
    NewAnswer {
        post_id: post_id.to_string(),
        content: "Here is what worked for me.".to_string(),
        author: Viewer::new(author),
    }
}

#[tokio::test]
async fn test_create_post_normalizes_input() {
    let h = harness();

    let post_id = h
        .forum
        .create_post(new_post("alice", "  Paying off a car loan early?  ", &["Loans", " loans", ""]))
        .await
        .unwrap();

    let post = h.forum.get_post(&post_id).await.unwrap();
    assert_eq!(post.title, "Paying off a car loan early?");
    assert_eq!(post.tags, vec!["loans"]);
    assert_eq!(post.counts, VotesCount::default());
    assert_eq!(post.answer_count, 0);
    assert_eq!(post.author_display_name, "ALICE");
}

#[tokio::test]
async fn test_create_post_rejects_blank_title() {
    let h = harness();

    let err = h.forum.create_post(new_post("alice", "   ", &[])).await.unwrap_err();

    assert!(matches!(err, ForumError::InvalidInput(_)));
}

#[tokio::test]
async fn test_answers_update_count_and_require_post() {
    let h = harness();
    let post_id = h.forum.create_post(new_post("alice", "Question", &[])).await.unwrap();

    h.forum.create_answer(new_answer(&post_id, "carol")).await.unwrap();
    h.forum.create_answer(new_answer(&post_id, "dave")).await.unwrap();
    let err = h.forum.create_answer(new_answer("missing", "dave")).await.unwrap_err();

    assert!(matches!(err, ForumError::NotFound(_)));
    assert_eq!(h.forum.get_post(&post_id).await.unwrap().answer_count, 2);
    assert_eq!(h.forum.list_answers(&post_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_posts_by_tag_and_author() {
    let h = harness();
    let taxes = h.forum.create_post(new_post("alice", "Taxes", &["taxes"])).await.unwrap();
    let savings = h.forum.create_post(new_post("bob", "Savings", &["savings"])).await.unwrap();
    h.votes.cast_vote(CastVote::post("carol", &savings, VoteType::Helpful)).await.unwrap();

    let tagged = h
        .forum
        .list_posts(&PostQuery { sort: PostSort::Newest, tag: Some("TAXES".to_string()) })
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].id, taxes);

    let helpful = h
        .forum
        .list_posts(&PostQuery { sort: PostSort::MostHelpful, tag: None })
        .await
        .unwrap();
    assert_eq!(helpful[0].id, savings);

    let mine = h.forum.posts_by_author("alice").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(h.forum.posts_by_author("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_author_can_delete() {
    let h = harness();
    let post_id = h.forum.create_post(new_post("alice", "Question", &[])).await.unwrap();
    let answer_id = h.forum.create_answer(new_answer(&post_id, "carol")).await.unwrap();

    let err = h
        .forum
        .delete_answer(&Viewer::new("alice"), &post_id, &answer_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ForumError::Forbidden(_)));

    let err = h.forum.delete_post(&Viewer::new("carol"), &post_id).await.unwrap_err();
    assert!(matches!(err, ForumError::Forbidden(_)));
}

#[tokio::test]
async fn test_delete_answer_removes_votes_and_reputation() {
    let h = harness();
    let post_id = h.forum.create_post(new_post("alice", "Question", &[])).await.unwrap();
    let answer_id = h.forum.create_answer(new_answer(&post_id, "carol")).await.unwrap();
    h.votes
        .cast_vote(CastVote::answer("bob", &post_id, &answer_id, VoteType::Helpful))
        .await
        .unwrap();

    let summary = h
        .forum
        .delete_answer(&Viewer::new("carol"), &post_id, &answer_id)
        .await
        .unwrap();

    assert_eq!(summary, DeletionSummary { answers_removed: 1, votes_removed: 1 });
    assert_eq!(h.forum.get_post(&post_id).await.unwrap().answer_count, 0);
    assert_eq!(h.votes.get_user_vote_for_item("bob", &answer_id).await.unwrap(), None);
    assert_eq!(h.store.get_author_reputation("carol").await.unwrap().total_helpful_votes, 0);
}

#[tokio::test]
async fn test_delete_post_cascades_to_answers_and_votes() {
    let h = harness();
    let post_id = h.forum.create_post(new_post("alice", "Question", &[])).await.unwrap();
    let answer_id = h.forum.create_answer(new_answer(&post_id, "carol")).await.unwrap();
    h.votes.cast_vote(CastVote::post("bob", &post_id, VoteType::NotHelpful)).await.unwrap();
    h.votes
        .cast_vote(CastVote::answer("bob", &post_id, &answer_id, VoteType::Helpful))
        .await
        .unwrap();
    h.votes
        .cast_vote(CastVote::answer("alice", &post_id, &answer_id, VoteType::Helpful))
        .await
        .unwrap();

    let summary = h.forum.delete_post(&Viewer::new("alice"), &post_id).await.unwrap();

    assert_eq!(summary, DeletionSummary { answers_removed: 1, votes_removed: 3 });
    assert_eq!(h.store.vote_count().await, 0);
    assert!(matches!(h.forum.get_post(&post_id).await, Err(ForumError::NotFound(_))));
    let alice = h.store.get_author_reputation("alice").await.unwrap();
    assert_eq!(alice.total_not_helpful_votes, 0);
    let carol = h.store.get_author_reputation("carol").await.unwrap();
    assert_eq!(carol.total_helpful_votes, 0);

    let report = h.auditor.run(false).await.unwrap();
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_audit_reports_then_repairs_drift() {
    let h = harness();
    let post_id = h.forum.create_post(new_post("alice", "Question", &[])).await.unwrap();
    let post = ItemRef::post(post_id.clone());
    h.votes.cast_vote(CastVote::post("bob", &post_id, VoteType::Helpful)).await.unwrap();
    h.store.overwrite_counts(&post, VotesCount::new(3, 1)).await;
    h.store
        .insert_raw_vote(VoteRecord {
            user_id: "bob".to_string(),
            item_id: "deleted-answer".to_string(),
            item_type: ItemType::Answer,
            post_id: Some(post_id.clone()),
            vote_type: VoteType::NotHelpful,
            voted_at: 1713859200,
        })
        .await;

    let report = h.auditor.run(false).await.unwrap();
    assert_eq!(report.items_checked, 1);
    assert_eq!(report.drifted.len(), 1);
    assert_eq!(report.orphans_found, 1);
    assert_eq!(report.orphans_removed, 0);
    assert!(!report.repaired);

    let report = h.auditor.run(true).await.unwrap();
    assert!(report.repaired);
    assert_eq!(report.orphans_removed, 1);

    assert!(h.auditor.run(false).await.unwrap().is_clean());
    assert_eq!(h.forum.get_post(&post_id).await.unwrap().counts, VotesCount::new(1, 0));
    let alice = h.store.get_author_reputation("alice").await.unwrap();
    assert_eq!((alice.total_helpful_votes, alice.total_not_helpful_votes), (1, 0));
}
