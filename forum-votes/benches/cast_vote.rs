use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use forum_votes_core::{AggregatorConfig, CastVote, ForumService, NewPost, VoteAggregator};
use forum_votes_repository::MemoryStore;
use forum_votes_shared::types::{Viewer, VoteType};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Creates an aggregator over a fresh in-memory store holding one post.
async fn setup() -> (VoteAggregator, String) {
    let store = Arc::new(MemoryStore::new());
    let forum = ForumService::new(store.clone());
    let post_id = forum
        .create_post(NewPost {
            title: "Is a high-yield savings account worth it?".to_string(),
            content: "Looking at rates across a few banks.".to_string(),
            tags: vec!["savings".to_string()],
            author: Viewer::new("author"),
        })
        .await
        .expect("post should be created");

    (VoteAggregator::new(store, AggregatorConfig::default()), post_id)
}

/// Benchmark a first vote by a new user on a post
fn first_vote(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let (aggregator, post_id) = runtime.block_on(setup());
    let aggregator = &aggregator;
    let mut voter = 0u64;

    c.bench_function("cast_first_vote", |b| {
        b.to_async(&runtime).iter_batched(
            || {
                voter += 1;
                CastVote::post(format!("voter-{}", voter), post_id.clone(), VoteType::Helpful)
            },
            move |request| async move { black_box(aggregator.cast_vote(request).await) },
            BatchSize::SmallInput,
        )
    });
}

/// Benchmark one user flipping their vote back and forth
fn toggle_vote(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let (aggregator, post_id) = runtime.block_on(setup());
    let aggregator = &aggregator;
    let mut round = 0u64;

    c.bench_function("toggle_vote", |b| {
        b.to_async(&runtime).iter_batched(
            || {
                round += 1;
                let vote = if round % 2 == 0 {
                    VoteType::Helpful
                } else {
                    VoteType::NotHelpful
                };
                CastVote::post("flipper", post_id.clone(), vote)
            },
            move |request| async move { black_box(aggregator.cast_vote(request).await) },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, first_vote, toggle_vote);
criterion_main!(benches);
