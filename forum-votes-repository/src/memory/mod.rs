//! In-memory implementation of the forum data store.
//!
//! `MemoryStore` implements `VoteRepository`, `ForumRepository` and
//! `AuditRepository` over a single mutex-guarded state. Every write checks
//! all of its preconditions before mutating anything, so a failed write
//! leaves the state untouched, the same way a rolled-back transaction
//! would.
//!
//! Tests can make the next commits fail with `fail_next_commits` (store
//! unavailable) or `conflict_next_commits` (concurrent modification).
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use forum_votes_shared::types::{
    AuthorReputation, DeletionSummary, ForumAnswer, ForumPost, ItemRef, ItemTally, ItemType,
    PostQuery, PostSort, RecordWrite, RepairPlan, VotableItem, VoteChangeset, VoteDelta, VoteKey,
    VoteRecord, VotesCount,
};
use tokio::sync::Mutex;
use crate::errors::{CodecError, ForumRepositoryError, VoteRepositoryError};
use crate::interfaces::{AuditRepository, ForumRepository, VoteRepository};

#[derive(Debug, Default)]
struct State {
    posts: HashMap<String, ForumPost>,
    /// Keyed by answer id.
    answers: HashMap<String, ForumAnswer>,
    votes: HashMap<VoteKey, VoteRecord>,
    reputation: HashMap<String, AuthorReputation>,
}

impl State {
    fn item(&self, item: &ItemRef) -> Option<(&str, VotesCount)> {
        match item {
            ItemRef::Post { post_id } => self
                .posts
                .get(post_id)
                .map(|post| (post.author_id.as_str(), post.counts)),
            ItemRef::Answer { post_id, answer_id } => self
                .answers
                .get(answer_id)
                .filter(|answer| &answer.post_id == post_id)
                .map(|answer| (answer.author_id.as_str(), answer.counts)),
        }
    }

    fn counts_mut(&mut self, item: &ItemRef) -> Option<&mut VotesCount> {
        match item {
            ItemRef::Post { post_id } => self.posts.get_mut(post_id).map(|post| &mut post.counts),
            ItemRef::Answer { post_id, answer_id } => self
                .answers
                .get_mut(answer_id)
                .filter(|answer| &answer.post_id == post_id)
                .map(|answer| &mut answer.counts),
        }
    }

    fn item_exists(&self, record: &VoteRecord) -> bool {
        match record.item_type {
            ItemType::Post => self.posts.contains_key(&record.item_id),
            ItemType::Answer => self
                .answers
                .get(&record.item_id)
                .is_some_and(|answer| record.post_id.as_deref() == Some(answer.post_id.as_str())),
        }
    }

    fn apply_reputation_delta(&mut self, author_id: &str, delta: VoteDelta) {
        if delta.is_zero() {
            return;
        }
        let entry = self
            .reputation
            .entry(author_id.to_string())
            .or_insert_with(|| AuthorReputation::empty(author_id));
        entry.total_helpful_votes += delta.helpful;
        entry.total_not_helpful_votes += delta.not_helpful;
    }

    /// Counts the vote records cast on `item`.
    fn recount(&self, item: &ItemRef) -> VotesCount {
        let mut counts = VotesCount::default();
        for record in self.votes.values() {
            let matches = match item {
                ItemRef::Post { post_id } => {
                    record.item_type == ItemType::Post && &record.item_id == post_id
                }
                ItemRef::Answer { post_id, answer_id } => {
                    record.item_type == ItemType::Answer
                        && &record.item_id == answer_id
                        && record.post_id.as_ref() == Some(post_id)
                }
            };
            if matches {
                counts.record(record.vote_type);
            }
        }
        counts
    }

    /// Removes every vote record matching `predicate`, returning how many were removed.
    fn remove_votes(&mut self, predicate: impl Fn(&VoteRecord) -> bool) -> u64 {
        let before = self.votes.len();
        self.votes.retain(|_, record| !predicate(record));
        (before - self.votes.len()) as u64
    }
}

/// In-memory forum store with transactional semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing_commits: AtomicUsize,
    conflicting_commits: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` changesets fail as if the store were unreachable.
    pub fn fail_next_commits(&self, count: usize) {
        self.failing_commits.store(count, Ordering::SeqCst);
    }

    /// Makes the next `count` changesets fail with a compare-and-set conflict.
    pub fn conflict_next_commits(&self, count: usize) {
        self.conflicting_commits.store(count, Ordering::SeqCst);
    }

    /// Overwrites an item's counters without touching its vote records.
    ///
    /// Returns `false` if the item does not exist. Used to simulate drifted data.
    pub async fn overwrite_counts(&self, item: &ItemRef, counts: VotesCount) -> bool {
        let mut state = self.state.lock().await;
        match state.counts_mut(item) {
            Some(stored) => {
                *stored = counts;
                true
            }
            None => false,
        }
    }

    /// Stores a vote record as-is, bypassing counters and reputation.
    pub async fn insert_raw_vote(&self, record: VoteRecord) {
        self.state.lock().await.votes.insert(record.key(), record);
    }

    /// Number of vote records currently stored.
    pub async fn vote_count(&self) -> usize {
        self.state.lock().await.votes.len()
    }

    fn take_injected(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn sorted_newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (u64, &str)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl VoteRepository for MemoryStore {
    async fn get_user_vote(
        &self,
        key: &VoteKey,
    ) -> Result<Option<VoteRecord>, VoteRepositoryError> {
        Ok(self.state.lock().await.votes.get(key).cloned())
    }

    async fn get_item(
        &self,
        item: &ItemRef,
    ) -> Result<Option<VotableItem>, VoteRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.item(item).map(|(author_id, counts)| VotableItem {
            item: item.clone(),
            author_id: author_id.to_string(),
            counts,
        }))
    }

    async fn get_author_reputation(
        &self,
        user_id: &str,
    ) -> Result<AuthorReputation, VoteRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .reputation
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| AuthorReputation::empty(user_id)))
    }

    async fn persist_changeset(
        &self,
        changeset: &VoteChangeset,
    ) -> Result<VotesCount, VoteRepositoryError> {
        if Self::take_injected(&self.failing_commits) {
            return Err(VoteRepositoryError::Unavailable(
                "injected commit failure".to_string(),
            ));
        }
        if Self::take_injected(&self.conflicting_commits) {
            return Err(VoteRepositoryError::conflict(&changeset.key));
        }

        let mut state = self.state.lock().await;

        let (author_id, counts) = state
            .item(&changeset.item)
            .map(|(author_id, counts)| (author_id.to_string(), counts))
            .ok_or_else(|| VoteRepositoryError::item_not_found(&changeset.item))?;

        let stored = state.votes.get(&changeset.key).map(|record| record.vote_type);
        if stored != changeset.expected {
            return Err(VoteRepositoryError::conflict(&changeset.key));
        }
        match &changeset.record {
            RecordWrite::Delete if changeset.expected.is_none() => {
                return Err(VoteRepositoryError::conflict(&changeset.key));
            }
            RecordWrite::Upsert(record)
                if record.item_type == ItemType::Answer && record.post_id.is_none() =>
            {
                return Err(CodecError::MissingParentPost(record.item_id.clone()).into());
            }
            _ => {}
        }

        let updated = counts.checked_apply(changeset.delta).ok_or_else(|| {
            VoteRepositoryError::CounterUnderflow(changeset.item.item_id().to_string())
        })?;

        if let Some(stored_counts) = state.counts_mut(&changeset.item) {
            *stored_counts = updated;
        }
        match &changeset.record {
            RecordWrite::Upsert(record) => {
                state.votes.insert(changeset.key.clone(), record.clone());
            }
            RecordWrite::Delete => {
                state.votes.remove(&changeset.key);
            }
        }
        state.apply_reputation_delta(&author_id, changeset.delta);

        Ok(updated)
    }
}

#[async_trait]
impl ForumRepository for MemoryStore {
    async fn insert_post(&self, post: &ForumPost) -> Result<(), ForumRepositoryError> {
        let mut state = self.state.lock().await;
        if state.posts.contains_key(&post.id) {
            return Err(ForumRepositoryError::DuplicateId(post.id.clone()));
        }
        state.posts.insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn insert_answer(&self, answer: &ForumAnswer) -> Result<(), ForumRepositoryError> {
        let mut state = self.state.lock().await;
        if state.answers.contains_key(&answer.id) {
            return Err(ForumRepositoryError::DuplicateId(answer.id.clone()));
        }
        let post = state
            .posts
            .get_mut(&answer.post_id)
            .ok_or_else(|| ForumRepositoryError::PostNotFound(answer.post_id.clone()))?;
        post.answer_count += 1;
        state.answers.insert(answer.id.clone(), answer.clone());
        Ok(())
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<ForumPost>, ForumRepositoryError> {
        Ok(self.state.lock().await.posts.get(post_id).cloned())
    }

    async fn get_answer(
        &self,
        post_id: &str,
        answer_id: &str,
    ) -> Result<Option<ForumAnswer>, ForumRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .answers
            .get(answer_id)
            .filter(|answer| answer.post_id == post_id)
            .cloned())
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<ForumPost>, ForumRepositoryError> {
        let tag = query.tag.as_deref().map(|t| t.trim().to_lowercase());
        let state = self.state.lock().await;
        let mut posts: Vec<ForumPost> = state
            .posts
            .values()
            .filter(|post| tag.as_ref().is_none_or(|tag| post.tags.contains(tag)))
            .cloned()
            .collect();

        match query.sort {
            PostSort::Newest => sorted_newest_first(&mut posts, |p| (p.created_at, p.id.as_str())),
            PostSort::MostHelpful => posts.sort_by(|a, b| {
                (b.counts.helpful, b.created_at, &b.id).cmp(&(a.counts.helpful, a.created_at, &a.id))
            }),
        }
        Ok(posts)
    }

    async fn list_answers(&self, post_id: &str) -> Result<Vec<ForumAnswer>, ForumRepositoryError> {
        let state = self.state.lock().await;
        let mut answers: Vec<ForumAnswer> = state
            .answers
            .values()
            .filter(|answer| answer.post_id == post_id)
            .cloned()
            .collect();
        sorted_newest_first(&mut answers, |a| (a.created_at, a.id.as_str()));
        Ok(answers)
    }

    async fn posts_by_author(&self, author_id: &str) -> Result<Vec<ForumPost>, ForumRepositoryError> {
        let state = self.state.lock().await;
        let mut posts: Vec<ForumPost> = state
            .posts
            .values()
            .filter(|post| post.author_id == author_id)
            .cloned()
            .collect();
        sorted_newest_first(&mut posts, |p| (p.created_at, p.id.as_str()));
        Ok(posts)
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
        let mut state = self.state.lock().await;
        let belongs_to_post = state
            .answers
            .get(answer_id)
            .is_some_and(|answer| answer.post_id == post_id);
        if !belongs_to_post {
            return Err(not_found());
        }
        let answer = state.answers.remove(answer_id).ok_or_else(not_found)?;

        let votes_removed = state.remove_votes(|record| {
            record.item_type == ItemType::Answer && record.item_id == answer_id
        });
        state.apply_reputation_delta(&answer.author_id, VoteDelta::removing(answer.counts));
        if let Some(post) = state.posts.get_mut(post_id) {
            post.answer_count = (post.answer_count - 1).max(0);
        }

        Ok(DeletionSummary { answers_removed: 1, votes_removed })
    }

    async fn delete_post(&self, post_id: &str) -> Result<DeletionSummary, ForumRepositoryError> {
        let mut state = self.state.lock().await;
        let post = state
            .posts
            .remove(post_id)
            .ok_or_else(|| ForumRepositoryError::PostNotFound(post_id.to_string()))?;

        let answer_ids: Vec<String> = state
            .answers
            .values()
            .filter(|answer| answer.post_id == post_id)
            .map(|answer| answer.id.clone())
            .collect();
        let mut removed = Vec::with_capacity(answer_ids.len());
        for id in &answer_ids {
            if let Some(answer) = state.answers.remove(id) {
                removed.push(answer);
            }
        }

        let votes_removed = state.remove_votes(|record| match record.item_type {
            ItemType::Post => record.item_id == post_id,
            ItemType::Answer => record.post_id.as_deref() == Some(post_id),
        });

        state.apply_reputation_delta(&post.author_id, VoteDelta::removing(post.counts));
        for answer in &removed {
            state.apply_reputation_delta(&answer.author_id, VoteDelta::removing(answer.counts));
        }

        Ok(DeletionSummary {
            answers_removed: removed.len() as u64,
            votes_removed,
        })
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn tally_items(&self) -> Result<Vec<ItemTally>, VoteRepositoryError> {
        let state = self.state.lock().await;
        let mut recounts: HashMap<(ItemType, &str), VotesCount> = HashMap::new();
        for record in state.votes.values().filter(|record| state.item_exists(record)) {
            recounts
                .entry((record.item_type, record.item_id.as_str()))
                .or_default()
                .record(record.vote_type);
        }

        let posts = state.posts.values().map(|post| ItemTally {
            item: ItemRef::post(post.id.clone()),
            author_id: post.author_id.clone(),
            stored: post.counts,
            recounted: recounts
                .get(&(ItemType::Post, post.id.as_str()))
                .copied()
                .unwrap_or_default(),
        });
        let answers = state.answers.values().map(|answer| ItemTally {
            item: ItemRef::answer(answer.post_id.clone(), answer.id.clone()),
            author_id: answer.author_id.clone(),
            stored: answer.counts,
            recounted: recounts
                .get(&(ItemType::Answer, answer.id.as_str()))
                .copied()
                .unwrap_or_default(),
        });

        let mut tallies: Vec<ItemTally> = posts.chain(answers).collect();
        tallies.sort_by(|a, b| {
            let key = |t: &ItemTally| (t.item.item_type() == ItemType::Answer, t.item.item_id().to_string());
            key(a).cmp(&key(b))
        });
        Ok(tallies)
    }

    async fn find_orphan_votes(&self) -> Result<Vec<VoteKey>, VoteRepositoryError> {
        let state = self.state.lock().await;
        let mut orphans: Vec<VoteKey> = state
            .votes
            .values()
            .filter(|record| !state.item_exists(record))
            .map(VoteRecord::key)
            .collect();
        orphans.sort_by(|a, b| (&a.user_id, &a.item_id).cmp(&(&b.user_id, &b.item_id)));
        Ok(orphans)
    }

    async fn apply_repair(&self, plan: &RepairPlan) -> Result<(), VoteRepositoryError> {
        let mut state = self.state.lock().await;

        for item in &plan.items {
            let recounted = state.recount(item);
            if let Some(stored) = state.counts_mut(item) {
                *stored = recounted;
            }
        }
        for key in &plan.orphans {
            let orphaned = state
                .votes
                .get(key)
                .is_some_and(|record| !state.item_exists(record));
            if orphaned {
                state.votes.remove(key);
            }
        }

        let mut reputation: HashMap<String, AuthorReputation> = HashMap::new();
        let contributions = state
            .posts
            .values()
            .map(|post| (&post.author_id, post.counts))
            .chain(state.answers.values().map(|answer| (&answer.author_id, answer.counts)));
        for (author_id, counts) in contributions {
            let entry = reputation
                .entry(author_id.clone())
                .or_insert_with(|| AuthorReputation::empty(author_id.clone()));
            entry.total_helpful_votes += counts.helpful;
            entry.total_not_helpful_votes += counts.not_helpful;
        }
        state.reputation = reputation;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_votes_shared::types::VoteType;

    fn post(id: &str, author: &str, created_at: u64) -> ForumPost {
        ForumPost {
            id: id.to_string(),
            title: format!("title {id}"),
            content: "content".to_string(),
            tags: vec!["budgeting".to_string()],
            author_id: author.to_string(),
            author_display_name: author.to_string(),
            counts: VotesCount::default(),
            answer_count: 0,
            created_at,
        }
    }

    fn answer(id: &str, post_id: &str, author: &str, created_at: u64) -> ForumAnswer {
        ForumAnswer {
            id: id.to_string(),
            post_id: post_id.to_string(),
            content: "content".to_string(),
            author_id: author.to_string(),
            author_display_name: author.to_string(),
            counts: VotesCount::default(),
            created_at,
        }
    }

    fn first_vote(user: &str, item: &ItemRef, vote: VoteType) -> VoteChangeset {
        let key = VoteKey::new(user, item.item_id());
        VoteChangeset {
            key: key.clone(),
            item: item.clone(),
            expected: None,
            record: RecordWrite::Upsert(VoteRecord {
                user_id: key.user_id,
                item_id: key.item_id,
                item_type: item.item_type(),
                post_id: item.parent_post_id().map(str::to_string),
                vote_type: vote,
                voted_at: 1713859200,
            }),
            delta: VoteDelta::increment(vote),
        }
    }

    fn retraction(user: &str, item: &ItemRef) -> VoteChangeset {
        VoteChangeset {
            key: VoteKey::new(user, item.item_id()),
            item: item.clone(),
            expected: Some(VoteType::Helpful),
            record: RecordWrite::Delete,
            delta: VoteDelta::decrement(VoteType::Helpful),
        }
    }

    async fn store_with_post() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_post(&post("p1", "alice", 100)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_persist_first_vote_updates_everything() {
        let store = store_with_post().await;
        let item = ItemRef::post("p1");

        let counts = store
            .persist_changeset(&first_vote("bob", &item, VoteType::Helpful))
            .await
            .unwrap();

        assert_eq!(counts, VotesCount::new(1, 0));
        let record = store.get_user_vote(&VoteKey::new("bob", "p1")).await.unwrap();
        assert_eq!(record.map(|r| r.vote_type), Some(VoteType::Helpful));
        let reputation = store.get_author_reputation("alice").await.unwrap();
        assert_eq!(reputation.total_helpful_votes, 1);
    }

    #[tokio::test]
    async fn test_persist_rejects_stale_expectation() {
        let store = store_with_post().await;
        let item = ItemRef::post("p1");
        let changeset = first_vote("bob", &item, VoteType::Helpful);
        store.persist_changeset(&changeset).await.unwrap();

        let err = store.persist_changeset(&changeset).await.unwrap_err();

        assert!(err.is_conflict());
        let stored = store.get_item(&item).await.unwrap().unwrap();
        assert_eq!(stored.counts, VotesCount::new(1, 0));
    }

    #[tokio::test]
    async fn test_persist_underflow_leaves_state_untouched() {
        let store = store_with_post().await;
        let item = ItemRef::post("p1");
        store
            .insert_raw_vote(VoteRecord {
                user_id: "bob".to_string(),
                item_id: "p1".to_string(),
                item_type: ItemType::Post,
                post_id: None,
                vote_type: VoteType::Helpful,
                voted_at: 1,
            })
            .await;

        let err = store.persist_changeset(&retraction("bob", &item)).await.unwrap_err();

        assert!(matches!(err, VoteRepositoryError::CounterUnderflow(_)));
        assert_eq!(store.vote_count().await, 1);
    }

    #[tokio::test]
    async fn test_repeated_stale_retraction_is_a_conflict() {
        let store = store_with_post().await;
        let item = ItemRef::post("p1");
        store
            .persist_changeset(&first_vote("bob", &item, VoteType::Helpful))
            .await
            .unwrap();
        let changeset = retraction("bob", &item);
        store.persist_changeset(&changeset).await.unwrap();

        let err = store.persist_changeset(&changeset).await.unwrap_err();

        assert!(err.is_conflict(), "expected a conflict, got {err:?}");
        let stored = store.get_item(&item).await.unwrap().unwrap();
        assert_eq!(stored.counts, VotesCount::new(0, 0));
    }

    #[tokio::test]
    async fn test_persist_missing_item() {
        let store = MemoryStore::new();
        let item = ItemRef::answer("p1", "a1");

        let err = store
            .persist_changeset(&first_vote("bob", &item, VoteType::Helpful))
            .await
            .unwrap_err();

        assert!(matches!(err, VoteRepositoryError::ItemNotFound { item_type: ItemType::Answer, .. }));
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let store = store_with_post().await;
        let changeset = first_vote("bob", &ItemRef::post("p1"), VoteType::Helpful);
        store.fail_next_commits(1);

        let err = store.persist_changeset(&changeset).await.unwrap_err();
        assert!(matches!(err, VoteRepositoryError::Unavailable(_)));
        assert_eq!(store.vote_count().await, 0);

        store.persist_changeset(&changeset).await.unwrap();
        assert_eq!(store.vote_count().await, 1);
    }

    #[tokio::test]
    async fn test_insert_answer_requires_post() {
        let store = store_with_post().await;

        let err = store.insert_answer(&answer("a1", "missing", "carol", 200)).await.unwrap_err();
        assert!(matches!(err, ForumRepositoryError::PostNotFound(_)));

        store.insert_answer(&answer("a1", "p1", "carol", 200)).await.unwrap();
        let post = store.get_post("p1").await.unwrap().unwrap();
        assert_eq!(post.answer_count, 1);
    }

    #[tokio::test]
    async fn test_list_posts_sorting_and_tag_filter() {
        let store = MemoryStore::new();
        store.insert_post(&post("old", "alice", 100)).await.unwrap();
        store.insert_post(&post("new", "alice", 200)).await.unwrap();
        let mut untagged = post("untagged", "alice", 300);
        untagged.tags.clear();
        store.insert_post(&untagged).await.unwrap();
        store
            .persist_changeset(&first_vote("bob", &ItemRef::post("old"), VoteType::Helpful))
            .await
            .unwrap();

        let newest = store.list_posts(&PostQuery::default()).await.unwrap();
        let ids: Vec<&str> = newest.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["untagged", "new", "old"]);

        let helpful = store
            .list_posts(&PostQuery { sort: PostSort::MostHelpful, tag: Some(" Budgeting ".to_string()) })
            .await
            .unwrap();
        let ids: Vec<&str> = helpful.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["old", "new"]);
    }

    #[tokio::test]
    async fn test_delete_post_cascades() {
        let store = store_with_post().await;
        store.insert_answer(&answer("a1", "p1", "carol", 200)).await.unwrap();
        store
            .persist_changeset(&first_vote("bob", &ItemRef::post("p1"), VoteType::Helpful))
            .await
            .unwrap();
        store
            .persist_changeset(&first_vote("bob", &ItemRef::answer("p1", "a1"), VoteType::NotHelpful))
            .await
            .unwrap();

        let summary = store.delete_post("p1").await.unwrap();

        assert_eq!(summary, DeletionSummary { answers_removed: 1, votes_removed: 2 });
        assert_eq!(store.vote_count().await, 0);
        assert_eq!(store.get_author_reputation("alice").await.unwrap().total_helpful_votes, 0);
        assert_eq!(store.get_author_reputation("carol").await.unwrap().total_not_helpful_votes, 0);
    }

    #[tokio::test]
    async fn test_delete_answer_under_wrong_post_is_not_found() {
        let store = store_with_post().await;
        store.insert_post(&post("p2", "alice", 150)).await.unwrap();
        store.insert_answer(&answer("a1", "p1", "carol", 200)).await.unwrap();

        let err = store.delete_answer("p2", "a1").await.unwrap_err();

        assert!(matches!(err, ForumRepositoryError::AnswerNotFound { .. }));
        assert!(store.get_answer("p1", "a1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_audit_detects_drift_and_orphans() {
        let store = store_with_post().await;
        let item = ItemRef::post("p1");
        store
            .persist_changeset(&first_vote("bob", &item, VoteType::Helpful))
            .await
            .unwrap();
        store.overwrite_counts(&item, VotesCount::new(5, 2)).await;
        store
            .insert_raw_vote(VoteRecord {
                user_id: "bob".to_string(),
                item_id: "gone".to_string(),
                item_type: ItemType::Post,
                post_id: None,
                vote_type: VoteType::Helpful,
                voted_at: 1,
            })
            .await;

        let tallies = store.tally_items().await.unwrap();
        assert_eq!(tallies.len(), 1);
        assert!(tallies[0].has_drift());
        assert_eq!(tallies[0].recounted, VotesCount::new(1, 0));

        let orphans = store.find_orphan_votes().await.unwrap();
        assert_eq!(orphans, vec![VoteKey::new("bob", "gone")]);

        let plan = RepairPlan {
            items: vec![item.clone()],
            orphans,
        };
        store.apply_repair(&plan).await.unwrap();

        assert!(!store.tally_items().await.unwrap()[0].has_drift());
        assert!(store.find_orphan_votes().await.unwrap().is_empty());
        assert_eq!(store.get_author_reputation("alice").await.unwrap().total_helpful_votes, 1);
    }

    #[tokio::test]
    async fn test_repair_keeps_votes_committed_after_tally() {
        let store = store_with_post().await;
        let item = ItemRef::post("p1");
        store.overwrite_counts(&item, VotesCount::new(5, 0)).await;

        let tallies = store.tally_items().await.unwrap();
        assert_eq!(tallies[0].recounted, VotesCount::new(0, 0));

        store
            .persist_changeset(&first_vote("bob", &item, VoteType::Helpful))
            .await
            .unwrap();
        store
            .apply_repair(&RepairPlan { items: vec![item.clone()], orphans: vec![] })
            .await
            .unwrap();

        let stored = store.get_item(&item).await.unwrap().unwrap();
        assert_eq!(stored.counts, VotesCount::new(1, 0));
        assert_eq!(store.get_author_reputation("alice").await.unwrap().total_helpful_votes, 1);
    }
}
