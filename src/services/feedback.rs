use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Feedback, NewFeedback};

/// In-memory like/dislike records
#[derive(Clone, Default)]
pub struct FeedbackStore {
    records: Arc<RwLock<HashMap<Uuid, Feedback>>>,
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, input: NewFeedback) -> Feedback {
        let feedback = Feedback::from(input);
        self.records
            .write()
            .await
            .insert(feedback.id, feedback.clone());

        tracing::debug!(
            feedback_id = %feedback.id,
            content_id = feedback.content_id,
            liked = feedback.liked,
            "Feedback recorded"
        );
        feedback
    }

    /// Returns false when no record has this id
    pub async fn remove(&self, id: Uuid) -> bool {
        self.records.write().await.remove(&id).is_some()
    }

    pub async fn for_content(&self, content_id: u64) -> Vec<Feedback> {
        let mut matching: Vec<Feedback> = self
            .records
            .read()
            .await
            .values()
            .filter(|f| f.content_id == content_id)
            .cloned()
            .collect();
        matching.sort_by_key(|f| f.timestamp);
        matching
    }

    /// Ids of liked titles, oldest like first, each id once
    pub async fn liked_content_ids(&self) -> Vec<u64> {
        let mut liked: Vec<(chrono::DateTime<chrono::Utc>, u64)> = self
            .records
            .read()
            .await
            .values()
            .filter(|f| f.liked)
            .map(|f| (f.timestamp, f.content_id))
            .collect();
        liked.sort();

        let mut ids = Vec::with_capacity(liked.len());
        for (_, content_id) in liked {
            if !ids.contains(&content_id) {
                ids.push(content_id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(content_id: u64, liked: bool) -> NewFeedback {
        NewFeedback {
            content_id,
            liked,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_record_and_remove() {
        let store = FeedbackStore::new();
        let feedback = store.record(input(238, true)).await;

        assert_eq!(feedback.content_id, 238);
        assert!(store.remove(feedback.id).await);
        assert!(!store.remove(feedback.id).await);
        assert!(store.liked_content_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_liked_ids_skip_dislikes_and_duplicates() {
        let store = FeedbackStore::new();
        store.record(input(1, true)).await;
        store.record(input(2, false)).await;
        store.record(input(3, true)).await;
        store.record(input(1, true)).await;

        let liked = store.liked_content_ids().await;
        assert_eq!(liked.len(), 2);
        assert!(liked.contains(&1));
        assert!(liked.contains(&3));
        assert!(!liked.contains(&2));
    }

    #[tokio::test]
    async fn test_for_content() {
        let store = FeedbackStore::new();
        store.record(input(7, true)).await;
        store.record(input(7, false)).await;
        store.record(input(8, true)).await;

        let feedback = store.for_content(7).await;
        assert_eq!(feedback.len(), 2);
        assert!(feedback.iter().all(|f| f.content_id == 7));
    }
}
