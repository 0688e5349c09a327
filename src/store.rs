//! In-memory submission store. Append-only, keyed by user.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::instrument;

use crate::domain::Submission;

#[derive(Clone, Default)]
pub struct SubmissionStore {
    by_user: Arc<RwLock<HashMap<String, Vec<Submission>>>>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a user's history in insertion order.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_submissions(&self, user_id: &str) -> Vec<Submission> {
        self.by_user
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Append an already-validated submission unless the user is at `cap`.
    /// Returns false when the cap is hit.
    #[instrument(level = "debug", skip(self, submission), fields(id = %submission.id, user = %submission.user_id))]
    pub async fn append(&self, submission: Submission, cap: usize) -> bool {
        let mut by_user = self.by_user.write().await;
        let history = by_user.entry(submission.user_id.clone()).or_default();
        if history.len() >= cap {
            return false;
        }
        history.push(submission);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sub(id: &str, user: &str) -> Submission {
        Submission {
            id: id.into(),
            user_id: user.into(),
            template_id: "bg-1".into(),
            submitted_at: Utc::now(),
            scores_by_criterion: Default::default(),
        }
    }

    #[tokio::test]
    async fn histories_are_kept_per_user() {
        let store = SubmissionStore::new();
        assert!(store.append(sub("s1", "alice"), 10).await);
        assert!(store.append(sub("s2", "bob"), 10).await);
        assert!(store.append(sub("s3", "alice"), 10).await);

        let ids: Vec<String> = store.list_submissions("alice").await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["s1", "s3"]);
        assert!(store.list_submissions("carol").await.is_empty());
    }

    #[tokio::test]
    async fn cap_blocks_further_appends() {
        let store = SubmissionStore::new();
        assert!(store.append(sub("s1", "alice"), 1).await);
        assert!(!store.append(sub("s2", "alice"), 1).await);
        assert_eq!(store.list_submissions("alice").await.len(), 1);
    }
}
