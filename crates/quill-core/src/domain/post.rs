use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog post authored by a registered user.
///
/// A post with no `published_at` timestamp is a draft. Publishing stamps
/// the timestamp exactly once; there is no transition back to draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new draft with a generated ID and creation timestamp.
    pub fn new(author_id: Uuid, title: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            body,
            created_at: Utc::now(),
            published_at: None,
        }
    }

    /// Stamp the publication timestamp. A second call is a no-op.
    pub fn publish(&mut self) {
        if self.published_at.is_none() {
            self.published_at = Some(Utc::now());
        }
    }

    pub fn is_draft(&self) -> bool {
        self.published_at.is_none()
    }

    /// Whether the post is publicly visible at `now`.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.published_at, Some(ts) if ts <= now)
    }
}
