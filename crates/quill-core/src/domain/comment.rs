use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - a visitor comment attached to a post.
///
/// The author is free text, not a registered user; comments start out
/// unapproved and are approved by a moderator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: String,
    pub text: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new unapproved comment on a post.
    pub fn new(post_id: Uuid, author: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author,
            text,
            approved: false,
            created_at: Utc::now(),
        }
    }

    /// Mark the comment as approved. Approval is terminal; a second call
    /// changes nothing.
    pub fn approve(&mut self) {
        self.approved = true;
    }
}
