//! Response bodies for the blog API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::{Comment, Post};

/// A post as it appears in list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            body: post.body,
            created_at: post.created_at,
            published_at: post.published_at,
        }
    }
}

/// A comment as shown on a post's detail view. Unapproved comments are
/// included and marked pending via the `approved` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author: String,
    pub text: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            author: comment.author,
            text: comment.text,
            approved: comment.approved,
            created_at: comment.created_at,
        }
    }
}

/// A single post with its author's username and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub id: Uuid,
    pub author: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub comments: Vec<CommentResponse>,
}

impl PostDetailResponse {
    pub fn new(post: Post, author: String, comments: Vec<Comment>) -> Self {
        Self {
            id: post.id,
            author,
            title: post.title,
            body: post.body,
            created_at: post.created_at,
            published_at: post.published_at,
            comments: comments.into_iter().map(Into::into).collect(),
        }
    }
}
