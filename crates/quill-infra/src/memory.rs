//! In-memory repository implementations - used as fallback when no
//! database is configured, and as fixtures by handler tests.
//!
//! Data is lost on process restart. Filtering and ordering match the
//! Postgres repositories.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentRepository, PostRepository, UserRepository,
};

/// In-memory user store behind an async RwLock.
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        let duplicate = store
            .values()
            .any(|u| u.username == entity.username && u.id != entity.id);
        if duplicate {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }
}

/// In-memory post store behind an async RwLock.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        self.store.write().await.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .filter(|p| p.is_visible_at(now))
            .cloned()
            .collect();
        posts.sort_by_key(|p| p.published_at);
        Ok(posts)
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by_key(|p| p.created_at);
        Ok(posts)
    }

    async fn find_drafts(&self) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store.values().filter(|p| p.is_draft()).cloned().collect();
        posts.sort_by_key(|p| p.created_at);
        Ok(posts)
    }
}

/// In-memory comment store behind an async RwLock.
pub struct InMemoryCommentRepository {
    store: RwLock<HashMap<Uuid, Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCommentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Comment) -> Result<Comment, RepoError> {
        self.store.write().await.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let store = self.store.read().await;
        let mut comments: Vec<Comment> = store
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn post_at(author_id: Uuid, title: &str, age_hours: i64, published: Option<i64>) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            author_id,
            title: title.to_string(),
            body: "body".to_string(),
            created_at: now - TimeDelta::hours(age_hours),
            published_at: published.map(|h| now - TimeDelta::hours(h)),
        }
    }

    #[tokio::test]
    async fn published_list_filters_and_orders() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();

        repo.save(post_at(author, "draft", 5, None)).await.unwrap();
        repo.save(post_at(author, "old", 5, Some(4))).await.unwrap();
        repo.save(post_at(author, "new", 5, Some(1))).await.unwrap();
        repo.save(post_at(author, "future", 5, Some(-2))).await.unwrap();

        let posts = repo.find_published(Utc::now()).await.unwrap();

        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["old", "new"]);
    }

    #[tokio::test]
    async fn draft_list_orders_by_creation() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();

        repo.save(post_at(author, "younger", 1, None)).await.unwrap();
        repo.save(post_at(author, "older", 3, None)).await.unwrap();
        repo.save(post_at(author, "published", 2, Some(1))).await.unwrap();

        let drafts = repo.find_drafts().await.unwrap();

        let titles: Vec<&str> = drafts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["older", "younger"]);
    }

    #[tokio::test]
    async fn author_list_is_scoped_to_one_author() {
        let repo = InMemoryPostRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        repo.save(post_at(alice, "mine", 2, None)).await.unwrap();
        repo.save(post_at(bob, "theirs", 1, None)).await.unwrap();

        let posts = repo.find_by_author(alice).await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "mine");
    }

    #[tokio::test]
    async fn save_overwrites_and_delete_removes() {
        let repo = InMemoryPostRepository::new();
        let mut post = post_at(Uuid::new_v4(), "v1", 1, None);

        repo.save(post.clone()).await.unwrap();
        post.title = "v2".to_string();
        repo.save(post.clone()).await.unwrap();

        let found = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(found.title, "v2");

        repo.delete(post.id).await.unwrap();
        assert!(repo.find_by_id(post.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(post.id).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_constraint_violation() {
        let repo = InMemoryUserRepository::new();

        repo.save(User::new("alice".into(), "hash-a".into()))
            .await
            .unwrap();
        let result = repo.save(User::new("alice".into(), "hash-b".into())).await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn comments_are_scoped_to_their_post() {
        let repo = InMemoryCommentRepository::new();
        let post_a = Uuid::new_v4();
        let post_b = Uuid::new_v4();

        repo.save(Comment::new(post_a, "visitor".into(), "first".into()))
            .await
            .unwrap();
        repo.save(Comment::new(post_b, "visitor".into(), "other".into()))
            .await
            .unwrap();

        let comments = repo.find_by_post(post_a).await.unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "first");
    }
}
