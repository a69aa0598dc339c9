//! Post handlers - listing, authoring, publishing, deletion.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Post;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository};
use quill_shared::dto::{PostDetailResponse, PostResponse};
use quill_shared::forms::PostForm;

use crate::audit;
use crate::handlers::{POSTS_PATH, see_other};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("post {id} not found"))
}

fn detail_path(id: Uuid) -> String {
    format!("{POSTS_PATH}/{id}")
}

/// GET /posts - posts published up to now, oldest publication first.
pub async fn list_published(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_published(chrono::Utc::now()).await?;
    let body: Vec<PostResponse> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/mine - the session principal's posts, oldest first.
pub async fn list_mine(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let posts = state.posts.find_by_author(identity.user_id).await?;
    let body: Vec<PostResponse> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/drafts - unpublished posts, oldest first.
pub async fn list_drafts(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let posts = state.posts.find_drafts().await?;
    let body: Vec<PostResponse> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/{id} - a single post with its comments.
pub async fn detail(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    let author = state
        .users
        .find_by_id(post.author_id)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();
    let comments = state.comments.find_by_post(post.id).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse::new(post, author, comments)))
}

/// GET /posts/new - empty authoring form.
pub async fn new_form(_identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(PostForm::default())
}

/// POST /posts - create a draft owned by the session principal.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    form.validate().map_err(AppError::Validation)?;

    let post = Post::new(identity.user_id, form.title, form.body);
    let saved = state.posts.save(post).await?;

    audit::record(&identity.username, "added a post", &saved.title);
    Ok(see_other(detail_path(saved.id)))
}

/// GET /posts/{id}/edit - authoring form pre-populated from the post.
pub async fn edit_form(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    Ok(HttpResponse::Ok().json(PostForm {
        title: post.title,
        body: post.body,
    }))
}

/// POST /posts/{id} - update title and body, rebinding the author to the
/// session principal.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    let form = form.into_inner();
    form.validate().map_err(AppError::Validation)?;

    post.title = form.title;
    post.body = form.body;
    post.author_id = identity.user_id;
    let saved = state.posts.save(post).await?;

    audit::record(&identity.username, "edited a post", &saved.title);
    Ok(see_other(detail_path(saved.id)))
}

/// GET /posts/{id}/publish - stamp the publication timestamp.
pub async fn publish(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    post.publish();
    let saved = state.posts.save(post).await?;

    audit::record(&identity.username, "published a post", &saved.title);
    Ok(see_other(detail_path(saved.id)))
}

/// GET /posts/{id}/delete - remove the post and return to the list.
pub async fn remove(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    state.posts.delete(post.id).await?;

    audit::record(&identity.username, "removed a post", &post.title);
    Ok(see_other(POSTS_PATH))
}
