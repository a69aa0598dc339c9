//! Comment handlers - anonymous submission, moderation.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Comment;
use quill_core::ports::BaseRepository;
use quill_shared::forms::CommentForm;

use crate::audit;
use crate::handlers::see_other;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn comment_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("comment {id} not found"))
}

fn parent_path(post_id: Uuid) -> String {
    format!("/posts/{post_id}")
}

/// GET /posts/{id}/comment - empty comment form for an existing post.
pub async fn comment_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id} not found")))?;

    Ok(HttpResponse::Ok().json(CommentForm::default()))
}

/// POST /posts/{id}/comment - attach a visitor comment to a post.
///
/// No authentication: attribution is the free-text author field, and any
/// session identity on the request is ignored. The comment starts
/// unapproved.
pub async fn add(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id} not found")))?;

    let form = form.into_inner();
    form.validate().map_err(AppError::Validation)?;

    let comment = Comment::new(post.id, form.author, form.text);
    let saved = state.comments.save(comment).await?;

    audit::record(&saved.author, "added a comment", &post.title);
    Ok(see_other(parent_path(post.id)))
}

/// GET /comments/{id}/approve - mark a comment approved.
pub async fn approve(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| comment_not_found(id))?;

    comment.approve();
    let saved = state.comments.save(comment).await?;

    audit::record(&identity.username, "approved a comment", &saved.author);
    Ok(see_other(parent_path(saved.post_id)))
}

/// GET /comments/{id}/delete - remove a comment.
pub async fn remove(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| comment_not_found(id))?;

    state.comments.delete(comment.id).await?;

    audit::record(&identity.username, "removed a comment", &comment.author);
    Ok(see_other(parent_path(comment.post_id)))
}
