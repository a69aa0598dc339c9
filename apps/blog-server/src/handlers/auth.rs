//! Authentication handlers - registration, login, logout.

use std::sync::Arc;

use actix_web::{HttpResponse, cookie::Cookie, http::header, web};

use quill_core::domain::User;
use quill_core::ports::{BaseRepository, PasswordService, TokenService, UserRepository};
use quill_shared::forms::{LoginForm, SignupForm};

use crate::audit;
use crate::handlers::{POSTS_PATH, see_other};
use crate::middleware::auth::{Identity, LOGIN_PATH, OptionalIdentity, SESSION_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /auth/register - empty signup form.
pub async fn register_form() -> HttpResponse {
    HttpResponse::Ok().json(SignupForm::default())
}

/// POST /auth/register - create an account and send the caller to login.
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    form.validate().map_err(AppError::Validation)?;

    if state.users.find_by_username(&form.username).await?.is_some() {
        return Err(AppError::Conflict("username already taken".to_string()));
    }

    let password_hash = password_service
        .hash(&form.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = User::new(form.username, password_hash);
    let saved = state.users.save(user).await?;

    audit::record(&saved.username, "registered", &saved.username);
    Ok(see_other(LOGIN_PATH))
}

/// GET /auth/login - empty login form; already-authenticated callers go
/// straight to the post list.
pub async fn login_form(identity: OptionalIdentity) -> HttpResponse {
    if identity.0.is_some() {
        return see_other(POSTS_PATH);
    }
    HttpResponse::Ok().json(LoginForm::default())
}

/// POST /auth/login - establish a session and redirect to the post list.
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    identity: OptionalIdentity,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    if identity.0.is_some() {
        return Ok(see_other(POSTS_PATH));
    }

    let form = form.into_inner();
    form.validate().map_err(AppError::Validation)?;

    let user = state
        .users
        .find_by_username(&form.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&form.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = token_service
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .finish();

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, POSTS_PATH))
        .cookie(cookie)
        .finish())
}

/// GET /auth/logout - clear the session and return to login.
pub async fn logout(_identity: Identity) -> HttpResponse {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, LOGIN_PATH))
        .cookie(cookie)
        .finish()
}
