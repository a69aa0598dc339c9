//! Handler tests driven through the actix test harness against the
//! in-memory repositories.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, User};
use quill_core::ports::{BaseRepository, PasswordService, TokenService};
use quill_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use quill_shared::ErrorResponse;
use quill_shared::dto::{PostDetailResponse, PostResponse};
use quill_shared::forms::{CommentForm, LoginForm, PostForm, SignupForm};

use crate::state::AppState;

macro_rules! test_app {
    ($state:expr, $tokens:expr) => {{
        let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new($tokens.clone()))
                .app_data(web::Data::new(password_service))
                .configure(super::configure_routes),
        )
        .await
    }};
}

fn token_service() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "handler-test-secret".to_string(),
        expiration_hours: 1,
        issuer: "quill-tests".to_string(),
    }))
}

async fn seed_user(state: &AppState, username: &str, password: &str) -> User {
    let hasher = Argon2PasswordService::new();
    let user = User::new(username.to_string(), hasher.hash(password).unwrap());
    state.users.save(user).await.unwrap()
}

async fn seed_post(
    state: &AppState,
    author_id: Uuid,
    title: &str,
    age_hours: i64,
    published_hours_ago: Option<i64>,
) -> Post {
    let now = Utc::now();
    let post = Post {
        id: Uuid::new_v4(),
        author_id,
        title: title.to_string(),
        body: "body".to_string(),
        created_at: now - TimeDelta::hours(age_hours),
        published_at: published_hours_ago.map(|h| now - TimeDelta::hours(h)),
    };
    state.posts.save(post).await.unwrap()
}

fn bearer(tokens: &Arc<dyn TokenService>, user: &User) -> (header::HeaderName, String) {
    let token = tokens.generate_token(user.id, &user.username).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_string()
}

#[actix_web::test]
async fn published_list_is_filtered_and_ordered() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let author = Uuid::new_v4();

    seed_post(&state, author, "draft", 6, None).await;
    seed_post(&state, author, "oldest", 6, Some(5)).await;
    seed_post(&state, author, "newest", 6, Some(1)).await;
    seed_post(&state, author, "scheduled", 6, Some(-3)).await;

    let app = test_app!(state, tokens);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<PostResponse> = test::read_body_json(resp).await;
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["oldest", "newest"]);
}

#[actix_web::test]
async fn post_detail_shows_author_and_pending_comments() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let post = seed_post(&state, alice.id, "Hello", 1, None).await;
    state
        .comments
        .save(Comment::new(post.id, "visitor".into(), "nice!".into()))
        .await
        .unwrap();

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let detail: PostDetailResponse = test::read_body_json(resp).await;
    assert_eq!(detail.author, "alice");
    assert!(detail.published_at.is_none());
    assert_eq!(detail.comments.len(), 1);
    assert!(!detail.comments[0].approved);
}

#[actix_web::test]
async fn missing_post_detail_is_not_found() {
    let state = AppState::in_memory();
    let tokens = token_service();

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unauthenticated_mutation_redirects_to_login() {
    let state = AppState::in_memory();
    let tokens = token_service();

    let app = test_app!(state, tokens);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/posts/drafts").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_form(PostForm {
            title: "Hello".into(),
            body: "World".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");
}

#[actix_web::test]
async fn create_post_binds_author_and_redirects_to_detail() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(bearer(&tokens, &alice))
        .set_form(PostForm {
            title: "Hello".into(),
            body: "World".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let detail_path = location(&resp);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri(&detail_path).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail: PostDetailResponse = test::read_body_json(resp).await;
    assert_eq!(detail.author, "alice");
    assert_eq!(detail.title, "Hello");
    assert!(detail.published_at.is_none());
}

#[actix_web::test]
async fn invalid_post_form_is_rejected_with_field_errors() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(bearer(&tokens, &alice))
        .set_form(PostForm {
            title: "   ".into(),
            body: String::new(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = test::read_body_json(resp).await;
    let fields: Vec<String> = body
        .errors
        .expect("field errors")
        .into_iter()
        .map(|e| e.field)
        .collect();
    assert_eq!(fields, vec!["title", "body"]);

    // nothing was persisted
    let req = test::TestRequest::get()
        .uri("/posts/mine")
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let posts: Vec<PostResponse> = test::read_body_json(resp).await;
    assert!(posts.is_empty());
}

#[actix_web::test]
async fn draft_list_orders_by_creation_time() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;

    seed_post(&state, alice.id, "younger", 1, None).await;
    seed_post(&state, alice.id, "older", 3, None).await;
    seed_post(&state, alice.id, "published", 2, Some(1)).await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri("/posts/drafts")
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<PostResponse> = test::read_body_json(resp).await;
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["older", "younger"]);
}

#[actix_web::test]
async fn my_posts_lists_only_the_principals_posts() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let bob = seed_user(&state, "bob", "battery staple").await;

    seed_post(&state, alice.id, "second", 1, None).await;
    seed_post(&state, alice.id, "first", 3, Some(1)).await;
    seed_post(&state, bob.id, "not mine", 2, None).await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri("/posts/mine")
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let posts: Vec<PostResponse> = test::read_body_json(resp).await;
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second"]);
}

#[actix_web::test]
async fn publish_moves_draft_into_public_list() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let post = seed_post(&state, alice.id, "Hello", 2, None).await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/publish", post.id))
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .to_request();
    let detail: PostDetailResponse = test::read_body_json(test::call_service(&app, req).await).await;
    let published_at = detail.published_at.expect("published");
    assert!(published_at >= detail.created_at);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request()).await;
    let public: Vec<PostResponse> = test::read_body_json(resp).await;
    assert!(public.iter().any(|p| p.id == post.id));

    let req = test::TestRequest::get()
        .uri("/posts/drafts")
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let drafts: Vec<PostResponse> = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(drafts.iter().all(|p| p.id != post.id));
}

#[actix_web::test]
async fn publish_does_not_restamp_an_already_published_post() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let post = seed_post(&state, alice.id, "Hello", 2, Some(1)).await;
    let original = post.published_at;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/publish", post.id))
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .to_request();
    let detail: PostDetailResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(detail.published_at, original);
}

#[actix_web::test]
async fn delete_post_removes_it_from_all_views() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let post = seed_post(&state, alice.id, "Hello", 2, Some(1)).await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/delete", post.id))
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/posts");

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request()).await;
    let public: Vec<PostResponse> = test::read_body_json(resp).await;
    assert!(public.is_empty());
}

#[actix_web::test]
async fn anonymous_comment_starts_pending() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let post = seed_post(&state, alice.id, "Hello", 2, Some(1)).await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.id))
        .set_form(CommentForm {
            author: "visitor".into(),
            text: "nice!".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.id))
        .to_request();
    let detail: PostDetailResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].author, "visitor");
    assert!(!detail.comments[0].approved);
}

#[actix_web::test]
async fn commenting_on_a_missing_post_is_not_found() {
    let state = AppState::in_memory();
    let tokens = token_service();

    let app = test_app!(state, tokens);
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", Uuid::new_v4()))
        .set_form(CommentForm {
            author: "visitor".into(),
            text: "nice!".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unauthenticated_approval_redirects_and_mutates_nothing() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let post = seed_post(&state, alice.id, "Hello", 2, Some(1)).await;
    let comment = state
        .comments
        .save(Comment::new(post.id, "visitor".into(), "nice!".into()))
        .await
        .unwrap();

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri(&format!("/comments/{}/approve", comment.id))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");

    let stored = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert!(!stored.approved);
}

#[actix_web::test]
async fn any_authenticated_user_can_approve_a_comment() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let bob = seed_user(&state, "bob", "battery staple").await;
    let post = seed_post(&state, alice.id, "Hello", 2, Some(1)).await;
    let comment = state
        .comments
        .save(Comment::new(post.id, "visitor".into(), "nice!".into()))
        .await
        .unwrap();

    let app = test_app!(state, tokens);
    let approve_uri = format!("/comments/{}/approve", comment.id);
    let req = test::TestRequest::get()
        .uri(&approve_uri)
        .insert_header(bearer(&tokens, &bob))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));

    let stored = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert!(stored.approved);

    // approving again keeps the flag set
    let req = test::TestRequest::get()
        .uri(&approve_uri)
        .insert_header(bearer(&tokens, &bob))
        .to_request();
    test::call_service(&app, req).await;
    let stored = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert!(stored.approved);
}

#[actix_web::test]
async fn delete_comment_redirects_to_the_parent_post() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let post = seed_post(&state, alice.id, "Hello", 2, Some(1)).await;
    let comment = state
        .comments
        .save(Comment::new(post.id, "visitor".into(), "spam".into()))
        .await
        .unwrap();

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri(&format!("/comments/{}/delete", comment.id))
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));
    assert!(state.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn register_then_login_establishes_a_session() {
    let state = AppState::in_memory();
    let tokens = token_service();

    let app = test_app!(state, tokens);
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_form(SignupForm {
            username: "alice".into(),
            password: "correct horse".into(),
            password_confirm: "correct horse".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form(LoginForm {
            username: "alice".into(),
            password: "correct horse".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/posts");
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("quill_session="));

    // the cookie alone authenticates a gated route
    let cookie = Cookie::parse(set_cookie).unwrap();
    let req = test::TestRequest::get()
        .uri("/posts/drafts")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn register_rejects_a_taken_username() {
    let state = AppState::in_memory();
    let tokens = token_service();
    seed_user(&state, "alice", "correct horse").await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_form(SignupForm {
            username: "alice".into(),
            password: "another pass".into(),
            password_confirm: "another pass".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn register_rejects_a_password_mismatch() {
    let state = AppState::in_memory();
    let tokens = token_service();

    let app = test_app!(state, tokens);
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_form(SignupForm {
            username: "alice".into(),
            password: "correct horse".into(),
            password_confirm: "wrong horse".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = test::read_body_json(resp).await;
    let fields: Vec<String> = body
        .errors
        .expect("field errors")
        .into_iter()
        .map(|e| e.field)
        .collect();
    assert_eq!(fields, vec!["password_confirm"]);
}

#[actix_web::test]
async fn login_with_wrong_password_is_unauthorized() {
    let state = AppState::in_memory();
    let tokens = token_service();
    seed_user(&state, "alice", "correct horse").await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form(LoginForm {
            username: "alice".into(),
            password: "wrong horse".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_form_redirects_an_authenticated_caller() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri("/auth/login")
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/posts");
}

#[actix_web::test]
async fn logout_clears_the_session_cookie() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri("/auth/logout")
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("removal cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("quill_session="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[actix_web::test]
async fn edit_form_is_prefilled_from_the_post() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let post = seed_post(&state, alice.id, "Hello", 1, None).await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit", post.id))
        .insert_header(bearer(&tokens, &alice))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let form: PostForm = test::read_body_json(resp).await;
    assert_eq!(form.title, "Hello");
    assert_eq!(form.body, "body");
}

#[actix_web::test]
async fn update_changes_content_and_redirects_to_detail() {
    let state = AppState::in_memory();
    let tokens = token_service();
    let alice = seed_user(&state, "alice", "correct horse").await;
    let post = seed_post(&state, alice.id, "Hello", 1, None).await;

    let app = test_app!(state, tokens);
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}", post.id))
        .insert_header(bearer(&tokens, &alice))
        .set_form(PostForm {
            title: "Hello again".into(),
            body: "updated".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/posts/{}", post.id));

    let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Hello again");
    assert_eq!(stored.body, "updated");
}
