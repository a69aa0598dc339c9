//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;

use actix_web::{HttpResponse, http::header, web};

#[cfg(test)]
mod tests;

/// Canonical list view of published posts.
pub const POSTS_PATH: &str = "/posts";

/// 303 redirect to the given location.
pub(crate) fn see_other(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.as_ref().to_string()))
        .finish()
}

/// Configure all application routes.
///
/// Fixed segments are registered ahead of the `{id}` patterns they would
/// otherwise shadow.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/posts")
                .route("/mine", web::get().to(posts::list_mine))
                .route("/drafts", web::get().to(posts::list_drafts))
                .route("/new", web::get().to(posts::new_form))
                .service(
                    web::resource("")
                        .route(web::get().to(posts::list_published))
                        .route(web::post().to(posts::create)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(posts::detail))
                        .route(web::post().to(posts::update)),
                )
                .route("/{id}/edit", web::get().to(posts::edit_form))
                .route("/{id}/publish", web::get().to(posts::publish))
                .route("/{id}/delete", web::get().to(posts::remove))
                .service(
                    web::resource("/{id}/comment")
                        .route(web::get().to(comments::comment_form))
                        .route(web::post().to(comments::add)),
                ),
        )
        .service(
            web::scope("/comments")
                .route("/{id}/approve", web::get().to(comments::approve))
                .route("/{id}/delete", web::get().to(comments::remove)),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/register")
                        .route(web::get().to(auth::register_form))
                        .route(web::post().to(auth::register)),
                )
                .service(
                    web::resource("/login")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .route("/logout", web::get().to(auth::logout)),
        );
}
