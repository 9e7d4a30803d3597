/// HTTP handlers for blog-service
///
/// - Posts: index listing, create, read-only detail, author-only edit
/// - Comments: list and add comments on a post
/// - Feed: group listing, author profile, follow/unfollow, following feed
pub mod comments;
pub mod feed;
pub mod posts;

use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::PageNumber;
use crate::services::BlogServices;

/// `?page=` query; missing or non-numeric values fall back to page 1
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn number(&self) -> PageNumber {
        PageNumber::parse(self.page.as_deref())
    }
}

/// Register every blog-service route under `/api/v1`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .route("/health", web::get().to(health))
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list_posts))
                    .route(web::post().to(posts::create_post)),
            )
            .service(
                web::resource("/posts/{post_id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::put().to(posts::edit_post)),
            )
            .service(
                web::resource("/posts/{post_id}/comments")
                    .route(web::get().to(comments::list_comments))
                    .route(web::post().to(comments::add_comment)),
            )
            .route("/groups/{slug}/posts", web::get().to(feed::group_posts))
            .route("/profiles/{username}", web::get().to(feed::profile))
            .route("/profiles/{username}/follow", web::post().to(feed::follow))
            .route(
                "/profiles/{username}/unfollow",
                web::post().to(feed::unfollow),
            )
            .route("/follow", web::get().to(feed::following_feed)),
    );
}

/// Malformed JSON bodies answer with the same error body as every other failure
fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "rejected request body");

    let message = match &err {
        JsonPayloadError::Deserialize(e) => format!("invalid request body: {}", e),
        other => other.to_string(),
    };
    AppError::BadRequest(message).into()
}

async fn health(services: web::Data<BlogServices>) -> HttpResponse {
    match services.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({ "status": "unavailable" }))
        }
    }
}
