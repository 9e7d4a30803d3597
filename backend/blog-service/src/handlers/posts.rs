/// Post handlers - HTTP endpoints for post operations
use actix_web::http::header::LOCATION;
use actix_web::{web, HttpResponse};

use super::PageQuery;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::PostForm;
use crate::services::BlogServices;

/// Index listing of every post, newest first
pub async fn list_posts(
    services: web::Data<BlogServices>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = services.feed.list_all(query.number()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Create a new post
pub async fn create_post(
    services: web::Data<BlogServices>,
    user_id: UserId,
    form: web::Json<PostForm>,
) -> Result<HttpResponse> {
    let post = services
        .content
        .create_post(user_id.0, form.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// Read-only post view
pub async fn get_post(
    services: web::Data<BlogServices>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let detail = services.content.post_detail(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Edit a post. A non-author is sent back to the read-only view.
pub async fn edit_post(
    services: web::Data<BlogServices>,
    user_id: UserId,
    post_id: web::Path<i64>,
    form: web::Json<PostForm>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();

    match services
        .content
        .edit_post(user_id.0, post_id, form.into_inner())
        .await
    {
        Ok(post) => Ok(HttpResponse::Ok().json(post)),
        Err(AppError::Forbidden(_)) => Ok(HttpResponse::SeeOther()
            .insert_header((LOCATION, format!("/api/v1/posts/{}", post_id)))
            .finish()),
        Err(e) => Err(e),
    }
}
