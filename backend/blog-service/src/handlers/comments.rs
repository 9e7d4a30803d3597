use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::CommentForm;
use crate::services::BlogServices;

pub async fn list_comments(
    services: web::Data<BlogServices>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let comments = services.content.list_comments(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn add_comment(
    services: web::Data<BlogServices>,
    user_id: UserId,
    post_id: web::Path<i64>,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse> {
    let comment = services
        .content
        .add_comment(user_id.0, post_id.into_inner(), form.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}
