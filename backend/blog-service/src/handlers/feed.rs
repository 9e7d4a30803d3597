/// Listing, profile and follow endpoints
use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::PageQuery;
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::BlogServices;

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub username: String,
    pub following: bool,
    /// Whether this request changed the follow graph
    pub changed: bool,
}

pub async fn group_posts(
    services: web::Data<BlogServices>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = services
        .feed
        .list_by_group(&slug, query.number())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Author profile; the viewer is optional
pub async fn profile(
    services: web::Data<BlogServices>,
    viewer: Option<UserId>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let profile = services
        .feed
        .profile(&username, viewer.map(|v| v.0), query.number())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Posts by the authors the caller follows
pub async fn following_feed(
    services: web::Data<BlogServices>,
    user_id: UserId,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = services
        .feed
        .list_following(user_id.0, query.number())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn follow(
    services: web::Data<BlogServices>,
    user_id: UserId,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let username = username.into_inner();
    let changed = services.follows.follow(user_id.0, &username).await?;
    let author = services.directory.find_user_by_username(&username).await?;
    let following = services.follows.is_following(user_id.0, author.id).await?;

    Ok(HttpResponse::Ok().json(FollowResponse {
        username,
        following,
        changed,
    }))
}

pub async fn unfollow(
    services: web::Data<BlogServices>,
    user_id: UserId,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let username = username.into_inner();
    let changed = services.follows.unfollow(user_id.0, &username).await?;

    Ok(HttpResponse::Ok().json(FollowResponse {
        username,
        following: false,
        changed,
    }))
}
