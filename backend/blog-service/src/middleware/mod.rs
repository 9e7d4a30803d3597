/// Request identity for blog-service
///
/// Authentication happens upstream; the gateway forwards the authenticated
/// user's numeric id in the `x-user-id` header. Handlers that mutate state
/// take a `UserId` and handlers with an optional viewer take `Option<UserId>`.
use actix_web::error::InternalError;
use actix_web::http::header::LOCATION;
use actix_web::{web, Error, FromRequest, HttpRequest, HttpResponse};
use std::future::{ready, Ready};

use crate::config::AuthConfig;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user id forwarded by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

impl UserId {
    fn from_headers(req: &HttpRequest) -> Option<Self> {
        req.headers()
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(UserId)
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Self::from_headers(req).ok_or_else(|| login_redirect(req)))
    }
}

/// `302 Found` to the login page, carrying the requested path in `next`.
fn login_redirect(req: &HttpRequest) -> Error {
    let login_url = req
        .app_data::<web::Data<AuthConfig>>()
        .map(|auth| auth.login_url.clone())
        .unwrap_or_else(|| AuthConfig::default().login_url);

    let next = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.path());

    tracing::debug!(path = %req.path(), "anonymous request redirected to login");

    let response = HttpResponse::Found()
        .insert_header((
            LOCATION,
            format!("{}?next={}", login_url, urlencoding::encode(next)),
        ))
        .finish();
    InternalError::from_response("authentication required", response).into()
}
