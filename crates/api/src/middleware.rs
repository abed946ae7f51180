//! Application state and request middleware.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use yatube_common::SharedPageCache;
use yatube_core::{CommentService, FollowingService, GroupService, PostService, UserService};

use crate::response::PageResponse;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "yatube_session";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub group_service: GroupService,
    pub following_service: FollowingService,
    pub page_cache: SharedPageCache,
    /// How long the index page stays cached.
    pub index_ttl: Duration,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

/// Resolve the session cookie or bearer token to a user.
///
/// Unknown tokens are ignored; the request simply stays anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let token = bearer.or_else(|| {
        CookieJar::from_headers(req.headers())
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    });

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => {
                tracing::warn!(error = %e, "Session lookup failed");
            }
            Err(_) => {}
        }
    }

    next.run(req).await
}

/// Replace every 404 with the not-found page for the requested path.
pub async fn not_found_page(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    if response.status() != StatusCode::NOT_FOUND {
        return response;
    }

    tracing::debug!(path = %path, "Page not found");
    PageResponse::page(
        "posts/misc/404.html",
        serde_json::json!({ "path": path }),
    )
    .with_status(StatusCode::NOT_FOUND)
    .into_response()
}
