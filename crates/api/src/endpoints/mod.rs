//! Page endpoints.

mod auth;
mod follow;
mod groups;
mod posts;
mod profile;

use axum::{
    Router,
    http::Uri,
    middleware::{from_fn, from_fn_with_state},
};
use yatube_common::AppError;

use crate::middleware::{AppState, auth_middleware, not_found_page};

/// Create the page router with session resolution and the 404 page.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(follow::router())
        .merge(groups::router())
        .merge(posts::router())
        .merge(profile::router())
        .fallback(|uri: Uri| async move { AppError::NotFound(uri.path().to_string()) })
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(from_fn(not_found_page))
        .with_state(state)
}
