//! Follow feed and follow/unfollow actions.

use axum::{
    Router,
    extract::{Path, State},
    response::Response,
    routing::get,
};
use serde_json::json;
use yatube_common::AppResult;

use crate::{
    extractors::{PageParam, SessionUser},
    middleware::AppState,
    response::{PageResponse, profile_url, redirect},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(follow_index))
        .route("/{username}/follow", get(profile_follow))
        .route("/{username}/unfollow", get(profile_unfollow))
}

/// Posts by every author the viewer follows.
async fn follow_index(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    PageParam(page): PageParam,
) -> AppResult<PageResponse> {
    let page = state.following_service.get_feed(&user, page).await?;

    Ok(PageResponse::page(
        "follow.html",
        json!({ "page": page, "username": user.username }),
    ))
}

async fn profile_follow(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let author = state.user_service.get_by_username(&username).await?;
    let outcome = state.following_service.follow(&user, &author).await?;
    tracing::debug!(author = %author.username, outcome = ?outcome, "Follow request");

    Ok(redirect(&profile_url(&author.username)))
}

async fn profile_unfollow(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let author = state.user_service.get_by_username(&username).await?;
    state.following_service.unfollow(&user, &author).await?;

    Ok(redirect(&profile_url(&author.username)))
}
