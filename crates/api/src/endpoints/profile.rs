//! Author profile page.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::json;
use yatube_common::AppResult;
use yatube_core::AuthorSummary;

use crate::{
    extractors::{MaybeSessionUser, PageParam},
    middleware::AppState,
    response::PageResponse,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{username}/", get(profile))
}

/// An author's posts with follower counts and whether the viewer follows them.
async fn profile(
    MaybeSessionUser(viewer): MaybeSessionUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    PageParam(page): PageParam,
) -> AppResult<PageResponse> {
    let author = state.user_service.get_by_username(&username).await?;
    let page = state.post_service.profile_posts(&author.id, page).await?;
    let counts = state.following_service.counts(&author.id).await?;
    let posts_count = page.total_items;

    let following = match &viewer {
        Some(viewer) => {
            state
                .following_service
                .is_following(&viewer.id, &author.id)
                .await?
        }
        None => false,
    };

    Ok(PageResponse::page(
        "posts/profile.html",
        json!({
            "author": AuthorSummary::from(&author),
            "page": page,
            "posts_count": posts_count,
            "following": following,
            "followers": counts.followers,
            "follows": counts.following,
        }),
    ))
}
