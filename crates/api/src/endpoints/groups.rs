//! Group pages.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::json;
use yatube_common::AppResult;

use crate::{extractors::PageParam, middleware::AppState, response::PageResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/group/{slug}/", get(group_posts))
}

async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    PageParam(page): PageParam,
) -> AppResult<PageResponse> {
    let group = state.group_service.get_by_slug(&slug).await?;
    let page = state.post_service.group_posts(&group.id, page).await?;

    Ok(PageResponse::page(
        "group.html",
        json!({ "group": group, "page": page }),
    ))
}
