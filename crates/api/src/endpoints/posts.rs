//! Post pages: index, post view, new/edit forms and comments.

use axum::{
    Form, Router,
    extract::{Multipart, Path, State, rejection::FormRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use yatube_common::{AppError, AppResult, CacheKey, FormErrors};
use yatube_core::{CommentInput, GroupSummary, ImageUpload, PostInput, PostView};
use yatube_db::entities::user;

use crate::{
    extractors::{PageParam, SessionUser},
    middleware::AppState,
    response::{PageResponse, post_url, redirect},
};

const POST_FORM_TEMPLATE: &str = "posts/new_edit_post.html";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/new/", get(new_post_form).post(new_post))
        .route("/{username}/{post_id}/", get(post_view))
        .route("/{username}/{post_id}/edit/", get(edit_post_form).post(edit_post))
        .route("/{username}/{post_id}/comment", post(add_comment))
}

/// Values and errors of the post form, as shown on the page.
#[derive(Debug, Default, Serialize)]
struct PostForm {
    text: String,
    group: Option<String>,
    clear_image: bool,
    errors: FormErrors,
}

impl PostForm {
    fn from_input(input: &PostInput, errors: FormErrors) -> Self {
        Self {
            text: input.text.clone(),
            group: input.group.clone(),
            clear_image: input.clear_image,
            errors,
        }
    }
}

fn index_cache_key(number: u64) -> CacheKey {
    CacheKey::new("index", &[("page", number.to_string().as_str())])
}

/// Global feed, newest first. Served from the page cache while fresh.
///
/// Entries are keyed by the page actually shown, and only requests that
/// name that page exactly are answered from or written to the cache.
/// Out-of-range numbers are rendered fresh so they cannot grow the cache.
async fn index(State(state): State<AppState>, PageParam(page): PageParam) -> AppResult<Response> {
    let requested = u64::try_from(page.get()).ok().filter(|n| *n >= 1);

    if let Some(number) = requested {
        match state.page_cache.get(&index_cache_key(number)).await {
            Ok(Some(body)) => return Ok(PageResponse::Cached(body).into_response()),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Page cache read failed"),
        }
    }

    let page = state.post_service.global_feed(page).await?;
    let shown = page.number;
    let response = PageResponse::page("index.html", json!({ "page": page }));

    if requested == Some(shown) {
        let body = response.body()?;
        if let Err(e) = state
            .page_cache
            .set(&index_cache_key(shown), body, state.index_ttl)
            .await
        {
            tracing::warn!(error = %e, "Page cache write failed");
        }
    }

    Ok(response.into_response())
}

async fn group_choices(state: &AppState) -> AppResult<Vec<GroupSummary>> {
    let groups = state.group_service.list_groups().await?;
    Ok(groups.iter().map(GroupSummary::from).collect())
}

async fn render_post_form(
    state: &AppState,
    form: PostForm,
    post: Option<&PostView>,
) -> AppResult<Response> {
    let groups = group_choices(state).await?;
    let mut context = json!({ "form": form, "groups": groups });
    if let Some(post) = post {
        context["post"] = serde_json::to_value(post).map_err(|e| AppError::Internal(e.to_string()))?;
    }
    Ok(PageResponse::page(POST_FORM_TEMPLATE, context).into_response())
}

/// Read the multipart post form. An empty file input means no image.
async fn read_post_form(mut multipart: Multipart) -> AppResult<(PostInput, Option<ImageUpload>)> {
    let mut input = PostInput::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::field("form", e.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "text" => {
                input.text = field
                    .text()
                    .await
                    .map_err(|e| AppError::field("text", e.body_text()))?;
            }
            "group" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::field("group", e.body_text()))?;
                input.group = Some(value).filter(|v| !v.trim().is_empty());
            }
            // Clear checkbox next to the current image.
            "image-clear" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::field("image", e.body_text()))?;
                input.clear_image = matches!(value.as_str(), "on" | "true" | "1");
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::field("image", e.body_text()))?;

                if !(data.is_empty() && file_name.is_empty()) {
                    image = Some(ImageUpload {
                        file_name,
                        content_type,
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok((input, image))
}

async fn new_post_form(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    render_post_form(&state, PostForm::default(), None).await
}

async fn new_post(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (input, image) = read_post_form(multipart).await?;

    match state
        .post_service
        .create_post(&user, input.clone(), image)
        .await
    {
        Ok(_) => Ok(redirect("/")),
        Err(AppError::Validation(errors)) => {
            render_post_form(&state, PostForm::from_input(&input, errors), None).await
        }
        Err(e) => Err(e),
    }
}

async fn post_view(
    State(state): State<AppState>,
    Path((username, post_id)): Path<(String, String)>,
) -> AppResult<PageResponse> {
    let post = state.post_service.get_post(&username, &post_id).await?;
    let comments = state.comment_service.list_comments(&post.id).await?;
    let counts = state.following_service.counts(&post.author.id).await?;
    let posts_count = state.post_service.count_by_author(&post.author.id).await?;

    Ok(PageResponse::page(
        "posts/post.html",
        json!({
            "author": post.author,
            "post": post,
            "comments": comments,
            "posts_count": posts_count,
            "followers": counts.followers,
            "follows": counts.following,
        }),
    ))
}

/// Redirect anyone but the author back to the post.
fn non_author_redirect(user: &user::Model, post: &PostView, username: &str) -> Option<Response> {
    (post.author.id != user.id).then(|| redirect(&post_url(username, &post.id)))
}

async fn edit_post_form(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    Path((username, post_id)): Path<(String, String)>,
) -> AppResult<Response> {
    let post = state.post_service.get_post(&username, &post_id).await?;
    if let Some(response) = non_author_redirect(&user, &post, &username) {
        return Ok(response);
    }

    let form = PostForm {
        text: post.text.clone(),
        group: post.group.as_ref().map(|g| g.id.clone()),
        ..PostForm::default()
    };
    render_post_form(&state, form, Some(&post)).await
}

async fn edit_post(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    Path((username, post_id)): Path<(String, String)>,
    multipart: Multipart,
) -> AppResult<Response> {
    let post = state.post_service.get_post(&username, &post_id).await?;
    if let Some(response) = non_author_redirect(&user, &post, &username) {
        return Ok(response);
    }

    let (input, image) = read_post_form(multipart).await?;

    match state
        .post_service
        .edit_post(&user, &username, &post_id, input.clone(), image)
        .await
    {
        Ok(updated) => Ok(redirect(&post_url(&username, &updated.id))),
        Err(AppError::Forbidden(_)) => Ok(redirect(&post_url(&username, &post_id))),
        Err(AppError::Validation(errors)) => {
            render_post_form(&state, PostForm::from_input(&input, errors), Some(&post)).await
        }
        Err(e) => Err(e),
    }
}

/// Add a comment. Invalid comments are dropped; the visitor always lands
/// back on the post.
async fn add_comment(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    Path((username, post_id)): Path<(String, String)>,
    form: Result<Form<CommentInput>, FormRejection>,
) -> AppResult<Response> {
    let (_, post) = state.post_service.find_post(&username, &post_id).await?;

    let input = match form {
        Ok(Form(input)) => input,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable comment form");
            CommentInput::default()
        }
    };

    match state.comment_service.add_comment(&user, &post.id, input).await {
        Ok(_) => {}
        Err(AppError::Validation(errors)) => {
            tracing::debug!(post_id = %post.id, errors = ?errors, "Comment rejected");
        }
        Err(e) => return Err(e),
    }

    Ok(redirect(&post_url(&username, &post.id)))
}
