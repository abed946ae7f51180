//! Router tests.
//!
//! These drive the full page router with a mock database and check what a
//! browser would see: status codes, redirects, cookies and page contexts.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use chrono::Utc;
use maplit::btreemap;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use serde_json::Value as Json;
use tower::ServiceExt;
use yatube_api::{AppState, router};
use yatube_common::{InMemoryPageCache, LocalStorage, ManualClock, SharedPageCache};
use yatube_core::{
    CommentService, FollowingService, GroupService, MediaService, PostService, UserService,
};
use yatube_db::entities::{post, user};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

fn create_test_state(db: MockDatabase, page_cache: SharedPageCache) -> AppState {
    let db = Arc::new(db.into_connection());

    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    let storage = Arc::new(LocalStorage::new(
        std::env::temp_dir().join("yatube-router-tests"),
        "/media".to_string(),
    ));
    let media = MediaService::new(storage, 1024 * 1024);

    let post_service = PostService::new(
        post_repo.clone(),
        user_repo.clone(),
        group_repo.clone(),
        media,
    );

    AppState {
        user_service: UserService::new(user_repo.clone()),
        comment_service: CommentService::new(comment_repo, post_repo.clone(), user_repo),
        group_service: GroupService::new(group_repo),
        following_service: FollowingService::new(follow_repo, post_repo, post_service.clone()),
        post_service,
        page_cache,
        index_ttl: Duration::from_secs(20),
        secure_cookies: false,
    }
}

fn create_test_app(db: MockDatabase) -> Router {
    router(create_test_state(db, Arc::new(InMemoryPageCache::new())))
}

fn create_test_user(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        username_lower: username.to_lowercase(),
        password_hash: String::new(),
        token: Some(format!("token-{id}")),
        name: None,
        created_at: Utc::now().into(),
    }
}

fn create_test_post(id: &str, author_id: &str, text: &str) -> post::Model {
    post::Model {
        id: id.to_string(),
        text: text.to_string(),
        pub_date: Utc::now().into(),
        author_id: author_id.to_string(),
        group_id: None,
        image: None,
    }
}

fn count_row(n: i64) -> Vec<std::collections::BTreeMap<&'static str, Value>> {
    vec![btreemap! { "num_items" => Value::BigInt(Some(n)) }]
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, user: &user::Model) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", user.token.as_deref().unwrap()),
        )
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: Response<Body>) -> Json {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_unknown_route_renders_404_page() {
    let app = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app.oneshot(get("/a/b/c/d")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["template"], "posts/misc/404.html");
    assert_eq!(body["context"]["path"], "/a/b/c/d");
}

#[tokio::test]
async fn test_unknown_user_profile_is_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_app(db);

    let response = app.oneshot(get("/ghost/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["context"]["path"], "/ghost/");
}

#[tokio::test]
async fn test_anonymous_new_post_redirects_to_login() {
    let app = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app.oneshot(get("/new/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/?next=/new/");
}

#[tokio::test]
async fn test_anonymous_follow_feed_redirects_to_login() {
    let app = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app.oneshot(get("/follow/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/?next=/follow/");
}

#[tokio::test]
async fn test_self_follow_redirects_to_profile() {
    let leo = create_test_user("u1", "leo");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // session lookup, then the profile being followed
        .append_query_results([vec![leo.clone()], vec![leo.clone()]]);
    let app = create_test_app(db);

    let response = app.oneshot(get_as("/leo/follow", &leo)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/leo/");
}

#[tokio::test]
async fn test_non_author_edit_redirects_to_post() {
    let leo = create_test_user("u1", "leo");
    let bob = create_test_user("u2", "bob");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![bob.clone()], vec![leo.clone()]])
        .append_query_results([vec![create_test_post("p1", "u1", "original")]]);
    let app = create_test_app(db);

    let response = app.oneshot(get_as("/leo/p1/edit/", &bob)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/leo/p1/");
}

#[tokio::test]
async fn test_non_author_edit_submit_redirects_to_post() {
    let leo = create_test_user("u1", "leo");
    let bob = create_test_user("u2", "bob");
    // No rows for an UPDATE: reaching one would fail the request.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![bob.clone()], vec![leo.clone()]])
        .append_query_results([vec![create_test_post("p1", "u1", "original")]]);
    let app = create_test_app(db);

    let body = "--X\r\n\
        Content-Disposition: form-data; name=\"text\"\r\n\r\n\
        hijacked\r\n\
        --X--\r\n";
    let request = Request::builder()
        .method("POST")
        .uri("/leo/p1/edit/")
        .header(header::AUTHORIZATION, "Bearer token-u2")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=X")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/leo/p1/");
}

#[tokio::test]
async fn test_blank_comment_still_redirects_to_post() {
    let leo = create_test_user("u1", "leo");
    let bob = create_test_user("u2", "bob");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![bob.clone()], vec![leo.clone()]])
        .append_query_results([vec![create_test_post("p1", "u1", "original")]]);
    let app = create_test_app(db);

    let request = Request::builder()
        .method("POST")
        .uri("/leo/p1/comment")
        .header(header::AUTHORIZATION, "Bearer token-u2")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("text=+++"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/leo/p1/");
}

#[tokio::test]
async fn test_index_is_cached_until_ttl() {
    let leo = create_test_user("u1", "leo");
    let first = create_test_post("p1", "u1", "first post");
    let second = create_test_post("p2", "u1", "second post");

    // Only two renders are backed by rows; a third database hit would fail.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([count_row(1)])
        .append_query_results([vec![first.clone()]])
        .append_query_results([vec![leo.clone()]])
        .append_query_results([count_row(2)])
        .append_query_results([vec![second.clone(), first.clone()]])
        .append_query_results([vec![leo.clone()]]);

    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(InMemoryPageCache::with_clock(clock.clone()));
    let app = router(create_test_state(db, cache));

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rendered = json_body(response).await;
    assert_eq!(rendered["template"], "index.html");
    assert_eq!(rendered["context"]["page"]["total_items"], 1);

    // A post written now stays invisible while the entry is fresh.
    clock.advance(Duration::from_secs(19));
    let cached = json_body(app.clone().oneshot(get("/")).await.unwrap()).await;
    assert_eq!(cached, rendered);

    clock.advance(Duration::from_secs(1));
    let refreshed = json_body(app.oneshot(get("/")).await.unwrap()).await;
    assert_eq!(refreshed["context"]["page"]["total_items"], 2);
    assert_eq!(
        refreshed["context"]["page"]["items"][0]["text"],
        "second post"
    );
}

#[tokio::test]
async fn test_out_of_range_index_page_is_not_cached() {
    let leo = create_test_user("u1", "leo");
    let first = create_test_post("p1", "u1", "first post");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([count_row(1)])
        .append_query_results([vec![first.clone()]])
        .append_query_results([vec![leo.clone()]])
        .append_query_results([count_row(1)])
        .append_query_results([vec![first.clone()]])
        .append_query_results([vec![leo.clone()]]);

    let cache = Arc::new(InMemoryPageCache::new());
    let app = router(create_test_state(db, cache.clone()));

    let response = app.clone().oneshot(get("/?page=999999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["context"]["page"]["number"], 1);
    assert!(cache.is_empty().await);

    let response = app.oneshot(get("/?page=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_login_page_keeps_next() {
    let app = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(get("/auth/login/?next=/follow/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["template"], "auth/login.html");
    assert_eq!(body["context"]["form"]["next"], "/follow/");
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    // The stale token resolves to nobody.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_app(db);

    let request = Request::builder()
        .uri("/auth/logout/")
        .header(header::COOKIE, "yatube_session=stale")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("yatube_session="));
    assert!(cookie.contains("Max-Age=0"));
}
