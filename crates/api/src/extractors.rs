//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use yatube_common::PageNumber;
use yatube_db::entities::user;

/// Where anonymous visitors are sent when a page needs a session.
pub const LOGIN_URL: &str = "/auth/login/";

/// Logged-in user. Anonymous requests are redirected to the login page.
#[derive(Debug, Clone)]
pub struct SessionUser(pub user::Model);

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware.
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(SessionUser)
            .ok_or_else(|| Redirect::to(&login_redirect(parts)).into_response())
    }
}

/// Login URL that brings the visitor back to the current page afterwards.
fn login_redirect(parts: &Parts) -> String {
    let target = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());
    let next = urlencoding::encode(&target).replace("%2F", "/");
    format!("{LOGIN_URL}?next={next}")
}

/// The logged-in user, if any.
#[derive(Debug, Clone)]
pub struct MaybeSessionUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeSessionUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<String>,
}

/// The `?page=` parameter. Missing or malformed values mean page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParam(pub PageNumber);

impl<S> FromRequestParts<S> for PageParam
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = Query::<PageQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.page);
        Ok(Self(PageNumber::parse(raw.as_deref())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode, header};

    fn parts(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_anonymous_is_sent_to_login_with_next() {
        let mut parts = parts("/new/");
        let rejection = SessionUser::from_request_parts(&mut parts, &()).await.unwrap_err();

        assert_eq!(rejection.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            rejection.headers()[header::LOCATION],
            "/auth/login/?next=/new/"
        );
    }

    #[tokio::test]
    async fn test_next_keeps_query_encoded() {
        let mut parts = parts("/follow/?page=2");
        let rejection = SessionUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(
            rejection.headers()[header::LOCATION],
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }

    #[tokio::test]
    async fn test_page_param() {
        for (uri, expected) in [
            ("/", 1),
            ("/?page=3", 3),
            ("/?page=abc", 1),
            ("/?page=", 1),
            ("/?page=-2", -2),
        ] {
            let mut parts = parts(uri);
            let PageParam(page) = PageParam::from_request_parts(&mut parts, &()).await.unwrap();
            assert_eq!(page.get(), expected, "{uri}");
        }
    }
}
