//! Page responses.
//!
//! A page is the name of the template that renders it plus the context the
//! template receives, serialized as `{"template": ..., "context": ...}`.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use serde_json::Value;
use yatube_common::{AppError, AppResult};

/// A rendered page or a raw, previously rendered body.
#[derive(Debug)]
pub enum PageResponse {
    /// Template plus context.
    Page {
        status: StatusCode,
        template: &'static str,
        context: Value,
    },
    /// Body served from the page cache.
    Cached(String),
}

#[derive(Serialize)]
struct Envelope<'a> {
    template: &'a str,
    context: &'a Value,
}

impl PageResponse {
    /// A 200 page.
    #[must_use]
    pub const fn page(template: &'static str, context: Value) -> Self {
        Self::Page {
            status: StatusCode::OK,
            template,
            context,
        }
    }

    /// Override the status code.
    #[must_use]
    pub fn with_status(self, status: StatusCode) -> Self {
        match self {
            Self::Page {
                template, context, ..
            } => Self::Page {
                status,
                template,
                context,
            },
            cached => cached,
        }
    }

    /// The serialized body, as stored in the page cache.
    pub fn body(&self) -> AppResult<String> {
        match self {
            Self::Page {
                template, context, ..
            } => serde_json::to_string(&Envelope { template, context })
                .map_err(|e| AppError::Internal(e.to_string())),
            Self::Cached(body) => Ok(body.clone()),
        }
    }
}

impl IntoResponse for PageResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Page {
                status,
                template,
                context,
            } => (status, Json(Envelope {
                template,
                context: &context,
            }))
                .into_response(),
            Self::Cached(body) => (
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
        }
    }
}

/// 303 redirect.
#[must_use]
pub fn redirect(to: &str) -> Response {
    Redirect::to(to).into_response()
}

/// URL of a post page.
#[must_use]
pub fn post_url(username: &str, post_id: &str) -> String {
    format!("/{username}/{post_id}/")
}

/// URL of a profile page.
#[must_use]
pub fn profile_url(username: &str) -> String {
    format!("/{username}/")
}
