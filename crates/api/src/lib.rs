//! HTTP layer for yatube-rs.
//!
//! Every page handler returns either a page context (the data a template
//! renders, serialized as JSON next to the template name) or a redirect.
//!
//! - **Endpoints**: posts, profiles, follows, groups and auth pages
//! - **Extractors**: session user, login redirect, page number
//! - **Middleware**: session resolution, 404 page
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, SESSION_COOKIE};
