//! Common utilities and shared types for yatube-rs.
//!
//! This crate provides foundational components used across all yatube-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Forms**: Typed validation results via [`validate_form`] and [`FormErrors`]
//! - **ID Generation**: ULID-based identifiers via [`IdGenerator`]
//! - **Pagination**: Clamped, 1-indexed pages via [`paginate`] and [`PageWindow`]
//! - **Page cache**: TTL cache for rendered pages via [`PageCache`]
//! - **Slugs**: URL-safe group identifiers via [`slugify`]
//! - **Storage**: File storage for post images
//!
//! # Example
//!
//! ```no_run
//! use yatube_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} -> {}", config.server.url, id_gen.generate());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod form;
pub mod id;
pub mod pagination;
pub mod slug;
pub mod storage;

pub use cache::{
    CacheKey, Clock, InMemoryPageCache, ManualClock, PageCache, RedisPageCache, SharedPageCache,
    SystemClock,
};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use form::{FieldError, FormErrors, validate_form};
pub use id::IdGenerator;
pub use pagination::{POSTS_PER_PAGE, Page, PageNumber, PageWindow, paginate, paginate_by};
pub use slug::slugify;
pub use storage::{LocalStorage, StorageBackend, UploadedFile, generate_storage_key};
