//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod following;
pub mod group;
pub mod media;
pub mod post;
pub mod user;

pub use comment::{CommentInput, CommentService, CommentView};
pub use following::{FollowCounts, FollowOutcome, FollowingService};
pub use group::{CreateGroupInput, GroupService};
pub use media::{ImageInfo, ImageUpload, MediaService, validate_image};
pub use post::{AuthorSummary, GroupSummary, PostInput, PostService, PostView};
pub use user::{LoginInput, SignupInput, UserService};
