//! Follow relationships and the feed built from them.

use sea_orm::Set;
use serde::Serialize;
use yatube_common::{AppError, AppResult, IdGenerator, Page, PageNumber};
use yatube_db::{
    entities::{follow, user},
    repositories::{FollowRepository, PostRepository},
};

use super::post::{PostService, PostView};

/// Result of a follow request. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    /// A new edge was created.
    Followed,
    /// The edge already existed.
    AlreadyFollowing,
    /// Users cannot follow themselves; nothing was created.
    SelfFollow,
}

/// Follower and following counts of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    follow_repo: FollowRepository,
    post_repo: PostRepository,
    posts: PostService,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository, post_repo: PostRepository, posts: PostService) -> Self {
        Self {
            follow_repo,
            post_repo,
            posts,
            id_gen: IdGenerator::new(),
        }
    }

    /// Posts by authors `viewer` follows, newest first.
    pub async fn get_feed(
        &self,
        viewer: &user::Model,
        page: PageNumber,
    ) -> AppResult<Page<PostView>> {
        let page = self.post_repo.find_feed_page(&viewer.id, page).await?;
        self.posts.hydrate_page(page).await
    }

    /// Make `viewer` follow `author`. Repeating it changes nothing.
    pub async fn follow(
        &self,
        viewer: &user::Model,
        author: &user::Model,
    ) -> AppResult<FollowOutcome> {
        if viewer.id == author.id {
            return Ok(FollowOutcome::SelfFollow);
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(viewer.id.clone()),
            author_id: Set(author.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.follow_repo.create(model).await {
            Ok(()) => {
                tracing::info!(user_id = %viewer.id, author_id = %author.id, "Followed");
                Ok(FollowOutcome::Followed)
            }
            Err(AppError::Conflict(_)) => Ok(FollowOutcome::AlreadyFollowing),
            Err(e) => Err(e),
        }
    }

    /// Remove the edge from `viewer` to `author`, if any.
    pub async fn unfollow(&self, viewer: &user::Model, author: &user::Model) -> AppResult<bool> {
        let removed = self
            .follow_repo
            .delete_by_pair(&viewer.id, &author.id)
            .await?;
        if removed {
            tracing::info!(user_id = %viewer.id, author_id = %author.id, "Unfollowed");
        }
        Ok(removed)
    }

    /// Whether `viewer` follows `author`.
    pub async fn is_following(&self, viewer_id: &str, author_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(viewer_id, author_id).await
    }

    /// Number of users following `author_id`.
    pub async fn follower_count(&self, author_id: &str) -> AppResult<u64> {
        self.follow_repo.count_followers(author_id).await
    }

    /// Number of authors `user_id` follows.
    pub async fn following_count(&self, user_id: &str) -> AppResult<u64> {
        self.follow_repo.count_following(user_id).await
    }

    /// Both counts for a profile header.
    pub async fn counts(&self, user_id: &str) -> AppResult<FollowCounts> {
        Ok(FollowCounts {
            followers: self.follower_count(user_id).await?,
            following: self.following_count(user_id).await?,
        })
    }
}
