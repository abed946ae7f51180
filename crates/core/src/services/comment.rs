//! Comments on posts.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository, UserRepository},
};

use super::post::AuthorSummary;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Fields of the comment form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub text: String,
}

/// A comment with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub id: String,
    pub text: String,
    pub created: DateTime<FixedOffset>,
    pub author: AuthorSummary,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Attach a comment by `actor` to a post.
    pub async fn add_comment(
        &self,
        actor: &user::Model,
        post_id: &str,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        if input.text.trim().is_empty() {
            return Err(AppError::field("text", "This field is required."));
        }

        if self.post_repo.find_by_id(post_id).await?.is_none() {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(input.text),
            created: Set(chrono::Utc::now().into()),
            post_id: Set(post_id.to_string()),
            author_id: Set(actor.id.clone()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %comment.id, post_id = %post_id, "Comment added");
        Ok(comment)
    }

    /// Comments on a post, newest first.
    pub async fn list_comments(&self, post_id: &str) -> AppResult<Vec<CommentView>> {
        let comments = self.comment_repo.find_by_post(post_id).await?;

        let author_ids: Vec<String> = comments
            .iter()
            .map(|c| c.author_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(comments
            .into_iter()
            .filter_map(|c| {
                let author = authors.get(&c.author_id)?;
                Some(CommentView {
                    id: c.id,
                    text: c.text,
                    created: c.created,
                    author: author.into(),
                })
            })
            .collect())
    }
}
