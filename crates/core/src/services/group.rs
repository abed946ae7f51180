//! Groups posts can be published to.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yatube_common::{
    AppError, AppResult, IdGenerator, slug::with_suffix, slugify, validate_form,
};
use yatube_db::{entities::group, repositories::GroupRepository};

/// Slug candidates tried before giving up on a title.
const MAX_SLUG_ATTEMPTS: u32 = 100;

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

/// Input for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Explicit slug. Generated from the title when absent.
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a group, deriving a unique slug from the title when none is given.
    pub async fn create_group(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        let input = validate_form(input)?;

        let slug = match input.slug {
            Some(slug) => {
                let normalized = slugify(&slug);
                if normalized != slug {
                    return Err(AppError::field(
                        "slug",
                        "Enter a valid slug consisting of lowercase letters, numbers or hyphens.",
                    ));
                }
                if self.group_repo.slug_exists(&slug).await? {
                    return Err(AppError::field("slug", "Group with this slug already exists."));
                }
                slug
            }
            None => self.unique_slug(&input.title).await?,
        };

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(slug),
            description: Set(input.description),
        };

        let group = self.group_repo.create(model).await?;
        tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");
        Ok(group)
    }

    /// Find a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::GroupNotFound(slug.to_string()))
    }

    /// All groups, ordered by title.
    pub async fn list_groups(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    /// Delete a group. Its posts stay, detached from any group.
    pub async fn delete_group(&self, id: &str) -> AppResult<()> {
        if !self.group_repo.delete(id).await? {
            return Err(AppError::GroupNotFound(id.to_string()));
        }
        tracing::info!(group_id = %id, "Group deleted");
        Ok(())
    }

    async fn unique_slug(&self, title: &str) -> AppResult<String> {
        let base = match slugify(title) {
            s if s.is_empty() => "group".to_string(),
            s => s,
        };

        if !self.group_repo.slug_exists(&base).await? {
            return Ok(base);
        }
        for n in 2..=MAX_SLUG_ATTEMPTS {
            let candidate = with_suffix(&base, n);
            if !self.group_repo.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(AppError::field("slug", "Could not generate a unique slug."))
    }
}
