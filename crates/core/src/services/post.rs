//! Posts: authoring, editing and the listings built from them.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use yatube_common::{AppError, AppResult, FormErrors, IdGenerator, Page, PageNumber};
use yatube_db::{
    entities::{group, post, user},
    repositories::{GroupRepository, PostRepository, UserRepository},
};

use super::media::{ImageUpload, MediaService};

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    media: MediaService,
    id_gen: IdGenerator,
}

/// Fields of the post form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
    pub text: String,
    /// Group ID. Empty means no group.
    #[serde(default)]
    pub group: Option<String>,
    /// Drop the current image. A newly uploaded image wins over this.
    #[serde(default)]
    pub clear_image: bool,
}

/// Author as shown next to a post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    pub id: String,
    pub username: String,
    pub display_name: String,
}

impl From<&user::Model> for AuthorSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user.display_name().to_string(),
        }
    }
}

/// Group as shown next to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
}

impl From<&group::Model> for GroupSummary {
    fn from(group: &group::Model) -> Self {
        Self {
            id: group.id.clone(),
            title: group.title.clone(),
            slug: group.slug.clone(),
        }
    }
}

/// A post with everything a page needs to show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub id: String,
    pub text: String,
    pub pub_date: DateTime<FixedOffset>,
    pub author: AuthorSummary,
    pub group: Option<GroupSummary>,
    /// Public URL of the attached image.
    pub image: Option<String>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        media: MediaService,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            media,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new post as `author`.
    pub async fn create_post(
        &self,
        author: &user::Model,
        input: PostInput,
        image: Option<ImageUpload>,
    ) -> AppResult<post::Model> {
        let group_id = self.check_form(&input, image.as_ref()).await?;

        let image_key = match &image {
            Some(upload) => Some(self.media.store(&author.id, upload).await?),
            None => None,
        };

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(input.text.trim().to_string()),
            pub_date: Set(chrono::Utc::now().into()),
            author_id: Set(author.id.clone()),
            group_id: Set(group_id),
            image: Set(image_key.clone()),
        };

        match self.post_repo.create(model).await {
            Ok(post) => {
                tracing::info!(post_id = %post.id, author_id = %author.id, "Post created");
                Ok(post)
            }
            Err(e) => {
                if let Some(key) = image_key {
                    self.media.discard(&key).await;
                }
                Err(e)
            }
        }
    }

    /// Edit a post in place. Only its author may do this.
    ///
    /// `pub_date` and the author never change. A new image replaces the old
    /// one; `clear_image` without a new image removes it.
    pub async fn edit_post(
        &self,
        actor: &user::Model,
        author_username: &str,
        post_id: &str,
        input: PostInput,
        image: Option<ImageUpload>,
    ) -> AppResult<post::Model> {
        let (_, post) = self.find_post(author_username, post_id).await?;
        if post.author_id != actor.id {
            return Err(AppError::Forbidden(format!(
                "{} is not the author of post {post_id}",
                actor.username
            )));
        }

        let group_id = self.check_form(&input, image.as_ref()).await?;

        let new_image = match &image {
            Some(upload) => Some(self.media.store(&actor.id, upload).await?),
            None => None,
        };
        let replace_image = new_image.is_some() || input.clear_image;
        let old_image = post.image.clone();

        let mut active: post::ActiveModel = post.into();
        active.text = Set(input.text.trim().to_string());
        active.group_id = Set(group_id);
        if replace_image {
            active.image = Set(new_image.clone());
        }

        let updated = match self.post_repo.update(active).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(key) = new_image {
                    self.media.discard(&key).await;
                }
                return Err(e);
            }
        };

        if replace_image && let Some(old) = old_image {
            self.media.discard(&old).await;
        }

        tracing::info!(post_id = %updated.id, "Post edited");
        Ok(updated)
    }

    /// Load a post for display. It must belong to `author_username`.
    pub async fn get_post(&self, author_username: &str, post_id: &str) -> AppResult<PostView> {
        let (author, post) = self.find_post(author_username, post_id).await?;
        let group = match &post.group_id {
            Some(id) => self.group_repo.find_by_id(id).await?,
            None => None,
        };
        Ok(self.view(post, &author, group.as_ref()))
    }

    /// Load the raw post and its author. The post must belong to that author.
    pub async fn find_post(
        &self,
        author_username: &str,
        post_id: &str,
    ) -> AppResult<(user::Model, post::Model)> {
        let author = self.user_repo.get_by_username(author_username).await?;
        let post = self
            .post_repo
            .find_by_author_and_id(&author.id, post_id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))?;
        Ok((author, post))
    }

    /// Every post, newest first.
    pub async fn global_feed(&self, page: PageNumber) -> AppResult<Page<PostView>> {
        let page = self.post_repo.find_all_page(page).await?;
        self.hydrate_page(page).await
    }

    /// An author's posts, newest first.
    pub async fn profile_posts(
        &self,
        author_id: &str,
        page: PageNumber,
    ) -> AppResult<Page<PostView>> {
        let page = self.post_repo.find_by_author_page(author_id, page).await?;
        self.hydrate_page(page).await
    }

    /// A group's posts, newest first.
    pub async fn group_posts(&self, group_id: &str, page: PageNumber) -> AppResult<Page<PostView>> {
        let page = self.post_repo.find_by_group_page(group_id, page).await?;
        self.hydrate_page(page).await
    }

    /// Number of posts written by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        self.post_repo.count_by_author(author_id).await
    }

    /// Attach authors and groups to a page of posts.
    pub async fn hydrate_page(&self, mut page: Page<post::Model>) -> AppResult<Page<PostView>> {
        let posts = std::mem::take(&mut page.items);
        let views = self.hydrate(posts).await?;
        Ok(page.with_items(views))
    }

    async fn hydrate(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostView>> {
        let author_ids: Vec<String> = posts
            .iter()
            .map(|p| p.author_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let group_ids: Vec<String> = posts
            .iter()
            .filter_map(|p| p.group_id.clone())
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
        let groups: HashMap<String, group::Model> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let Some(author) = authors.get(&post.author_id) else {
                    tracing::warn!(post_id = %post.id, "Post author missing");
                    return None;
                };
                let group = post.group_id.as_ref().and_then(|id| groups.get(id));
                Some(self.view(post, author, group))
            })
            .collect())
    }

    fn view(&self, post: post::Model, author: &user::Model, group: Option<&group::Model>) -> PostView {
        PostView {
            image: post.image.as_deref().map(|key| self.media.url(key)),
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author: author.into(),
            group: group.map(Into::into),
        }
    }

    /// Validate the post form, returning the resolved group ID.
    async fn check_form(
        &self,
        input: &PostInput,
        image: Option<&ImageUpload>,
    ) -> AppResult<Option<String>> {
        let mut errors = FormErrors::new();

        if input.text.trim().is_empty() {
            errors.add("text", "This field is required.");
        }

        let group_id = match input.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(id) => {
                if self.group_repo.find_by_id(id).await?.is_none() {
                    errors.add(
                        "group",
                        "Select a valid choice. That choice is not one of the available choices.",
                    );
                }
                Some(id.to_string())
            }
        };

        if let Some(upload) = image
            && let Err(e) = self.media.validate(upload)
        {
            errors.extend(e);
        }

        errors.into_result()?;
        Ok(group_id)
    }
}
