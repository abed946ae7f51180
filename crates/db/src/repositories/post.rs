//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, follow, post};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, sea_query::Query,
};
use yatube_common::{AppError, AppResult, POSTS_PER_PAGE, Page, PageNumber, PageWindow};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, only if it was written by `author_id`.
    pub async fn find_by_author_and_id(
        &self,
        author_id: &str,
        id: &str,
    ) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .filter(post::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One page of every post, newest first.
    pub async fn find_all_page(&self, page: PageNumber) -> AppResult<Page<post::Model>> {
        self.fetch_page(Post::find(), page).await
    }

    /// One page of an author's posts, newest first.
    pub async fn find_by_author_page(
        &self,
        author_id: &str,
        page: PageNumber,
    ) -> AppResult<Page<post::Model>> {
        let query = Post::find().filter(post::Column::AuthorId.eq(author_id));
        self.fetch_page(query, page).await
    }

    /// One page of a group's posts, newest first.
    pub async fn find_by_group_page(
        &self,
        group_id: &str,
        page: PageNumber,
    ) -> AppResult<Page<post::Model>> {
        let query = Post::find().filter(post::Column::GroupId.eq(group_id));
        self.fetch_page(query, page).await
    }

    /// One page of posts by authors `user_id` follows, newest first.
    pub async fn find_feed_page(
        &self,
        user_id: &str,
        page: PageNumber,
    ) -> AppResult<Page<post::Model>> {
        let followed = Query::select()
            .column(follow::Column::AuthorId)
            .from(follow::Entity)
            .and_where(follow::Column::UserId.eq(user_id))
            .to_owned();

        let query = Post::find().filter(post::Column::AuthorId.in_subquery(followed));
        self.fetch_page(query, page).await
    }

    /// Count an author's posts.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the matching rows, clamp the page against that count, then load
    /// only that page.
    async fn fetch_page(
        &self,
        query: Select<Post>,
        page: PageNumber,
    ) -> AppResult<Page<post::Model>> {
        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let window = PageWindow::resolve(total, page, POSTS_PER_PAGE);
        if total == 0 {
            return Ok(Page::from_window(window, vec![]));
        }

        let items = query
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .offset(window.offset)
            .limit(window.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Page::from_window(window, items))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            text: format!("post {id}"),
            pub_date: Utc::now().into(),
            author_id: author_id.to_string(),
            group_id: None,
            image: None,
        }
    }

    fn count_row(n: i64) -> [std::collections::BTreeMap<&'static str, sea_orm::Value>; 1] {
        [btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }]
    }

    #[tokio::test]
    async fn test_find_by_author_and_id() {
        let post = create_test_post("p1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_author_and_id("u1", "p1").await.unwrap();

        assert_eq!(result.unwrap().author_id, "u1");
    }

    #[tokio::test]
    async fn test_first_page_of_twelve() {
        let posts: Vec<_> = (0..10)
            .map(|i| create_test_post(&format!("p{i}"), "u1"))
            .collect();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_row(12)])
                .append_query_results([posts])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let page = repo.find_all_page(PageNumber::FIRST).await.unwrap();

        assert_eq!(page.len(), 10);
        assert_eq!(page.num_pages, 2);
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn test_page_past_end_clamps_to_last() {
        let posts = vec![create_test_post("p10", "u1"), create_test_post("p11", "u1")];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_row(12)])
                .append_query_results([posts])
                .into_connection(),
        );

        let repo = PostRepository::new(db.clone());
        let page = repo
            .find_by_author_page("u1", PageNumber::new(7))
            .await
            .unwrap();

        assert_eq!(page.number, 2);
        assert_eq!(page.len(), 2);
        assert!(!page.has_next);

        drop(repo);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        assert!(log[1].statements()[0].sql.contains("OFFSET"));
    }

    #[tokio::test]
    async fn test_empty_feed_skips_row_query() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_row(0)])
                .into_connection(),
        );

        let repo = PostRepository::new(db.clone());
        let page = repo.find_feed_page("u1", PageNumber::FIRST).await.unwrap();

        assert!(page.is_empty());
        assert_eq!(page.num_pages, 1);

        drop(repo);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains("IN (SELECT"));
        assert!(sql.contains("\"follow\""));
    }

    #[tokio::test]
    async fn test_count_by_author() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_row(3)])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        assert_eq!(repo.count_by_author("u1").await.unwrap(), 3);
    }
}
