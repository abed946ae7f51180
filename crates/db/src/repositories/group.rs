//! Group repository.

use std::sync::Arc;

use crate::entities::{Group, group};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use yatube_common::{AppError, AppResult};

/// Group repository for database operations.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<group::Model>> {
        Group::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find groups by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<group::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Group::find()
            .filter(group::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a group by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<group::Model>> {
        Group::find()
            .filter(group::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a slug is already used.
    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        let count = Group::find()
            .filter(group::Column::Slug.eq(slug))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// All groups, ordered by title.
    pub async fn find_all(&self) -> AppResult<Vec<group::Model>> {
        Group::find()
            .order_by_asc(group::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new group.
    pub async fn create(&self, model: group::ActiveModel) -> AppResult<group::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a group. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Group::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_group(id: &str, title: &str, slug: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let group = create_test_group("g1", "Cats", "cats");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[group.clone()]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.find_by_slug("cats").await.unwrap();

        assert_eq!(result.unwrap().id, "g1");
    }

    #[tokio::test]
    async fn test_slug_exists() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1)),
                }]])
                .append_query_results([[btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0)),
                }]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        assert!(repo.slug_exists("cats").await.unwrap());
        assert!(!repo.slug_exists("dogs").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_group("g1", "Cats", "cats"),
                    create_test_group("g2", "Dogs", "dogs"),
                ]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let groups = repo.find_all().await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].title, "Cats");
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        assert!(repo.delete("g1").await.unwrap());
        assert!(!repo.delete("g1").await.unwrap());
    }
}
