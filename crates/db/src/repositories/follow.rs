//! Follow repository.

use std::sync::Arc;

use crate::entities::{Follow, follow};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    sea_query::OnConflict,
};
use yatube_common::{AppError, AppResult};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the edge from `user_id` to `author_id`.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        author_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `user_id` follows `author_id`.
    pub async fn is_following(&self, user_id: &str, author_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(user_id, author_id).await?.is_some())
    }

    /// Insert an edge.
    ///
    /// Fails with [`AppError::Conflict`] when the pair was already present,
    /// including when a concurrent request inserted it first.
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<()> {
        let inserted = Follow::insert(model)
            .on_conflict(
                OnConflict::columns([follow::Column::UserId, follow::Column::AuthorId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if inserted == 0 {
            return Err(AppError::Conflict("Follow edge already exists".to_string()));
        }
        Ok(())
    }

    /// Delete the edge from `user_id` to `author_id`. Returns whether one existed.
    pub async fn delete_by_pair(&self, user_id: &str, author_id: &str) -> AppResult<bool> {
        let result = Follow::delete_many()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Count users following `author_id`.
    pub async fn count_followers(&self, author_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count authors `user_id` follows.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_follow(id: &str, user_id: &str, author_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn new_edge(user_id: &str, author_id: &str) -> follow::ActiveModel {
        follow::ActiveModel {
            id: Set("f1".to_string()),
            user_id: Set(user_id.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(Utc::now().into()),
        }
    }

    #[tokio::test]
    async fn test_is_following() {
        let edge = create_test_follow("f1", "u1", "u2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert!(repo.is_following("u1", "u2").await.unwrap());
        assert!(!repo.is_following("u1", "u3").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_reports_existing_pair_as_conflict() {
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

        let repo = FollowRepository::new(db.clone());
        repo.create(new_edge("u1", "u2")).await.unwrap();
        let again = repo.create(new_edge("u1", "u2")).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));

        drop(repo);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        assert!(log[0].statements()[0].sql.contains("ON CONFLICT"));
    }

    #[tokio::test]
    async fn test_delete_by_pair() {
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

        let repo = FollowRepository::new(db);
        assert!(repo.delete_by_pair("u1", "u2").await.unwrap());
        assert!(!repo.delete_by_pair("u1", "u2").await.unwrap());
    }

    #[tokio::test]
    async fn test_counts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(4)),
                }]])
                .append_query_results([[btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2)),
                }]])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert_eq!(repo.count_followers("u1").await.unwrap(), 4);
        assert_eq!(repo.count_following("u1").await.unwrap(), 2);
    }
}
