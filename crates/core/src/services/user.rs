//! User accounts and sessions.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yatube_common::{AppError, AppResult, FormErrors, IdGenerator, validate_form};
use yatube_db::{entities::user, repositories::UserRepository};

static USERNAME_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.@+\-]+$"));

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Signup form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub name: Option<String>,
}

/// Login form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a user and open a session for them.
    pub async fn signup(&self, input: SignupInput) -> AppResult<user::Model> {
        let input = validate_form(input)?;
        check_username(&input.username)?;

        if self.user_repo.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::field(
                "username",
                "A user with that username already exists.",
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let name = input.name.filter(|n| !n.trim().is_empty());

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            password_hash: Set(password_hash),
            token: Set(Some(self.id_gen.generate_token())),
            name: Set(name),
            created_at: Set(chrono::Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
        Ok(user)
    }

    /// Check credentials and issue a fresh session token.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        let input = validate_form(input)?;

        let Some(user) = self.user_repo.find_by_username(&input.username).await? else {
            return Err(AppError::Unauthorized);
        };
        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        let user = self.user_repo.update(active).await?;

        tracing::debug!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// End the user's session.
    pub async fn logout(&self, user: &user::Model) -> AppResult<()> {
        let mut active: user::ActiveModel = user.clone().into();
        active.token = Set(None);
        self.user_repo.update(active).await?;
        Ok(())
    }

    /// Resolve a session token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Look up a user by username, ignoring case.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }
}

fn check_username(username: &str) -> Result<(), FormErrors> {
    let re = USERNAME_RE
        .as_ref()
        .map_err(|_| FormErrors::single("username", "Enter a valid username."))?;
    if re.is_match(username) {
        Ok(())
    } else {
        Err(FormErrors::single(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str, password: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            password_hash: hash_password(password).unwrap(),
            token: Some("old_token".to_string()),
            name: None,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db.into_connection())))
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_check_username() {
        assert!(check_username("leo.tolstoy+1@ya_ru-x").is_ok());
        assert!(check_username("has space").is_err());
        assert!(check_username("кириллица").is_err());
    }

    #[tokio::test]
    async fn test_signup_rejects_short_password() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = svc
            .signup(SignupInput {
                username: "leo".to_string(),
                password: "short".to_string(),
                name: None,
            })
            .await;

        match result {
            Err(AppError::Validation(errors)) => assert!(errors.has("password")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_username() {
        let existing = create_test_user("u1", "Leo", "password123");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = svc
            .signup(SignupInput {
                username: "leo".to_string(),
                password: "password123".to_string(),
                name: None,
            })
            .await;

        match result {
            Err(AppError::Validation(errors)) => assert!(errors.has("username")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_user_with_token() {
        let created = create_test_user("u1", "leo", "password123");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
        );

        let user = svc
            .signup(SignupInput {
                username: "leo".to_string(),
                password: "password123".to_string(),
                name: Some("  ".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(user.username, "leo");
        assert!(user.token.is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let existing = create_test_user("u1", "leo", "password123");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = svc
            .login(LoginInput {
                username: "leo".to_string(),
                password: "nope-nope".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_rotates_token() {
        let existing = create_test_user("u1", "leo", "password123");
        let mut rotated = existing.clone();
        rotated.token = Some("new_token".to_string());

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[rotated]]),
        );

        let user = svc
            .login(LoginInput {
                username: "LEO".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.token.as_deref(), Some("new_token"));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = svc.authenticate_by_token("missing").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
