//! PostgreSQL implementation of UserRepository.
//!
//! Persists User accounts to PostgreSQL. The unique index on email is the
//! final authority on duplicates; the handler's pre-check only makes the
//! common case fast.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode, Role, Timestamp, UserId};
use crate::domain::user::User;
use crate::ports::UserRepository;

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, name, password_hash, role, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email())
        .bind(user.name())
        .bind(user.password_hash())
        .bind(user.role().as_str())
        .bind(user.created_at().as_datetime())
        .bind(user.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::DuplicateEmail,
                    format!("User already exists with email: {}", user.email()),
                )
            } else {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to insert user: {}", e),
                )
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch user: {}", e),
            )
        })?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch user by email: {}", e),
            )
        })?;

        row.map(row_to_user).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to check email existence: {}", e),
                )
            })?;

        Ok(result.0 > 0)
    }

    async fn list_all(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list users: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_user).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Postgres error class 23505 is unique_violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

fn row_to_user(row: sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Failed to get id: {}", e))
    })?;

    let email: String = row.try_get("email").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get email: {}", e),
        )
    })?;

    let name: String = row.try_get("name").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get name: {}", e),
        )
    })?;

    let password_hash: String = row.try_get("password_hash").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get password_hash: {}", e),
        )
    })?;

    let role_str: String = row.try_get("role").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get role: {}", e),
        )
    })?;
    let role = Role::from_str(&role_str).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid role in database: {}", e),
        )
    })?;

    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get created_at: {}", e),
        )
    })?;

    let updated_at: chrono::DateTime<chrono::Utc> = row.try_get("updated_at").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get updated_at: {}", e),
        )
    })?;

    Ok(User::from_storage(
        UserId::from_uuid(id),
        email,
        name,
        password_hash,
        role,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
