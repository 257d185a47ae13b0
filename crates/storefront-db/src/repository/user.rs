//! # User Repository
//!
//! Database operations for users.
//!
//! Email uniqueness is enforced twice: the service checks
//! [`UserRepository::exists_by_email`] first to produce a friendly
//! "already in use" error, and the `UNIQUE` index on `users.email` catches
//! the concurrent-insert race.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use storefront_core::{Page, PageRequest, User};

use crate::error::{DbError, DbResult};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Returns every user in insertion order.
    pub async fn find_all(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Returns one page of users in insertion order.
    pub async fn find_page(&self, request: PageRequest) -> DbResult<Page<User>> {
        let total = self.count().await?;
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY rowid LIMIT ?1 OFFSET ?2"
        ))
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(users, request, total))
    }

    /// Gets a user by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<User>> {
        self.find_one("id", id).await
    }

    /// Gets the first user with this exact username.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        self.find_one("username", username).await
    }

    /// Gets the user with this exact email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_one(&self, column: &'static str, value: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1 ORDER BY rowid LIMIT 1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Case-insensitive substring search on username.
    pub async fn search_username(&self, keyword: &str) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE instr(lower(username), lower(?1)) > 0
            ORDER BY rowid
            "#
        ))
        .bind(keyword)
        .fetch_all(&self.pool)
        .await?;

        debug!(keyword = %keyword, count = users.len(), "Searched users");
        Ok(users)
    }

    /// Whether another user already holds `email`.
    ///
    /// ## Arguments
    /// * `excluding` - user id to ignore (the user being updated)
    pub async fn exists_by_email(&self, email: &str, excluding: Option<&str>) -> DbResult<bool> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND (?2 IS NULL OR id <> ?2))",
        )
        .bind(email)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists != 0)
    }

    /// Counts all users.
    pub async fn count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Inserts a new user.
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_on(&mut conn, user).await?;
        debug!(id = %user.id, username = %user.username, "Inserted user");
        Ok(())
    }

    /// Inserts many users in one transaction (seed import).
    pub async fn insert_all(&self, users: &[User]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for user in users {
            insert_on(&mut tx, user).await?;
        }
        tx.commit().await?;
        Ok(users.len())
    }

    /// Updates username, email and password hash.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no user with this id
    /// * `DbError::UniqueViolation` - email taken by another user
    pub async fn update(&self, user: &User) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = ?2,
                email = ?3,
                password_hash = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", &user.id));
        }
        Ok(())
    }

    /// Deletes a user.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - the user still owns carts
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(id = %id, deleted = result.rows_affected(), "Deleted user");
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_on(conn: &mut SqliteConnection, user: &User) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } if field.ends_with("email") => {
            DbError::duplicate(field, user.email.clone())
        }
        other => other,
    })?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
