//! User accounts.
//!
//! ## Create / Update
//! ```text
//! UserDraft (validated)
//!      │
//!      ├── email held by another user? ──► DuplicateEmail (400)
//!      │
//!      ├── hash_password (blocking pool)
//!      │
//!      └── insert / update
//!            unique index on email fires ──► DuplicateEmail (400)
//! ```
//! The pre-check and the write are not atomic, so a concurrent request can
//! still claim the email in between. The unique index catches that case.

use chrono::Utc;
use tracing::info;

use storefront_core::password::hash_password;
use storefront_core::{CoreError, Page, PageRequest, User, UserDraft};
use storefront_db::{Database, DbError};

use crate::error::{ApiError, ApiResult};

pub async fn list(db: &Database, request: PageRequest) -> ApiResult<Page<User>> {
    Ok(db.users().find_page(request).await?)
}

pub async fn get(db: &Database, id: &str) -> ApiResult<User> {
    db.users()
        .find_by_id(id)
        .await?
        .ok_or_else(|| CoreError::UserNotFound(id.to_string()).into())
}

pub async fn get_by_username(db: &Database, username: &str) -> ApiResult<User> {
    db.users()
        .find_by_username(username)
        .await?
        .ok_or_else(|| CoreError::UsernameNotFound(username.to_string()).into())
}

pub async fn get_by_email(db: &Database, email: &str) -> ApiResult<User> {
    db.users()
        .find_by_email(email)
        .await?
        .ok_or_else(|| CoreError::EmailNotFound(email.to_string()).into())
}

pub async fn search(db: &Database, keyword: &str) -> ApiResult<Vec<User>> {
    Ok(db.users().search_username(keyword).await?)
}

pub async fn count(db: &Database) -> ApiResult<u64> {
    Ok(db.users().count().await?)
}

pub async fn create(db: &Database, draft: UserDraft) -> ApiResult<User> {
    if db.users().exists_by_email(&draft.email, None).await? {
        return Err(CoreError::DuplicateEmail(draft.email).into());
    }

    let password_hash = hash(draft.password).await?;
    let user = User::new(draft.username, draft.email, password_hash);
    db.users()
        .insert(&user)
        .await
        .map_err(|e| email_conflict(e, &user.email))?;

    info!(id = %user.id, username = %user.username, "User created");
    Ok(user)
}

pub async fn update(db: &Database, id: &str, draft: UserDraft) -> ApiResult<User> {
    let mut user = get(db, id).await?;

    if db.users().exists_by_email(&draft.email, Some(id)).await? {
        return Err(CoreError::DuplicateEmail(draft.email).into());
    }

    user.password_hash = hash(draft.password).await?;
    user.username = draft.username;
    user.email = draft.email;
    user.updated_at = Utc::now();
    db.users()
        .update(&user)
        .await
        .map_err(|e| email_conflict(e, &user.email))?;

    info!(id = %user.id, "User updated");
    Ok(user)
}

/// Fails with a constraint violation while the user still owns carts.
pub async fn delete(db: &Database, id: &str) -> ApiResult<()> {
    if !db.users().delete(id).await? {
        return Err(CoreError::UserNotFound(id.to_string()).into());
    }
    info!(id = %id, "User deleted");
    Ok(())
}

/// Reports a unique-index hit on the email column as `DuplicateEmail`.
fn email_conflict(err: DbError, email: &str) -> ApiError {
    match err {
        DbError::UniqueViolation { field, .. } if field.ends_with("email") => {
            CoreError::DuplicateEmail(email.to_string()).into()
        }
        other => other.into(),
    }
}

/// Argon2 runs on the blocking pool.
async fn hash(password: String) -> ApiResult<String> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))??;
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_db::DbConfig;

    async fn db_with_user(email: &str) -> (Database, User) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = User::new("first".into(), email.into(), "hash".into());
        db.users().insert(&user).await.unwrap();
        (db, user)
    }

    #[tokio::test]
    async fn test_insert_race_on_email_reports_duplicate_email() {
        let (db, _) = db_with_user("taken@example.com").await;

        // Skips the exists_by_email pre-check, like a request that lost the race.
        let late = User::new("second".into(), "taken@example.com".into(), "hash".into());
        let err = db
            .users()
            .insert(&late)
            .await
            .map_err(|e| email_conflict(e, &late.email))
            .unwrap_err();

        assert!(matches!(
            &err,
            ApiError::Core(CoreError::DuplicateEmail(email)) if email == "taken@example.com"
        ));
    }

    #[tokio::test]
    async fn test_update_race_on_email_reports_duplicate_email() {
        let (db, _) = db_with_user("taken@example.com").await;
        let mut other = User::new("other".into(), "free@example.com".into(), "hash".into());
        db.users().insert(&other).await.unwrap();

        other.email = "taken@example.com".into();
        let err = db
            .users()
            .update(&other)
            .await
            .map_err(|e| email_conflict(e, &other.email))
            .unwrap_err();

        assert!(matches!(err, ApiError::Core(CoreError::DuplicateEmail(_))));
    }

    #[test]
    fn test_other_constraint_errors_pass_through() {
        let err = email_conflict(DbError::duplicate("users.id", "u1"), "a@example.com");
        assert!(matches!(err, ApiError::Db(DbError::UniqueViolation { .. })));

        let err = email_conflict(
            DbError::ForeignKeyViolation { message: "fk".into() },
            "a@example.com",
        );
        assert!(matches!(err, ApiError::Db(DbError::ForeignKeyViolation { .. })));
    }
}
