use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

/// Insert a user row; profiles can only be created for users that exist
pub async fn insert_user(pool: &PgPool, name: &str, email: &str) -> Result<User, DatabaseError> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email)
        VALUES ($1, $2)
        RETURNING id, name, email, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Email already registered", "User does not exist"))
}

pub async fn find_user(pool: &PgPool, id: i32) -> Result<User, DatabaseError> {
    sqlx::query_as::<_, User>("SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))
}
