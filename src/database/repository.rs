use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProfile, Profile};

/// Storage operations behind the profile handlers
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profiles(&self) -> Result<Vec<Profile>, DatabaseError>;
    async fn get_profile(&self, id: i32) -> Result<Profile, DatabaseError>;
    async fn get_profile_by_user(&self, user_id: i32) -> Result<Profile, DatabaseError>;
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, DatabaseError>;
    async fn update_profile(&self, profile: Profile) -> Result<Profile, DatabaseError>;
    async fn delete_profile(&self, profile: Profile) -> Result<Profile, DatabaseError>;
    async fn ping(&self) -> Result<(), DatabaseError>;
}

const SELECT_PROFILE: &str = r#"
    SELECT p.id, p.phone, p.address, p.city, p.postal_code, p.image, p.user_id,
           p.created_at, p.updated_at,
           u.name AS user_name, u.email AS user_email
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

const PROFILE_CONFLICT: &str = "User already has a profile";
const PROFILE_USER_MISSING: &str = "User does not exist";

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_404(&self, filter: &str, value: i32) -> Result<Profile, DatabaseError> {
        let sql = format!("{} WHERE {} = $1", SELECT_PROFILE, filter);
        match sqlx::query_as::<_, Profile>(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await
        {
            Ok(row) => Ok(row),
            Err(sqlx::Error::RowNotFound) => Err(DatabaseError::NotFound("Profile not found".to_string())),
            Err(other) => Err(other.into()),
        }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_profiles(&self) -> Result<Vec<Profile>, DatabaseError> {
        let sql = format!("{} ORDER BY p.id", SELECT_PROFILE);
        let rows = sqlx::query_as::<_, Profile>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get_profile(&self, id: i32) -> Result<Profile, DatabaseError> {
        self.select_404("p.id", id).await
    }

    async fn get_profile_by_user(&self, user_id: i32) -> Result<Profile, DatabaseError> {
        self.select_404("p.user_id", user_id).await
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, DatabaseError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO profiles (phone, address, city, postal_code, image, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(profile.postal_code)
        .bind(&profile.image)
        .bind(profile.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, PROFILE_CONFLICT, PROFILE_USER_MISSING))?;

        tracing::debug!("Inserted profile {} for user {}", id, profile.user_id);
        self.get_profile(id).await
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET phone = $1, address = $2, city = $3, postal_code = $4, image = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(profile.postal_code)
        .bind(&profile.image)
        .bind(profile.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Profile not found".to_string()));
        }
        self.get_profile(profile.id).await
    }

    async fn delete_profile(&self, profile: Profile) -> Result<Profile, DatabaseError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(profile.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Profile not found".to_string()));
        }
        Ok(profile)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        crate::database::manager::DatabaseManager::health_check(&self.pool).await
    }
}
