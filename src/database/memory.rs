use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProfile, Profile, User, UserSummary};
use crate::database::repository::ProfileRepository;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    profiles: BTreeMap<i32, Profile>,
    next_user_id: i32,
    next_profile_id: i32,
}

/// Process-local profile store with the same constraints as the PostgreSQL schema:
/// a profile must reference an existing user and each user owns at most one profile.
#[derive(Default)]
pub struct MemoryProfileRepository {
    tables: RwLock<Tables>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, name: impl Into<String>, email: impl Into<String>) -> User {
        let mut tables = self.tables.write().await;
        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            name: name.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        user
    }

    pub async fn profile_count(&self) -> usize {
        self.tables.read().await.profiles.len()
    }
}

fn not_found() -> DatabaseError {
    DatabaseError::NotFound("Profile not found".to_string())
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn find_profiles(&self) -> Result<Vec<Profile>, DatabaseError> {
        Ok(self.tables.read().await.profiles.values().cloned().collect())
    }

    async fn get_profile(&self, id: i32) -> Result<Profile, DatabaseError> {
        self.tables
            .read()
            .await
            .profiles
            .get(&id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn get_profile_by_user(&self, user_id: i32) -> Result<Profile, DatabaseError> {
        self.tables
            .read()
            .await
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, DatabaseError> {
        let mut tables = self.tables.write().await;

        let user = tables
            .users
            .get(&profile.user_id)
            .map(UserSummary::from)
            .ok_or_else(|| DatabaseError::InvalidReference("User does not exist".to_string()))?;

        if tables.profiles.values().any(|p| p.user_id == profile.user_id) {
            return Err(DatabaseError::Conflict("User already has a profile".to_string()));
        }

        tables.next_profile_id += 1;
        let now = Utc::now();
        let stored = Profile {
            id: tables.next_profile_id,
            phone: profile.phone,
            address: profile.address,
            city: profile.city,
            postal_code: profile.postal_code,
            image: profile.image,
            user_id: profile.user_id,
            user,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile, DatabaseError> {
        let mut tables = self.tables.write().await;
        let existing = tables.profiles.get_mut(&profile.id).ok_or_else(not_found)?;

        existing.phone = profile.phone;
        existing.address = profile.address;
        existing.city = profile.city;
        existing.postal_code = profile.postal_code;
        existing.image = profile.image;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_profile(&self, profile: Profile) -> Result<Profile, DatabaseError> {
        self.tables
            .write()
            .await
            .profiles
            .remove(&profile.id)
            .ok_or_else(not_found)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
