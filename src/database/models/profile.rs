use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use super::user::UserSummary;

/// A stored profile together with the user that owns it.
///
/// Rows are read with the owner joined in (`user_name`, `user_email`), so a
/// profile is never handed out without its `user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i32,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: i32,
    pub image: String,
    pub user_id: i32,
    pub user: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Profile {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let user_id: i32 = row.try_get("user_id")?;
        Ok(Self {
            id: row.try_get("id")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            postal_code: row.try_get("postal_code")?,
            image: row.try_get("image")?,
            user_id,
            user: UserSummary {
                id: user_id,
                name: row.try_get("user_name")?,
                email: row.try_get("user_email")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Fields accepted when a profile is first created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: i32,
    pub image: String,
    pub user_id: i32,
}

/// Incoming changes for an existing profile. Empty strings, zero postal codes
/// and a missing image leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: i32,
    pub image: Option<String>,
}

impl Profile {
    /// Overwrite only the fields that carry a value
    pub fn apply(&mut self, changes: ProfileChanges) {
        if !changes.phone.is_empty() {
            self.phone = changes.phone;
        }
        if !changes.address.is_empty() {
            self.address = changes.address;
        }
        if !changes.city.is_empty() {
            self.city = changes.city;
        }
        if changes.postal_code != 0 {
            self.postal_code = changes.postal_code;
        }
        if let Some(image) = changes.image {
            self.image = image;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        let now = Utc::now();
        Profile {
            id: 1,
            phone: "0811".to_string(),
            address: "Jl. Merdeka 1".to_string(),
            city: "Jakarta".to_string(),
            postal_code: 10110,
            image: "https://img/old.png".to_string(),
            user_id: 7,
            user: UserSummary {
                id: 7,
                name: "Ayu".to_string(),
                email: "ayu@example.com".to_string(),
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_changes_leave_profile_untouched() {
        let original = sample();
        let mut profile = original.clone();
        profile.apply(ProfileChanges::default());
        assert_eq!(profile, original);
    }

    #[test]
    fn non_empty_fields_overwrite() {
        let mut profile = sample();
        profile.apply(ProfileChanges {
            address: "Jl. Sudirman 5".to_string(),
            postal_code: 40111,
            ..Default::default()
        });

        assert_eq!(profile.address, "Jl. Sudirman 5");
        assert_eq!(profile.postal_code, 40111);
        assert_eq!(profile.city, "Jakarta");
        assert_eq!(profile.phone, "0811");
        assert_eq!(profile.image, "https://img/old.png");
    }

    #[test]
    fn image_replaced_only_when_uploaded() {
        let mut profile = sample();
        profile.apply(ProfileChanges {
            image: Some("https://img/new.png".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.image, "https://img/new.png");
    }
}
