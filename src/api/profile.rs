use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::database::models::{NewProfile, Profile, UserSummary};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 20, message = "Phone must be between 1 and 20 characters"))]
    pub phone: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "City must be between 1 and 255 characters"))]
    pub city: String,
    #[validate(range(min = 1, message = "Postal code must be a positive number"))]
    pub postal_code: i32,
    #[serde(default)]
    #[validate(url(message = "Image must be a URL"))]
    pub image: Option<String>,
    /// Owner of the new profile; defaults to the authenticated user
    #[serde(default)]
    #[validate(range(min = 1, message = "User id must be positive"))]
    pub user_id: Option<i32>,
}

/// Surrounding whitespace never counts toward a required field
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

impl CreateProfileRequest {
    pub fn into_new_profile(self, caller_id: i32) -> NewProfile {
        NewProfile {
            phone: self.phone,
            address: self.address,
            city: self.city,
            postal_code: self.postal_code,
            image: self.image.unwrap_or_default(),
            user_id: self.user_id.unwrap_or(caller_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i32,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: i32,
    pub image: String,
    pub user_id: i32,
    pub user: UserSummary,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            phone: p.phone,
            address: p.address,
            city: p.city,
            postal_code: p.postal_code,
            image: p.image,
            user_id: p.user_id,
            user: p.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> CreateProfileRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn valid_request_defaults_owner_to_caller() {
        let req = request(json!({
            "phone": "0812", "address": "Jl. A", "city": "Depok", "postal_code": 16424
        }));
        assert!(req.validate().is_ok());

        let new_profile = req.into_new_profile(9);
        assert_eq!(new_profile.user_id, 9);
        assert_eq!(new_profile.image, "");
    }

    #[test]
    fn explicit_owner_wins() {
        let req = request(json!({
            "phone": "0812", "address": "Jl. A", "city": "Depok", "postal_code": 16424, "user_id": 3
        }));
        assert_eq!(req.into_new_profile(9).user_id, 3);
    }

    #[test]
    fn empty_fields_fail_validation() {
        let req = request(json!({
            "phone": "", "address": "", "city": "Depok", "postal_code": 0
        }));
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("address"));
        assert!(fields.contains_key("postal_code"));
        assert!(!fields.contains_key("city"));
    }

    #[test]
    fn image_must_be_url() {
        let req = request(json!({
            "phone": "1", "address": "a", "city": "c", "postal_code": 1, "image": "not a url"
        }));
        assert!(req.validate().unwrap_err().field_errors().contains_key("image"));
    }

    #[test]
    fn blank_text_is_trimmed_then_rejected() {
        let req = request(json!({
            "phone": " 0812 ", "address": "   ", "city": "  ", "postal_code": 16424
        }));
        assert_eq!(req.phone, "0812");

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("address"));
        assert!(fields.contains_key("city"));
        assert!(!fields.contains_key("phone"));
    }

    #[test]
    fn phone_longer_than_twenty_is_rejected() {
        let req = request(json!({
            "phone": "1".repeat(21), "address": "a", "city": "c", "postal_code": 1
        }));
        assert!(req.validate().unwrap_err().field_errors().contains_key("phone"));

        let req = request(json!({
            "phone": "1".repeat(20), "address": "a", "city": "c", "postal_code": 1
        }));
        assert!(req.validate().is_ok());
    }
}
