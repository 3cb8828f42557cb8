use axum::extract::{Extension, Multipart, Path, State};
use validator::Validate;

use crate::api::profile::{CreateProfileRequest, ProfileResponse};
use crate::app::AppState;
use crate::database::models::ProfileChanges;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, FormData, ValidJson};
use crate::upload::ImageFile;

/// GET /api/v1/profiles - every profile with its owner
pub async fn find_profiles(State(state): State<AppState>) -> ApiResult<Vec<ProfileResponse>> {
    let profiles = state.profiles.find_profiles().await?;
    Ok(ApiResponse::success(
        profiles.into_iter().map(ProfileResponse::from).collect(),
    ))
}

/// GET /api/v1/profile/:id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProfileResponse> {
    let id = parse_id(&id)?;
    let profile = state.profiles.get_profile(id).await?;
    Ok(ApiResponse::success(profile.into()))
}

/// POST /api/v1/profile
///
/// Body is JSON; `user_id` may be left out to create the caller's own profile.
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(request): ValidJson<CreateProfileRequest>,
) -> ApiResult<ProfileResponse> {
    let new_profile = request.into_new_profile(auth.user_id);
    let profile = state.profiles.create_profile(new_profile).await?;

    tracing::info!("Created profile {} for user {}", profile.id, profile.user_id);
    Ok(ApiResponse::success(profile.into()))
}

/// PATCH /api/v1/profile
///
/// Multipart form against the caller's own profile. Empty text fields and a
/// zero postal code keep the stored value; the image is only replaced when a
/// file is attached.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    FormData(multipart): FormData,
) -> ApiResult<ProfileResponse> {
    let form = UpdateProfileForm::from_multipart(multipart).await?;
    form.validate()?;
    let mut profile = state.profiles.get_profile_by_user(auth.user_id).await?;

    let image = match form.image {
        Some(file) => {
            file.validate(state.config.upload.max_upload_bytes)?;
            let uploaded = state.uploader.upload(file).await?;
            Some(uploaded.secure_url)
        }
        None => None,
    };

    profile.apply(ProfileChanges {
        phone: form.phone,
        address: form.address,
        city: form.city,
        postal_code: form.postal_code,
        image,
    });

    let updated = state.profiles.update_profile(profile).await?;
    tracing::info!("Updated profile {} for user {}", updated.id, auth.user_id);
    Ok(ApiResponse::success(updated.into()))
}

/// DELETE /api/v1/profile/:id - returns the removed profile
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProfileResponse> {
    let id = parse_id(&id)?;
    let profile = state.profiles.get_profile(id).await?;
    let deleted = state.profiles.delete_profile(profile).await?;

    tracing::info!("Deleted profile {}", deleted.id);
    Ok(ApiResponse::success(deleted.into()))
}

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid profile id: {}", raw)))
}

/// Fields of the profile update form; blank text means "keep the stored value"
#[derive(Debug, Default, Validate)]
struct UpdateProfileForm {
    #[validate(length(max = 20, message = "Phone must be between 1 and 20 characters"))]
    phone: String,
    address: String,
    #[validate(length(max = 255, message = "City must be between 1 and 255 characters"))]
    city: String,
    postal_code: i32,
    image: Option<ImageFile>,
}

impl UpdateProfileForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            match field.name() {
                Some("phone") => form.phone = field.text().await?.trim().to_string(),
                Some("address") => form.address = field.text().await?.trim().to_string(),
                Some("city") => form.city = field.text().await?.trim().to_string(),
                Some("postal_code") => {
                    form.postal_code = parse_postal_code(&field.text().await?)?;
                }
                Some("image") => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field.bytes().await?;
                    // Browsers send a nameless empty part when no file was chosen.
                    // A named but empty file still reaches ImageFile::validate.
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    form.image = Some(ImageFile {
                        file_name: if file_name.is_empty() { "upload".to_string() } else { file_name },
                        content_type,
                        data,
                    });
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

fn parse_postal_code(raw: &str) -> Result<i32, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<i32>()
        .ok()
        .filter(|code| *code >= 0)
        .ok_or_else(|| {
            let mut field_errors = std::collections::HashMap::new();
            field_errors.insert(
                "postal_code".to_string(),
                "Postal code must be a positive number".to_string(),
            );
            ApiError::validation_error("Validation failed", Some(field_errors))
        })
}
