// src/models/user_desc.rs

use serde::Serialize;
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Fallback when an image was stored without a content type.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Represents the 'user_desc' table: the optional profile of one user.
/// `id` is also the owning user's id.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct UserDesc {
    pub id: i64,
    pub short_desc: Option<String>,
    pub detail_desc: Option<String>,
    pub passing_year: Option<i64>,

    /// Raw image bytes; pages receive them base64-encoded instead.
    #[serde(skip)]
    pub user_image: Option<Vec<u8>>,
    pub user_image_mime: Option<String>,

    pub department: Option<String>,
    pub course: Option<String>,
    pub social1: Option<String>,
    pub social2: Option<String>,
    pub social3: Option<String>,
    pub social4: Option<String>,
}

impl UserDesc {
    pub fn has_image(&self) -> bool {
        self.user_image.as_ref().is_some_and(|img| !img.is_empty())
    }

    pub fn image_mime(&self) -> &str {
        self.user_image_mime.as_deref().unwrap_or(DEFAULT_IMAGE_MIME)
    }

    pub fn socials(&self) -> Vec<&str> {
        [&self.social1, &self.social2, &self.social3, &self.social4]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Profile form fields. The image travels separately.
#[derive(Debug, Validate)]
pub struct ProfileUpload {
    #[validate(length(max = 250, message = "Short description is at most 250 characters."))]
    pub short_desc: Option<String>,
    pub detail_desc: Option<String>,
    #[validate(range(min = 1900, max = 2200, message = "Passing year looks wrong."))]
    pub passing_year: Option<i64>,
    #[validate(length(max = 20, message = "Department is at most 20 characters."))]
    pub department: Option<String>,
    #[validate(length(max = 20, message = "Course is at most 20 characters."))]
    pub course: Option<String>,
    #[validate(length(max = 150), custom(function = validate_social_link))]
    pub social1: Option<String>,
    #[validate(length(max = 150), custom(function = validate_social_link))]
    pub social2: Option<String>,
    #[validate(length(max = 150), custom(function = validate_social_link))]
    pub social3: Option<String>,
    #[validate(length(max = 150), custom(function = validate_social_link))]
    pub social4: Option<String>,
}

/// Social links are rendered as anchors, so only web URLs are accepted.
fn validate_social_link(link: &str) -> Result<(), validator::ValidationError> {
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_url")
            .with_message("Social links must be full http(s) URLs.".into())),
    }
}
