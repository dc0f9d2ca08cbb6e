// src/models/directory.rs

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::AppError, models::user_desc::DEFAULT_IMAGE_MIME};

/// One verified user joined with their description.
#[derive(Debug, FromRow)]
pub struct DirectoryRow {
    pub id: i64,
    pub name: String,
    pub enrollment_no: Option<String>,
    pub course: Option<String>,
    pub department: Option<String>,
    pub passing_year: Option<i64>,
    pub short_desc: Option<String>,
    pub user_image: Option<Vec<u8>>,
    pub user_image_mime: Option<String>,
}

impl DirectoryRow {
    fn image_mime(&self) -> String {
        self.user_image_mime
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string())
    }
}

/// Card rendered on the home page.
#[derive(Debug, Serialize)]
pub struct DirectoryCard {
    pub id: i64,
    pub name: String,
    pub course: Option<String>,
    pub department: Option<String>,
    pub passing_year: Option<i64>,
    pub short_desc: Option<String>,
    /// Base64 of the profile image, empty when there is none.
    pub user_image: String,
    pub image_mime: String,
}

impl From<DirectoryRow> for DirectoryCard {
    fn from(row: DirectoryRow) -> Self {
        let image_mime = row.image_mime();
        Self {
            id: row.id,
            name: row.name,
            course: row.course,
            department: row.department,
            passing_year: row.passing_year,
            short_desc: row.short_desc,
            user_image: encode_image(row.user_image.as_deref()),
            image_mime,
        }
    }
}

/// Card returned by `/filter_cards`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterCard {
    pub id: i64,
    pub name: String,
    pub course: Option<String>,
    pub department: Option<String>,
    pub passing_year: Option<i64>,
    pub user_image: String,
    pub image_mime: String,
}

impl From<DirectoryRow> for FilterCard {
    fn from(row: DirectoryRow) -> Self {
        let image_mime = row.image_mime();
        Self {
            id: row.id,
            name: row.name,
            course: row.course,
            department: row.department,
            passing_year: row.passing_year,
            user_image: encode_image(row.user_image.as_deref()),
            image_mime,
        }
    }
}

pub fn encode_image(image: Option<&[u8]>) -> String {
    match image {
        Some(bytes) if !bytes.is_empty() => STANDARD.encode(bytes),
        _ => String::new(),
    }
}

/// The year arrives as whatever the dropdown's `data-value` held:
/// usually a string, sometimes a number. Anything else is kept so it can be
/// refused as a bad request rather than a body the extractor rejects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YearValue {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

/// Body of `/filter_cards`. Every field is optional and "" means "any".
#[derive(Debug, Default, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub year_of_passing: Option<YearValue>,
    #[serde(default)]
    pub search_term: Option<String>,
}

/// Normalised filter predicates, ANDed together.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DirectoryFilter {
    pub department: Option<String>,
    pub course: Option<String>,
    pub passing_year: Option<i64>,
    pub search_term: Option<String>,
}

impl TryFrom<FilterRequest> for DirectoryFilter {
    type Error = AppError;

    fn try_from(req: FilterRequest) -> Result<Self, Self::Error> {
        let passing_year = match req.year_of_passing {
            None => None,
            Some(YearValue::Number(year)) => Some(year),
            Some(YearValue::Text(text)) => match text.trim() {
                "" => None,
                year => Some(year.parse::<i64>().map_err(|_| {
                    AppError::BadRequest(format!("year_of_passing '{}' is not a year", year))
                })?),
            },
            Some(YearValue::Other(serde_json::Value::Null)) => None,
            Some(YearValue::Other(other)) => {
                return Err(AppError::BadRequest(format!(
                    "year_of_passing {} is not a year",
                    other
                )));
            }
        };

        Ok(Self {
            department: non_empty(req.department),
            course: non_empty(req.course),
            passing_year,
            search_term: non_empty(req.search_term.map(|t| fold_case(t.trim()))),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Unicode lowercase, applied to both the term and the searched text.
/// SQLite's `LOWER` and `LIKE` only fold ASCII.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

impl DirectoryFilter {
    /// Case-insensitive substring match of the search term against the
    /// name or the enrollment number. No term matches everything.
    pub fn matches_search(&self, row: &DirectoryRow) -> bool {
        let Some(term) = &self.search_term else {
            return true;
        };

        fold_case(&row.name).contains(term.as_str())
            || row
                .enrollment_no
                .as_deref()
                .is_some_and(|no| fold_case(no).contains(term.as_str()))
    }
}

/// Values offered by the filter dropdowns on the home page.
#[derive(Debug, Default, Serialize)]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub courses: Vec<String>,
    pub passing_years: Vec<i64>,
}
