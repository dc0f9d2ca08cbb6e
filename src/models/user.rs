// src/models/user.rs

use serde::Serialize;
use sqlx::FromRow;
use validator::Validate;

/// The MIME type `check_id` is willing to serve back.
pub const PDF_MIME: &str = "application/pdf";

/// Represents the 'user' table without its identity document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub enrollment_no: Option<String>,
    pub faculty_no: Option<String>,

    /// Declared content type of the identity document.
    pub id_proof_mime: Option<String>,

    /// Set by an administrator; unverified users cannot log in.
    pub is_verified: bool,

    pub created_at: chrono::NaiveDateTime,
}

/// Identity document as stored at registration.
#[derive(Debug, FromRow)]
pub struct IdProof {
    pub name: String,
    pub id_proof: Vec<u8>,
    pub id_proof_mime: Option<String>,
}

impl IdProof {
    /// Only non-empty documents declared as PDF are ever served.
    pub fn is_servable(&self) -> bool {
        !self.id_proof.is_empty() && self.id_proof_mime.as_deref() == Some(PDF_MIME)
    }

    pub fn download_name(&self) -> String {
        let safe: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{}_ID_proof.pdf", safe)
    }
}

/// Registration form fields (the document travels separately).
#[derive(Debug, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(max = 10, message = "Enrollment number is at most 10 characters."))]
    pub enrollment_no: Option<String>,
    #[validate(length(max = 10, message = "Faculty number is at most 10 characters."))]
    pub faculty_no: Option<String>,
}
