// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::page,
    models::user::{IdProof, PDF_MIME, User},
    templates::Templates,
    utils::{
        flash::{self, Level},
        jwt::Principal,
    },
};

const DASHBOARD: &str = "/admindashboard";

fn user_not_found(jar: CookieJar) -> Response {
    flash::redirect(jar, Level::Danger, "User not found", DASHBOARD)
}

/// Lists users waiting for verification, oldest first.
/// Admin only.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    State(templates): State<Arc<Templates>>,
    principal: Principal,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, enrollment_no, faculty_no,
               id_proof_mime, is_verified, created_at
        FROM user
        WHERE is_verified = 0
        ORDER BY id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list unverified users: {:?}", e);
        AppError::Database(e)
    })?;

    page(&templates, jar, principal, "dashboard", json!({ "users": users }))
}

/// Marks a user as verified. Verifying twice is harmless.
/// Admin only.
pub async fn verify_user(
    State(pool): State<SqlitePool>,
    jar: CookieJar,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let name = sqlx::query_scalar::<_, String>(
        "UPDATE user SET is_verified = 1 WHERE id = ? RETURNING name",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?;

    let Some(name) = name else {
        return Ok(user_not_found(jar));
    };

    tracing::info!(user_id, "User verified");
    Ok(flash::redirect(
        jar,
        Level::Success,
        format!("User {} has been verified.", name),
        DASHBOARD,
    ))
}

/// Deletes a user and their profile description.
/// Admin only.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    jar: CookieJar,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let mut tx = pool.begin().await?;

    let name = sqlx::query_scalar::<_, String>("SELECT name FROM user WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(name) = name else {
        return Ok(user_not_found(jar));
    };

    sqlx::query("DELETE FROM user_desc WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM user WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id, "User deleted");
    Ok(flash::redirect(
        jar,
        Level::Success,
        format!("User {} has been deleted.", name),
        DASHBOARD,
    ))
}

/// Streams a user's identity document back, inline.
///
/// Anything not stored as `application/pdf` is refused with a warning so
/// arbitrary uploaded bytes are never served.
/// Admin only.
pub async fn check_id(
    State(pool): State<SqlitePool>,
    jar: CookieJar,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let proof = sqlx::query_as::<_, IdProof>(
        "SELECT name, id_proof, id_proof_mime FROM user WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?;

    let Some(proof) = proof else {
        return Ok(user_not_found(jar));
    };

    if !proof.is_servable() {
        return Ok(flash::redirect(
            jar,
            Level::Warning,
            "ID proof is not available or is not a PDF file.",
            DASHBOARD,
        ));
    }

    let headers = [
        (header::CONTENT_TYPE, PDF_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", proof.download_name()),
        ),
    ];

    Ok((headers, proof.id_proof).into_response())
}
