use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::page,
    models::{
        describe_validation,
        directory::encode_image,
        user::User,
        user_desc::{ProfileUpload, UserDesc},
    },
    templates::Templates,
    utils::{
        flash::{self, Level},
        form::MultipartForm,
        html::clean_html,
        jwt::{Principal, end_session},
    },
};

async fn fetch_user(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, enrollment_no, faculty_no,
               id_proof_mime, is_verified, created_at
        FROM user
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

async fn fetch_desc(pool: &SqlitePool, user_id: i64) -> Result<Option<UserDesc>, sqlx::Error> {
    sqlx::query_as::<_, UserDesc>(
        r#"
        SELECT id, short_desc, detail_desc, passing_year, user_image, user_image_mime,
               department, course, social1, social2, social3, social4
        FROM user_desc
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Shows one user's profile page.
/// Users without a description yet are reported as not found.
pub async fn view_profile(
    State(pool): State<SqlitePool>,
    State(templates): State<Arc<Templates>>,
    principal: Principal,
    jar: CookieJar,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let (Some(user), Some(desc)) = (
        fetch_user(&pool, user_id).await?,
        fetch_desc(&pool, user_id).await?,
    ) else {
        return Ok(flash::redirect(jar, Level::Danger, "User not found", "/home"));
    };

    let detail_html = clean_html(desc.detail_desc.as_deref().unwrap_or_default());

    page(
        &templates,
        jar,
        principal,
        "profile",
        json!({
            "user": user,
            "image": encode_image(desc.user_image.as_deref()),
            "image_mime": desc.image_mime(),
            "detail_html": detail_html,
            "socials": desc.socials(),
            "desc": desc,
        }),
    )
}

/// Resolves the logged-in user for the upload pages, or the response that
/// should be sent instead.
async fn uploader(
    pool: &SqlitePool,
    principal: Principal,
    jar: CookieJar,
) -> Result<Result<(User, CookieJar), Response>, AppError> {
    let Some(user_id) = principal.user_id() else {
        return Ok(Err(flash::redirect(
            jar,
            Level::Warning,
            "Only alumni accounts have a profile to edit.",
            "/admindashboard",
        )));
    };

    match fetch_user(pool, user_id).await? {
        Some(user) => Ok(Ok((user, jar))),
        None => {
            tracing::warn!(user_id, "Session refers to a user that no longer exists");
            Ok(Err(flash::redirect(
                end_session(jar),
                Level::Warning,
                "Your account no longer exists.",
                "/",
            )))
        }
    }
}

/// Shows the profile form, pre-filled when a description exists.
pub async fn upload_page(
    State(pool): State<SqlitePool>,
    State(templates): State<Arc<Templates>>,
    principal: Principal,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let (user, jar) = match uploader(&pool, principal, jar).await? {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };

    let desc = fetch_desc(&pool, user.id).await?;
    let has_image = desc.as_ref().is_some_and(UserDesc::has_image);

    page(
        &templates,
        jar,
        principal,
        "upload",
        json!({ "user": user, "desc": desc, "has_image": has_image }),
    )
}

/// Creates or updates the caller's description.
///
/// There is at most one row per user: a second upload overwrites the first
/// in place. The stored image is only replaced when a new, non-empty file
/// comes with the form.
pub async fn upload(
    State(pool): State<SqlitePool>,
    principal: Principal,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (user, jar) = match uploader(&pool, principal, jar).await? {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };

    let mut form = MultipartForm::read(multipart).await?;

    let passing_year = match form.optional("passing_year").map(|y| y.parse::<i64>()) {
        None => None,
        Some(Ok(year)) => Some(year),
        Some(Err(_)) => {
            return Ok(flash::redirect(
                jar,
                Level::Danger,
                "Passing year must be a number.",
                "/upload",
            ));
        }
    };

    let payload = ProfileUpload {
        short_desc: form.optional("short_desc"),
        detail_desc: form.optional("detail_desc"),
        passing_year,
        department: form.optional("department"),
        course: form.optional("course"),
        social1: form.optional("social1"),
        social2: form.optional("social2"),
        social3: form.optional("social3"),
        social4: form.optional("social4"),
    };

    if let Err(validation_errors) = payload.validate() {
        return Ok(flash::redirect(
            jar,
            Level::Danger,
            describe_validation(&validation_errors),
            "/upload",
        ));
    }

    let image = form.take_file("user_image");
    let image_mime = image
        .as_ref()
        .and_then(|img| img.content_type.clone())
        .filter(|mime| mime.starts_with("image/"));

    sqlx::query(
        r#"
        INSERT INTO user_desc
            (id, short_desc, detail_desc, passing_year, department, course,
             social1, social2, social3, social4, user_image, user_image_mime)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            short_desc = excluded.short_desc,
            detail_desc = excluded.detail_desc,
            passing_year = excluded.passing_year,
            department = excluded.department,
            course = excluded.course,
            social1 = excluded.social1,
            social2 = excluded.social2,
            social3 = excluded.social3,
            social4 = excluded.social4,
            user_image = COALESCE(excluded.user_image, user_desc.user_image),
            user_image_mime = CASE
                WHEN excluded.user_image IS NULL THEN user_desc.user_image_mime
                ELSE excluded.user_image_mime
            END
        "#,
    )
    .bind(user.id)
    .bind(&payload.short_desc)
    .bind(&payload.detail_desc)
    .bind(payload.passing_year)
    .bind(&payload.department)
    .bind(&payload.course)
    .bind(&payload.social1)
    .bind(&payload.social2)
    .bind(&payload.social3)
    .bind(&payload.social4)
    .bind(image.as_ref().map(|img| img.bytes.to_vec()))
    .bind(image_mime)
    .execute(&pool)
    .await?;

    tracing::info!(user_id = user.id, new_image = image.is_some(), "Profile saved");

    Ok(flash::redirect(
        jar,
        Level::Success,
        "Your details have been uploaded successfully.",
        &format!("/profile/{}", user.id),
    ))
}
