// src/handlers/auth.rs

use std::sync::Arc;

use axum::{
    Form,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    handlers::page,
    models::{
        admin::{Admin, LoginRequest},
        describe_validation,
        user::{RegisterRequest, User},
    },
    templates::Templates,
    utils::{
        flash::{self, Level},
        form::MultipartForm,
        hash::{hash_password, verify_password},
        jwt::{Principal, end_session, start_session},
    },
};

pub async fn login_page(
    State(templates): State<Arc<Templates>>,
    principal: Principal,
    jar: CookieJar,
) -> Result<Response, AppError> {
    page(&templates, jar, principal, "login", json!({}))
}

/// Authenticates an admin or a user.
///
/// Admins are looked up first. A user must also be verified before a
/// session is issued; wrong passwords and unknown emails get the same answer.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    jar: CookieJar,
    Form(payload): Form<LoginRequest>,
) -> Result<Response, AppError> {
    let email = payload.email.trim();

    let admin = sqlx::query_as::<_, Admin>(
        "SELECT id, name, email, password FROM econnect_admin WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(&pool)
    .await?;

    if let Some(admin) = admin {
        if verify_password(&payload.password, &admin.password) {
            tracing::info!(admin_id = admin.id, "Admin logged in");
            let jar = start_session(jar, Principal::Admin(admin.id), &config)?;
            return Ok((jar, Redirect::to("/admindashboard")).into_response());
        }
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, enrollment_no, faculty_no,
               id_proof_mime, is_verified, created_at
        FROM user
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(&pool)
    .await?;

    match user {
        Some(user) if verify_password(&payload.password, &user.password) => {
            if !user.is_verified {
                return Ok(flash::redirect(
                    jar,
                    Level::Warning,
                    "Your account is not verified yet. Please wait for admin approval.",
                    "/",
                ));
            }

            tracing::info!(user_id = user.id, "User logged in");
            let jar = start_session(jar, Principal::User(user.id), &config)?;
            Ok((jar, Redirect::to("/home")).into_response())
        }
        _ => {
            tracing::debug!("Rejected login attempt");
            Ok(flash::redirect(jar, Level::Danger, "Invalid credentials", "/"))
        }
    }
}

pub async fn register_page(
    State(templates): State<Arc<Templates>>,
    principal: Principal,
    jar: CookieJar,
) -> Result<Response, AppError> {
    page(&templates, jar, principal, "register", json!({}))
}

/// Creates an unverified user together with their identity document.
///
/// The document is stored as sent, with the content type the browser
/// declared. An email that is already registered is refused by the UNIQUE
/// index and the existing account is left untouched.
pub async fn register(
    State(pool): State<SqlitePool>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = MultipartForm::read(multipart).await?;

    let payload = RegisterRequest {
        name: form.text("name").trim().to_string(),
        email: form.text("email").trim().to_string(),
        password: form.text("password"),
        enrollment_no: form.optional("enrollment_no"),
        faculty_no: form.optional("faculty_no"),
    };

    if let Err(validation_errors) = payload.validate() {
        return Ok(flash::redirect(
            jar,
            Level::Danger,
            describe_validation(&validation_errors),
            "/register",
        ));
    }

    let Some(id_proof) = form.take_file("id_proof") else {
        return Ok(flash::redirect(
            jar,
            Level::Danger,
            "Please attach your identity document.",
            "/register",
        ));
    };

    let hashed_password = hash_password(&payload.password)?;

    let inserted = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO user
            (name, email, password, enrollment_no, faculty_no, id_proof, id_proof_mime, is_verified)
        VALUES (?, ?, ?, ?, ?, ?, ?, 0)
        RETURNING id
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(&payload.enrollment_no)
    .bind(&payload.faculty_no)
    .bind(id_proof.bytes.as_ref())
    .bind(&id_proof.content_type)
    .fetch_one(&pool)
    .await;

    match inserted {
        Ok(id) => {
            tracing::info!(
                user_id = id,
                mime = id_proof.content_type.as_deref().unwrap_or("unknown"),
                size = id_proof.bytes.len(),
                "Registered user awaiting verification"
            );
            Ok(flash::redirect(
                jar,
                Level::Info,
                "Please wait till your verification",
                "/",
            ))
        }
        Err(e) if is_unique_violation(&e) => Ok(flash::redirect(
            jar,
            Level::Danger,
            "An account with this email already exists.",
            "/register",
        )),
        Err(e) => {
            tracing::error!("Failed to register user: {:?}", e);
            Err(AppError::from(e))
        }
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    flash::redirect(
        end_session(jar),
        Level::Success,
        "You have been logged out successfully!",
        "/",
    )
}
