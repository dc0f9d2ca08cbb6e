// src/utils/jwt.rs

use std::{
    convert::Infallible,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    utils::flash::{self, Level},
};

/// Name of the cookie holding the signed session.
pub const SESSION_COOKIE: &str = "econnect_session";

/// Who the current request belongs to.
///
/// A session names exactly one principal; there is no way to be an admin and
/// a user at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Principal {
    Anonymous,
    Admin(i64),
    User(i64),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Principal::Anonymous)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::Admin(_))
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Principal::User(id) => Some(*id),
            _ => None,
        }
    }

    /// Flags consumed by the page layout.
    pub fn view(&self) -> SessionView {
        SessionView {
            logged_in: self.is_authenticated(),
            is_admin: self.is_admin(),
            is_user: self.user_id().is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub logged_in: bool,
    pub is_admin: bool,
    pub is_user: bool,
}

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    pub principal: Principal,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a session token for the principal.
pub fn sign_session(
    principal: Principal,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        principal,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a session token.
pub fn verify_session(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid session".to_string()))?;

    Ok(token_data.claims)
}

/// Reads the principal out of the session cookie.
/// Missing, expired and tampered cookies all mean `Anonymous`.
pub fn principal_from_jar(jar: &CookieJar, secret: &str) -> Principal {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| verify_session(cookie.value(), secret).ok())
        .map(|claims| claims.principal)
        .unwrap_or(Principal::Anonymous)
}

/// Stores the principal in a fresh session cookie.
pub fn start_session(
    jar: CookieJar,
    principal: Principal,
    config: &Config,
) -> Result<CookieJar, AppError> {
    let token = sign_session(principal, &config.session_secret, config.session_ttl)?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok(jar.add(cookie))
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Lets any handler ask who is calling.
///
/// Behind `auth_middleware` the principal is already in the request
/// extensions; elsewhere the cookie is decoded on the spot.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    Config: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(*principal);
        }

        let config = Config::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(principal_from_jar(&jar, &config.session_secret))
    }
}

/// Axum Middleware: Authentication.
///
/// Lets the request through for any logged-in principal and makes the
/// principal available to the handler. Anonymous visitors, and users whose
/// account has been deleted, are sent back to the login page.
pub async fn auth_middleware(
    State(config): State<Config>,
    State(pool): State<SqlitePool>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let principal = principal_from_jar(&jar, &config.session_secret);

    if !principal.is_authenticated() {
        return flash::redirect(
            jar,
            Level::Warning,
            "You need to log in to access this page.",
            "/",
        );
    }

    // A session outlives deletion of its user; such sessions end here.
    if let Some(user_id) = principal.user_id() {
        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM user WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&pool)
            .await;

        match exists {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::warn!(user_id, "Session refers to a user that no longer exists");
                return flash::redirect(
                    end_session(jar),
                    Level::Warning,
                    "Your account no longer exists.",
                    "/",
                );
            }
            Err(e) => return AppError::from(e).into_response(),
        }
    }

    req.extensions_mut().insert(principal);
    next.run(req).await
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`.
pub async fn admin_middleware(jar: CookieJar, req: Request<Body>, next: Next) -> Response {
    let is_admin = req
        .extensions()
        .get::<Principal>()
        .is_some_and(Principal::is_admin);

    if !is_admin {
        return flash::redirect(jar, Level::Danger, "Administrator access required.", "/home");
    }

    next.run(req).await
}
