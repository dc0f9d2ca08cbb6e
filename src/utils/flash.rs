//! One-shot messages that survive a single redirect.
//!
//! Pending messages live in a cookie as base64url-encoded JSON. Pushing keeps
//! whatever is already queued; `take` hands them to the page being rendered
//! and clears the cookie.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "econnect_flash";

/// Bootstrap alert category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: Level,
    pub message: String,
}

pub fn push(jar: CookieJar, category: Level, message: impl Into<String>) -> CookieJar {
    let mut pending = pending(&jar);
    pending.push(Flash {
        category,
        message: message.into(),
    });

    let cookie = Cookie::build((FLASH_COOKIE, encode(&pending)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    jar.add(cookie)
}

/// Drains the pending messages.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    let pending = pending(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, pending);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), pending)
}

/// Queues a message and answers with a 303 to `to`.
pub fn redirect(jar: CookieJar, category: Level, message: impl Into<String>, to: &str) -> Response {
    (push(jar, category, message), Redirect::to(to)).into_response()
}

fn pending(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

fn encode(flashes: &[Flash]) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(flashes).unwrap_or_default())
}

// A cookie we cannot read is dropped rather than failing the page.
fn decode(value: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}
