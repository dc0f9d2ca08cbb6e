// src/handlers/mod.rs

pub mod about;
pub mod admin;
pub mod auth;
pub mod directory;
pub mod profile;

use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;

use crate::{
    error::AppError,
    templates::Templates,
    utils::{flash, jwt::Principal},
};

/// Renders a full page: drains pending flashes and tells the layout who is
/// logged in. `data` must be a JSON object.
pub(crate) fn page(
    templates: &Templates,
    jar: CookieJar,
    principal: Principal,
    name: &str,
    mut data: Value,
) -> Result<Response, AppError> {
    let (jar, flashes) = flash::take(jar);

    if let Value::Object(map) = &mut data {
        map.insert("flashes".into(), serde_json::to_value(flashes)?);
        map.insert("session".into(), serde_json::to_value(principal.view())?);
    }

    Ok((jar, templates.render(name, &data)?).into_response())
}
