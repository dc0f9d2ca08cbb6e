use std::sync::Arc;

use axum::{extract::State, response::Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::{
    config::Config,
    error::AppError,
    handlers::page,
    models::quote::{Quote, QuoteEnvelope},
    templates::Templates,
    utils::jwt::Principal,
};

/// Pulls one random quote. Upstream trouble only costs the quote, not the page.
async fn fetch_quote(http: &reqwest::Client, url: &str) -> Option<Quote> {
    let result = async {
        http.get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<QuoteEnvelope>()
            .await
    }
    .await;

    match result {
        Ok(envelope) => Some(envelope.data),
        Err(e) => {
            tracing::warn!("Quote API unavailable: {}", e);
            None
        }
    }
}

pub async fn about(
    State(templates): State<Arc<Templates>>,
    State(http): State<reqwest::Client>,
    State(config): State<Config>,
    principal: Principal,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let quote = fetch_quote(&http, &config.quote_api_url).await;

    page(&templates, jar, principal, "about", json!({ "quote": quote }))
}
