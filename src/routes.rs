// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{about, admin, auth, directory, profile},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public pages: login, registration, about.
/// * Member pages: any logged-in principal.
/// * Admin pages: auth check first, then the admin check.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/about", get(about::about));

    let member_routes = Router::new()
        .route("/home", get(directory::home))
        .route("/filter_cards", post(directory::filter_cards))
        .route("/profile/{user_id}", get(profile::view_profile))
        .route("/upload", get(profile::upload_page).post(profile::upload))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/admindashboard", get(admin::dashboard))
        .route("/verify/{user_id}", post(admin::verify_user))
        .route("/delete/{user_id}", post(admin::delete_user))
        .route("/check_id/{user_id}", get(admin::check_id))
        // Layers run outside in: auth_middleware, then admin_middleware
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .merge(admin_routes)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .with_state(state)
}
