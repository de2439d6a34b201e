pub mod auth;
pub mod catalog;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod wizard;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_auth;
use state::AppState;

/// Builds the API router: public auth and catalog routes, and the wizard
/// routes behind the session gate.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/signin", post(auth::signin_handler))
        .route("/auth/signout", post(auth::signout_handler))
        .route("/styles", get(catalog::list_styles_handler))
        .route("/pricing", get(catalog::pricing_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/wizards", post(wizard::start_wizard_handler))
        .route(
            "/wizards/{id}",
            get(wizard::get_wizard_handler).delete(wizard::abandon_handler),
        )
        .route("/wizards/{id}/draft", patch(wizard::update_draft_handler))
        .route(
            "/wizards/{id}/reference-image",
            put(wizard::upload_reference_image_handler)
                .delete(wizard::clear_reference_image_handler),
        )
        .route("/wizards/{id}/next", post(wizard::next_step_handler))
        .route("/wizards/{id}/previous", post(wizard::previous_step_handler))
        .route("/wizards/{id}/styles/reload", post(wizard::reload_styles_handler))
        .route("/wizards/{id}/preview", post(wizard::generate_preview_handler))
        .route("/wizards/{id}/submit", post(wizard::submit_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(app_state)
}
