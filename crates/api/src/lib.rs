pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Tenant registry (no tenant prefix)
    let tenant_routes = Router::new()
        .route("/", get(routes::tenant::list).post(routes::tenant::create))
        .route("/signup", post(routes::tenant::signup))
        .route("/slug/{slug}", get(routes::tenant::get_by_slug))
        .route(
            "/{tenant_id}",
            get(routes::tenant::get)
                .patch(routes::tenant::update)
                .delete(routes::tenant::deactivate),
        );

    // Roster routes (under tenant)
    let roster_routes = Router::new()
        .route("/", get(routes::roster::display))
        .route(
            "/source",
            get(routes::roster::source).put(routes::roster::set_source),
        )
        .route(
            "/override",
            get(routes::roster::overrides).put(routes::roster::set_override),
        )
        .route("/cell", post(routes::roster::update_cell))
        .route("/reset", post(routes::roster::reset))
        .route("/hard-reset", post(routes::roster::hard_reset))
        .route("/modification", get(routes::roster::modifications))
        .route("/employee", post(routes::roster::add_employee))
        .route(
            "/employee/{employee_id}",
            patch(routes::roster::update_employee),
        )
        .route(
            "/employee/{employee_id}/deactivate",
            post(routes::roster::deactivate_employee),
        )
        .route(
            "/employee/{employee_id}/reactivate",
            post(routes::roster::reactivate_employee),
        )
        .route("/team", post(routes::roster::add_team))
        .route(
            "/team/{team}",
            patch(routes::roster::rename_team).delete(routes::roster::delete_team),
        );

    // Shift change and swap requests (under tenant)
    let request_routes = Router::new()
        .route("/", get(routes::request::list_all))
        .route("/pending", get(routes::request::list_pending))
        .route("/approved", get(routes::request::list_approved))
        .route("/counts", get(routes::request::counts))
        .route("/change", post(routes::request::submit_change))
        .route("/swap", post(routes::request::submit_swap))
        .route(
            "/employee/{employee_id}",
            get(routes::request::list_for_employee),
        )
        .route("/{request_id}", get(routes::request::get))
        .route("/{request_id}/decide", post(routes::request::decide));

    // Shift vocabulary (under tenant)
    let shift_routes = Router::new()
        .route(
            "/",
            get(routes::shift_definition::list)
                .post(routes::shift_definition::upsert)
                .put(routes::shift_definition::replace_all),
        )
        .route("/lookup", get(routes::shift_definition::lookup))
        .route(
            "/{code}",
            delete(routes::shift_definition::delete),
        );

    // Employee credentials (under tenant)
    let credential_routes = Router::new()
        .route("/verify", post(routes::credential::verify))
        .route("/login", post(routes::credential::login))
        .route(
            "/{employee_id}/password",
            put(routes::credential::set_password),
        )
        .route("/{employee_id}/email", put(routes::credential::set_email))
        .route(
            "/{employee_id}/deactivate",
            post(routes::credential::deactivate),
        )
        .route(
            "/{employee_id}/reactivate",
            post(routes::credential::reactivate),
        );

    let reset_routes = Router::new()
        .route("/", post(routes::credential::issue_reset_token))
        .route("/validate", post(routes::credential::validate_reset_token))
        .route("/consume", post(routes::credential::consume_reset_token));

    // Per-month provenance of the imported roster (under tenant)
    let source_link_routes = Router::new()
        .route("/", get(routes::source_link::list))
        .route(
            "/{month}",
            put(routes::source_link::save).delete(routes::source_link::delete),
        );

    let settings_routes = Router::new()
        .route("/", get(routes::settings::get))
        .route("/auto-sync", put(routes::settings::set_auto_sync));

    // Compose API
    let api = Router::new()
        .nest("/tenant", tenant_routes)
        .nest("/tenant/{tenant_id}/roster", roster_routes)
        .nest("/tenant/{tenant_id}/request", request_routes)
        .nest("/tenant/{tenant_id}/shift", shift_routes)
        .nest("/tenant/{tenant_id}/credential", credential_routes)
        .nest("/tenant/{tenant_id}/password-reset", reset_routes)
        .nest("/tenant/{tenant_id}/source-link", source_link_routes)
        .nest("/tenant/{tenant_id}/settings", settings_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
