use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // Wide-open CORS, matching the deployed endpoints; the layer answers
    // OPTIONS preflights itself.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/projects",
            get(handlers::get_projects).post(handlers::save_projects),
        )
        .route(
            "/api/analytics",
            get(handlers::get_analytics).post(handlers::track),
        )
        .route(
            "/api/update-projects.php",
            axum::routing::post(handlers::update_projects_compat),
        )
        .route("/data/projects.json", get(handlers::projects_json))
        .layer(cors)
        .with_state(state)
}
