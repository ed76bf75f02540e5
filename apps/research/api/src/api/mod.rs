use crate::state::AppState;
use axum::Router;

pub mod health;
pub mod status;
pub mod tasks;

/// All application routes, with state applied.
///
/// Health routes sit at the root (`/`, `/health`, `/api/health/...`);
/// versioned routes live under `/api/v1`.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(health::router(state.clone()))
        .nest("/api/v1", v1_routes(state))
}

fn v1_routes(state: &AppState) -> Router {
    Router::new()
        .merge(status::router())
        .nest("/tasks", tasks::router(state.clone()))
}
