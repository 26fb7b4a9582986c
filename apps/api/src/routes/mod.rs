pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::loans::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/get-loans", post(handlers::handle_get_loans))
        .with_state(state)
}
