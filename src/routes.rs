// routes.rs
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::store::CategoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CategoryStore>,
}

pub fn create_routes(store: Arc<dyn CategoryStore>) -> Router {
    Router::new()
        .route("/categories", get(handlers::list_categories))
        .route("/categories/create", post(handlers::create_category))
        .route(
            "/categories/{id}",
            get(handlers::get_category).delete(handlers::delete_category),
        )
        .route(
            "/categories/{id}/update",
            put(handlers::update_category).patch(handlers::update_category),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { store })
}
