use axum::{routing::get, Router};
use crate::handlers::store::{
    available_owners, create_store, delete_store, get_store, list_stores, show_own_store,
    update_own_store, update_store,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/store",
            get(show_own_store).post(create_store).put(update_own_store),
        )
        .route("/stores-management", get(list_stores))
        .route(
            "/stores-management/{id}",
            get(get_store).put(update_store).delete(delete_store),
        )
        .route("/stores-management/available/owners", get(available_owners))
}
