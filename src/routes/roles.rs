use axum::{
    routing::{get, put},
    Router,
};
use crate::handlers::role::{list_roles, update_role_permissions};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/{role}", put(update_role_permissions))
}
