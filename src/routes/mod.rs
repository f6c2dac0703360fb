pub mod auth;
pub mod inventory;
pub mod menu;
pub mod orders;
pub mod employees;
pub mod capital;
pub mod roles;
pub mod stores;
pub mod users;

use axum::{middleware, routing::post, Router};
use crate::handlers::auth::login;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(auth::routes())
        .merge(inventory::routes())
        .merge(menu::routes())
        .merge(orders::routes())
        .merge(employees::routes())
        .merge(capital::routes())
        .merge(roles::routes())
        .merge(stores::routes())
        .merge(users::routes())
        .layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/login", post(login))
        .merge(protected)
}
