use axum::{routing::get, Router};
use crate::handlers::auth::me;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/user", get(me))
}
