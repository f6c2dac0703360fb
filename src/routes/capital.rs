use axum::{routing::get, Router};
use crate::handlers::capital::{
    calculate_breakeven, create_capital, delete_capital, get_capital, list_capital, update_capital,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/capital", get(list_capital).post(create_capital))
        .route(
            "/capital/{id}",
            get(get_capital).put(update_capital).delete(delete_capital),
        )
        .route("/capital/calculate/breakeven", get(calculate_breakeven))
}
