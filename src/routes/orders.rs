use axum::{routing::get, Router};
use crate::handlers::order::{cancel_order, create_order, get_order, list_orders, sales_report};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order).delete(cancel_order))
        .route("/orders/report/sales", get(sales_report))
}
