use axum::{routing::get, Router};
use crate::handlers::inventory::{
    calculate_total_value, create_inventory_item, delete_inventory_item, get_inventory_item,
    list_inventory, update_inventory_item,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_inventory).post(create_inventory_item))
        .route(
            "/inventory/{id}",
            get(get_inventory_item)
                .put(update_inventory_item)
                .delete(delete_inventory_item),
        )
        .route("/inventory/calculate/total-value", get(calculate_total_value))
}
