use axum::{routing::get, Router};
use crate::handlers::menu::{
    create_menu_item, delete_menu_item, get_menu_item, list_menu, update_menu_item,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_menu).post(create_menu_item))
        .route(
            "/menu/{id}",
            get(get_menu_item).put(update_menu_item).delete(delete_menu_item),
        )
}
