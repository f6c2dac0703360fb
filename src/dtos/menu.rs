use serde::{Deserialize, Serialize};
use crate::models::menu::MenuItem;

#[derive(Deserialize)]
pub struct IngredientRequest {
    pub inventory_item_id: i64,
    pub amount: f64,
}

#[derive(Deserialize)]
pub struct CreateMenuRequest {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub discount_percentage: Option<f64>,
    pub image: Option<String>,
    pub ingredients: Vec<IngredientRequest>,
    pub store_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateMenuRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct MenuListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub store_id: Option<i64>,
}

#[derive(Serialize)]
pub struct MenuIngredientResponse {
    pub inventory_item_id: i64,
    pub inventory_item_name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub amount: f64,
    pub unit: Option<String>,
    pub price_per_unit: Option<f64>,
}

#[derive(Serialize)]
pub struct MenuItemResponse {
    #[serde(flatten)]
    pub item: MenuItem,
    pub ingredients: Vec<MenuIngredientResponse>,
    pub discounted_price: f64,
    pub cogs: f64,
    pub profit: f64,
    pub margin: f64,
}
