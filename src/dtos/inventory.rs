use serde::{Deserialize, Serialize};
use crate::models::inventory::InventoryItem;

#[derive(Deserialize)]
pub struct CreateInventoryRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub category: String,
    pub current_stock: Option<f64>,
    pub unit: Option<String>,
    pub price_per_unit: Option<f64>,
    pub min_stock: Option<f64>,
    pub total_price: f64,
    pub status: Option<String>,
    pub description: Option<String>,
    pub store_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateInventoryRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub category: Option<String>,
    pub current_stock: Option<f64>,
    pub unit: Option<String>,
    pub price_per_unit: Option<f64>,
    pub min_stock: Option<f64>,
    pub total_price: Option<f64>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub store_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct InventoryListParams {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub search: Option<String>,
    pub store_id: Option<i64>,
}

#[derive(Serialize)]
pub struct InventoryItemResponse {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub value: f64,
    pub stock_status: &'static str,
    pub is_low_stock: bool,
}

impl From<InventoryItem> for InventoryItemResponse {
    fn from(item: InventoryItem) -> Self {
        let value = item.value();
        let stock_status = item.stock_status();
        let is_low_stock = item.is_low_stock();
        Self { item, value, stock_status, is_low_stock }
    }
}

#[derive(Serialize)]
pub struct TotalValueResponse {
    pub stock_value: f64,
    pub equipment_value: f64,
    pub total_value: f64,
}
