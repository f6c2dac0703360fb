use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::models::order::Order;

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: i64,
    pub quantity: i32,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: Option<String>,
    pub payment_method: String,
    pub order_type: String,
    pub paid_amount: Option<f64>,
    pub store_id: Option<i64>,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<String>,
    pub store_id: Option<i64>,
    pub user_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub price: f64,
    pub line_total: f64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct SalesReportResponse {
    pub total_orders: i64,
    pub total_sales: f64,
    pub total_cogs: f64,
    pub total_profit: f64,
    pub profit_margin: f64,
}

#[derive(Serialize)]
pub struct CancelOrderResponse {
    pub message: &'static str,
    pub order: OrderResponse,
}
