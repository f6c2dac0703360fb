use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

#[derive(Deserialize)]
pub struct CreateCapitalRequest {
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub store_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateCapitalRequest {
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CapitalListParams {
    pub store_id: Option<i64>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct CurrentAssets {
    pub stock_value: f64,
    pub equipment_value: f64,
    pub total: f64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Revenue {
    pub total_sales: f64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Expenses {
    pub cogs: f64,
    pub salaries: f64,
    pub damaged_equipment: f64,
    pub total: f64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ProfitLoss {
    pub net_profit: f64,
    pub status: &'static str,
    pub roi_percentage: f64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct BreakevenResponse {
    pub initial_capital: f64,
    pub current_assets: CurrentAssets,
    pub revenue: Revenue,
    pub expenses: Expenses,
    pub profit_loss: ProfitLoss,
}
