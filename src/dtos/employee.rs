use serde::{Deserialize, Serialize};
use crate::models::user::User;

#[derive(Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub positions: Option<Vec<String>>,
    pub salary_type: String,
    pub base_salary: Option<f64>,
    pub bonus: Option<f64>,
    pub store_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub positions: Option<Vec<String>>,
    pub salary_type: Option<String>,
    pub base_salary: Option<f64>,
    pub bonus: Option<f64>,
    pub store_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeListParams {
    pub role: Option<String>,
    pub position: Option<String>,
    pub store_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SalaryParams {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Serialize)]
pub struct EmployeeResponse {
    #[serde(flatten)]
    pub user: User,
    pub monthly_salary: f64,
}

#[derive(Serialize)]
pub struct SalaryBreakdownResponse {
    pub employee: String,
    pub month: u32,
    pub year: i32,
    pub salary_type: String,
    pub base_salary: Option<f64>,
    pub auto_calculation: Option<f64>,
    pub bonus: f64,
    pub total_salary: f64,
}
