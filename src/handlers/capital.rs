// src/handlers/capital.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Datelike, Utc};
use sqlx::QueryBuilder;
use tracing::instrument;
use crate::auth::permissions::require_permission;
use crate::dtos::capital::{
    BreakevenResponse, CapitalListParams, CreateCapitalRequest, CurrentAssets, Expenses,
    ProfitLoss, Revenue, UpdateCapitalRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::capital::CapitalRecord;
use crate::models::inventory::InventoryItem;
use crate::models::user::User;
use crate::state::AppState;

const CAPITAL_COLUMNS: &str =
    "id, store_id, user_id, amount::FLOAT8 AS amount, date, description, created_at";

// GET /capital
pub async fn list_capital(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<CapitalListParams>,
) -> Result<Json<Vec<CapitalRecord>>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_capital").await?;

    let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!(
        "SELECT {CAPITAL_COLUMNS} FROM capital_records WHERE 1=1"
    ));
    if let Some(store_id) = auth.store_scope(params.store_id) {
        qb.push(" AND store_id = ").push_bind(store_id);
    }
    qb.push(" ORDER BY date DESC");

    let records: Vec<CapitalRecord> = qb.build_query_as().fetch_all(&state.db_pool).await?;
    Ok(Json(records))
}

// POST /capital
#[instrument(skip(state, auth, payload))]
pub async fn create_capital(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateCapitalRequest>,
) -> Result<(StatusCode, Json<CapitalRecord>), AppError> {
    require_permission(&state.db_pool, &auth, "manage_capital").await?;

    if payload.amount < 0.0 {
        return Err(AppError::validation("Amount cannot be negative"));
    }

    let store_id = auth.assigned_store(payload.store_id);

    let record = sqlx::query_as::<_, CapitalRecord>(&format!(
        "INSERT INTO capital_records (store_id, user_id, amount, date, description) \
         VALUES ($1, $2, $3::FLOAT8, $4, $5) RETURNING {CAPITAL_COLUMNS}"
    ))
    .bind(store_id)
    .bind(auth.user_id)
    .bind(payload.amount)
    .bind(payload.date)
    .bind(&payload.description)
    .fetch_one(&state.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

// GET /capital/:id
pub async fn get_capital(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<CapitalRecord>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_capital").await?;
    let record = fetch_record(&state.db_pool, id).await?;
    Ok(Json(record))
}

// PUT /capital/:id
pub async fn update_capital(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCapitalRequest>,
) -> Result<Json<CapitalRecord>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_capital").await?;

    if payload.amount.is_some_and(|a| a < 0.0) {
        return Err(AppError::validation("Amount cannot be negative"));
    }

    let existing = fetch_record(&state.db_pool, id).await?;

    let record = sqlx::query_as::<_, CapitalRecord>(&format!(
        "UPDATE capital_records SET amount = $1::FLOAT8, date = $2, description = $3 \
         WHERE id = $4 RETURNING {CAPITAL_COLUMNS}"
    ))
    .bind(payload.amount.unwrap_or(existing.amount))
    .bind(payload.date.unwrap_or(existing.date))
    .bind(payload.description.or(existing.description))
    .bind(id)
    .fetch_one(&state.db_pool)
    .await?;

    Ok(Json(record))
}

// DELETE /capital/:id
pub async fn delete_capital(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_capital").await?;

    let result = sqlx::query("DELETE FROM capital_records WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Capital record not found"));
    }

    Ok(Json(serde_json::json!({ "message": "Capital record deleted successfully" })))
}

struct BreakevenInput {
    initial_capital: f64,
    stock_value: f64,
    good_equipment_value: f64,
    damaged_equipment_value: f64,
    total_sales: f64,
    total_cogs: f64,
    salaries: f64,
}

/// Combine the aggregated figures into the profit/loss report:
/// net profit = (current assets + revenue) - (initial capital + expenses),
/// where expenses = COGS + salaries + damaged equipment.
fn assemble_report(input: BreakevenInput) -> BreakevenResponse {
    let current_assets_total = input.stock_value + input.good_equipment_value;
    let total_expenses = input.total_cogs + input.salaries + input.damaged_equipment_value;

    let net_profit =
        (current_assets_total + input.total_sales) - (input.initial_capital + total_expenses);
    let status = if net_profit >= 0.0 { "profit" } else { "loss" };
    let roi = if input.initial_capital > 0.0 {
        net_profit / input.initial_capital * 100.0
    } else {
        0.0
    };

    BreakevenResponse {
        initial_capital: input.initial_capital,
        current_assets: CurrentAssets {
            stock_value: input.stock_value,
            equipment_value: input.good_equipment_value,
            total: current_assets_total,
        },
        revenue: Revenue { total_sales: input.total_sales },
        expenses: Expenses {
            cogs: input.total_cogs,
            salaries: input.salaries,
            damaged_equipment: input.damaged_equipment_value,
            total: total_expenses,
        },
        profit_loss: ProfitLoss {
            net_profit,
            status,
            roi_percentage: (roi * 100.0).round() / 100.0,
        },
    }
}

// GET /capital/calculate/breakeven
#[instrument(skip(state, auth))]
pub async fn calculate_breakeven(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<CapitalListParams>,
) -> Result<Json<BreakevenResponse>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_capital").await?;

    let scope = auth.store_scope(params.store_id);

    let initial_capital = scoped_sum(&state.db_pool, "SELECT COALESCE(SUM(amount), 0)::FLOAT8 FROM capital_records", scope).await?;

    let mut qb = QueryBuilder::<sqlx::Postgres>::new(
        "SELECT id, store_id, name, type, current_stock::FLOAT8 AS current_stock, unit, \
                price_per_unit::FLOAT8 AS price_per_unit, min_stock::FLOAT8 AS min_stock, \
                total_price::FLOAT8 AS total_price, status, description, category, created_at \
         FROM inventory_items WHERE 1=1",
    );
    if let Some(store_id) = scope {
        qb.push(" AND store_id = ").push_bind(store_id);
    }
    let inventory: Vec<InventoryItem> = qb.build_query_as().fetch_all(&state.db_pool).await?;

    let stock_value: f64 = inventory.iter().filter(|i| i.is_stock()).map(|i| i.value()).sum();
    let good_equipment_value: f64 = inventory
        .iter()
        .filter(|i| i.is_good_asset())
        .map(|i| i.value())
        .sum();
    let damaged_equipment_value: f64 =
        inventory.iter().filter(|i| i.is_damaged()).map(|i| i.value()).sum();

    // TODO: decide whether cancelled orders belong in these sums; the sales
    // report excludes them, this report does not.
    let total_sales = scoped_sum(&state.db_pool, "SELECT COALESCE(SUM(total), 0)::FLOAT8 FROM orders", scope).await?;
    let total_cogs = scoped_sum(&state.db_pool, "SELECT COALESCE(SUM(cogs), 0)::FLOAT8 FROM orders", scope).await?;

    let mut qb = QueryBuilder::<sqlx::Postgres>::new(
        "SELECT id, store_id, name, email, password_hash, role, positions, salary_type, \
                base_salary::FLOAT8 AS base_salary, bonus::FLOAT8 AS bonus, created_at \
         FROM users WHERE 1=1",
    );
    if let Some(store_id) = scope {
        qb.push(" AND store_id = ").push_bind(store_id);
    }
    let users: Vec<User> = qb.build_query_as().fetch_all(&state.db_pool).await?;

    let now = Utc::now();
    let salaries: f64 = users.iter().map(|u| u.monthly_salary(now.year(), now.month())).sum();

    Ok(Json(assemble_report(BreakevenInput {
        initial_capital,
        stock_value,
        good_equipment_value,
        damaged_equipment_value,
        total_sales,
        total_cogs,
        salaries,
    })))
}

async fn scoped_sum(
    pool: &sqlx::PgPool,
    base: &str,
    scope: Option<i64>,
) -> Result<f64, AppError> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(base);
    if let Some(store_id) = scope {
        qb.push(" WHERE store_id = ").push_bind(store_id);
    }
    let sum: f64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(sum)
}

async fn fetch_record(pool: &sqlx::PgPool, id: i64) -> Result<CapitalRecord, AppError> {
    sqlx::query_as::<_, CapitalRecord>(&format!(
        "SELECT {CAPITAL_COLUMNS} FROM capital_records WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Capital record not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_balances_the_worked_example() {
        let report = assemble_report(BreakevenInput {
            initial_capital: 1_000_000.0,
            stock_value: 200_000.0,
            good_equipment_value: 500_000.0,
            damaged_equipment_value: 100_000.0,
            total_sales: 3_000_000.0,
            total_cogs: 1_200_000.0,
            salaries: 900_000.0,
        });

        assert_eq!(report.current_assets.total, 700_000.0);
        assert_eq!(report.expenses.total, 2_200_000.0);
        assert_eq!(report.profit_loss.net_profit, 500_000.0);
        assert_eq!(report.profit_loss.status, "profit");
        assert_eq!(report.profit_loss.roi_percentage, 50.0);
    }

    #[test]
    fn losses_flip_the_status() {
        let report = assemble_report(BreakevenInput {
            initial_capital: 5_000_000.0,
            stock_value: 100_000.0,
            good_equipment_value: 0.0,
            damaged_equipment_value: 0.0,
            total_sales: 500_000.0,
            total_cogs: 300_000.0,
            salaries: 1_000_000.0,
        });

        assert!(report.profit_loss.net_profit < 0.0);
        assert_eq!(report.profit_loss.status, "loss");
    }

    #[test]
    fn zero_capital_yields_zero_roi() {
        let report = assemble_report(BreakevenInput {
            initial_capital: 0.0,
            stock_value: 0.0,
            good_equipment_value: 0.0,
            damaged_equipment_value: 0.0,
            total_sales: 100_000.0,
            total_cogs: 0.0,
            salaries: 0.0,
        });

        assert_eq!(report.profit_loss.roi_percentage, 0.0);
        assert_eq!(report.profit_loss.status, "profit");
    }

    #[test]
    fn damaged_equipment_is_an_expense_not_an_asset() {
        let base = BreakevenInput {
            initial_capital: 1_000_000.0,
            stock_value: 0.0,
            good_equipment_value: 0.0,
            damaged_equipment_value: 250_000.0,
            total_sales: 2_000_000.0,
            total_cogs: 500_000.0,
            salaries: 0.0,
        };
        let report = assemble_report(base);

        assert_eq!(report.current_assets.total, 0.0);
        assert_eq!(report.expenses.total, 750_000.0);
        assert_eq!(report.profit_loss.net_profit, 2_000_000.0 - 1_750_000.0);
    }
}
