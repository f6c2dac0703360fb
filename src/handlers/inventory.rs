// src/handlers/inventory.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::QueryBuilder;
use tracing::instrument;
use crate::auth::permissions::require_permission;
use crate::dtos::inventory::{
    CreateInventoryRequest, InventoryItemResponse, InventoryListParams, TotalValueResponse,
    UpdateInventoryRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::inventory::{derive_price_per_unit, InventoryItem};
use crate::state::AppState;

const INVENTORY_COLUMNS: &str = "id, store_id, name, type, \
     current_stock::FLOAT8 AS current_stock, unit, \
     price_per_unit::FLOAT8 AS price_per_unit, min_stock::FLOAT8 AS min_stock, \
     total_price::FLOAT8 AS total_price, status, description, category, created_at";

// GET /inventory
#[instrument(skip(state, auth))]
pub async fn list_inventory(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<InventoryListParams>,
) -> Result<Json<Vec<InventoryItemResponse>>, AppError> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!(
        "SELECT {INVENTORY_COLUMNS} FROM inventory_items WHERE 1=1"
    ));

    if let Some(item_type) = &params.item_type {
        qb.push(" AND type = ").push_bind(item_type);
    }
    if let Some(search) = &params.search {
        qb.push(" AND name ILIKE ").push_bind(format!("%{search}%"));
    }
    if let Some(store_id) = auth.store_scope(params.store_id) {
        qb.push(" AND store_id = ").push_bind(store_id);
    }
    qb.push(" ORDER BY created_at DESC");

    let items: Vec<InventoryItem> = qb.build_query_as().fetch_all(&state.db_pool).await?;

    Ok(Json(items.into_iter().map(InventoryItemResponse::from).collect()))
}

// GET /inventory/:id
pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InventoryItemResponse>, AppError> {
    let item = fetch_item(&state.db_pool, id).await?;
    Ok(Json(InventoryItemResponse::from(item)))
}

// POST /inventory
#[instrument(skip(state, auth, payload))]
pub async fn create_inventory_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateInventoryRequest>,
) -> Result<(StatusCode, Json<InventoryItemResponse>), AppError> {
    require_permission(&state.db_pool, &auth, "manage_inventory").await?;

    if payload.item_type != "stock" && payload.item_type != "equipment" {
        return Err(AppError::validation("Type must be stock or equipment"));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Name required"));
    }
    if payload.total_price < 0.0 {
        return Err(AppError::validation("Total price cannot be negative"));
    }
    if payload.item_type == "stock" {
        if payload.current_stock.is_none() {
            return Err(AppError::validation("Current stock required for stock items"));
        }
        if payload.unit.as_deref().map_or(true, |u| u.is_empty()) {
            return Err(AppError::validation("Unit required for stock items"));
        }
        if payload.min_stock.is_none() {
            return Err(AppError::validation("Minimum stock required for stock items"));
        }
    }

    // For stock items the per-unit price is derived from the purchase total
    // spread over the quantity on hand.
    let price_per_unit = if payload.item_type == "stock" {
        derive_price_per_unit(Some(payload.total_price), payload.current_stock)
            .or(payload.price_per_unit)
    } else {
        payload.price_per_unit
    };

    let store_id = auth.assigned_store(payload.store_id);

    let item = sqlx::query_as::<_, InventoryItem>(&format!(
        "INSERT INTO inventory_items \
         (store_id, name, type, current_stock, unit, price_per_unit, min_stock, \
          total_price, status, description, category) \
         VALUES ($1, $2, $3, $4::FLOAT8, $5, $6::FLOAT8, $7::FLOAT8, $8::FLOAT8, $9, $10, $11) \
         RETURNING {INVENTORY_COLUMNS}"
    ))
    .bind(store_id)
    .bind(&payload.name)
    .bind(&payload.item_type)
    .bind(payload.current_stock)
    .bind(&payload.unit)
    .bind(price_per_unit)
    .bind(payload.min_stock)
    .bind(payload.total_price)
    .bind(&payload.status)
    .bind(&payload.description)
    .bind(&payload.category)
    .fetch_one(&state.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(InventoryItemResponse::from(item))))
}

// PUT /inventory/:id
#[instrument(skip(state, auth, payload))]
pub async fn update_inventory_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateInventoryRequest>,
) -> Result<Json<InventoryItemResponse>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_inventory").await?;

    let existing = fetch_item(&state.db_pool, id).await?;

    let item_type = payload.item_type.unwrap_or(existing.item_type);
    if item_type != "stock" && item_type != "equipment" {
        return Err(AppError::validation("Type must be stock or equipment"));
    }

    let current_stock = payload.current_stock.or(existing.current_stock);
    let total_price = payload.total_price.or(existing.total_price);

    // Keep the per-unit price in sync with total price and quantity.
    let price_per_unit = if item_type == "stock" {
        derive_price_per_unit(total_price, current_stock)
            .or(payload.price_per_unit)
            .or(existing.price_per_unit)
    } else {
        payload.price_per_unit.or(existing.price_per_unit)
    };

    let item = sqlx::query_as::<_, InventoryItem>(&format!(
        "UPDATE inventory_items SET \
         name = $1, type = $2, current_stock = $3::FLOAT8, unit = $4, \
         price_per_unit = $5::FLOAT8, min_stock = $6::FLOAT8, total_price = $7::FLOAT8, \
         status = $8, description = $9, category = $10, store_id = $11 \
         WHERE id = $12 RETURNING {INVENTORY_COLUMNS}"
    ))
    .bind(payload.name.unwrap_or(existing.name))
    .bind(&item_type)
    .bind(current_stock)
    .bind(payload.unit.or(existing.unit))
    .bind(price_per_unit)
    .bind(payload.min_stock.or(existing.min_stock))
    .bind(total_price)
    .bind(payload.status.or(existing.status))
    .bind(payload.description.or(existing.description))
    .bind(payload.category.unwrap_or(existing.category))
    .bind(payload.store_id.or(existing.store_id))
    .bind(id)
    .fetch_one(&state.db_pool)
    .await?;

    Ok(Json(InventoryItemResponse::from(item)))
}

// DELETE /inventory/:id
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_inventory").await?;

    let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Inventory item not found"));
    }

    Ok(Json(serde_json::json!({ "message": "Inventory item deleted successfully" })))
}

// GET /inventory/calculate/total-value
pub async fn calculate_total_value(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<InventoryListParams>,
) -> Result<Json<TotalValueResponse>, AppError> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!(
        "SELECT {INVENTORY_COLUMNS} FROM inventory_items WHERE 1=1"
    ));
    if let Some(store_id) = auth.store_scope(params.store_id) {
        qb.push(" AND store_id = ").push_bind(store_id);
    }

    let items: Vec<InventoryItem> = qb.build_query_as().fetch_all(&state.db_pool).await?;

    let stock_value: f64 = items.iter().filter(|i| i.is_stock()).map(|i| i.value()).sum();
    let equipment_value: f64 = items.iter().filter(|i| !i.is_stock()).map(|i| i.value()).sum();

    Ok(Json(TotalValueResponse {
        stock_value,
        equipment_value,
        total_value: stock_value + equipment_value,
    }))
}

pub(crate) async fn fetch_item(pool: &sqlx::PgPool, id: i64) -> Result<InventoryItem, AppError> {
    sqlx::query_as::<_, InventoryItem>(&format!(
        "SELECT {INVENTORY_COLUMNS} FROM inventory_items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Inventory item not found"))
}
