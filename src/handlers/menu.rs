// src/handlers/menu.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;
use crate::auth::permissions::require_permission;
use crate::dtos::menu::{
    CreateMenuRequest, IngredientRequest, MenuIngredientResponse, MenuItemResponse,
    MenuListParams, UpdateMenuRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::menu::{margin_percentage, recipe_cogs, IngredientCost, MenuItem};
use crate::state::AppState;

const MENU_COLUMNS: &str = "id, store_id, name, category, price::FLOAT8 AS price, \
     discount_percentage::FLOAT8 AS discount_percentage, image, created_at";

#[derive(sqlx::FromRow)]
struct IngredientRow {
    inventory_item_id: i64,
    inventory_item_name: String,
    item_type: String,
    amount: f64,
    unit: Option<String>,
    price_per_unit: Option<f64>,
}

// GET /menu
#[instrument(skip(state, auth))]
pub async fn list_menu(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<MenuListParams>,
) -> Result<Json<Vec<MenuItemResponse>>, AppError> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!(
        "SELECT {MENU_COLUMNS} FROM menu_items WHERE 1=1"
    ));

    if let Some(search) = &params.search {
        qb.push(" AND name ILIKE ").push_bind(format!("%{search}%"));
    }
    if let Some(category) = &params.category {
        qb.push(" AND category = ").push_bind(category);
    }
    if let Some(store_id) = auth.store_scope(params.store_id) {
        qb.push(" AND store_id = ").push_bind(store_id);
    }
    qb.push(" ORDER BY created_at DESC");

    let items: Vec<MenuItem> = qb.build_query_as().fetch_all(&state.db_pool).await?;

    let mut responses = Vec::with_capacity(items.len());
    for item in items {
        responses.push(with_costing(&state.db_pool, item).await?);
    }

    Ok(Json(responses))
}

// GET /menu/:id
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MenuItemResponse>, AppError> {
    let item = fetch_menu_item(&state.db_pool, id).await?;
    Ok(Json(with_costing(&state.db_pool, item).await?))
}

// POST /menu
#[instrument(skip(state, auth, payload))]
pub async fn create_menu_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateMenuRequest>,
) -> Result<(StatusCode, Json<MenuItemResponse>), AppError> {
    require_permission(&state.db_pool, &auth, "manage_menu").await?;

    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Name required"));
    }
    if payload.price < 0.0 {
        return Err(AppError::validation("Price cannot be negative"));
    }
    if payload.ingredients.is_empty() {
        return Err(AppError::validation("Menu item needs at least one ingredient"));
    }
    validate_ingredients(&payload.ingredients)?;

    let store_id = auth.assigned_store(payload.store_id);

    let mut tx = state.db_pool.begin().await?;

    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "INSERT INTO menu_items (store_id, name, category, price, discount_percentage, image) \
         VALUES ($1, $2, $3, $4::FLOAT8, $5::FLOAT8, $6) \
         RETURNING {MENU_COLUMNS}"
    ))
    .bind(store_id)
    .bind(&payload.name)
    .bind(&payload.category)
    .bind(payload.price)
    .bind(payload.discount_percentage.unwrap_or(0.0))
    .bind(&payload.image)
    .fetch_one(&mut *tx)
    .await?;

    insert_ingredients(&mut tx, item.id, &payload.ingredients).await?;

    tx.commit().await?;

    let response = with_costing(&state.db_pool, item).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// PUT /menu/:id
#[instrument(skip(state, auth, payload))]
pub async fn update_menu_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateMenuRequest>,
) -> Result<Json<MenuItemResponse>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_menu").await?;

    let existing = fetch_menu_item(&state.db_pool, id).await?;

    if let Some(ingredients) = &payload.ingredients {
        validate_ingredients(ingredients)?;
    }

    let mut tx = state.db_pool.begin().await?;

    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "UPDATE menu_items SET name = $1, category = $2, price = $3::FLOAT8, \
         discount_percentage = $4::FLOAT8, image = $5 \
         WHERE id = $6 RETURNING {MENU_COLUMNS}"
    ))
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.category.unwrap_or(existing.category))
    .bind(payload.price.unwrap_or(existing.price))
    .bind(payload.discount_percentage.unwrap_or(existing.discount_percentage))
    .bind(payload.image.or(existing.image))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    // The recipe is replaced wholesale when ingredients are supplied.
    if let Some(ingredients) = &payload.ingredients {
        sqlx::query("DELETE FROM menu_ingredients WHERE menu_item_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_ingredients(&mut tx, id, ingredients).await?;
    }

    tx.commit().await?;

    Ok(Json(with_costing(&state.db_pool, item).await?))
}

// DELETE /menu/:id
pub async fn delete_menu_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_menu").await?;

    let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Menu item not found"));
    }

    Ok(Json(serde_json::json!({ "message": "Menu item deleted successfully" })))
}

fn validate_ingredients(ingredients: &[IngredientRequest]) -> Result<(), AppError> {
    for ingredient in ingredients {
        if ingredient.amount < 0.0 {
            return Err(AppError::validation("Ingredient amount cannot be negative"));
        }
    }
    Ok(())
}

async fn insert_ingredients(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    menu_item_id: i64,
    ingredients: &[IngredientRequest],
) -> Result<(), AppError> {
    for ingredient in ingredients {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM inventory_items WHERE id = $1",
        )
        .bind(ingredient.inventory_item_id)
        .fetch_optional(&mut **tx)
        .await?;
        if exists.is_none() {
            return Err(AppError::validation(format!(
                "Inventory item {} not found",
                ingredient.inventory_item_id
            )));
        }

        sqlx::query(
            "INSERT INTO menu_ingredients (menu_item_id, inventory_item_id, amount) \
             VALUES ($1, $2, $3::FLOAT8)",
        )
        .bind(menu_item_id)
        .bind(ingredient.inventory_item_id)
        .bind(ingredient.amount)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub(crate) async fn fetch_menu_item(pool: &PgPool, id: i64) -> Result<MenuItem, AppError> {
    sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {MENU_COLUMNS} FROM menu_items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Menu item not found"))
}

async fn load_ingredients(pool: &PgPool, menu_item_id: i64) -> Result<Vec<IngredientRow>, AppError> {
    let rows = sqlx::query_as::<_, IngredientRow>(
        "SELECT mi.inventory_item_id, ii.name AS inventory_item_name, \
                ii.type AS item_type, mi.amount::FLOAT8 AS amount, ii.unit, \
                ii.price_per_unit::FLOAT8 AS price_per_unit \
         FROM menu_ingredients mi \
         JOIN inventory_items ii ON ii.id = mi.inventory_item_id \
         WHERE mi.menu_item_id = $1 \
         ORDER BY mi.id",
    )
    .bind(menu_item_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Attach the derived costing figures (COGS, discounted price, profit,
/// margin) to a menu item.
async fn with_costing(pool: &PgPool, item: MenuItem) -> Result<MenuItemResponse, AppError> {
    let rows = load_ingredients(pool, item.id).await?;

    let cogs = recipe_cogs(
        &rows
            .iter()
            .map(|r| IngredientCost {
                amount: r.amount,
                item_type: r.item_type.clone(),
                price_per_unit: r.price_per_unit,
            })
            .collect::<Vec<_>>(),
    );
    let discounted_price = item.discounted_price();
    let profit = discounted_price - cogs;
    let margin = margin_percentage(discounted_price, cogs);

    let ingredients = rows
        .into_iter()
        .map(|r| MenuIngredientResponse {
            inventory_item_id: r.inventory_item_id,
            inventory_item_name: r.inventory_item_name,
            item_type: r.item_type,
            amount: r.amount,
            unit: r.unit,
            price_per_unit: r.price_per_unit,
        })
        .collect();

    Ok(MenuItemResponse {
        item,
        ingredients,
        discounted_price,
        cogs,
        profit,
        margin,
    })
}
