// src/handlers/order.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::{PgPool, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use crate::dtos::order::{
    CancelOrderResponse, CreateOrderRequest, OrderItemResponse, OrderListParams, OrderResponse,
    SalesReportResponse,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::menu::{discounted_price, recipe_cogs, IngredientCost};
use crate::models::order::{change_due, order_totals, CheckoutLine, Order};
use crate::state::AppState;

const ORDER_COLUMNS: &str = "id, store_id, user_id, customer_name, \
     total::FLOAT8 AS total, cogs::FLOAT8 AS cogs, profit::FLOAT8 AS profit, \
     payment_method, order_type, paid_amount::FLOAT8 AS paid_amount, \
     change_amount::FLOAT8 AS change_amount, daily_number, status, created_at";

#[derive(sqlx::FromRow)]
struct CheckoutIngredientRow {
    inventory_item_id: i64,
    name: String,
    item_type: String,
    amount: f64,
    current_stock: Option<f64>,
    price_per_unit: Option<f64>,
}

// POST /orders
#[instrument(skip(state, auth, req))]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::validation("Order must contain at least one item"));
    }
    if !matches!(req.payment_method.as_str(), "cash" | "card" | "qris") {
        return Err(AppError::validation("Payment method must be cash, card or qris"));
    }
    if !matches!(req.order_type.as_str(), "dine_in" | "takeaway") {
        return Err(AppError::validation("Order type must be dine_in or takeaway"));
    }
    if req.paid_amount.is_some_and(|p| p < 0.0) {
        return Err(AppError::validation("Paid amount cannot be negative"));
    }

    let store_id = auth.assigned_store(req.store_id);

    let mut tx = state.db_pool.begin().await?;

    // Per-store, per-day receipt number from an atomic upsert counter, so
    // concurrent checkouts can never draw the same number.
    let daily_number: i64 = sqlx::query_scalar(
        "INSERT INTO order_daily_counters (store_key, counter_date, last_number) \
         VALUES ($1, CURRENT_DATE, 1) \
         ON CONFLICT (store_key, counter_date) \
         DO UPDATE SET last_number = order_daily_counters.last_number + 1 \
         RETURNING last_number",
    )
    .bind(store_id.unwrap_or(0))
    .fetch_one(&mut *tx)
    .await?;

    let mut lines: Vec<CheckoutLine> = Vec::with_capacity(req.items.len());
    let mut item_rows: Vec<(i64, i32, f64)> = Vec::with_capacity(req.items.len());

    for item in &req.items {
        if item.quantity < 1 {
            return Err(AppError::validation("Quantity must be at least 1"));
        }

        let menu_item = sqlx::query_as::<_, (i64, String, f64, f64)>(
            "SELECT id, name, price::FLOAT8, discount_percentage::FLOAT8 \
             FROM menu_items WHERE id = $1",
        )
        .bind(item.menu_item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu item {} not found", item.menu_item_id)))?;

        let ingredients = sqlx::query_as::<_, CheckoutIngredientRow>(
            "SELECT mi.inventory_item_id, ii.name, ii.type AS item_type, \
                    mi.amount::FLOAT8 AS amount, ii.current_stock::FLOAT8 AS current_stock, \
                    ii.price_per_unit::FLOAT8 AS price_per_unit \
             FROM menu_ingredients mi \
             JOIN inventory_items ii ON ii.id = mi.inventory_item_id \
             WHERE mi.menu_item_id = $1",
        )
        .bind(menu_item.0)
        .fetch_all(&mut *tx)
        .await?;

        for ingredient in &ingredients {
            if ingredient.item_type != "stock" {
                continue;
            }
            let required = ingredient.amount * item.quantity as f64;
            if ingredient.current_stock.unwrap_or(0.0) < required {
                return Err(AppError::validation(format!(
                    "Insufficient stock for {}",
                    ingredient.name
                )));
            }

            // The decrement is guarded at the database as well, so a
            // concurrent checkout racing past the check above still cannot
            // drive stock negative.
            let updated = sqlx::query(
                "UPDATE inventory_items \
                 SET current_stock = current_stock - $2::FLOAT8 \
                 WHERE id = $1 AND current_stock >= $2::FLOAT8",
            )
            .bind(ingredient.inventory_item_id)
            .bind(required)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::validation(format!(
                    "Insufficient stock for {}",
                    ingredient.name
                )));
            }
        }

        // Price and COGS are frozen at sale time; later menu or ingredient
        // price changes must not reach back into this order.
        let price = discounted_price(menu_item.2, menu_item.3);
        let unit_cogs = recipe_cogs(
            &ingredients
                .iter()
                .map(|r| IngredientCost {
                    amount: r.amount,
                    item_type: r.item_type.clone(),
                    price_per_unit: r.price_per_unit,
                })
                .collect::<Vec<_>>(),
        );

        lines.push(CheckoutLine { price, unit_cogs, quantity: item.quantity });
        item_rows.push((menu_item.0, item.quantity, price));
    }

    let totals = order_totals(&lines);
    let change_amount = change_due(req.paid_amount, totals.total);

    let order = sqlx::query_as::<_, Order>(&format!(
        "INSERT INTO orders \
         (store_id, user_id, customer_name, total, cogs, profit, payment_method, \
          order_type, paid_amount, change_amount, daily_number, status) \
         VALUES ($1, $2, $3, $4::FLOAT8, $5::FLOAT8, $6::FLOAT8, $7, $8, \
                 $9::FLOAT8, $10::FLOAT8, $11, 'completed') \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(store_id)
    .bind(auth.user_id)
    .bind(&req.customer_name)
    .bind(totals.total)
    .bind(totals.cogs)
    .bind(totals.profit)
    .bind(&req.payment_method)
    .bind(&req.order_type)
    .bind(req.paid_amount)
    .bind(change_amount)
    .bind(daily_number)
    .fetch_one(&mut *tx)
    .await?;

    for (menu_item_id, quantity, price) in &item_rows {
        sqlx::query(
            "INSERT INTO order_items (order_id, menu_item_id, quantity, price) \
             VALUES ($1, $2, $3, $4::FLOAT8)",
        )
        .bind(order.id)
        .bind(menu_item_id)
        .bind(quantity)
        .bind(price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(order_id = order.id, daily_number, total = totals.total, "Order placed");

    let response = fetch_order(&state.db_pool, order.id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// GET /orders
#[instrument(skip(state, auth))]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE 1=1"
    ));
    push_order_filters(&mut qb, &auth, &params);
    qb.push(" ORDER BY created_at DESC");

    let orders: Vec<Order> = qb.build_query_as().fetch_all(&state.db_pool).await?;
    let mut items_by_order = load_items(&state.db_pool, orders.iter().map(|o| o.id).collect()).await?;

    Ok(Json(
        orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                OrderResponse { order, items }
            })
            .collect(),
    ))
}

// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, AppError> {
    let response = fetch_order(&state.db_pool, id).await?;

    // Cashiers only see their own orders.
    if auth.is_karyawan() && response.order.user_id != auth.user_id {
        return Err(AppError::forbidden("Unauthorized"));
    }

    Ok(Json(response))
}

// GET /orders/report/sales
#[instrument(skip(state, auth))]
pub async fn sales_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<SalesReportResponse>, AppError> {
    // Statistics cover completed orders only; the status filter from the
    // query string is ignored here.
    let mut qb = QueryBuilder::<sqlx::Postgres>::new(
        "SELECT COUNT(*), COALESCE(SUM(total), 0)::FLOAT8, \
                COALESCE(SUM(cogs), 0)::FLOAT8, COALESCE(SUM(profit), 0)::FLOAT8 \
         FROM orders WHERE status = 'completed'",
    );
    let params = OrderListParams { status: None, ..params };
    push_order_filters(&mut qb, &auth, &params);

    let (total_orders, total_sales, total_cogs, total_profit): (i64, f64, f64, f64) =
        qb.build_query_as().fetch_one(&state.db_pool).await?;

    let profit_margin = if total_sales > 0.0 {
        total_profit / total_sales * 100.0
    } else {
        0.0
    };

    Ok(Json(SalesReportResponse {
        total_orders,
        total_sales,
        total_cogs,
        total_profit,
        profit_margin,
    }))
}

// DELETE /orders/:id - soft cancel, restores consumed stock
#[instrument(skip(state))]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CancelOrderResponse>, AppError> {
    let mut tx = state.db_pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("Order not found"))?;

    if order.status == "cancelled" {
        return Err(AppError::validation("Order is already cancelled"));
    }

    // Give back every stock-type ingredient the order consumed.
    let restocks = sqlx::query_as::<_, (i64, f64)>(
        "SELECT mi.inventory_item_id, (mi.amount * oi.quantity)::FLOAT8 \
         FROM order_items oi \
         JOIN menu_ingredients mi ON mi.menu_item_id = oi.menu_item_id \
         JOIN inventory_items ii ON ii.id = mi.inventory_item_id \
         WHERE oi.order_id = $1 AND ii.type = 'stock'",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    for (inventory_item_id, quantity) in restocks {
        sqlx::query(
            "UPDATE inventory_items SET current_stock = current_stock + $2::FLOAT8 WHERE id = $1",
        )
        .bind(inventory_item_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;
    }

    // The row stays for audit; totals keep their values at sale time.
    sqlx::query("UPDATE orders SET status = 'cancelled' WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(order_id = id, "Order cancelled, inventory restored");

    let response = fetch_order(&state.db_pool, id).await?;
    Ok(Json(CancelOrderResponse {
        message: "Order cancelled successfully and inventory restored",
        order: response,
    }))
}

fn push_order_filters(
    qb: &mut QueryBuilder<'_, sqlx::Postgres>,
    auth: &AuthContext,
    params: &OrderListParams,
) {
    if let Some(status) = &params.status {
        qb.push(" AND status = ").push_bind(status.clone());
    }
    if auth.is_karyawan() {
        // Cashiers are restricted to their own orders regardless of filters.
        qb.push(" AND user_id = ").push_bind(auth.user_id);
    } else if let Some(user_id) = params.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(store_id) = auth.store_scope(params.store_id) {
        qb.push(" AND store_id = ").push_bind(store_id);
    }
    if let Some(start) = params.start_date {
        qb.push(" AND created_at::date >= ").push_bind(start);
    }
    if let Some(end) = params.end_date {
        qb.push(" AND created_at::date <= ").push_bind(end);
    }
}

async fn load_items(
    pool: &PgPool,
    order_ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<OrderItemResponse>>, AppError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (i64, i64, String, i32, f64)>(
        "SELECT oi.order_id, oi.menu_item_id, m.name, oi.quantity, oi.price::FLOAT8 \
         FROM order_items oi \
         JOIN menu_items m ON m.id = oi.menu_item_id \
         WHERE oi.order_id = ANY($1) \
         ORDER BY oi.id",
    )
    .bind(&order_ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<i64, Vec<OrderItemResponse>> = HashMap::new();
    for (order_id, menu_item_id, menu_item_name, quantity, price) in rows {
        by_order.entry(order_id).or_default().push(OrderItemResponse {
            menu_item_id,
            menu_item_name,
            quantity,
            price,
            line_total: price * quantity as f64,
        });
    }

    Ok(by_order)
}

pub(crate) async fn fetch_order(pool: &PgPool, id: i64) -> Result<OrderResponse, AppError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Order not found"))?;

    let mut items_by_order = load_items(pool, vec![order.id]).await?;
    let items = items_by_order.remove(&order.id).unwrap_or_default();

    Ok(OrderResponse { order, items })
}
