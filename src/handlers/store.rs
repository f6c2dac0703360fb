// src/handlers/store.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;
use crate::auth::permissions::has_permission;
use crate::dtos::store::{
    CreateStoreRequest, OwnerSummary, StoreListParams, StoreResponse, UpdateStoreRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::store::Store;
use crate::state::AppState;

const STORE_COLUMNS: &str = "id, name, location, owner_id, image, created_at";

fn require_admin(auth: &AuthContext) -> Result<(), AppError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Unauthorized"))
    }
}

// GET /store - the current user's store
pub async fn show_own_store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<StoreResponse>, AppError> {
    let store_id = auth
        .store_id
        .ok_or_else(|| AppError::not_found("No store associated"))?;
    let response = fetch_store(&state.db_pool, store_id).await?;
    Ok(Json(response))
}

// POST /store - create a store, the creator becomes its owner
#[instrument(skip(state, auth, payload))]
pub async fn create_store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreResponse>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Name required"));
    }

    let already_owns = sqlx::query_scalar::<_, i64>("SELECT id FROM stores WHERE owner_id = $1")
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?;
    if already_owns.is_some() {
        return Err(AppError::validation("User already owns a store"));
    }

    let mut tx = state.db_pool.begin().await?;

    let store = sqlx::query_as::<_, Store>(&format!(
        "INSERT INTO stores (name, location, owner_id, image) \
         VALUES ($1, $2, $3, $4) RETURNING {STORE_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(&payload.location)
    .bind(auth.user_id)
    .bind(&payload.image)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET store_id = $1 WHERE id = $2")
        .bind(store.id)
        .bind(auth.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let response = fetch_store(&state.db_pool, store.id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// PUT /store - update the current user's store
#[instrument(skip(state, auth, payload))]
pub async fn update_own_store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateStoreRequest>,
) -> Result<Json<StoreResponse>, AppError> {
    let store_id = auth
        .store_id
        .ok_or_else(|| AppError::not_found("No store found"))?;

    if !auth.is_owner() && !has_permission(&state.db_pool, &auth, "manage_capital").await? {
        return Err(AppError::forbidden("Unauthorized"));
    }

    update_store_row(&state.db_pool, store_id, payload).await?;

    let response = fetch_store(&state.db_pool, store_id).await?;
    Ok(Json(response))
}

// GET /stores-management (admin)
#[instrument(skip(state, auth))]
pub async fn list_stores(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<StoreListParams>,
) -> Result<Json<Vec<StoreResponse>>, AppError> {
    require_admin(&auth)?;

    let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE 1=1"
    ));
    if let Some(search) = &params.search {
        qb.push(" AND (name ILIKE ")
            .push_bind(format!("%{search}%"))
            .push(" OR location ILIKE ")
            .push_bind(format!("%{search}%"))
            .push(")");
    }
    qb.push(" ORDER BY created_at DESC");

    let stores: Vec<Store> = qb.build_query_as().fetch_all(&state.db_pool).await?;

    let mut responses = Vec::with_capacity(stores.len());
    for store in stores {
        responses.push(decorate(&state.db_pool, store).await?);
    }

    Ok(Json(responses))
}

// GET /stores-management/:id (admin)
pub async fn get_store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<StoreResponse>, AppError> {
    require_admin(&auth)?;
    let response = fetch_store(&state.db_pool, id).await?;
    Ok(Json(response))
}

// PUT /stores-management/:id (admin)
pub async fn update_store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStoreRequest>,
) -> Result<Json<StoreResponse>, AppError> {
    require_admin(&auth)?;
    update_store_row(&state.db_pool, id, payload).await?;
    let response = fetch_store(&state.db_pool, id).await?;
    Ok(Json(response))
}

// DELETE /stores-management/:id (admin)
#[instrument(skip(state, auth))]
pub async fn delete_store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&auth)?;

    let users_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE store_id = $1",
    )
    .bind(id)
    .fetch_one(&state.db_pool)
    .await?;

    if users_count > 0 {
        return Err(AppError::validation(
            "Cannot delete store with active users. Please reassign users first.",
        ));
    }

    let result = sqlx::query("DELETE FROM stores WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Store not found"));
    }

    Ok(Json(serde_json::json!({ "message": "Store deleted successfully" })))
}

// GET /stores-management/available/owners (admin)
pub async fn available_owners(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<OwnerSummary>>, AppError> {
    require_admin(&auth)?;

    let owners = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, name, email FROM users WHERE role = 'owner' AND store_id IS NULL",
    )
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(
        owners
            .into_iter()
            .map(|(id, name, email)| OwnerSummary { id, name, email })
            .collect(),
    ))
}

async fn update_store_row(
    pool: &PgPool,
    id: i64,
    payload: UpdateStoreRequest,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE stores SET \
         name = COALESCE($1, name), location = COALESCE($2, location), \
         image = COALESCE($3, image) WHERE id = $4",
    )
    .bind(payload.name)
    .bind(payload.location)
    .bind(payload.image)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Store not found"));
    }
    Ok(())
}

async fn decorate(pool: &PgPool, store: Store) -> Result<StoreResponse, AppError> {
    let owner = match store.owner_id {
        Some(owner_id) => sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, email FROM users WHERE id = $1",
        )
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .map(|(id, name, email)| OwnerSummary { id, name, email }),
        None => None,
    };

    let users_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE store_id = $1",
    )
    .bind(store.id)
    .fetch_one(pool)
    .await?;

    Ok(StoreResponse { store, owner, users_count })
}

async fn fetch_store(pool: &PgPool, id: i64) -> Result<StoreResponse, AppError> {
    let store = sqlx::query_as::<_, Store>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Store not found"))?;

    decorate(pool, store).await
}
