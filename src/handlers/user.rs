// src/handlers/user.rs
//
// Admin-level user administration, distinct from the per-store employee
// endpoints. Created users start without a store assignment.
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::QueryBuilder;
use tracing::instrument;
use crate::auth::permissions::ROLES;
use crate::dtos::user::{CreateUserRequest, UpdateUserRequest, UserListParams};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::user::User;
use crate::state::AppState;

const USER_COLUMNS: &str = "id, store_id, name, email, password_hash, role, positions, \
     salary_type, base_salary::FLOAT8 AS base_salary, bonus::FLOAT8 AS bonus, created_at";

fn require_admin(auth: &AuthContext) -> Result<(), AppError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Unauthorized"))
    }
}

// GET /users
#[instrument(skip(state, auth))]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<UserListParams>,
) -> Result<Json<Vec<User>>, AppError> {
    require_admin(&auth)?;

    let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!(
        "SELECT {USER_COLUMNS} FROM users WHERE 1=1"
    ));
    if let Some(role) = &params.role {
        qb.push(" AND role = ").push_bind(role.clone());
    }
    if let Some(search) = &params.search {
        qb.push(" AND (name ILIKE ")
            .push_bind(format!("%{search}%"))
            .push(" OR email ILIKE ")
            .push_bind(format!("%{search}%"))
            .push(")");
    }
    qb.push(" ORDER BY created_at DESC");

    let users: Vec<User> = qb.build_query_as().fetch_all(&state.db_pool).await?;
    Ok(Json(users))
}

// POST /users
#[instrument(skip(state, auth, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    require_admin(&auth)?;

    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::validation("Name and email are required"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation("Password must be at least 6 characters"));
    }
    if !ROLES.contains(&payload.role.as_str()) {
        return Err(AppError::validation("Invalid role"));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash, role) \
         VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(&payload.role)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::conflict("Email already exists")
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}

// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    require_admin(&auth)?;
    let user = fetch_user(&state.db_pool, id).await?;
    Ok(Json(user))
}

// PUT /users/:id
#[instrument(skip(state, auth, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    require_admin(&auth)?;

    let existing = fetch_user(&state.db_pool, id).await?;

    let role = payload.role.unwrap_or(existing.role);
    if !ROLES.contains(&role.as_str()) {
        return Err(AppError::validation("Invalid role"));
    }

    let password_hash = match payload.password {
        Some(password) if !password.is_empty() => {
            if password.len() < 6 {
                return Err(AppError::validation("Password must be at least 6 characters"));
            }
            bcrypt::hash(&password, bcrypt::DEFAULT_COST)
                .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?
        }
        _ => existing.password_hash,
    };

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET name = $1, email = $2, password_hash = $3, role = $4 \
         WHERE id = $5 RETURNING {USER_COLUMNS}"
    ))
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.email.unwrap_or(existing.email))
    .bind(&password_hash)
    .bind(&role)
    .bind(id)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::conflict("Email already exists")
        }
        _ => AppError::from(e),
    })?;

    Ok(Json(user))
}

// DELETE /users/:id
#[instrument(skip(state, auth))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&auth)?;

    if id == auth.user_id {
        return Err(AppError::validation("Cannot delete yourself"));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("User not found"));
    }

    Ok(Json(serde_json::json!({ "message": "User deleted successfully" })))
}

async fn fetch_user(pool: &sqlx::PgPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}
