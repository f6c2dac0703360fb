use axum::{extract::State, Extension, Json};
use bcrypt::verify;
use crate::auth::jwt::sign_token;
use crate::auth::permissions::{self, PERMISSIONS};
use crate::dtos::auth::{LoginRequest, LoginResponse, ProfileResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::user::User;
use crate::state::AppState;

const USER_COLUMNS: &str = "id, store_id, name, email, password_hash, role, positions, \
     salary_type, base_salary::FLOAT8 AS base_salary, bonus::FLOAT8 AS bonus, created_at";

pub async fn login(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::validation("Email required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let user = sqlx::query_as::<_, User>(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"),
    )
    .bind(&payload.email)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    let ok = verify(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;
    if !ok {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::internal("JWT secret not configured"))?;
    let token = sign_token(user.id, &user.role, &user.email, &secret)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
        expires_in_seconds: 8 * 60 * 60,
    }))
}

/// Current user profile with the effective permission set resolved.
pub async fn me(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"),
    )
    .bind(auth.user_id)
    .fetch_one(&db_pool)
    .await?;

    // Owners hold every permission regardless of the table contents.
    let effective = if user.role == "owner" {
        PERMISSIONS.iter().map(|p| p.key.to_string()).collect()
    } else {
        permissions::role_permissions(&db_pool, &user.role).await?
    };

    Ok(Json(ProfileResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        positions: user.positions.map(|p| p.0).unwrap_or_default(),
        store_id: user.store_id,
        permissions: effective,
    }))
}
