// src/handlers/employee.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use bcrypt::{hash, DEFAULT_COST};
use chrono::{Datelike, Utc};
use sqlx::QueryBuilder;
use tracing::instrument;
use crate::auth::permissions::{has_permission, require_permission};
use crate::dtos::employee::{
    CreateEmployeeRequest, EmployeeListParams, EmployeeResponse, SalaryBreakdownResponse,
    SalaryParams, UpdateEmployeeRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::user::{days_in_month, User, AUTO_DAILY_RATE};
use crate::state::AppState;

const USER_COLUMNS: &str = "id, store_id, name, email, password_hash, role, positions, \
     salary_type, base_salary::FLOAT8 AS base_salary, bonus::FLOAT8 AS bonus, created_at";

fn salary_response(user: User) -> EmployeeResponse {
    let now = Utc::now();
    let monthly_salary = user.monthly_salary(now.year(), now.month());
    EmployeeResponse { user, monthly_salary }
}

fn validate_role(role: &str) -> Result<(), AppError> {
    if !matches!(role, "admin" | "owner" | "karyawan") {
        return Err(AppError::validation("Role must be admin, owner or karyawan"));
    }
    Ok(())
}

fn validate_salary_type(salary_type: &str, base_salary: Option<f64>) -> Result<(), AppError> {
    match salary_type {
        "manual" => {
            if base_salary.is_none() {
                return Err(AppError::validation("Base salary required for manual salary type"));
            }
            Ok(())
        }
        "auto" => Ok(()),
        _ => Err(AppError::validation("Salary type must be auto or manual")),
    }
}

fn map_email_conflict(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            AppError::conflict("Email already exists")
        }
        other => other.into(),
    }
}

// GET /employees
#[instrument(skip(state, auth))]
pub async fn list_employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<EmployeeListParams>,
) -> Result<Json<Vec<EmployeeResponse>>, AppError> {
    if !has_permission(&state.db_pool, &auth, "manage_employees").await?
        && !has_permission(&state.db_pool, &auth, "view_reports").await?
    {
        return Err(AppError::forbidden("Unauthorized"));
    }

    let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!(
        "SELECT {USER_COLUMNS} FROM users WHERE 1=1"
    ));

    if let Some(role) = params.role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(position) = params.position {
        qb.push(" AND positions @> ").push_bind(sqlx::types::Json(vec![position]));
    }
    if let Some(store_id) = auth.store_scope(params.store_id) {
        qb.push(" AND store_id = ").push_bind(store_id);
    }
    qb.push(" ORDER BY created_at DESC");

    let employees: Vec<User> = qb.build_query_as().fetch_all(&state.db_pool).await?;

    Ok(Json(employees.into_iter().map(salary_response).collect()))
}

// POST /employees
#[instrument(skip(state, auth, payload))]
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeResponse>), AppError> {
    require_permission(&state.db_pool, &auth, "manage_employees").await?;

    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Name required"));
    }
    if payload.password.len() < 8 {
        return Err(AppError::validation("Password must be at least 8 characters"));
    }
    validate_role(&payload.role)?;
    validate_salary_type(&payload.salary_type, payload.base_salary)?;

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;
    let store_id = auth.assigned_store(payload.store_id);

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users \
         (store_id, name, email, password_hash, role, positions, salary_type, base_salary, bonus) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8::FLOAT8, $9::FLOAT8) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(store_id)
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(&payload.role)
    .bind(payload.positions.map(sqlx::types::Json))
    .bind(&payload.salary_type)
    .bind(payload.base_salary)
    .bind(payload.bonus.unwrap_or(0.0))
    .fetch_one(&state.db_pool)
    .await
    .map_err(map_email_conflict)?;

    Ok((StatusCode::CREATED, Json(salary_response(user))))
}

// GET /employees/:id
pub async fn get_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<EmployeeResponse>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_employees").await?;
    let user = fetch_user(&state.db_pool, id).await?;
    Ok(Json(salary_response(user)))
}

// PUT /employees/:id
#[instrument(skip(state, auth, payload))]
pub async fn update_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_employees").await?;

    let existing = fetch_user(&state.db_pool, id).await?;

    let role = payload.role.unwrap_or(existing.role);
    validate_role(&role)?;
    let salary_type = payload.salary_type.unwrap_or(existing.salary_type);
    let base_salary = payload.base_salary.or(existing.base_salary);
    validate_salary_type(&salary_type, base_salary)?;

    let password_hash = match payload.password {
        Some(password) => {
            if password.len() < 8 {
                return Err(AppError::validation("Password must be at least 8 characters"));
            }
            hash(&password, DEFAULT_COST)
                .map_err(|e| AppError::internal(format!("Hash error: {e}")))?
        }
        None => existing.password_hash,
    };

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET \
         name = $1, email = $2, password_hash = $3, role = $4, positions = $5, \
         salary_type = $6, base_salary = $7::FLOAT8, bonus = $8::FLOAT8, store_id = $9 \
         WHERE id = $10 RETURNING {USER_COLUMNS}"
    ))
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.email.unwrap_or(existing.email))
    .bind(&password_hash)
    .bind(&role)
    .bind(payload.positions.map(sqlx::types::Json).or(existing.positions))
    .bind(&salary_type)
    .bind(base_salary)
    .bind(payload.bonus.unwrap_or(existing.bonus))
    .bind(payload.store_id.or(existing.store_id))
    .bind(id)
    .fetch_one(&state.db_pool)
    .await
    .map_err(map_email_conflict)?;

    Ok(Json(salary_response(user)))
}

// DELETE /employees/:id
pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_employees").await?;

    if id == auth.user_id {
        return Err(AppError::validation("Cannot delete yourself"));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Employee not found"));
    }

    Ok(Json(serde_json::json!({ "message": "Employee deleted successfully" })))
}

// GET /employees/:id/salary
pub async fn calculate_salary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Query(params): Query<SalaryParams>,
) -> Result<Json<SalaryBreakdownResponse>, AppError> {
    require_permission(&state.db_pool, &auth, "manage_employees").await?;

    let user = fetch_user(&state.db_pool, id).await?;

    let now = Utc::now();
    let month = params.month.unwrap_or(now.month());
    let year = params.year.unwrap_or(now.year());
    let days = days_in_month(year, month)
        .ok_or_else(|| AppError::validation("Month must be between 1 and 12"))?;

    let total_salary = user.monthly_salary(year, month);
    let is_manual = user.salary_type == "manual";

    Ok(Json(SalaryBreakdownResponse {
        employee: user.name,
        month,
        year,
        salary_type: user.salary_type,
        base_salary: if is_manual { user.base_salary } else { None },
        auto_calculation: if is_manual { None } else { Some(days as f64 * AUTO_DAILY_RATE) },
        bonus: user.bonus,
        total_salary,
    }))
}

async fn fetch_user(pool: &sqlx::PgPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))
}
