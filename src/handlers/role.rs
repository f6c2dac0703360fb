// src/handlers/role.rs
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::instrument;
use crate::auth::permissions::{self, is_known_permission, PERMISSIONS, ROLES};
use crate::dtos::role::{
    PermissionInfo, RolesResponse, RoleWithPermissions, UpdateRolePermissionsRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

// Role grants are an admin-only surface; owners hold every permission
// anyway but do not get to edit the table.
fn require_role_editor(auth: &AuthContext) -> Result<(), AppError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Unauthorized"))
    }
}

// GET /roles
pub async fn list_roles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<RolesResponse>, AppError> {
    require_role_editor(&auth)?;

    let mut roles = Vec::with_capacity(ROLES.len());
    for role in ROLES {
        let granted = permissions::role_permissions(&state.db_pool, role).await?;
        roles.push(RoleWithPermissions {
            name: role.to_string(),
            permissions: granted,
        });
    }

    let available_permissions = PERMISSIONS
        .iter()
        .map(|p| PermissionInfo { key: p.key, label: p.label, group: p.group })
        .collect();

    Ok(Json(RolesResponse { roles, available_permissions }))
}

// PUT /roles/:role
#[instrument(skip(state, auth, payload))]
pub async fn update_role_permissions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(role): Path<String>,
    Json(payload): Json<UpdateRolePermissionsRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_role_editor(&auth)?;

    if !ROLES.contains(&role.as_str()) {
        return Err(AppError::validation("Invalid role"));
    }

    let mut tx = state.db_pool.begin().await?;

    sqlx::query("DELETE FROM role_permissions WHERE role = $1")
        .bind(&role)
        .execute(&mut *tx)
        .await?;

    // Unknown permission keys are silently dropped.
    for permission in payload.permissions.iter().filter(|p| is_known_permission(p)) {
        sqlx::query("INSERT INTO role_permissions (role, permission) VALUES ($1, $2)")
            .bind(&role)
            .bind(permission)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(%role, "Role permissions updated");

    Ok(Json(serde_json::json!({ "message": "Permissions updated successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: &str) -> AuthContext {
        AuthContext {
            user_id: 1,
            name: "Test".into(),
            role: role.into(),
            store_id: None,
        }
    }

    #[test]
    fn only_admins_may_edit_roles() {
        assert!(require_role_editor(&ctx("admin")).is_ok());
        assert!(require_role_editor(&ctx("owner")).is_err());
        assert!(require_role_editor(&ctx("karyawan")).is_err());
    }
}
