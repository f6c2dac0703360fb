use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct RoleWithPermissions {
    pub name: String,
    pub permissions: Vec<String>,
}

#[derive(Serialize)]
pub struct PermissionInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub group: &'static str,
}

#[derive(Serialize)]
pub struct RolesResponse {
    pub roles: Vec<RoleWithPermissions>,
    pub available_permissions: Vec<PermissionInfo>,
}

#[derive(Deserialize)]
pub struct UpdateRolePermissionsRequest {
    pub permissions: Vec<String>,
}
