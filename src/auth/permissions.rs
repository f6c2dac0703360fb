use sqlx::PgPool;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;

pub const ROLES: &[&str] = &["owner", "admin", "karyawan"];

pub struct PermissionDef {
    pub key: &'static str,
    pub label: &'static str,
    pub group: &'static str,
}

/// Catalog of every assignable permission. Role grants outside this list
/// are dropped on update.
pub const PERMISSIONS: &[PermissionDef] = &[
    PermissionDef { key: "view_dashboard", label: "Lihat Dashboard", group: "Dashboard" },
    PermissionDef { key: "manage_inventory", label: "Kelola Inventori (Stok & Alat)", group: "Inventori" },
    PermissionDef { key: "view_inventory", label: "Lihat Inventori", group: "Inventori" },
    PermissionDef { key: "manage_menu", label: "Kelola Menu", group: "Menu" },
    PermissionDef { key: "view_menu", label: "Lihat Menu", group: "Menu" },
    PermissionDef { key: "manage_orders", label: "Akses POS (Buat Transaksi)", group: "Transaksi" },
    PermissionDef { key: "view_reports", label: "Lihat Laporan", group: "Laporan" },
    PermissionDef { key: "manage_employees", label: "Kelola Karyawan & Gaji", group: "Karyawan" },
    PermissionDef { key: "manage_capital", label: "Kelola Modal & Analisis", group: "Keuangan" },
    PermissionDef { key: "delete_transactions", label: "Hapus Data Transaksi", group: "Bahaya" },
];

pub fn is_known_permission(key: &str) -> bool {
    PERMISSIONS.iter().any(|p| p.key == key)
}

/// The owner role is granted everything unconditionally, regardless of what
/// the role_permissions table holds. Everyone else needs an explicit grant.
pub fn role_grants(role: &str, permission: &str, granted: &[String]) -> bool {
    if role == "owner" {
        return true;
    }
    granted.iter().any(|p| p == permission)
}

pub async fn role_permissions(pool: &PgPool, role: &str) -> Result<Vec<String>, AppError> {
    let granted = sqlx::query_scalar::<_, String>(
        "SELECT permission FROM role_permissions WHERE role = $1 ORDER BY permission",
    )
    .bind(role)
    .fetch_all(pool)
    .await?;

    Ok(granted)
}

pub async fn has_permission(pool: &PgPool, auth: &AuthContext, permission: &str) -> Result<bool, AppError> {
    if auth.role == "owner" {
        return Ok(true);
    }
    let granted = role_permissions(pool, &auth.role).await?;
    Ok(role_grants(&auth.role, permission, &granted))
}

pub async fn require_permission(pool: &PgPool, auth: &AuthContext, permission: &str) -> Result<(), AppError> {
    if has_permission(pool, auth, permission).await? {
        Ok(())
    } else {
        Err(AppError::forbidden("Unauthorized"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(perms: &[&str]) -> Vec<String> {
        perms.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn owner_bypasses_the_table() {
        assert!(role_grants("owner", "manage_capital", &[]));
        assert!(role_grants("owner", "delete_transactions", &granted(&["view_menu"])));
    }

    #[test]
    fn other_roles_need_an_explicit_grant() {
        let perms = granted(&["view_menu", "manage_orders"]);
        assert!(role_grants("karyawan", "manage_orders", &perms));
        assert!(!role_grants("karyawan", "manage_capital", &perms));
        assert!(!role_grants("admin", "manage_capital", &[]));
    }

    #[test]
    fn catalog_rejects_unknown_keys() {
        assert!(is_known_permission("manage_menu"));
        assert!(!is_known_permission("manage_everything"));
    }
}
