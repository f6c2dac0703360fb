use axum::{response::{Response, IntoResponse}};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use serde::Serialize;
use crate::auth::jwt::verify_token;
use crate::state::AppState;

/// The resolved current user, attached to every authenticated request.
/// Role and store assignment are re-read from the database on each request
/// so that permission or store changes take effect without re-login.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: i64,
    pub name: String,
    pub role: String,
    pub store_id: Option<i64>,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn is_owner(&self) -> bool {
        self.role == "owner"
    }

    pub fn is_karyawan(&self) -> bool {
        self.role == "karyawan"
    }

    /// Store filter for read queries. Admins may scope to any requested
    /// store (or none for a cross-store view); everyone else is pinned to
    /// their own store.
    pub fn store_scope(&self, requested: Option<i64>) -> Option<i64> {
        if self.is_admin() {
            requested
        } else {
            self.store_id
        }
    }

    /// Store assignment for new rows: an explicit store wins, otherwise the
    /// creator's own store.
    pub fn assigned_store(&self, requested: Option<i64>) -> Option<i64> {
        requested.or(self.store_id)
    }
}

#[derive(Serialize)]
struct ErrorBody { error: String, code: &'static str }

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_header = match req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return unauthorized("Missing Authorization header"),
    };

    // Expect "Bearer <token>"
    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return unauthorized("Invalid Authorization format"),
    };

    let secret = match std::env::var("JWT_SECRET") {
        Ok(s) => s,
        Err(_) => return unauthorized("Server auth misconfiguration"),
    };

    let claims = match verify_token(token, &secret) {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    let user = match sqlx::query_as::<_, (i64, String, String, Option<i64>)>(
        "SELECT id, name, role, store_id FROM users WHERE id = $1",
    )
    .bind(claims.sub)
    .fetch_optional(&state.db_pool)
    .await
    {
        Ok(Some(u)) => u,
        Ok(None) => return unauthorized("User no longer exists"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve current user");
            return unauthorized("Could not resolve user");
        }
    };

    req.extensions_mut().insert(AuthContext {
        user_id: user.0,
        name: user.1,
        role: user.2,
        store_id: user.3,
    });

    next.run(req).await
}

fn unauthorized(msg: &str) -> Response {
    let body = axum::Json(ErrorBody { error: msg.to_string(), code: "unauthorized" });
    (StatusCode::UNAUTHORIZED, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: &str, store_id: Option<i64>) -> AuthContext {
        AuthContext {
            user_id: 1,
            name: "Test".into(),
            role: role.into(),
            store_id,
        }
    }

    #[test]
    fn admin_scope_follows_the_request() {
        let admin = ctx("admin", None);
        assert_eq!(admin.store_scope(Some(7)), Some(7));
        assert_eq!(admin.store_scope(None), None);
    }

    #[test]
    fn non_admins_are_pinned_to_their_store() {
        let owner = ctx("owner", Some(3));
        assert_eq!(owner.store_scope(Some(7)), Some(3));
        assert_eq!(owner.store_scope(None), Some(3));

        let kasir = ctx("karyawan", None);
        assert_eq!(kasir.store_scope(Some(7)), None);
    }

    #[test]
    fn new_rows_default_to_the_creators_store() {
        let owner = ctx("owner", Some(3));
        assert_eq!(owner.assigned_store(None), Some(3));
        assert_eq!(owner.assigned_store(Some(9)), Some(9));
    }
}
