//! Admin authentication middleware for JWT token validation

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{error::AdminError, state::AppState};

/// Roles allowed to call the admin routes
pub const ADMIN_ROLES: &[&str] = &["admin", "superadmin"];

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// User roles
    pub roles: Vec<String>,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated admin information
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: i64,
    pub roles: Vec<String>,
}

/// Validate a bearer token and require an admin role
pub fn authorize(token: &str, secret: &str) -> Result<AdminUser, AdminError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| {
            error!("Failed to validate token: {}", e);
            AdminError::Unauthorized
        })?;

    let claims = token_data.claims;
    if !claims
        .roles
        .iter()
        .any(|role| ADMIN_ROLES.contains(&role.as_str()))
    {
        error!("User {} lacks an admin role", claims.sub);
        return Err(AdminError::Unauthorized);
    }

    Ok(AdminUser {
        id: claims.sub,
        roles: claims.roles,
    })
}

/// Authentication middleware
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AdminError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AdminError::Unauthorized)?;

    let admin = authorize(token, &state.config.jwt_secret)?;

    req.extensions_mut().insert(admin);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(roles: &[&str], secret: &str, ttl: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            iat: now as u64,
            exp: (now + ttl) as u64,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_admin_token_is_accepted() {
        let admin = authorize(&token(&["admin"], "secret", 600), "secret").unwrap();
        assert_eq!(admin.id, 1);
        assert_eq!(admin.roles, vec!["admin".to_string()]);
    }

    #[test]
    fn test_non_admin_role_is_rejected() {
        let result = authorize(&token(&["translator"], "secret", 600), "secret");
        assert!(matches!(result, Err(AdminError::Unauthorized)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let result = authorize(&token(&["superadmin"], "secret", 600), "other");
        assert!(matches!(result, Err(AdminError::Unauthorized)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let result = authorize(&token(&["admin"], "secret", -3600), "secret");
        assert!(matches!(result, Err(AdminError::Unauthorized)));
    }
}
