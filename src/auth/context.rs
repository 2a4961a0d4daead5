use super::Claims;
use uuid::Uuid;

/// Party on whose behalf a request is made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Authenticated user context extracted from the JWT.
/// This is attached to request extensions after successful auth.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID (from JWT sub claim)
    pub user_id: Uuid,

    /// Caller role
    pub role: Role,

    /// User email if available
    pub email: Option<String>,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;

        let role = match claims.role.as_str() {
            "admin" => Role::Admin,
            "user" => Role::User,
            _ => return Err("Unknown role in token"),
        };

        Ok(Self {
            user_id,
            role,
            email: claims.email.clone(),
        })
    }
}
