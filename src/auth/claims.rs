//! JWT claims and verification
//!
//! Tokens are issued by the account service and verified here with a shared
//! HS256 secret. This server never issues tokens.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID
    pub sub: String,

    /// Role: "admin" or "user"
    pub role: String,

    /// User email if available
    #[serde(default)]
    pub email: Option<String>,

    /// Expiry (unix seconds)
    pub exp: usize,
}

/// Decode and verify an HS256 bearer token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthContext, Role};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(role: &str) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            role: role.to_string(),
            email: Some("client@example.com".into()),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        }
    }

    #[test]
    fn valid_token_round_trips() {
        let original = claims("user");
        let token = sign(&original, SECRET);
        let verified = verify_token(&token, SECRET).unwrap();
        assert_eq!(verified.sub, original.sub);
        assert_eq!(verified.role, "user");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(&claims("user"), "other-secret");
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims("user");
        expired.exp = (chrono::Utc::now().timestamp() - 3600) as usize;
        let token = sign(&expired, SECRET);
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn context_maps_roles() {
        let ctx = AuthContext::from_claims(&claims("admin")).unwrap();
        assert_eq!(ctx.role, Role::Admin);

        let ctx = AuthContext::from_claims(&claims("user")).unwrap();
        assert_eq!(ctx.role, Role::User);

        assert!(AuthContext::from_claims(&claims("superuser")).is_err());
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let mut bad = claims("user");
        bad.sub = "not-a-uuid".into();
        assert!(AuthContext::from_claims(&bad).is_err());
    }
}
