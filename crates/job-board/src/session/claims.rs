use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Role, UserId};

/// Claims the backend puts into its bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "userRole")]
    pub user_role: String,
    /// Expiry as Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

impl TokenClaims {
    pub fn role(&self) -> Result<Role, TokenError> {
        Role::parse(&self.user_role).ok_or_else(|| TokenError::UnknownRole(self.user_role.clone()))
    }

    /// A token without `exp` never expires client-side; the backend still decides.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp < now.timestamp())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
    #[error("token carries unknown role '{0}'")]
    UnknownRole(String),
    #[error("token expired")]
    Expired,
}

/// Reads the claims without checking the signature. The signing key stays with
/// the backend, which verifies every request anyway.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let header = decode_header(token)?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) fn token_for(user_id: i64, role: &str, exp: Option<i64>) -> String {
        let claims = TokenClaims {
            user_id: UserId(user_id),
            user_role: role.to_string(),
            exp,
            sub: Some(format!("user-{user_id}@example.com")),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"backend-only-secret"),
        )
        .expect("token encodes")
    }

    #[test]
    fn decodes_claims_signed_with_unknown_key() {
        let exp = Utc::now().timestamp() + 3600;
        let claims = decode_claims(&token_for(42, "EMPLOYER", Some(exp))).expect("decodes");

        assert_eq!(claims.user_id, UserId(42));
        assert_eq!(claims.role().expect("known role"), Role::Employer);
        assert!(!claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn past_exp_is_expired() {
        let exp = Utc::now().timestamp() - 1;
        let claims = decode_claims(&token_for(1, "JOB_SEEKER", Some(exp))).expect("decodes");
        assert!(claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn rejects_garbage_and_unknown_roles() {
        assert!(matches!(
            decode_claims("not-a-token"),
            Err(TokenError::Malformed(_))
        ));

        let claims = decode_claims(&token_for(1, "ADMIN", None)).expect("decodes");
        assert!(matches!(claims.role(), Err(TokenError::UnknownRole(role)) if role == "ADMIN"));
    }
}
