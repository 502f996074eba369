use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    /// Unix milliseconds, like every other timestamp in the API. The `exp`
    /// claim inside the token stays in seconds.
    pub expires_at: i64,
}

/// Mints and verifies stateless HS256 session tokens.
///
/// Verification is signature and expiry only; it never consults the user
/// store, so a token stays valid for its lifetime even if the account
/// disappears.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, username: &str) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires = now + self.ttl;
        let claims = Claims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Crypto(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at: expires.timestamp_millis(),
        })
    }

    pub fn resolve(&self, token: &str) -> Result<String, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::InvalidToken(e.to_string()))?;

        if data.claims.username.is_empty() {
            return Err(AppError::InvalidToken("Missing username claim".to_string()));
        }

        Ok(data.claims.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, Duration::hours(1))
    }

    #[test]
    fn test_issue_resolve() {
        let issuer = issuer();
        let issued = issuer.issue("alice").unwrap();
        assert_eq!(issuer.resolve(&issued.token).unwrap(), "alice");
        let now_ms = Utc::now().timestamp_millis();
        assert!(issued.expires_at > now_ms);
        assert!(issued.expires_at <= now_ms + Duration::hours(1).num_milliseconds());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let issuer = issuer();
        let alice = issuer.issue("alice").unwrap().token;
        let bob = issuer.issue("bob").unwrap().token;

        // bob's claims under alice's signature
        let a: Vec<&str> = alice.split('.').collect();
        let b: Vec<&str> = bob.split('.').collect();
        let forged = format!("{}.{}.{}", b[0], b[1], a[2]);

        assert!(matches!(
            issuer.resolve(&forged),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_foreign_key_rejected() {
        let other = TokenIssuer::new(b"another-secret-another-secret-xx", Duration::hours(1));
        let token = other.issue("alice").unwrap().token;
        assert!(matches!(
            issuer().resolve(&token),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_malformed_rejected() {
        let issuer = issuer();
        assert!(matches!(issuer.resolve(""), Err(AppError::InvalidToken(_))));
        assert!(matches!(
            issuer.resolve("not.a.token"),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_rejected() {
        let expired = TokenIssuer::new(SECRET, Duration::hours(-2));
        let token = expired.issue("alice").unwrap().token;
        assert!(matches!(
            issuer().resolve(&token),
            Err(AppError::InvalidToken(_))
        ));
    }
}
