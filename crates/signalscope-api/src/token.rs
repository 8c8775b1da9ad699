use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use signalscope_types::api::Claims;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Covers malformed tokens, bad signatures, expired tokens, and tokens
    /// signed with a different secret alike.
    #[error("invalid or expired token")]
    Invalid,
}

/// Stateless bearer-token issuance and verification. Signature + expiry
/// are the only trust mechanism: there is no revocation list, so rotating
/// the secret invalidates every outstanding token at once.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token asserting `user_id`, expiring exactly `ttl` from now.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id,
            exp: (Utc::now() + self.ttl).timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Pure, synchronous verification — never touches the store.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact, no grace window.
        validation.leeway = 0;

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|_| TokenError::Invalid)?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, ttl_minutes: i64) -> TokenService {
        TokenService::new(secret, Duration::minutes(ttl_minutes))
    }

    #[test]
    fn verify_resolves_issued_user() {
        let svc = service("test-secret", 60);
        let user_id = Uuid::new_v4();

        let token = svc.issue(user_id).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn expired_token_rejected() {
        let svc = service("test-secret", -5);
        let token = svc.issue(Uuid::new_v4()).unwrap();
        assert_eq!(svc.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn foreign_secret_rejected() {
        let issuer = service("secret-a", 60);
        let verifier = service("secret-b", 60);

        let token = issuer.issue(Uuid::new_v4()).unwrap();
        assert_eq!(verifier.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn malformed_token_rejected() {
        let svc = service("test-secret", 60);
        assert_eq!(svc.verify("not-a-jwt"), Err(TokenError::Invalid));
        assert_eq!(svc.verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn tampered_token_rejected() {
        let svc = service("test-secret", 60);
        let mut token = svc.issue(Uuid::new_v4()).unwrap();
        token.pop();
        token.push('x');
        assert_eq!(svc.verify(&token), Err(TokenError::Invalid));
    }
}
