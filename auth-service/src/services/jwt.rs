use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Identity, Role};
use crate::services::ServiceError;
use crate::utils::Clock;

/// Access credential lifetime. Always shorter than a session.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

const _: () = assert!(ACCESS_TOKEN_TTL_MINUTES < crate::models::SESSION_TTL_DAYS * 24 * 60);

/// Minimum accepted signing secret length in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Mints and verifies HS256 access credentials.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

/// Claims carried by an access credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub jti: String,
}

impl TokenIssuer {
    pub fn new(secret: &SecretString, clock: Arc<dyn Clock>) -> Result<Self, anyhow::Error> {
        let bytes = secret.expose_secret().as_bytes();
        if bytes.len() < MIN_SECRET_BYTES {
            anyhow::bail!(
                "JWT secret must be at least {} bytes, got {}",
                MIN_SECRET_BYTES,
                bytes.len()
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            clock,
        })
    }

    /// Sign a credential for `identity` valid for `ACCESS_TOKEN_TTL_MINUTES`.
    pub fn issue(&self, identity: &Identity) -> Result<String, ServiceError> {
        let now = self.clock.now();
        let exp = now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES);

        let claims = AccessTokenClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Failed to encode access token: {}", e)))
    }

    /// Check signature and expiry, returning the claims.
    pub fn decode_claims(&self, token: &str) -> Result<AccessTokenClaims, ServiceError> {
        // Expiry is judged against the injected clock below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                ServiceError::InvalidToken
            })?
            .claims;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(ServiceError::InvalidToken);
        }

        Ok(claims)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, ServiceError> {
        let claims = self.decode_claims(token)?;
        let id = claims.sub.parse().map_err(|_| ServiceError::InvalidToken)?;

        Ok(Identity {
            id,
            email: claims.email,
            role: claims.role,
        })
    }
}
