/// Bearer token verification
///
/// Tokens are issued by the external identity provider and signed with RS256.
/// This service only holds the public key: it can verify tokens but never
/// mint them.
use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

/// JWT algorithm accepted from the identity provider
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

/// Claims carried by identity-provider access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
    /// Username
    pub username: String,
}

impl Claims {
    /// Identity described by the claims
    pub fn user(&self) -> Result<User> {
        let id = Uuid::parse_str(&self.sub)
            .map_err(|e| anyhow!("Invalid user ID format in token: {e}"))?;
        if self.username.trim().is_empty() {
            return Err(anyhow!("Token carries no username"));
        }
        Ok(User {
            id,
            username: self.username.clone(),
        })
    }
}

/// Validates access tokens against the identity provider's public key
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Build a verifier from an RSA public key in PEM format
    pub fn from_rsa_pem(public_key_pem: &str) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Verify signature and expiry, then require an access token
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))?;

        if data.claims.token_type != "access" {
            return Err(anyhow!("Expected an access token"));
        }

        Ok(data.claims)
    }
}
