//! # vt-auth-jwt
//!
//! HS256 access-token implementation of `AuthProvider`.
//! Tokens are minted by the account service; this crate only verifies them
//! and reads the `_id` claim. `issue_access_token` exists for fixtures and
//! local tooling.

use anyhow::{anyhow, Context};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vt_core::traits::AuthProvider;

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub exp: i64,
}

pub struct JwtAuthProvider {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl JwtAuthProvider {
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            decoding: DecodingKey::from_secret(key),
            encoding: EncodingKey::from_secret(key),
            validation,
        }
    }

    /// Signs a token for `user` valid for `ttl`.
    pub fn issue_access_token(&self, user: Uuid, ttl: Duration) -> anyhow::Result<String> {
        let claims = AccessClaims {
            id: user.to_string(),
            username: None,
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("signing access token")
    }
}

impl AuthProvider for JwtAuthProvider {
    fn verify_access_token(&self, token: &str) -> anyhow::Result<Uuid> {
        let data = decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| anyhow!("token validation failed: {e}"))?;
        Uuid::parse_str(&data.claims.id).context("token subject is not a user id")
    }
}
