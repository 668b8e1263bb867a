//! GitHub App JWT signing.
//!
//! An app authenticates as itself with a short-lived RS256 JWT and then
//! exchanges it for an installation access token.
//! Reference: https://docs.github.com/en/apps/creating-github-apps/authenticating-with-a-github-app/generating-a-json-web-token-jwt-for-a-github-app

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};

/// Backdate `iat` to tolerate clock drift between us and GitHub.
const CLOCK_DRIFT_SECS: u64 = 60;

/// GitHub rejects app JWTs valid for more than 10 minutes.
const JWT_LIFETIME_SECS: u64 = 9 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
}

impl Claims {
    pub fn new(app_id: u64, now: u64) -> Self {
        Self {
            iat: now.saturating_sub(CLOCK_DRIFT_SECS),
            exp: now + JWT_LIFETIME_SECS,
            iss: app_id.to_string(),
        }
    }
}

/// Sign an app JWT with the app's PEM private key.
pub fn app_jwt(app_id: u64, private_key_pem: &str) -> RelayResult<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| RelayError::Auth(format!("invalid private key: {}", e)))?;

    encode(&Header::new(Algorithm::RS256), &Claims::new(app_id, now), &key)
        .map_err(|e| RelayError::Auth(format!("failed to sign app JWT: {}", e)))
}
