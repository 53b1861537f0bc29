use anyhow::{Context, Result};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::common::JWT_LIFETIME_SECS;

/// Session token stored in the `jwt` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    pub exp: u64,
}

impl Claims {
    pub fn new(username: impl Into<String>) -> Self {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|now| now.as_secs())
            .unwrap_or_default()
            + JWT_LIFETIME_SECS;
        Self {
            sub: username.into(),
            exp,
        }
    }

    pub fn encode_with_key(&self, key: &[u8]) -> Result<String> {
        encode(&Header::default(), self, &EncodingKey::from_secret(key))
            .context("Failed to generate token")
    }
}
