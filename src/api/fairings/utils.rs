use anyhow::{Error, Result, anyhow};
use jsonwebtoken::{DecodingKey, Validation, decode};
use rocket::Request;
use serde::de::DeserializeOwned;

use crate::AppState;
use crate::api::claims::Claims;
use crate::common::JWT_COOKIE_NAME;
use crate::models::user::User;

/// Decode JWT token with given claims type and validation
pub fn my_decode_token<T: DeserializeOwned>(
    token: impl AsRef<str>,
    key: &[u8],
    validation: &Validation,
) -> Result<T> {
    match decode::<T>(token.as_ref(), &DecodingKey::from_secret(key), validation) {
        Ok(token_data) => Ok(token_data.claims),
        Err(err) => Err(Error::from(err).context("Failed to decode JWT token")),
    }
}

/// Authenticate via the JWT cookie and load the session's user
pub fn try_jwt_cookie_auth(
    req: &Request<'_>,
    state: &AppState,
    validation: &Validation,
) -> Result<User> {
    let jwt_cookie = req
        .cookies()
        .get(JWT_COOKIE_NAME)
        .ok_or_else(|| anyhow!("JWT not found in cookies"))?;
    let claims = my_decode_token::<Claims>(
        jwt_cookie.value(),
        &state.config.jwt_secret_key(),
        validation,
    )?;
    state
        .store
        .read_user(&claims.sub)?
        .ok_or_else(|| anyhow!("User '{}' no longer exists", claims.sub))
}

/// Only local absolute paths are accepted as post-login targets.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
        _ => "/targets/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_be_local() {
        assert_eq!(safe_next(Some("/targets/?page=2")), "/targets/?page=2");
        assert_eq!(safe_next(Some("//evil.example")), "/targets/");
        assert_eq!(safe_next(Some("https://evil.example")), "/targets/");
        assert_eq!(safe_next(None), "/targets/");
    }

    #[test]
    fn tokens_round_trip_with_matching_key() {
        let token = Claims::new("ana").encode_with_key(b"k1").unwrap();
        let claims: Claims = my_decode_token(&token, b"k1", &crate::api::fairings::VALIDATION).unwrap();
        assert_eq!(claims.sub, "ana");
        assert!(my_decode_token::<Claims>(&token, b"k2", &crate::api::fairings::VALIDATION).is_err());
    }
}
