/**
 * Bearer Token Verification
 *
 * Accounts and sign-in live with an external identity provider. It signs a
 * JWT (HS256) with the shared `JWT_SECRET` whose `sub` claim is the user id;
 * this server only verifies those tokens. Without `JWT_SECRET` a development
 * secret is used and a warning is logged once.
 *
 * `create_token` mints a token the same way the provider does, for tests and
 * local tooling.
 */

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

/// Lifetime of tokens minted by `create_token` (30 days)
const TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

const DEV_SECRET: &str = "xfteam-development-secret-change-me";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id
    sub: Uuid,
    exp: u64,
    iat: u64,
}

/// Why a bearer token was not accepted
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Token expired")]
    Expired,

    /// Bad signature, malformed token, or a `sub` that is not a user id
    #[error("Invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for SessionError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid(err),
        }
    }
}

fn jwt_secret() -> &'static [u8] {
    static SECRET: OnceLock<String> = OnceLock::new();
    SECRET
        .get_or_init(|| {
            std::env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_SECRET.to_string()
            })
        })
        .as_bytes()
}

fn now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Mint a token for `user_id`
pub fn create_token(user_id: Uuid) -> Result<String, SessionError> {
    let now = now_secs();
    let claims = Claims {
        sub: user_id,
        exp: now + TOKEN_TTL_SECS,
        iat: now,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret()),
    )?)
}

/// Check a token's signature and expiry and return the user id it names
pub fn verify_token(token: &str) -> Result<Uuid, SessionError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret()),
        &Validation::default(),
    )?;
    Ok(data.claims.sub)
}
