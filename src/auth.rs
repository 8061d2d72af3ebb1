use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::Role;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Validity window of an issued token.
pub const TOKEN_TTL_SECS: u64 = 3600; // 1 hour

/// Identity facts embedded in a session token.
///
/// Trusted only once the enclosing token verifies against the service
/// secret and its expiry has not passed.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub exp: u64,
}

impl Claims {
    /// Claims for a fresh session, expiring `TOKEN_TTL_SECS` from now.
    pub fn new(user_id: String, email: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
            exp: unix_now() + TOKEN_TTL_SECS,
        }
    }
}

/// Encodes claims into signed tokens and verifies them back.
///
/// Holds the HS256 keys derived from the process-wide secret, built once at
/// startup and shared read-only across requests.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Serialize claims into a signed, tamper-evident token string.
    pub fn issue(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), claims, &self.encoding)
    }

    /// Recompute the signature and check expiry. Bad signature, malformed
    /// structure and elapsed expiry all come back as `Err`, never a panic.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
    }
}

/// Capability check, not a hierarchy: the caller's role must match exactly.
pub fn role_allows(required: &Role, actual: &Role) -> bool {
    required == actual
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
