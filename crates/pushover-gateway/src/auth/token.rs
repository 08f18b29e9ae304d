//! Signed token codec
//!
//! Token format: `base64(header).base64(payload).base64(signature)`, every
//! segment URL-safe base64 without padding. The signature is
//! HMAC-SHA256(secret, `header.payload`).
//!
//! NOTE: [`verify_token`] does NOT reject expired tokens. It checks structure,
//! signature, algorithm, issuer, audience and issue time, then returns the
//! claims with `expires_at` as data. Expiry is enforced in exactly one place,
//! [`AuthMiddleware`](super::AuthMiddleware). Any new caller of
//! `verify_token` must compare `expires_at` itself.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// The only accepted signing algorithm
pub const TOKEN_ALGORITHM: &str = "HS256";

/// Issuer stamped into every token
pub const TOKEN_ISSUER: &str = "pushover-mcp-server";

/// Audience stamped into every token
pub const TOKEN_AUDIENCE: &str = "pushover-mcp-clients";

/// Clock skew tolerated on time-based claims
pub const CLOCK_SKEW_LEEWAY_SECS: i64 = 60;

/// Token codec errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format: {0}")]
    Format(String),

    #[error("invalid signature")]
    Signature,

    #[error("unsupported signing algorithm: {0}")]
    Algorithm(String),

    #[error("invalid claims: {0}")]
    Claim(String),

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "sub")]
    pub subject_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// Free-form role, carried but not enforced
    pub role: String,
    /// Issued at (Unix timestamp)
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiration (Unix timestamp)
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "aud")]
    pub audience: String,
}

impl Claims {
    /// Build claims issued now and expiring after `expiration_hours`.
    ///
    /// Zero or negative hours are accepted and produce an already expired token.
    pub fn new(
        subject_id: impl Into<String>,
        display_name: impl Into<String>,
        role: impl Into<String>,
        expiration_hours: i64,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            subject_id: subject_id.into(),
            display_name: display_name.into(),
            role: role.into(),
            issued_at: now,
            expires_at: now.saturating_add(expiration_hours.saturating_mul(3600)),
            issuer: TOKEN_ISSUER.to_string(),
            audience: TOKEN_AUDIENCE.to_string(),
        }
    }

    /// Whether the token is past its expiry at `now` (Unix seconds)
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }

    pub fn issued_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.issued_at, 0)
    }

    pub fn expires_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.expires_at, 0)
    }
}

/// Issue a signed token for the given identity
pub fn issue_token(
    secret: &[u8],
    subject_id: &str,
    display_name: &str,
    role: &str,
    expiration_hours: i64,
) -> Result<String, TokenError> {
    let claims = Claims::new(subject_id, display_name, role, expiration_hours);
    encode_token(secret, &claims)
}

/// Sign arbitrary claims
pub fn encode_token(secret: &[u8], claims: &Claims) -> Result<String, TokenError> {
    let header = TokenHeader {
        alg: TOKEN_ALGORITHM.to_string(),
        typ: Some("JWT".to_string()),
    };

    let header_json =
        serde_json::to_vec(&header).map_err(|e| TokenError::Encoding(e.to_string()))?;
    let payload_json =
        serde_json::to_vec(claims).map_err(|e| TokenError::Encoding(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        base64_url_encode(&header_json),
        base64_url_encode(&payload_json)
    );
    let signature = sign(secret, &signing_input);

    Ok(format!("{}.{}", signing_input, signature))
}

/// Verify a token against the current time
pub fn verify_token(secret: &[u8], token: &str) -> Result<Claims, TokenError> {
    verify_token_at(secret, token, chrono::Utc::now().timestamp())
}

/// Verify a token, using `now` (Unix seconds) for time-based claim checks.
///
/// Order matters: the signature is checked before the header or payload are
/// decoded, so nothing from an unsigned token is ever trusted.
pub fn verify_token_at(secret: &[u8], token: &str, now: i64) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [header_b64, payload_b64, signature_b64] = parts.as_slice() else {
        debug!(
            "[Auth] Invalid token format - expected 3 parts, got {}",
            parts.len()
        );
        return Err(TokenError::Format(format!(
            "expected 3 segments, got {}",
            parts.len()
        )));
    };

    // Undecodable signature counts as a mismatch, not a format problem
    let signature = base64_url_decode(signature_b64).ok_or(TokenError::Signature)?;

    let mut mac = new_mac(secret);
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(payload_b64.as_bytes());
    if mac.verify_slice(&signature).is_err() {
        debug!("[Auth] Invalid token signature");
        return Err(TokenError::Signature);
    }

    let header: TokenHeader = decode_segment(header_b64, "header")?;
    if header.alg != TOKEN_ALGORITHM {
        debug!("[Auth] Rejected token algorithm {}", header.alg);
        return Err(TokenError::Algorithm(header.alg));
    }

    let claims: Claims = decode_segment(payload_b64, "payload")?;

    if claims.issuer != TOKEN_ISSUER {
        return Err(TokenError::Claim(format!(
            "unexpected issuer '{}'",
            claims.issuer
        )));
    }
    if claims.audience != TOKEN_AUDIENCE {
        return Err(TokenError::Claim(format!(
            "unexpected audience '{}'",
            claims.audience
        )));
    }
    if claims.issued_at > now.saturating_add(CLOCK_SKEW_LEEWAY_SECS) {
        return Err(TokenError::Claim("token issued in the future".to_string()));
    }

    Ok(claims)
}

fn new_mac(secret: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size")
}

fn sign(secret: &[u8], signing_input: &str) -> String {
    let mut mac = new_mac(secret);
    mac.update(signing_input.as_bytes());
    base64_url_encode(&mac.finalize().into_bytes())
}

fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> Result<T, TokenError> {
    let bytes = base64_url_decode(segment)
        .ok_or_else(|| TokenError::Format(format!("failed to decode {}", what)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Format(format!("failed to parse {}: {}", what, e)))
}

/// Base64 URL-safe encoding (no padding)
fn base64_url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Base64 URL-safe decoding
fn base64_url_decode(s: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(s).ok()
}
