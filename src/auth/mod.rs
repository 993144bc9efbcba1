//! Bearer-token auth and password hashing.
//!
//! Tokens are `base64url(claims JSON) . hex(HMAC-SHA256 signature)` — opaque
//! to clients, stateless for the server. The signing secret comes from config
//! or is generated once and persisted next to the database.

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::path::Path;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried inside a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: String,
    /// Expiry as unix seconds.
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Verification failures, with the exact messages the API returns.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token is missing")]
    Missing,
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

// ─── Token signing ────────────────────────────────────────────────────────────

pub struct TokenSigner {
    secret: Vec<u8>,
    ttl_hours: i64,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours,
        }
    }

    /// Issue a signed token for `user_id` that expires after the configured TTL.
    pub fn issue(&self, user_id: &str, email: &str, role: &str) -> Result<String> {
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp: (Utc::now() + chrono::Duration::hours(self.ttl_hours)).timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| anyhow!("invalid HMAC key: {e}"))?;
        mac.update(payload.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{sig}"))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let (payload, sig_hex) = token.split_once('.').ok_or(AuthError::Invalid)?;

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::Invalid)?;
        mac.update(payload.as_bytes());
        let sig = hex::decode(sig_hex).map_err(|_| AuthError::Invalid)?;
        mac.verify_slice(&sig).map_err(|_| AuthError::Invalid)?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::Invalid)?;
        let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| AuthError::Invalid)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

// ─── Signing secret ───────────────────────────────────────────────────────────

/// Load the token signing secret from `{data_dir}/auth_secret`, generating
/// and persisting a fresh one (0600 on unix) on first run.
pub fn get_or_create_secret(data_dir: &Path) -> Result<String> {
    let secret_path = data_dir.join("auth_secret");

    if secret_path.exists() {
        let secret = std::fs::read_to_string(&secret_path)
            .with_context(|| format!("failed to read {}", secret_path.display()))?
            .trim()
            .to_string();
        if !secret.is_empty() {
            return Ok(secret);
        }
    }

    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let secret = hex::encode(bytes);

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    std::fs::write(&secret_path, &secret)
        .with_context(|| format!("failed to write {}", secret_path.display()))?;

    // Owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&secret_path, perms)
            .with_context(|| format!("failed to set permissions on {}", secret_path.display()))?;
    }

    Ok(secret)
}

// ─── Password hashing ─────────────────────────────────────────────────────────

/// Hash a password with a fresh random salt. Returns `(salt_hex, hash_hex)`.
pub fn hash_password(password: &str) -> (String, String) {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);
    (hex::encode(salt), hash_with_salt(password, &salt))
}

/// Check a password against a stored salt + hash pair.
pub fn verify_password(password: &str, salt_hex: &str, hash_hex: &str) -> bool {
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    hash_with_salt(password, &salt) == hash_hex
}

fn hash_with_salt(password: &str, salt: &[u8]) -> String {
    // HMAC accepts keys of any length, so new_from_slice cannot fail here.
    let mut mac = HmacSha256::new_from_slice(salt).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
