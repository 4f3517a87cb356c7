//! Credential policy: handle shape, password strength, Argon2id hashing.
//!
//! Pure checks return plain booleans; only hashing can fail.

use anyhow::{Context, Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;
use tokio::task;

use crate::config::SecurityConfig;

pub const HANDLE_MIN_LEN: usize = 3;
pub const HANDLE_MAX_LEN: usize = 50;

/// Punctuation accepted by the password strength check.
const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("valid handle regex"));

#[must_use]
pub fn handle_length_ok(handle: &str) -> bool {
    (HANDLE_MIN_LEN..=HANDLE_MAX_LEN).contains(&handle.len())
}

#[must_use]
pub fn handle_charset_ok(handle: &str) -> bool {
    HANDLE_RE.is_match(handle)
}

#[must_use]
pub fn is_handle_valid(handle: &str) -> bool {
    handle_length_ok(handle) && handle_charset_ok(handle)
}

/// At least 8 chars with lowercase, uppercase, digit and one symbol from the
/// fixed set. All four classes are mandatory.
#[must_use]
pub fn is_password_strong(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// "RH" plus a zero-padded draw from [0, 99999]. Displayed to the user, so it
/// does not need to be unpredictable; a fresh one is drawn per registration.
#[must_use]
pub fn generate_verification_code() -> String {
    let number: u32 = rand::rng().random_range(0..=99_999);
    format!("RH{number:05}")
}

fn build_hasher(security: &SecurityConfig) -> Result<Argon2<'static>> {
    let params = Params::new(
        security.argon2_memory_cost_kib,
        security.argon2_time_cost,
        security.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow!("Invalid Argon2 parameters: {e}"))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes with a fresh random salt, so two hashes of the same password differ.
/// Runs on the blocking pool; Argon2 is CPU-bound by design and would stall
/// the async runtime otherwise.
pub async fn hash_password(password: &str, security: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let security = security.clone();

    task::spawn_blocking(move || {
        let argon2 = build_hasher(&security)?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {e}"))?;
        Ok::<String, anyhow::Error>(hash.to_string())
    })
    .await
    .context("Password hashing task panicked")?
}

/// Verifies against a stored PHC string. The parameters travel in the hash, so
/// verification works across configuration changes.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();

    task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| anyhow!("Invalid password hash format: {e}"))?;
        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}
