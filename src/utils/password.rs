use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Symboles acceptés (et exigés) par la politique de mot de passe
pub const POLICY_SYMBOLS: &str = "@$!%*?&";
const MIN_LENGTH: usize = 8;

pub const POLICY_MESSAGE: &str = "Password must be at least 8 characters long and include uppercase, lowercase, number, and special character.";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid hash format")]
    InvalidFormat,

    #[error("invalid iteration count")]
    InvalidIterations,

    #[error("failed to decode hash component")]
    Decode,

    #[error("invalid PBKDF2 output length")]
    OutputLength,
}

/// Vérifie la politique de complexité:
/// au moins 8 caractères, uniquement [A-Za-z0-9@$!%*?&],
/// au moins une minuscule, une majuscule, un chiffre et un symbole
pub fn meets_policy(password: &str) -> bool {
    let is_symbol = |c: char| POLICY_SYMBOLS.contains(c);

    password.chars().count() >= MIN_LENGTH
        && password.chars().all(|c| c.is_ascii_alphanumeric() || is_symbol(c))
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(is_symbol)
}

/// Hash un mot de passe au format Werkzeug: pbkdf2:sha256:iterations$salt$hash
pub fn hash_password(password: &str, iterations: u32) -> Result<String, PasswordError> {
    if iterations == 0 {
        return Err(PasswordError::InvalidIterations);
    }

    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut key)
        .map_err(|_| PasswordError::OutputLength)?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", iterations, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash produit par `hash_password`
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let mut parts = stored_hash.split('$');
    let (Some(header), Some(salt_str), Some(hash_str), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(PasswordError::InvalidFormat);
    };

    let iterations = match header.split(':').collect::<Vec<_>>().as_slice() {
        ["pbkdf2", "sha256", iterations] => iterations
            .parse::<u32>()
            .map_err(|_| PasswordError::InvalidIterations)?,
        _ => return Err(PasswordError::InvalidFormat),
    };
    if iterations == 0 {
        return Err(PasswordError::InvalidIterations);
    }

    let salt = decode_component(salt_str)?;
    let expected_hash = decode_component(hash_str)?;
    if expected_hash.is_empty() {
        return Err(PasswordError::InvalidFormat);
    }

    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|_| PasswordError::OutputLength)?;

    Ok(constant_time_eq(&computed, &expected_hash))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Salt et hash sont stockés en base64 url-safe sans padding
fn decode_component(input: &str) -> Result<Vec<u8>, PasswordError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| PasswordError::Decode)
}
