use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

/// Durée de vie du cookie de session
pub const SESSION_TTL_HOURS: i64 = 1;
/// Durée de vie du lien de vérification email
pub const VERIFICATION_TTL_HOURS: i64 = 24;

/// Contenu du cookie de session
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Contenu du token envoyé par email
#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationClaims {
    pub id: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to calculate expiration")]
    Expiration,

    #[error("invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

fn expiration(issued_at: DateTime<Utc>, ttl_hours: i64) -> Result<i64, TokenError> {
    issued_at
        .checked_add_signed(Duration::hours(ttl_hours))
        .map(|exp| exp.timestamp())
        .ok_or(TokenError::Expiration)
}

fn sign<T: Serialize>(secret: &str, claims: &T) -> Result<String, TokenError> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

fn verify<T: DeserializeOwned>(secret: &str, token: &str) -> Result<T, TokenError> {
    // exp strict: aucune tolérance après expiration
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Génère le token de session (1 heure) d'un utilisateur
pub fn issue_session_token(secret: &str, user_id: Uuid, role: &str) -> Result<String, TokenError> {
    issue_session_token_at(secret, user_id, role, Utc::now())
}

pub(crate) fn issue_session_token_at(
    secret: &str,
    user_id: Uuid,
    role: &str,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    let claims = SessionClaims {
        id: user_id,
        role: role.to_string(),
        iat: issued_at.timestamp(),
        exp: expiration(issued_at, SESSION_TTL_HOURS)?,
    };
    sign(secret, &claims)
}

/// Vérifie signature + expiration d'un token de session
pub fn verify_session_token(secret: &str, token: &str) -> Result<SessionClaims, TokenError> {
    verify(secret, token)
}

/// Génère le token de vérification email (24 heures)
pub fn issue_verification_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
) -> Result<String, TokenError> {
    issue_verification_token_at(secret, user_id, email, Utc::now())
}

pub(crate) fn issue_verification_token_at(
    secret: &str,
    user_id: Uuid,
    email: &str,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    let claims = VerificationClaims {
        id: user_id,
        email: email.to_string(),
        iat: issued_at.timestamp(),
        exp: expiration(issued_at, VERIFICATION_TTL_HOURS)?,
    };
    sign(secret, &claims)
}

pub fn verify_verification_token(
    secret: &str,
    token: &str,
) -> Result<VerificationClaims, TokenError> {
    verify(secret, token)
}
