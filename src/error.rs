// ============================================================================
// ERREURS API
// ============================================================================
//
// Toutes les erreurs renvoyées par les handlers passent par ApiError, qui
// produit la réponse JSON {"message": "..."} avec le bon code HTTP:
//
//   BadRequest      -> 400 (entrée manquante ou invalide)
//   Unauthorized    -> 401 (identifiants / session invalides)
//   Forbidden       -> 403 (compte non vérifié, rôle insuffisant)
//   NotFound        -> 404
//   Conflict        -> 409
//   TooManyRequests -> 429 (+ Retry-After)
//   Store/Internal  -> 500 (détail uniquement dans les logs)
//
// ============================================================================

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::middleware::rate_limit::{RateLimitRejection, standard_headers};
use crate::services::store::StoreError;
use crate::utils::jwt::TokenError;
use crate::utils::password::PasswordError;

pub const RATE_LIMIT_MESSAGE: &str = "Too many login attempts, please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooManyRequests(RateLimitRejection),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Message exposé au client
    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m) => m.clone(),
            Self::TooManyRequests(_) => RATE_LIMIT_MESSAGE.to_string(),
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self::Internal(format!("failed to issue token: {}", err))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(format!("password hashing failed: {}", err))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, Self::Store(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "request failed");
        }

        let mut response = HttpResponse::build(self.status_code());
        if let Self::TooManyRequests(rejection) = self {
            let retry_after = rejection.retry_after.as_secs().max(1).to_string();
            response.insert_header((header::RETRY_AFTER, retry_after));
            for header in standard_headers(rejection.limit, 0, rejection.retry_after) {
                response.insert_header(header);
            }
        }

        response.json(serde_json::json!({
            "message": self.public_message()
        }))
    }
}
