use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::{Ready, ready};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::utils::jwt;

/// Nom du cookie de session
pub const SESSION_COOKIE: &str = "token";

/// Utilisateur authentifié, extrait du cookie de session.
/// Utilisé comme paramètre des routes protégées.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

/// Token de la requête: cookie "token", sinon header "Authorization: Bearer <token>"
fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(ApiError::Internal("application state missing".to_string())));
        };

        let Some(token) = session_token(req) else {
            return ready(Err(ApiError::unauthorized("Unauthorized")));
        };

        // Signature ou expiration invalide: même réponse, quel que soit le payload
        ready(match jwt::verify_session_token(&state.config.jwt_secret, &token) {
            Ok(claims) => Ok(AuthUser {
                user_id: claims.id,
                role: claims.role,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "session token rejected");
                Err(ApiError::unauthorized("Invalid or expired token"))
            }
        })
    }
}
