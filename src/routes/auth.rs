use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use validator::Validate;

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::AuthRateLimit;
use crate::middleware::auth::SESSION_COOKIE;
use crate::models::dto::{LoginRequest, RegisterRequest, VerifyEmailQuery};
use crate::services::mailer::verification_mail;
use crate::services::store::{NewUser, StoreError};
use crate::state::AppState;
use crate::utils::{jwt, password};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const ALREADY_EXISTS: &str = "Email or username already exists";
const INVALID_TOKEN: &str = "Invalid or expired token";

/// Cookie de session: HttpOnly, SameSite=Strict, Secure en production, 1h
pub fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.production)
        .max_age(CookieDuration::hours(jwt::SESSION_TTL_HOURS))
        .finish()
}

/// POST /auth/register - Créer un compte non vérifié (PUBLIC, limité)
#[post("/register")]
pub async fn register(
    limit: AuthRateLimit,
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    // email et username arrivent déjà trimés (voir dto)
    let email = body.email.as_str();
    let username = body.username.as_str();

    // 1. Champs obligatoires
    if email.is_empty() || username.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request(
            "Email, username, and password are required",
        ));
    }

    // 2. Politique de mot de passe + format de l'email
    if !password::meets_policy(&body.password) {
        return Err(ApiError::bad_request(password::POLICY_MESSAGE));
    }
    if body.validate().is_err() {
        return Err(ApiError::bad_request("Invalid email address"));
    }

    // 3. Unicité email / username
    if state.store.user_exists(email, username).await? {
        return Err(ApiError::conflict(ALREADY_EXISTS));
    }

    // 4. Hash + insertion (une insertion concurrente peut encore violer l'unicité)
    let password_hash =
        password::hash_password(&body.password, state.config.password_hash_iterations)?;

    let user = match state
        .store
        .insert_user(NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::Duplicate) => return Err(ApiError::conflict(ALREADY_EXISTS)),
        Err(e) => return Err(e.into()),
    };

    // 5. Email de vérification: un échec d'envoi ne fait pas échouer l'inscription
    let token =
        jwt::issue_verification_token(&state.config.email_secret, user.user_id, &user.email)?;
    let url = format!(
        "{}/verify-email?token={}",
        state.config.frontend_url.trim_end_matches('/'),
        token
    );

    if let Err(e) = state.mailer.send(verification_mail(&user.email, &url)).await {
        tracing::error!(error = %e, user_id = %user.user_id, "failed to send verification email");
    }

    tracing::info!(user_id = %user.user_id, "user registered");

    let mut response = HttpResponse::Created();
    limit.apply(&mut response);
    Ok(response.json(serde_json::json!({
        "message": "User registered successfully. Please verify your email."
    })))
}

/// POST /auth/login - Ouvrir une session (PUBLIC, limité)
#[post("/login")]
pub async fn login(
    limit: AuthRateLimit,
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = body.email.as_str();
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    // 1. Utilisateur: erreur DB et compte absent donnent la même réponse
    let user = match state.store.find_user_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::unauthorized(INVALID_CREDENTIALS)),
        Err(e) => {
            tracing::warn!(error = %e, "user lookup failed during login");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    // 2. Mot de passe (hash illisible = mauvais mot de passe)
    match password::verify_password(&body.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::unauthorized(INVALID_CREDENTIALS)),
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user.user_id, "stored password hash unreadable");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    }

    if !user.is_verified {
        return Err(ApiError::forbidden(
            "Account not verified. Please verify your email.",
        ));
    }

    // 3. Session
    let token = jwt::issue_session_token(&state.config.jwt_secret, user.user_id, &user.role)?;

    if let Err(e) = state.store.record_login(user.user_id, Utc::now()).await {
        tracing::warn!(error = %e, user_id = %user.user_id, "failed to record last login");
    }

    let mut response = HttpResponse::Ok();
    limit.apply(&mut response);
    Ok(response
        .cookie(session_cookie(&state.config, token))
        .json(serde_json::json!({ "message": "Login successful" })))
}

/// GET /auth/verify-email?token=... - Valider l'email et ouvrir une session (PUBLIC)
#[get("/verify-email")]
pub async fn verify_email(
    state: web::Data<AppState>,
    query: web::Query<VerifyEmailQuery>,
) -> Result<HttpResponse, ApiError> {
    let Some(token) = query.token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(ApiError::bad_request("Invalid token"));
    };

    let claims = jwt::verify_verification_token(&state.config.email_secret, token).map_err(|e| {
        tracing::debug!(error = %e, "verification token rejected");
        ApiError::bad_request(INVALID_TOKEN)
    })?;

    let user = state
        .store
        .mark_verified(claims.id)
        .await?
        .ok_or_else(|| ApiError::bad_request(INVALID_TOKEN))?;

    let session = jwt::issue_session_token(&state.config.jwt_secret, user.user_id, &user.role)?;

    tracing::info!(user_id = %user.user_id, "email verified");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state.config, session))
        .json(serde_json::json!({ "message": "Email verified successfully!" })))
}

/// POST /auth/logout - Supprimer le cookie de session
#[post("/logout")]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut cookie = session_cookie(&state.config, String::new());
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(serde_json::json!({ "message": "Logged out" }))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(verify_email)
            .service(logout),
    );
}
