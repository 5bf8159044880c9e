use actix_web::{HttpResponse, get, put, web};
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    ProfileResponse, PublicProfileResponse, PublicProjectResponse, UpdateProfileRequest,
};
use crate::models::users;
use crate::services::store::{ProfileChanges, Store, StoreError};
use crate::state::AppState;

async fn find_by_username(store: &dyn Store, username: &str) -> Result<users::Model, ApiError> {
    store
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /user/me - Profil complet de l'utilisateur connecté
#[get("/me")]
pub async fn get_me(
    auth_user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .store
        .find_user_by_id(auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}

/// PUT /user/me - Modifier username / bio / avatar
#[put("/me")]
pub async fn update_me(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(e) = body.validate() {
        tracing::debug!(error = %e, "profile update rejected");
        return Err(ApiError::bad_request("Invalid profile data"));
    }

    let body = body.into_inner();
    let changes = ProfileChanges {
        username: body.username.map(|u| u.trim().to_string()),
        bio: body.bio,
        user_avatar: body.user_avatar,
    };
    if changes.username.as_deref() == Some("") {
        return Err(ApiError::bad_request("Invalid profile data"));
    }

    let user = if changes.is_empty() {
        state.store.find_user_by_id(auth_user.user_id).await?
    } else {
        match state.store.update_profile(auth_user.user_id, changes).await {
            Ok(user) => user,
            Err(StoreError::Duplicate) => return Err(ApiError::conflict("Username already taken")),
            Err(e) => return Err(e.into()),
        }
    };
    let user = user.ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}

/// GET /user/{username} - Profil public (PUBLIC)
#[get("/{username}")]
pub async fn get_public_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = find_by_username(state.store.as_ref(), &path).await?;

    Ok(HttpResponse::Ok().json(PublicProfileResponse::from(user)))
}

/// GET /user/{username}/projects - Projets publics d'un utilisateur (PUBLIC)
#[get("/{username}/projects")]
pub async fn get_public_projects(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = find_by_username(state.store.as_ref(), &path).await?;

    let projects: Vec<PublicProjectResponse> = state
        .store
        .public_projects_owned_by(user.user_id)
        .await?
        .into_iter()
        .map(PublicProjectResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "projects": projects })))
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    // /me avant /{username}
    cfg.service(
        web::scope("/user")
            .service(get_me)
            .service(update_me)
            .service(get_public_profile)
            .service(get_public_projects),
    );
}
