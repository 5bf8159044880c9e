// DTO des requêtes / réponses JSON
// Champs de requête optionnels: un champ manquant est validé dans le handler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{project_collaborators, projects, users};

/// Supprime les espaces autour de la valeur avant toute validation
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

// ---------------------------------------------------------------- auth

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

// ---------------------------------------------------------------- projets

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Champs absents = inchangés
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Version publique d'un projet (sans owner_id)
#[derive(Debug, Serialize)]
pub struct PublicProjectResponse {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl From<projects::Model> for PublicProjectResponse {
    fn from(p: projects::Model) -> Self {
        Self {
            project_id: p.project_id,
            name: p.name,
            description: p.description,
            is_public: p.is_public,
            created_at: p.created_at,
        }
    }
}

// ---------------------------------------------------------------- collaborateurs

/// Body de POST et PUT /collaborators
#[derive(Debug, Deserialize)]
pub struct CollaboratorRoleRequest {
    pub project_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub role: Option<String>,
}

/// Body de DELETE /collaborators
#[derive(Debug, Deserialize)]
pub struct RemoveCollaboratorRequest {
    pub project_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CollaboratorResponse {
    pub user_id: Uuid,
    pub role: project_collaborators::Role,
    pub added_at: DateTime<Utc>,
}

impl From<project_collaborators::Model> for CollaboratorResponse {
    fn from(c: project_collaborators::Model) -> Self {
        Self {
            user_id: c.user_id,
            role: c.role,
            added_at: c.added_at,
        }
    }
}

// ---------------------------------------------------------------- profils

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub user_avatar: Option<String>,
}

/// Profil complet, uniquement pour GET/PUT /user/me
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    pub user_avatar: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<users::Model> for ProfileResponse {
    fn from(u: users::Model) -> Self {
        Self {
            user_id: u.user_id,
            username: u.username,
            email: u.email,
            role: u.role,
            is_verified: u.is_verified,
            user_avatar: u.user_avatar,
            bio: u.bio,
            created_at: u.created_at,
            last_login: u.last_login,
        }
    }
}

/// Profil public (GET /user/{username})
#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub user_id: Uuid,
    pub username: String,
    pub user_avatar: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<users::Model> for PublicProfileResponse {
    fn from(u: users::Model) -> Self {
        Self {
            user_id: u.user_id,
            username: u.username,
            user_avatar: u.user_avatar,
            bio: u.bio,
            created_at: u.created_at,
            last_login: u.last_login,
        }
    }
}

// ---------------------------------------------------------------- health

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub time: DateTime<Utc>,
}
