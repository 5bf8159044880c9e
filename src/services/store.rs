// ============================================================================
// STORE - accès aux données
// ============================================================================
//
// Description:
//   Interface unique entre les handlers et la base relationnelle
//   (users, projects, project_collaborators). Chaque méthode est un simple
//   select / insert / update / delete filtré.
//
// Implémentations:
//   - DbStore (services::db_store) : SeaORM / PostgreSQL
//   - MemoryStore (services::memory_store) : tests uniquement
//
// Points d'attention:
//   - Aucune logique d'autorisation ici (voir services::access)
//   - Aucun retry: une erreur DB remonte telle quelle (=> 500)
//   - create_project écrit le projet ET la ligne owner dans une transaction
//
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::project_collaborators::{self, Role};
use crate::models::{projects, users};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Violation d'unicité (email, username, ou paire projet/utilisateur)
    #[error("duplicate record")]
    Duplicate,

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub owner_id: Uuid,
}

/// Modifications partielles d'un projet (None = inchangé)
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl ProjectChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.is_public.is_none()
    }
}

/// Modifications partielles d'un profil (None = inchangé)
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub user_avatar: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.bio.is_none() && self.user_avatar.is_none()
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Vérifie que la base répond
    async fn ping(&self) -> Result<(), StoreError>;

    // ---- users

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<users::Model>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<users::Model>, StoreError>;

    async fn find_user_by_username(&self, username: &str)
        -> Result<Option<users::Model>, StoreError>;

    /// true si l'email OU le username est déjà pris
    async fn user_exists(&self, email: &str, username: &str) -> Result<bool, StoreError>;

    /// Crée un utilisateur non vérifié
    async fn insert_user(&self, user: NewUser) -> Result<users::Model, StoreError>;

    /// Passe is_verified à true; None si l'utilisateur n'existe pas
    async fn mark_verified(&self, user_id: Uuid) -> Result<Option<users::Model>, StoreError>;

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<users::Model>, StoreError>;

    // ---- projects

    /// Insère le projet + la ligne collaborateur "owner" (atomique)
    async fn create_project(&self, project: NewProject) -> Result<projects::Model, StoreError>;

    async fn find_project(&self, project_id: Uuid) -> Result<Option<projects::Model>, StoreError>;

    async fn projects_owned_by(&self, owner_id: Uuid) -> Result<Vec<projects::Model>, StoreError>;

    async fn public_projects_owned_by(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<projects::Model>, StoreError>;

    async fn update_project(
        &self,
        project_id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Option<projects::Model>, StoreError>;

    /// Supprime le projet et ses collaborateurs; false si absent
    async fn delete_project(&self, project_id: Uuid) -> Result<bool, StoreError>;

    // ---- collaborators

    async fn find_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<project_collaborators::Model>, StoreError>;

    async fn add_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<project_collaborators::Model, StoreError>;

    /// Retourne le nombre de lignes supprimées
    async fn remove_collaborator(&self, project_id: Uuid, user_id: Uuid)
        -> Result<u64, StoreError>;

    /// Retourne le nombre de lignes modifiées
    async fn set_collaborator_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<u64, StoreError>;

    async fn list_collaborators(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<project_collaborators::Model>, StoreError>;
}
