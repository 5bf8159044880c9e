// ============================================================================
// CONTRÔLE D'ACCÈS AUX PROJETS
// ============================================================================
//
// Trois prédicats DISTINCTS (volontairement non fusionnés):
//
//   1. authorize_owner_action : ligne project_collaborators du demandeur avec
//      role = 'owner'. Protège l'ajout / retrait / changement de rôle.
//   2. require_project_owner : projects.owner_id == demandeur.
//      Protège la modification et la suppression du projet.
//   3. require_membership : n'importe quelle ligne collaborateur.
//      Protège la lecture d'un projet par id.
//
// Un collaborateur 'owner' qui n'est pas owner_id peut donc gérer les
// membres mais pas modifier ni supprimer le projet.
//
// ============================================================================

use uuid::Uuid;

use crate::error::ApiError;
use crate::models::project_collaborators::Role;
use crate::models::projects;
use crate::services::store::Store;

/// Actions réservées aux collaborateurs 'owner'
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerAction {
    AddCollaborator,
    RemoveCollaborator,
    UpdateCollaboratorRole,
}

impl OwnerAction {
    fn denial(self) -> &'static str {
        match self {
            Self::AddCollaborator => "Only owners can add collaborators.",
            Self::RemoveCollaborator => "Only owners can remove collaborators.",
            Self::UpdateCollaboratorRole => "Only owners can update collaborator roles.",
        }
    }
}

/// Actions réservées au owner_id du projet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    Update,
    Delete,
}

impl ProjectAction {
    fn denial(self) -> &'static str {
        match self {
            Self::Update => "Only the project owner can update the project.",
            Self::Delete => "Only the project owner can delete the project.",
        }
    }
}

/// Autorise `action` si le demandeur a une ligne collaborateur 'owner' sur le projet.
/// Pas de ligne, editor/viewer ou erreur DB: même refus 403.
pub async fn authorize_owner_action(
    store: &dyn Store,
    project_id: Uuid,
    requester_id: Uuid,
    action: OwnerAction,
) -> Result<(), ApiError> {
    match store.find_collaborator(project_id, requester_id).await {
        Ok(Some(row)) if row.role == Role::Owner => Ok(()),
        Ok(_) => Err(ApiError::forbidden(action.denial())),
        Err(e) => {
            tracing::warn!(error = %e, %project_id, "owner check failed");
            Err(ApiError::forbidden(action.denial()))
        }
    }
}

pub fn require_project_owner(
    project: &projects::Model,
    requester_id: Uuid,
    action: ProjectAction,
) -> Result<(), ApiError> {
    if project.owner_id == requester_id {
        Ok(())
    } else {
        Err(ApiError::forbidden(action.denial()))
    }
}

/// Rôle du demandeur sur le projet, 403 s'il n'est pas collaborateur
pub async fn require_membership(
    store: &dyn Store,
    project_id: Uuid,
    requester_id: Uuid,
) -> Result<Role, ApiError> {
    match store.find_collaborator(project_id, requester_id).await {
        Ok(Some(row)) => Ok(row.role),
        Ok(None) => Err(ApiError::forbidden("Access denied to this project")),
        Err(e) => {
            tracing::warn!(error = %e, %project_id, "membership check failed");
            Err(ApiError::forbidden("Access denied to this project"))
        }
    }
}
