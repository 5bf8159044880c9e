use actix_web::{HttpResponse, delete, get, post, put, web};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateProjectRequest, UpdateProjectRequest};
use crate::models::projects;
use crate::services::access::{self, ProjectAction};
use crate::services::store::{NewProject, ProjectChanges, Store};
use crate::state::AppState;

async fn find_project(store: &dyn Store, project_id: Uuid) -> Result<projects::Model, ApiError> {
    store
        .find_project(project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

/// POST /projects - Créer un projet (le créateur devient owner)
#[post("")]
pub async fn create_project(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let Some(name) = body.name.filter(|n| !n.trim().is_empty()) else {
        return Err(ApiError::bad_request(
            "Project name and authenticated user required.",
        ));
    };

    let project = state
        .store
        .create_project(NewProject {
            name,
            description: body.description,
            is_public: body.is_public.unwrap_or(false),
            owner_id: auth_user.user_id,
        })
        .await?;

    tracing::info!(
        project_id = %project.project_id,
        owner_id = %auth_user.user_id,
        role = %auth_user.role,
        "project created"
    );

    Ok(HttpResponse::Created().json(serde_json::json!({ "project": project })))
}

/// GET /projects - Projets dont l'utilisateur est owner_id
#[get("")]
pub async fn list_projects(
    auth_user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let projects = state.store.projects_owned_by(auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "projects": projects })))
}

/// GET /projects/{id} - Réservé aux collaborateurs du projet
#[get("/{project_id}")]
pub async fn get_project(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let project = find_project(state.store.as_ref(), path.into_inner()).await?;
    access::require_membership(state.store.as_ref(), project.project_id, auth_user.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "project": project })))
}

/// PUT /projects/{id} - Champs absents inchangés (owner_id uniquement)
#[put("/{project_id}")]
pub async fn update_project(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProjectRequest>,
) -> Result<HttpResponse, ApiError> {
    let project = find_project(state.store.as_ref(), path.into_inner()).await?;
    access::require_project_owner(&project, auth_user.user_id, ProjectAction::Update)?;

    let body = body.into_inner();
    if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::bad_request("Project name cannot be empty."));
    }

    let changes = ProjectChanges {
        name: body.name,
        description: body.description,
        is_public: body.is_public,
    };
    if changes.is_empty() {
        return Ok(HttpResponse::Ok().json(serde_json::json!({ "project": project })));
    }

    let updated = state
        .store
        .update_project(project.project_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "project": updated })))
}

/// DELETE /projects/{id} - Supprime aussi les lignes collaborateurs (owner_id uniquement)
#[delete("/{project_id}")]
pub async fn delete_project(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let project = find_project(state.store.as_ref(), path.into_inner()).await?;
    access::require_project_owner(&project, auth_user.user_id, ProjectAction::Delete)?;

    if !state.store.delete_project(project.project_id).await? {
        return Err(ApiError::not_found("Project not found"));
    }

    tracing::info!(project_id = %project.project_id, "project deleted");

    Ok(HttpResponse::NoContent().finish())
}

pub fn projects_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/projects")
            .service(create_project)
            .service(list_projects)
            .service(get_project)
            .service(update_project)
            .service(delete_project),
    );
}
