use actix_web::{HttpResponse, delete, get, post, put, web};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{CollaboratorResponse, CollaboratorRoleRequest, RemoveCollaboratorRequest};
use crate::models::project_collaborators::Role;
use crate::services::access::{self, OwnerAction};
use crate::state::AppState;

const INVALID_INPUT: &str = "Invalid input";

/// (project_id, user_id, role) d'un body POST/PUT, rôle inconnu = 400
fn role_change(body: CollaboratorRoleRequest) -> Result<(Uuid, Uuid, Role), ApiError> {
    match (body.project_id, body.user_id, body.role.as_deref().and_then(Role::parse)) {
        (Some(project_id), Some(user_id), Some(role)) => Ok((project_id, user_id, role)),
        _ => Err(ApiError::bad_request(INVALID_INPUT)),
    }
}

/// POST /collaborators - Ajouter un collaborateur (owners uniquement)
#[post("")]
pub async fn add_collaborator(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CollaboratorRoleRequest>,
) -> Result<HttpResponse, ApiError> {
    let (project_id, user_id, role) = role_change(body.into_inner())?;

    access::authorize_owner_action(
        state.store.as_ref(),
        project_id,
        auth_user.user_id,
        OwnerAction::AddCollaborator,
    )
    .await?;

    // Paire déjà présente: erreur store => 500
    state.store.add_collaborator(project_id, user_id, role).await?;

    tracing::info!(%project_id, %user_id, role = role.as_str(), "collaborator added");

    Ok(HttpResponse::Created().json(serde_json::json!({ "message": "Collaborator added" })))
}

/// DELETE /collaborators - Retirer un collaborateur (owners uniquement)
#[delete("")]
pub async fn remove_collaborator(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<RemoveCollaboratorRequest>,
) -> Result<HttpResponse, ApiError> {
    let (Some(project_id), Some(user_id)) = (body.project_id, body.user_id) else {
        return Err(ApiError::bad_request(INVALID_INPUT));
    };

    access::authorize_owner_action(
        state.store.as_ref(),
        project_id,
        auth_user.user_id,
        OwnerAction::RemoveCollaborator,
    )
    .await?;

    let removed = state.store.remove_collaborator(project_id, user_id).await?;
    tracing::info!(%project_id, %user_id, removed, "collaborator removed");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Collaborator removed" })))
}

/// PUT /collaborators - Changer le rôle d'un collaborateur (owners uniquement)
#[put("")]
pub async fn update_collaborator_role(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CollaboratorRoleRequest>,
) -> Result<HttpResponse, ApiError> {
    let (project_id, user_id, role) = role_change(body.into_inner())?;

    access::authorize_owner_action(
        state.store.as_ref(),
        project_id,
        auth_user.user_id,
        OwnerAction::UpdateCollaboratorRole,
    )
    .await?;

    let updated = state
        .store
        .set_collaborator_role(project_id, user_id, role)
        .await?;
    tracing::info!(%project_id, %user_id, updated, role = role.as_str(), "collaborator role updated");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Collaborator role updated" })))
}

/// GET /collaborators/{project_id} - Liste des collaborateurs (sans contrôle d'appartenance)
#[get("/{project_id}")]
pub async fn list_collaborators(
    _auth_user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let collaborators: Vec<CollaboratorResponse> = state
        .store
        .list_collaborators(path.into_inner())
        .await?
        .into_iter()
        .map(CollaboratorResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "collaborators": collaborators })))
}

pub fn collaborators_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/collaborators")
            .service(add_collaborator)
            .service(remove_collaborator)
            .service(update_collaborator_role)
            .service(list_collaborators),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    use super::*;
    use crate::models::projects;
    use crate::models::users;
    use crate::routes::configure_routes;
    use crate::routes::testing;
    use crate::services::mailer::testing::RecordingMailer;
    use crate::services::memory_store::MemoryStore;
    use crate::services::store::{NewProject, Store};

    async fn project_of(store: &MemoryStore, owner: &users::Model) -> projects::Model {
        store
            .create_project(NewProject {
                name: "Thesis".to_string(),
                description: None,
                is_public: false,
                owner_id: owner.user_id,
            })
            .await
            .unwrap()
    }

    fn body(project_id: Uuid, user_id: Uuid, role: &str) -> serde_json::Value {
        serde_json::json!({ "project_id": project_id, "user_id": user_id, "role": role })
    }

    #[actix_web::test]
    async fn test_collaboration_scenario() {
        let store = Arc::new(MemoryStore::new());
        let owner = testing::verified_user(&store, "owner").await;
        let viewer = testing::verified_user(&store, "viewer").await;
        let editor = testing::verified_user(&store, "editor").await;
        let project = project_of(&store, &owner).await;
        let app = test::init_service(
            App::new()
                .app_data(testing::state(store.clone(), Arc::new(RecordingMailer::default())))
                .configure(configure_routes),
        )
        .await;
        let pid = project.project_id;

        // owner ajoute un viewer
        let req = test::TestRequest::post()
            .uri("/api/collaborators")
            .cookie(testing::session(&owner))
            .set_json(body(pid, viewer.user_id, "viewer"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "Collaborator added");

        // le viewer ne peut ni ajouter, ni retirer, ni changer de rôle
        let req = test::TestRequest::post()
            .uri("/api/collaborators")
            .cookie(testing::session(&viewer))
            .set_json(body(pid, editor.user_id, "editor"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "Only owners can add collaborators.");

        let req = test::TestRequest::delete()
            .uri("/api/collaborators")
            .cookie(testing::session(&viewer))
            .set_json(serde_json::json!({ "project_id": pid, "user_id": owner.user_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri("/api/collaborators")
            .cookie(testing::session(&viewer))
            .set_json(body(pid, viewer.user_id, "owner"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "Only owners can update collaborator roles.");

        // owner promeut le viewer en editor, et l'editor n'a toujours pas les droits owner
        let req = test::TestRequest::put()
            .uri("/api/collaborators")
            .cookie(testing::session(&owner))
            .set_json(body(pid, viewer.user_id, "editor"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            store.find_collaborator(pid, viewer.user_id).await.unwrap().unwrap().role,
            Role::Editor
        );

        let req = test::TestRequest::post()
            .uri("/api/collaborators")
            .cookie(testing::session(&viewer))
            .set_json(body(pid, editor.user_id, "viewer"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // liste
        let req = test::TestRequest::get()
            .uri(&format!("/api/collaborators/{pid}"))
            .cookie(testing::session(&owner))
            .to_request();
        let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let list = json["collaborators"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().any(|c| c["role"] == "owner"));
        assert!(list.iter().any(|c| c["role"] == "editor"));

        // owner retire l'editor
        let req = test::TestRequest::delete()
            .uri("/api/collaborators")
            .cookie(testing::session(&owner))
            .set_json(serde_json::json!({ "project_id": pid, "user_id": viewer.user_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "Collaborator removed");
        assert_eq!(store.collaborators(pid).len(), 1);
    }

    #[actix_web::test]
    async fn test_invalid_input() {
        let store = Arc::new(MemoryStore::new());
        let owner = testing::verified_user(&store, "owner").await;
        let other = testing::verified_user(&store, "other").await;
        let project = project_of(&store, &owner).await;
        let app = test::init_service(
            App::new()
                .app_data(testing::state(store.clone(), Arc::new(RecordingMailer::default())))
                .configure(configure_routes),
        )
        .await;

        for payload in [
            body(project.project_id, other.user_id, "admin"),
            serde_json::json!({ "project_id": project.project_id, "role": "viewer" }),
            serde_json::json!({ "project_id": "not-a-uuid", "user_id": other.user_id, "role": "viewer" }),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/collaborators")
                .cookie(testing::session(&owner))
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let json: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(json["message"], "Invalid input");
        }

        assert_eq!(store.collaborators(project.project_id).len(), 1);
    }

    #[actix_web::test]
    async fn test_duplicate_collaborator_is_server_error() {
        let store = Arc::new(MemoryStore::new());
        let owner = testing::verified_user(&store, "owner").await;
        let other = testing::verified_user(&store, "other").await;
        let project = project_of(&store, &owner).await;
        store.seed_collaborator(project.project_id, other.user_id, Role::Viewer);
        let app = test::init_service(
            App::new()
                .app_data(testing::state(store.clone(), Arc::new(RecordingMailer::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/collaborators")
            .cookie(testing::session(&owner))
            .set_json(body(project.project_id, other.user_id, "editor"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "Internal server error");
    }

    #[actix_web::test]
    async fn test_unknown_project_is_forbidden() {
        let store = Arc::new(MemoryStore::new());
        let owner = testing::verified_user(&store, "owner").await;
        let app = test::init_service(
            App::new()
                .app_data(testing::state(store.clone(), Arc::new(RecordingMailer::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/collaborators")
            .cookie(testing::session(&owner))
            .set_json(body(Uuid::new_v4(), Uuid::new_v4(), "viewer"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
