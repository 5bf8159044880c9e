//! Store en mémoire pour les tests des routes (mêmes contraintes d'unicité que la base).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::project_collaborators::{self, Role};
use crate::models::{projects, users};
use crate::services::store::{
    NewProject, NewUser, ProfileChanges, ProjectChanges, Store, StoreError,
};

#[derive(Default)]
struct Tables {
    users: Vec<users::Model>,
    projects: Vec<projects::Model>,
    collaborators: Vec<project_collaborators::Model>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().users.len()
    }

    pub fn user(&self, user_id: Uuid) -> Option<users::Model> {
        self.tables.lock().users.iter().find(|u| u.user_id == user_id).cloned()
    }

    pub fn collaborators(&self, project_id: Uuid) -> Vec<project_collaborators::Model> {
        self.tables
            .lock()
            .collaborators
            .iter()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Insère une ligne collaborateur sans passer par les routes
    pub fn seed_collaborator(&self, project_id: Uuid, user_id: Uuid, role: Role) {
        self.tables.lock().collaborators.push(project_collaborators::Model {
            project_id,
            user_id,
            role,
            added_at: Utc::now(),
        });
    }

    /// Passe un compte en vérifié sans passer par le lien email
    pub fn seed_verified(&self, user_id: Uuid) {
        if let Some(user) = self.tables.lock().users.iter_mut().find(|u| u.user_id == user_id) {
            user.is_verified = true;
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<users::Model>, StoreError> {
        Ok(self.user(user_id))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<users::Model>, StoreError> {
        Ok(self.tables.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<users::Model>, StoreError> {
        Ok(self.tables.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_exists(&self, email: &str, username: &str) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .any(|u| u.email == email || u.username == username))
    }

    async fn insert_user(&self, user: NewUser) -> Result<users::Model, StoreError> {
        let mut tables = self.tables.lock();
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(StoreError::Duplicate);
        }

        let model = users::Model {
            user_id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_verified: false,
            role: users::DEFAULT_ROLE.to_string(),
            user_avatar: None,
            bio: None,
            created_at: Utc::now(),
            last_login: None,
        };
        tables.users.push(model.clone());
        Ok(model)
    }

    async fn mark_verified(&self, user_id: Uuid) -> Result<Option<users::Model>, StoreError> {
        let mut tables = self.tables.lock();
        Ok(tables.users.iter_mut().find(|u| u.user_id == user_id).map(|u| {
            u.is_verified = true;
            u.clone()
        }))
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(user) = self.tables.lock().users.iter_mut().find(|u| u.user_id == user_id) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<users::Model>, StoreError> {
        let mut tables = self.tables.lock();
        if let Some(username) = &changes.username {
            if tables.users.iter().any(|u| &u.username == username && u.user_id != user_id) {
                return Err(StoreError::Duplicate);
            }
        }

        Ok(tables.users.iter_mut().find(|u| u.user_id == user_id).map(|u| {
            if let Some(username) = changes.username {
                u.username = username;
            }
            if let Some(bio) = changes.bio {
                u.bio = Some(bio);
            }
            if let Some(avatar) = changes.user_avatar {
                u.user_avatar = Some(avatar);
            }
            u.clone()
        }))
    }

    async fn create_project(&self, new_project: NewProject) -> Result<projects::Model, StoreError> {
        let now = Utc::now();
        let project = projects::Model {
            project_id: Uuid::new_v4(),
            name: new_project.name,
            description: new_project.description,
            is_public: new_project.is_public,
            owner_id: new_project.owner_id,
            created_at: now,
        };

        let mut tables = self.tables.lock();
        tables.projects.push(project.clone());
        tables.collaborators.push(project_collaborators::Model {
            project_id: project.project_id,
            user_id: project.owner_id,
            role: Role::Owner,
            added_at: now,
        });
        Ok(project)
    }

    async fn find_project(&self, project_id: Uuid) -> Result<Option<projects::Model>, StoreError> {
        Ok(self
            .tables
            .lock()
            .projects
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned())
    }

    async fn projects_owned_by(&self, owner_id: Uuid) -> Result<Vec<projects::Model>, StoreError> {
        Ok(self
            .tables
            .lock()
            .projects
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn public_projects_owned_by(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<projects::Model>, StoreError> {
        Ok(self
            .tables
            .lock()
            .projects
            .iter()
            .filter(|p| p.owner_id == owner_id && p.is_public)
            .cloned()
            .collect())
    }

    async fn update_project(
        &self,
        project_id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Option<projects::Model>, StoreError> {
        let mut tables = self.tables.lock();
        Ok(tables.projects.iter_mut().find(|p| p.project_id == project_id).map(|p| {
            if let Some(name) = changes.name {
                p.name = name;
            }
            if let Some(description) = changes.description {
                p.description = Some(description);
            }
            if let Some(is_public) = changes.is_public {
                p.is_public = is_public;
            }
            p.clone()
        }))
    }

    async fn delete_project(&self, project_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock();
        tables.collaborators.retain(|c| c.project_id != project_id);
        let before = tables.projects.len();
        tables.projects.retain(|p| p.project_id != project_id);
        Ok(tables.projects.len() < before)
    }

    async fn find_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<project_collaborators::Model>, StoreError> {
        Ok(self
            .tables
            .lock()
            .collaborators
            .iter()
            .find(|c| c.project_id == project_id && c.user_id == user_id)
            .cloned())
    }

    async fn add_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<project_collaborators::Model, StoreError> {
        let mut tables = self.tables.lock();
        if tables
            .collaborators
            .iter()
            .any(|c| c.project_id == project_id && c.user_id == user_id)
        {
            return Err(StoreError::Duplicate);
        }

        let row = project_collaborators::Model {
            project_id,
            user_id,
            role,
            added_at: Utc::now(),
        };
        tables.collaborators.push(row.clone());
        Ok(row)
    }

    async fn remove_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock();
        let before = tables.collaborators.len();
        tables
            .collaborators
            .retain(|c| !(c.project_id == project_id && c.user_id == user_id));
        Ok((before - tables.collaborators.len()) as u64)
    }

    async fn set_collaborator_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock();
        let mut touched = 0;
        for row in tables
            .collaborators
            .iter_mut()
            .filter(|c| c.project_id == project_id && c.user_id == user_id)
        {
            row.role = role;
            touched += 1;
        }
        Ok(touched)
    }

    async fn list_collaborators(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<project_collaborators::Model>, StoreError> {
        Ok(self.collaborators(project_id))
    }
}
