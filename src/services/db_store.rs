use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::*;
use uuid::Uuid;

use crate::models::project_collaborators::{self, Role};
use crate::models::{projects, users};
use crate::services::store::{
    NewProject, NewUser, ProfileChanges, ProjectChanges, Store, StoreError,
};

/// Store PostgreSQL via SeaORM
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Les violations d'unicité deviennent StoreError::Duplicate
fn map_db_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Duplicate,
        _ => StoreError::Db(err),
    }
}

/// RecordNotUpdated (aucune ligne touchée par l'UPDATE) => None
fn updated<T>(result: Result<T, DbErr>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(model) => Ok(Some(model)),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(map_db_err(e)),
    }
}

#[async_trait]
impl Store for DbStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await?;
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<users::Model>, StoreError> {
        Ok(users::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<users::Model>, StoreError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<users::Model>, StoreError> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    async fn user_exists(&self, email: &str, username: &str) -> Result<bool, StoreError> {
        let existing = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Email.eq(email))
                    .add(users::Column::Username.eq(username)),
            )
            .one(&self.db)
            .await?;

        Ok(existing.is_some())
    }

    async fn insert_user(&self, user: NewUser) -> Result<users::Model, StoreError> {
        let new_user = users::ActiveModel {
            user_id: Set(Uuid::new_v4()),
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            is_verified: Set(false),
            role: Set(users::DEFAULT_ROLE.to_string()),
            user_avatar: Set(None),
            bio: Set(None),
            created_at: Set(Utc::now()),
            last_login: Set(None),
        };

        new_user.insert(&self.db).await.map_err(map_db_err)
    }

    async fn mark_verified(&self, user_id: Uuid) -> Result<Option<users::Model>, StoreError> {
        let active_model = users::ActiveModel {
            user_id: Set(user_id),
            is_verified: Set(true),
            ..Default::default()
        };

        updated(active_model.update(&self.db).await)
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let active_model = users::ActiveModel {
            user_id: Set(user_id),
            last_login: Set(Some(at)),
            ..Default::default()
        };

        updated(active_model.update(&self.db).await)?;
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<users::Model>, StoreError> {
        if changes.is_empty() {
            return self.find_user_by_id(user_id).await;
        }

        let mut active_model = users::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        };
        if let Some(username) = changes.username {
            active_model.username = Set(username);
        }
        if let Some(bio) = changes.bio {
            active_model.bio = Set(Some(bio));
        }
        if let Some(avatar) = changes.user_avatar {
            active_model.user_avatar = Set(Some(avatar));
        }

        updated(active_model.update(&self.db).await)
    }

    async fn create_project(&self, new_project: NewProject) -> Result<projects::Model, StoreError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let project = projects::ActiveModel {
            project_id: Set(Uuid::new_v4()),
            name: Set(new_project.name),
            description: Set(new_project.description),
            is_public: Set(new_project.is_public),
            owner_id: Set(new_project.owner_id),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;

        project_collaborators::ActiveModel {
            project_id: Set(project.project_id),
            user_id: Set(project.owner_id),
            role: Set(Role::Owner),
            added_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;

        // drop sans commit = rollback, pas de projet orphelin
        txn.commit().await?;
        Ok(project)
    }

    async fn find_project(&self, project_id: Uuid) -> Result<Option<projects::Model>, StoreError> {
        Ok(projects::Entity::find_by_id(project_id).one(&self.db).await?)
    }

    async fn projects_owned_by(&self, owner_id: Uuid) -> Result<Vec<projects::Model>, StoreError> {
        Ok(projects::Entity::find()
            .filter(projects::Column::OwnerId.eq(owner_id))
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn public_projects_owned_by(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<projects::Model>, StoreError> {
        Ok(projects::Entity::find()
            .filter(projects::Column::OwnerId.eq(owner_id))
            .filter(projects::Column::IsPublic.eq(true))
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn update_project(
        &self,
        project_id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Option<projects::Model>, StoreError> {
        if changes.is_empty() {
            return self.find_project(project_id).await;
        }

        let mut active_model = projects::ActiveModel {
            project_id: Set(project_id),
            ..Default::default()
        };
        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(description) = changes.description {
            active_model.description = Set(Some(description));
        }
        if let Some(is_public) = changes.is_public {
            active_model.is_public = Set(is_public);
        }

        updated(active_model.update(&self.db).await)
    }

    async fn delete_project(&self, project_id: Uuid) -> Result<bool, StoreError> {
        let txn = self.db.begin().await?;

        project_collaborators::Entity::delete_many()
            .filter(project_collaborators::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await?;
        let result = projects::Entity::delete_by_id(project_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<project_collaborators::Model>, StoreError> {
        Ok(project_collaborators::Entity::find_by_id((project_id, user_id))
            .one(&self.db)
            .await?)
    }

    async fn add_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<project_collaborators::Model, StoreError> {
        project_collaborators::ActiveModel {
            project_id: Set(project_id),
            user_id: Set(user_id),
            role: Set(role),
            added_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)
    }

    async fn remove_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, StoreError> {
        let result = project_collaborators::Entity::delete_many()
            .filter(project_collaborators::Column::ProjectId.eq(project_id))
            .filter(project_collaborators::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn set_collaborator_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<u64, StoreError> {
        let active_model = project_collaborators::ActiveModel {
            project_id: Set(project_id),
            user_id: Set(user_id),
            role: Set(role),
            ..Default::default()
        };

        Ok(updated(active_model.update(&self.db).await)?.map_or(0, |_| 1))
    }

    async fn list_collaborators(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<project_collaborators::Model>, StoreError> {
        Ok(project_collaborators::Entity::find()
            .filter(project_collaborators::Column::ProjectId.eq(project_id))
            .order_by_asc(project_collaborators::Column::AddedAt)
            .all(&self.db)
            .await?)
    }
}
