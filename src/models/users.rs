use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Rôle de compte par défaut (différent des rôles de collaborateur)
pub const DEFAULT_ROLE: &str = "user";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)] // jamais exposé en JSON
    pub password_hash: String, // Format: pbkdf2:sha256:iterations$salt$hash
    pub is_verified: bool,
    pub role: String,
    pub user_avatar: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::projects::Entity")]
    Projects,

    #[sea_orm(has_many = "super::project_collaborators::Entity")]
    ProjectCollaborators,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::project_collaborators::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectCollaborators.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
