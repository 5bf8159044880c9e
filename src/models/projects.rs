use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub owner_id: Uuid, // immuable: aucun transfert de propriété
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::UserId"
    )]
    Owner,

    #[sea_orm(has_many = "super::project_collaborators::Entity")]
    ProjectCollaborators,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::project_collaborators::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectCollaborators.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
