use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "share_links")]
pub struct Model {
    /// Internal primary key. Never exposed as the link identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// External-facing, unguessable token.
    #[sea_orm(unique)]
    pub link_id: String,
    pub document_id: String,
    /// Nullable so the link survives deletion of the issuing account.
    pub created_by: Option<String>,
    pub expires_at: Option<DateTimeUtc>,
    pub max_views: Option<i32>,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::documents::Entity",
        from = "Column::DocumentId",
        to = "super::documents::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Documents,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Creator,
    #[sea_orm(has_many = "super::share_link_logs::Entity")]
    ShareLinkLogs,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::share_link_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShareLinkLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
