use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only view events. Rows are never updated or deleted by the
/// application; they only disappear by cascade with the parent link.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "share_link_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub share_link_id: String,
    pub timestamp: DateTimeUtc,
    /// Best-effort client address, "unknown" when no source is available.
    pub ip_address: String,
    pub user_agent: String,
    pub country: Option<String>,
    pub viewer_email: Option<String>,
    pub session_duration_secs: Option<i32>,
    /// Open extension slot for fields not yet promoted to columns.
    pub extra: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::share_links::Entity",
        from = "Column::ShareLinkId",
        to = "super::share_links::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ShareLinks,
}

impl Related<super::share_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShareLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
