use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::link_id;
use crate::utils::client_info::ClientInfo;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

/// Effective state of a link, computed at access time from stored data and
/// wall-clock time. Never cached; every access re-resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Active,
    Expired,
    NotFound,
}

/// Pure resolution rule. A missing record is NotFound; a record whose
/// expiry has been reached is Expired; everything else (including links
/// with no expiry at all) is Active.
pub fn resolve_state(record: Option<&share_links::Model>, now: DateTime<Utc>) -> LinkState {
    match record {
        None => LinkState::NotFound,
        Some(link) => match link.expires_at {
            Some(expires_at) if expires_at <= now => LinkState::Expired,
            _ => LinkState::Active,
        },
    }
}

/// Named optional fields accepted on a log write, plus one open extension
/// map for anything not yet promoted to a column.
#[derive(Debug, Default, Clone)]
pub struct LogExtras {
    pub country: Option<String>,
    pub viewer_email: Option<String>,
    pub session_duration_secs: Option<i32>,
    pub extra: Option<serde_json::Value>,
}

const MAX_ID_ATTEMPTS: usize = 5;

pub struct LinkService;

impl LinkService {
    /// Create a new share link for a document the caller owns.
    ///
    /// Identifier collisions are absorbed here: the unique constraint on
    /// link_id is the arbiter, and a violation triggers regeneration
    /// rather than surfacing to the caller.
    pub async fn create_link(
        db: &DatabaseConnection,
        document_id: String,
        created_by: String,
        company_id: &str,
        expires_at: Option<DateTime<Utc>>,
        max_views: Option<i32>,
    ) -> Result<share_links::Model, AppError> {
        // Verify the caller owns the document, within their own company
        let _document = Documents::find_by_id(&document_id)
            .filter(documents::Column::OwnerId.eq(&created_by))
            .filter(documents::Column::CompanyId.eq(company_id))
            .one(db)
            .await?
            .ok_or(AppError::NotFound(
                "Document not found or access denied".to_string(),
            ))?;

        for _ in 0..MAX_ID_ATTEMPTS {
            let link_id = link_id::generate_link_id()?;

            let link = share_links::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                link_id: Set(link_id),
                document_id: Set(document_id.clone()),
                created_by: Set(Some(created_by.clone())),
                expires_at: Set(expires_at),
                max_views: Set(max_views),
                created_at: Set(Some(Utc::now())),
            };

            match link.insert(db).await {
                Ok(model) => return Ok(model),
                Err(e) => match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        tracing::warn!("Link identifier collision, regenerating");
                        continue;
                    }
                    _ => return Err(e.into()),
                },
            }
        }

        Err(AppError::Internal(
            "Could not allocate a unique link identifier".to_string(),
        ))
    }

    /// Lookup by external token. No ownership filter: any holder of the
    /// token is a legitimate caller by possession.
    pub async fn find_by_link_id(
        db: &DatabaseConnection,
        link_id: &str,
    ) -> Result<Option<share_links::Model>, AppError> {
        let link = ShareLinks::find()
            .filter(share_links::Column::LinkId.eq(link_id))
            .one(db)
            .await?;
        Ok(link)
    }

    /// Resolve a link for anonymous access, mapping its state to the
    /// distinct refusal signals: NotFound stays a generic 404, Expired is
    /// a deliberate 410 so clients can say "this link has expired".
    pub async fn resolve_by_link_id(
        db: &DatabaseConnection,
        link_id: &str,
        enforce_max_views: bool,
    ) -> Result<share_links::Model, AppError> {
        let record = Self::find_by_link_id(db, link_id).await?;

        let Some(link) = record else {
            return Err(AppError::NotFound("Share link not found".to_string()));
        };

        if resolve_state(Some(&link), Utc::now()) == LinkState::Expired {
            return Err(AppError::Gone("Share link has expired".to_string()));
        }

        if enforce_max_views {
            if let Some(max_views) = link.max_views {
                let views = Self::view_count(db, &link.id).await?;
                if views >= max_views as u64 {
                    return Err(AppError::Gone("Share link view limit reached".to_string()));
                }
            }
        }

        Ok(link)
    }

    /// Append a view event. Policy never rejects a write here; only a
    /// store failure does. Whether expired links accept log writes is
    /// decided by the caller (see AppConfig::gate_logging_on_active).
    pub async fn log_view(
        db: &DatabaseConnection,
        link: &share_links::Model,
        client: ClientInfo,
        extras: LogExtras,
    ) -> Result<share_link_logs::Model, AppError> {
        let log = share_link_logs::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            share_link_id: Set(link.id.clone()),
            timestamp: Set(Utc::now()),
            ip_address: Set(client.ip_address),
            user_agent: Set(client.user_agent),
            country: Set(extras.country),
            viewer_email: Set(extras.viewer_email),
            session_duration_secs: Set(extras.session_duration_secs),
            extra: Set(extras.extra),
        };

        let result = log.insert(db).await?;
        Ok(result)
    }

    pub async fn view_count(db: &DatabaseConnection, share_link_pk: &str) -> Result<u64, AppError> {
        let count = ShareLinkLogs::find()
            .filter(share_link_logs::Column::ShareLinkId.eq(share_link_pk))
            .count(db)
            .await?;
        Ok(count)
    }

    /// List links created by a user, newest first, optionally scoped to
    /// one document.
    pub async fn list_links(
        db: &DatabaseConnection,
        user_id: &str,
        document_id: Option<&str>,
    ) -> Result<Vec<share_links::Model>, AppError> {
        let mut query = ShareLinks::find()
            .filter(share_links::Column::CreatedBy.eq(user_id))
            .order_by_desc(share_links::Column::CreatedAt);

        if let Some(document_id) = document_id {
            query = query.filter(share_links::Column::DocumentId.eq(document_id));
        }

        let links = query.all(db).await?;
        Ok(links)
    }

    /// Revoke (delete) a link. Deletion is the only revocation mechanism;
    /// there is no stored "revoked" state.
    pub async fn revoke_link(
        db: &DatabaseConnection,
        share_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let link = ShareLinks::find_by_id(share_id)
            .filter(share_links::Column::CreatedBy.eq(user_id))
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Share link not found".to_string()))?;

        link.delete(db).await?;
        Ok(())
    }
}
