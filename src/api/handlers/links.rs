use crate::api::error::AppError;
use crate::entities::prelude::*;
use crate::services::link_service::{LinkService, LogExtras};
use crate::services::stats_service::StatsService;
use crate::utils::auth::Claims;
use crate::utils::client_info::resolve_client_info;
use axum::{
    Extension, Json,
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use utoipa::ToSchema;

// ── Request / Response Types ──────────────────────────────────────────

#[derive(Deserialize, ToSchema)]
pub struct CreateLinkRequest {
    pub document_id: Option<String>,
    /// Absolute expiry timestamp; omit for an unbounded link
    pub expires_at: Option<chrono::DateTime<Utc>>,
    /// Relative alternative to expires_at, in hours from now
    pub expires_in_hours: Option<i64>,
    /// Persisted view cap; only enforced when ENFORCE_MAX_VIEWS is on
    pub max_views: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct LinkResponse {
    pub id: String,
    pub link_id: String,
    pub document_id: String,
    pub created_by: Option<String>,
    pub expires_at: Option<chrono::DateTime<Utc>>,
    pub max_views: Option<i32>,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

impl From<crate::entities::share_links::Model> for LinkResponse {
    fn from(link: crate::entities::share_links::Model) -> Self {
        Self {
            id: link.id,
            link_id: link.link_id,
            document_id: link.document_id,
            created_by: link.created_by,
            expires_at: link.expires_at,
            max_views: link.max_views,
            created_at: link.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PublicLinkResponse {
    pub link_id: String,
    pub document_id: String,
    pub document_name: String,
    pub expires_at: Option<chrono::DateTime<Utc>>,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

#[derive(Deserialize, Default, ToSchema)]
pub struct LogViewRequest {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub country: Option<String>,
    pub viewer_email: Option<String>,
    pub session_duration_secs: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub extra: Option<serde_json::Value>,
}

#[derive(Serialize, ToSchema)]
pub struct LogViewResponse {
    pub logged: bool,
    pub timestamp: chrono::DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct LinkStatsResponse {
    pub link_id: String,
    pub document_id: String,
    pub view_count: i64,
    pub unique_viewers: i64,
    pub last_opened: Option<chrono::DateTime<Utc>>,
    pub expires_at: Option<chrono::DateTime<Utc>>,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct LinksQuery {
    pub document_id: Option<String>,
}

// ── Authenticated Endpoints ───────────────────────────────────────────

/// Create a share link
#[utoipa::path(
    post,
    path = "/links",
    request_body = CreateLinkRequest,
    responses(
        (status = 201, description = "Share link created", body = LinkResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(("jwt" = [])),
    tag = "links"
)]
pub async fn create_link(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let document_id = match req.document_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(AppError::BadRequest("document_id is required".to_string())),
    };

    let now = Utc::now();
    let ttl_cap = chrono::Duration::hours(state.config.max_link_ttl_hours);
    let expires_at = match (req.expires_at, req.expires_in_hours) {
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "Provide expires_at or expires_in_hours, not both".to_string(),
            ));
        }
        (Some(at), None) if at <= now => {
            return Err(AppError::BadRequest(
                "Expiry must be in the future".to_string(),
            ));
        }
        (Some(at), None) if at - now > ttl_cap => {
            return Err(AppError::BadRequest(format!(
                "Expiry cannot exceed {} hours",
                state.config.max_link_ttl_hours
            )));
        }
        (Some(at), None) => Some(at),
        (None, Some(hours)) if hours <= 0 => {
            return Err(AppError::BadRequest("Expiry must be positive".to_string()));
        }
        (None, Some(hours)) if hours > state.config.max_link_ttl_hours => {
            return Err(AppError::BadRequest(format!(
                "Expiry cannot exceed {} hours",
                state.config.max_link_ttl_hours
            )));
        }
        (None, Some(hours)) => Some(now + chrono::Duration::hours(hours)),
        (None, None) => None,
    };

    if matches!(req.max_views, Some(n) if n <= 0) {
        return Err(AppError::BadRequest(
            "max_views must be positive".to_string(),
        ));
    }

    let link = LinkService::create_link(
        &state.db,
        document_id,
        claims.sub,
        &claims.company_id,
        expires_at,
        req.max_views,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// List share links created by the caller
#[utoipa::path(
    get,
    path = "/links",
    params(
        ("document_id" = Option<String>, Query, description = "Filter by document ID")
    ),
    responses(
        (status = 200, description = "List of links", body = Vec<LinkResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "links"
)]
pub async fn list_links(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<LinksQuery>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = LinkService::list_links(&state.db, &claims.sub, query.document_id.as_deref()).await?;
    Ok(Json(links.into_iter().map(Into::into).collect()))
}

/// Revoke a share link
#[utoipa::path(
    delete,
    path = "/links/{link_id}",
    params(("link_id" = String, Path, description = "Internal share link ID")),
    responses(
        (status = 204, description = "Link revoked"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Link not found")
    ),
    security(("jwt" = [])),
    tag = "links"
)]
pub async fn revoke_link(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(share_id): Path<String>,
) -> Result<StatusCode, AppError> {
    LinkService::revoke_link(&state.db, &share_id, &claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Public Endpoints ──────────────────────────────────────────────────

/// Resolve a share link (public)
#[utoipa::path(
    get,
    path = "/links/{link_id}",
    params(("link_id" = String, Path, description = "Share link token")),
    responses(
        (status = 200, description = "Link is active", body = PublicLinkResponse),
        (status = 404, description = "Link not found"),
        (status = 410, description = "Link expired")
    ),
    tag = "links"
)]
pub async fn get_public_link(
    State(state): State<crate::AppState>,
    Path(link_id): Path<String>,
) -> Result<Json<PublicLinkResponse>, AppError> {
    let link = LinkService::resolve_by_link_id(
        &state.public_db,
        &link_id,
        state.config.enforce_max_views,
    )
    .await?;

    // Cascade keeps this consistent; a missing document is a race with
    // its deletion and reads as not found.
    let document = Documents::find_by_id(&link.document_id)
        .one(&state.public_db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shared document no longer exists".to_string()))?;

    Ok(Json(PublicLinkResponse {
        link_id: link.link_id,
        document_id: link.document_id,
        document_name: document.name,
        expires_at: link.expires_at,
        created_at: link.created_at,
    }))
}

/// Record a view against a share link (public)
#[utoipa::path(
    post,
    path = "/links/{link_id}/log",
    params(("link_id" = String, Path, description = "Share link token")),
    request_body = LogViewRequest,
    responses(
        (status = 201, description = "View recorded", body = LogViewResponse),
        (status = 404, description = "Link not found"),
        (status = 410, description = "Link expired (only when gating is enabled)")
    ),
    tag = "links"
)]
pub async fn log_link_view(
    State(state): State<crate::AppState>,
    Path(link_id): Path<String>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Option<Json<LogViewRequest>>,
) -> Result<(StatusCode, Json<LogViewResponse>), AppError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();

    // Default policy records attempts against expired links too; only
    // existence is checked. The toggle switches to the stricter gate.
    let link = if state.config.gate_logging_on_active {
        LinkService::resolve_by_link_id(&state.public_db, &link_id, state.config.enforce_max_views)
            .await?
    } else {
        LinkService::find_by_link_id(&state.public_db, &link_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Share link not found".to_string()))?
    };

    let client = resolve_client_info(
        req.ip_address.as_deref(),
        req.user_agent.as_deref(),
        &headers,
        connect_info.map(|ConnectInfo(addr)| addr),
    );

    let extras = LogExtras {
        country: req.country,
        viewer_email: req.viewer_email,
        session_duration_secs: req.session_duration_secs,
        extra: req.extra,
    };

    let log = LinkService::log_view(&state.public_db, &link, client, extras).await?;

    Ok((
        StatusCode::CREATED,
        Json(LogViewResponse {
            logged: true,
            timestamp: log.timestamp,
        }),
    ))
}

/// View statistics for a share link (public)
#[utoipa::path(
    get,
    path = "/links/{link_id}/stats",
    params(("link_id" = String, Path, description = "Share link token")),
    responses(
        (status = 200, description = "Link statistics", body = LinkStatsResponse),
        (status = 404, description = "Link not found")
    ),
    tag = "links"
)]
pub async fn get_link_stats(
    State(state): State<crate::AppState>,
    Path(link_id): Path<String>,
) -> Result<Json<LinkStatsResponse>, AppError> {
    // Stats stay readable after expiry; only a missing link is refused.
    let link = LinkService::find_by_link_id(&state.public_db, &link_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Share link not found".to_string()))?;

    let stats = StatsService::link_stats(&state.public_db, &link.id).await?;

    Ok(Json(LinkStatsResponse {
        link_id: link.link_id,
        document_id: link.document_id,
        view_count: stats.view_count,
        unique_viewers: stats.unique_viewers,
        last_opened: stats.last_opened,
        expires_at: link.expires_at,
        created_at: link.created_at,
    }))
}
