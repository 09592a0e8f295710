use crate::api::error::AppError;
use crate::entities::{documents, prelude::*};
use crate::services::stats_service::StatsService;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateDocumentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct LinkStatsEntry {
    pub link_id: String,
    pub view_count: i64,
    pub unique_viewers: i64,
    pub last_opened: Option<chrono::DateTime<Utc>>,
    pub expires_at: Option<chrono::DateTime<Utc>>,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct DocumentStatsResponse {
    pub document_id: String,
    pub total_views: i64,
    pub last_opened: Option<chrono::DateTime<Utc>>,
    pub links: Vec<LinkStatsEntry>,
}

/// Register a document identifier
#[utoipa::path(
    post,
    path = "/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Document registered", body = DocumentResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "documents"
)]
pub async fn create_document(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let document = documents::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        company_id: Set(claims.company_id.clone()),
        owner_id: Set(claims.sub.clone()),
        name: Set(req.name),
        created_at: Set(Some(Utc::now())),
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentResponse {
            id: document.id,
            name: document.name,
            owner_id: document.owner_id,
            created_at: document.created_at,
        }),
    ))
}

/// List the caller's documents
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "Documents owned by the caller", body = Vec<DocumentResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let docs = Documents::find()
        .filter(documents::Column::OwnerId.eq(&claims.sub))
        .filter(documents::Column::CompanyId.eq(&claims.company_id))
        .order_by_desc(documents::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(
        docs.into_iter()
            .map(|d| DocumentResponse {
                id: d.id,
                name: d.name,
                owner_id: d.owner_id,
                created_at: d.created_at,
            })
            .collect(),
    ))
}

/// Delete a document; its share links and their logs go with it
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = String, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(("jwt" = [])),
    tag = "documents"
)]
pub async fn delete_document(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(document_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let document = find_owned(&state, &claims, &document_id).await?;
    document.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Per-link view statistics for a document, with rolled-up totals
#[utoipa::path(
    get,
    path = "/documents/{id}/stats",
    params(("id" = String, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Aggregated stats", body = DocumentStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(("jwt" = [])),
    tag = "documents"
)]
pub async fn get_document_stats(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentStatsResponse>, AppError> {
    let document = find_owned(&state, &claims, &document_id).await?;

    let per_link = StatsService::document_stats(&state.db, &document.id).await?;

    let total_views = per_link.iter().map(|(_, s)| s.view_count).sum();
    let last_opened = per_link.iter().filter_map(|(_, s)| s.last_opened).max();

    let links = per_link
        .into_iter()
        .map(|(link, stats)| LinkStatsEntry {
            link_id: link.link_id,
            view_count: stats.view_count,
            unique_viewers: stats.unique_viewers,
            last_opened: stats.last_opened,
            expires_at: link.expires_at,
            created_at: link.created_at,
        })
        .collect();

    Ok(Json(DocumentStatsResponse {
        document_id: document.id,
        total_views,
        last_opened,
        links,
    }))
}

async fn find_owned(
    state: &crate::AppState,
    claims: &Claims,
    document_id: &str,
) -> Result<documents::Model, AppError> {
    Documents::find_by_id(document_id)
        .filter(documents::Column::OwnerId.eq(&claims.sub))
        .filter(documents::Column::CompanyId.eq(&claims.company_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
}
