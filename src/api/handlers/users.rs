use crate::api::error::AppError;
use crate::entities::{prelude::*, users};
use crate::utils::auth::{Claims, hash_password};
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

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: String,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub role: Option<String>,
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn get_profile(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>, AppError> {
    let user = Users::find_by_id(&claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// List users in the caller's company (admin only)
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Company users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    require_admin(&claims)?;

    let members = Users::find()
        .filter(users::Column::CompanyId.eq(&claims.company_id))
        .order_by_asc(users::Column::Username)
        .all(&state.db)
        .await?;

    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// Create a user in the caller's company (admin only)
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    require_admin(&claims)?;

    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let role = req.role.unwrap_or_else(|| "member".to_string());
    if !["admin", "member"].contains(&role.as_str()) {
        return Err(AppError::BadRequest(
            "role must be 'admin' or 'member'".to_string(),
        ));
    }

    let existing = Users::find()
        .filter(users::Column::Username.eq(&req.username))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        company_id: Set(claims.company_id.clone()),
        username: Set(req.username),
        password_hash: Set(Some(hash_password(&req.password)?)),
        email: Set(req.email),
        name: Set(req.name),
        role: Set(role),
        created_at: Set(Some(Utc::now())),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Delete a user in the caller's company (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    require_admin(&claims)?;

    if user_id == claims.sub {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    // Company-scoped lookup: users of other tenants look like they do
    // not exist.
    let user = Users::find_by_id(&user_id)
        .filter(users::Column::CompanyId.eq(&claims.company_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    user.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".to_string()))
    }
}
