use crate::api::error::AppError;
use crate::entities::{prelude::*, users};
use crate::utils::auth::{create_jwt, verify_password};
use axum::{Json, extract::State};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub company_id: String,
    pub role: String,
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    // One generic refusal for every failure mode; never reveal whether
    // the account exists.
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let user = Users::find()
        .filter(users::Column::Username.eq(&req.username))
        .one(&state.db)
        .await?
        .ok_or_else(invalid)?;

    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(&req.password, hash)? {
        return Err(invalid());
    }

    let token = create_jwt(
        &user.id,
        &user.company_id,
        &user.role,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
        company_id: user.company_id,
        role: user.role,
    }))
}
