pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use axum::{
    Router,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::login,
        api::handlers::links::create_link,
        api::handlers::links::list_links,
        api::handlers::links::revoke_link,
        api::handlers::links::get_public_link,
        api::handlers::links::log_link_view,
        api::handlers::links::get_link_stats,
        api::handlers::documents::create_document,
        api::handlers::documents::list_documents,
        api::handlers::documents::delete_document,
        api::handlers::documents::get_document_stats,
        api::handlers::users::get_profile,
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::delete_user,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::auth::LoginRequest,
            api::handlers::auth::LoginResponse,
            api::handlers::links::CreateLinkRequest,
            api::handlers::links::LinkResponse,
            api::handlers::links::PublicLinkResponse,
            api::handlers::links::LogViewRequest,
            api::handlers::links::LogViewResponse,
            api::handlers::links::LinkStatsResponse,
            api::handlers::documents::CreateDocumentRequest,
            api::handlers::documents::DocumentResponse,
            api::handlers::documents::LinkStatsEntry,
            api::handlers::documents::DocumentStatsResponse,
            api::handlers::users::UserResponse,
            api::handlers::users::CreateUserRequest,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "auth", description = "Credential exchange"),
        (name = "links", description = "Share link issuance, resolution and logging"),
        (name = "documents", description = "Document registry and per-document stats"),
        (name = "users", description = "Company-scoped user management"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

/// Shared application state. Two store handles are injected at
/// construction: the privileged one serves authenticated owner paths, the
/// public one serves anonymous link access under the anon credential.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub public_db: DatabaseConnection,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/auth/login", post(api::handlers::auth::login))
        // Public anonymous surface; no auth, the token itself is the
        // credential.
        .route("/links/:link_id", get(api::handlers::links::get_public_link))
        .route(
            "/links/:link_id/log",
            post(api::handlers::links::log_link_view),
        )
        .route(
            "/links/:link_id/stats",
            get(api::handlers::links::get_link_stats),
        )
        // Owner-facing management surface.
        .route(
            "/links",
            post(api::handlers::links::create_link)
                .get(api::handlers::links::list_links)
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route(
            "/links/:link_id",
            delete(api::handlers::links::revoke_link).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/documents",
            post(api::handlers::documents::create_document)
                .get(api::handlers::documents::list_documents)
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route(
            "/documents/:id",
            delete(api::handlers::documents::delete_document).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/documents/:id/stats",
            get(api::handlers::documents::get_document_stats).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/users",
            get(api::handlers::users::list_users)
                .post(api::handlers::users::create_user)
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route(
            "/users/me",
            get(api::handlers::users::get_profile).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/users/:id",
            delete(api::handlers::users::delete_user).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
