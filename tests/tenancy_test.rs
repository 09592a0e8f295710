use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use docshare_backend::config::AppConfig;
use docshare_backend::entities::{prelude::*, *};
use docshare_backend::infrastructure::database;
use docshare_backend::utils::auth::hash_password;
use docshare_backend::{AppState, create_app};
use http_body_util::BodyExt;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

async fn setup_test_db() -> DatabaseConnection {
    unsafe {
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
    }
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

fn test_app(db: &DatabaseConnection) -> Router {
    create_app(AppState {
        db: db.clone(),
        public_db: db.clone(),
        config: AppConfig::development(),
    })
}

async fn seed_company(db: &DatabaseConnection, name: &str) -> companies::Model {
    companies::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        created_at: Set(Some(Utc::now())),
    }
    .insert(db)
    .await
    .unwrap()
}

async fn seed_user(
    db: &DatabaseConnection,
    company_id: &str,
    username: &str,
    role: &str,
) -> users::Model {
    users::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        company_id: Set(company_id.to_string()),
        username: Set(username.to_string()),
        password_hash: Set(Some(hash_password("password123").unwrap())),
        email: Set(None),
        name: Set(None),
        role: Set(role.to_string()),
        created_at: Set(Some(Utc::now())),
    }
    .insert(db)
    .await
    .unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn login(app: &Router, username: &str) -> String {
    let response = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": username, "password": "password123"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let db = setup_test_db().await;
    let company = seed_company(&db, "Acme").await;
    seed_user(&db, &company.id, "alice", "member").await;
    let app = test_app(&db);

    let response = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown accounts get the same generic refusal
    let response = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "nobody", "password": "password123"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_user_crud_is_company_scoped() {
    let db = setup_test_db().await;
    let acme = seed_company(&db, "Acme").await;
    let globex = seed_company(&db, "Globex").await;
    seed_user(&db, &acme.id, "acme_admin", "admin").await;
    seed_user(&db, &acme.id, "acme_member", "member").await;
    let outsider = seed_user(&db, &globex.id, "globex_user", "member").await;
    let app = test_app(&db);

    let admin_token = login(&app, "acme_admin").await;
    let member_token = login(&app, "acme_member").await;

    // Member cannot manage users
    let response = send(&app, "GET", "/users", Some(&member_token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin sees only their own company
    let response = send(&app, "GET", "/users", Some(&admin_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let usernames: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert!(usernames.contains(&"acme_admin"));
    assert!(usernames.contains(&"acme_member"));
    assert!(!usernames.contains(&"globex_user"));

    // Admin creates a user in their company
    let response = send(
        &app,
        "POST",
        "/users",
        Some(&admin_token),
        Some(json!({"username": "acme_new", "password": "password123"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["role"], json!("member"));

    // Cross-tenant deletion reads as not found, never as forbidden
    let response = send(
        &app,
        "DELETE",
        &format!("/users/{}", outsider.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Weak passwords are refused
    let response = send(
        &app,
        "POST",
        "/users",
        Some(&admin_token),
        Some(json!({"username": "shorty", "password": "short"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_links_are_isolated_across_tenants() {
    let db = setup_test_db().await;
    let acme = seed_company(&db, "Acme").await;
    let globex = seed_company(&db, "Globex").await;
    seed_user(&db, &acme.id, "acme_owner", "member").await;
    seed_user(&db, &globex.id, "globex_owner", "member").await;
    let app = test_app(&db);

    let acme_token = login(&app, "acme_owner").await;
    let globex_token = login(&app, "globex_owner").await;

    let response = send(
        &app,
        "POST",
        "/documents",
        Some(&acme_token),
        Some(json!({"name": "acme-secret.pdf"})),
    )
    .await;
    let doc_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        "POST",
        "/links",
        Some(&acme_token),
        Some(json!({"document_id": doc_id})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let link = body_json(response).await;
    let share_id = link["id"].as_str().unwrap();
    let link_id = link["link_id"].as_str().unwrap();

    // Another tenant cannot mint links against the document
    let response = send(
        &app,
        "POST",
        "/links",
        Some(&globex_token),
        Some(json!({"document_id": doc_id})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Nor revoke, list or read stats through the management surface
    let response = send(
        &app,
        "DELETE",
        &format!("/links/{}", share_id),
        Some(&globex_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "GET", "/links", Some(&globex_token), None).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);

    let response = send(
        &app,
        "GET",
        &format!("/documents/{}/stats", doc_id),
        Some(&globex_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // But possession of the token grants anonymous access to anyone
    let response = send(&app, "GET", &format!("/links/{}", link_id), None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_link_survives_issuer_deletion() {
    let db = setup_test_db().await;
    let acme = seed_company(&db, "Acme").await;
    seed_user(&db, &acme.id, "admin", "admin").await;
    let issuer = seed_user(&db, &acme.id, "issuer", "member").await;
    let app = test_app(&db);

    let issuer_token = login(&app, "issuer").await;
    let admin_token = login(&app, "admin").await;

    let response = send(
        &app,
        "POST",
        "/documents",
        Some(&issuer_token),
        Some(json!({"name": "handover.pdf"})),
    )
    .await;
    let doc_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Reassign the document so it outlives the issuer's account
    let document = Documents::find_by_id(&doc_id).one(&db).await.unwrap().unwrap();
    let admin_user = Users::find()
        .filter(users::Column::Username.eq("admin"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let link = send(
        &app,
        "POST",
        "/links",
        Some(&issuer_token),
        Some(json!({"document_id": doc_id})),
    )
    .await;
    assert_eq!(link.status(), StatusCode::CREATED);
    let link = body_json(link).await;
    let link_id = link["link_id"].as_str().unwrap();

    let mut document: documents::ActiveModel = document.into();
    document.owner_id = Set(admin_user.id.clone());
    document.update(&db).await.unwrap();

    let response = send(
        &app,
        "DELETE",
        &format!("/users/{}", issuer.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The link still resolves; its creator reference is cleared
    let response = send(&app, "GET", &format!("/links/{}", link_id), None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = ShareLinks::find()
        .filter(share_links::Column::LinkId.eq(link_id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.created_by.is_none());
}
