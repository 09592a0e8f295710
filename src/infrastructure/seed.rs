use crate::entities::{companies, prelude::*, users};
use crate::utils::auth::hash_password;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use std::env;
use tracing::info;
use uuid::Uuid;

/// Bootstrap a first company and admin account on an empty database so the
/// instance is reachable. Controlled by BOOTSTRAP_COMPANY / BOOTSTRAP_ADMIN_USERNAME /
/// BOOTSTRAP_ADMIN_PASSWORD; skipped entirely once any user exists.
pub async fn seed_initial_data(db: &DatabaseConnection) -> anyhow::Result<()> {
    let existing = Users::find().count(db).await?;
    if existing > 0 {
        return Ok(());
    }

    let (Ok(company_name), Ok(username), Ok(password)) = (
        env::var("BOOTSTRAP_COMPANY"),
        env::var("BOOTSTRAP_ADMIN_USERNAME"),
        env::var("BOOTSTRAP_ADMIN_PASSWORD"),
    ) else {
        info!("🌱 No bootstrap credentials configured, skipping seed");
        return Ok(());
    };

    info!("🌱 Seeding bootstrap company '{}'", company_name);

    let company = companies::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(company_name),
        created_at: Set(Some(Utc::now())),
    }
    .insert(db)
    .await?;

    users::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        company_id: Set(company.id),
        username: Set(username),
        password_hash: Set(Some(hash_password(&password)?)),
        email: Set(None),
        name: Set(None),
        role: Set("admin".to_string()),
        created_at: Set(Some(Utc::now())),
    }
    .insert(db)
    .await?;

    info!("🌱 Bootstrap admin account created");
    Ok(())
}
