use crate::entities::{companies, documents, share_link_logs, share_links, users};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::env;
use std::time::Duration;
use tracing::info;

/// The two store-client handles the access-control core is constructed
/// with. The privileged handle bypasses row-level authorization and serves
/// the authenticated owner paths; the public handle carries the anon
/// credential and serves the anonymous link-access paths, so row-level
/// policies stand as a second layer of isolation behind the application
/// checks. The core never opens connections of its own.
#[derive(Clone)]
pub struct DbHandles {
    pub privileged: DatabaseConnection,
    pub public: DatabaseConnection,
}

pub async fn setup_database() -> anyhow::Result<DbHandles> {
    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    info!("📂 Database: {}", db_url);

    let privileged = Database::connect(connect_options(&db_url)).await?;

    info!("✅ Database connected successfully");

    run_migrations(&privileged).await?;
    crate::infrastructure::seed::seed_initial_data(&privileged).await?;

    // A separate anon-credential connection when configured. Falling back
    // to the privileged handle keeps single-credential deployments (and
    // sqlite) working; with :memory: a second connection would be a
    // different database entirely.
    let public = match env::var("DATABASE_ANON_URL") {
        Ok(anon_url) if anon_url != db_url => {
            info!("🔒 Using separate anon credential for public access paths");
            Database::connect(connect_options(&anon_url)).await?
        }
        _ => privileged.clone(),
    };

    Ok(DbHandles { privileged, public })
}

fn connect_options(url: &str) -> ConnectOptions {
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);
    opt
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let db_url = env::var("DATABASE_URL")?;

    if db_url.starts_with("postgres://") {
        info!("🔄 Running SQLx migrations for PostgreSQL...");
        let pool = sqlx::PgPool::connect(&db_url).await?;
        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            info!("⚠️ SQLx migration error: {}. Skipping.", e);
        }
    } else {
        info!("🔄 Running SeaORM auto-migrations for SQLite/Other...");
        let builder = db.get_database_backend();
        let schema = Schema::new(builder);

        let stmts = vec![
            schema
                .create_table_from_entity(companies::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(users::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(documents::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(share_links::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(share_link_logs::Entity)
                .if_not_exists()
                .to_owned(),
        ];

        for stmt in stmts {
            let stmt = builder.build(&stmt);
            db.execute(stmt).await?;
        }

        db.execute(sea_orm::Statement::from_string(
            builder,
            "CREATE INDEX IF NOT EXISTS idx_share_link_logs_share_link_id ON share_link_logs(share_link_id);".to_string(),
        ))
        .await?;
    }

    Ok(())
}
