/// Database migration runner
///
/// Migrations live in `chainstack-shared/migrations/` and are embedded into the
/// binary at compile time. Each migration has an up file
/// (`{timestamp}_{name}.up.sql`) and a rollback (`{timestamp}_{name}.down.sql`).
///
/// # Example
///
/// ```no_run
/// use chainstack_shared::db::pool::{create_pool, DatabaseConfig};
/// use chainstack_shared::db::migrations::{ensure_database_exists, run_migrations};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let url = std::env::var("DATABASE_URL")?;
///     ensure_database_exists(&url).await?;
///
///     let pool = create_pool(DatabaseConfig { url, ..Default::default() }).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Applies every pending migration
///
/// Already-applied migrations are skipped, so this is safe to call on every
/// start-up.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Number of successfully applied migrations
pub async fn applied_migrations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(0);
    }

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// Creates the database named in `database_url` if it does not exist
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
