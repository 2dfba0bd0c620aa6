//! Operator tool for registering users directly against the database
//!
//! ```bash
//! DATABASE_URL=postgresql://... create-user \
//!     --email admin@email.com --password adminpassword --admin
//! ```

use chainstack_api::{config::Config, telemetry};
use chainstack_shared::accounts::AccountService;
use chainstack_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use chainstack_shared::models::NewUser;
use chainstack_shared::store::PgStore;
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "create-user")]
#[command(about = "Register a chainstack user")]
#[command(version)]
struct Args {
    /// User email
    #[arg(long, env = "CREATE_USER_EMAIL")]
    email: String,

    /// User password (at least 8 characters)
    #[arg(long, env = "CREATE_USER_PASSWORD")]
    password: String,

    /// Grant user administration scope
    #[arg(long)]
    admin: bool,

    /// Maximum number of resources; omit for unlimited
    #[arg(long)]
    quota: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let args = Args::parse();

    let config = Config::from_env()?;
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: 1,
        min_connections: 0,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let accounts = AccountService::new(Arc::new(PgStore::new(pool.clone())));
    let result = accounts
        .create_user(NewUser {
            email: args.email,
            password: args.password,
            admin: args.admin,
            quota: args.quota.into(),
        })
        .await;

    close_pool(pool).await;

    let user = result?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}
