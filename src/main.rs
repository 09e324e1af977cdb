use coachdesk::{
    config::{actor::load_actor_from_env, budgets::load_config, database},
    core::{audit, budget},
    errors::Result,
};
use dotenvy::dotenv;
use std::{env, path::Path};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    let actor = load_actor_from_env()?;
    info!("Running maintenance as {} ({})", actor.user_id, actor.role);

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed public budget templates when a config file is present
    let config_path =
        env::var("COACHDESK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&config_path).exists() {
        let config = load_config(&config_path)?;
        let templates: Vec<_> = config
            .budgets
            .iter()
            .map(|template| template.to_new_budget())
            .collect();
        budget::seed_public_budgets(&db, &actor, &templates)
            .await
            .inspect_err(|e| error!("Failed to seed public budgets: {}", e))?;
    } else {
        info!("No config at {}, skipping budget seeding.", config_path);
    }

    // 5. Report plans left behind by assignments that no longer exist
    let orphans = audit::find_orphaned_plans(&db).await?;
    if orphans.is_empty() {
        info!("No orphaned plans found.");
    } else {
        warn!("Found {} orphaned plan(s)", orphans.len());
    }

    Ok(())
}
