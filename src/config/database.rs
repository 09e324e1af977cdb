//! Database configuration module for coachdesk.
//!
//! Handles `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`
//! so the schema always matches the Rust structs.

use crate::entities::{
    Budget, BudgetAssignment, Customer, Lead, NutritionPlan, StepsPlan, SupplementPlan,
    WorkoutPlan, WorkoutTemplate,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/coachdesk.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling
/// back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every coachdesk table that does not exist yet.
///
/// Parents are created before children so foreign keys declared through
/// `belongs_to` relations resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Customer).await?;
    create_table(db, &schema, Lead).await?;
    create_table(db, &schema, WorkoutTemplate).await?;
    create_table(db, &schema, Budget).await?;
    create_table(db, &schema, BudgetAssignment).await?;
    create_table(db, &schema, WorkoutPlan).await?;
    create_table(db, &schema, NutritionPlan).await?;
    create_table(db, &schema, SupplementPlan).await?;
    create_table(db, &schema, StepsPlan).await?;

    info!("Database tables ensured");
    Ok(())
}
