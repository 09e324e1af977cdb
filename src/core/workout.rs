//! Workout templates referenced by budgets and copied into workout plans.

use crate::{
    core::actor::Actor,
    entities::{WorkoutTemplate, workout_template},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Creates a workout template owned by the actor.
pub async fn create_workout_template(
    db: &DatabaseConnection,
    actor: &Actor,
    name: &str,
    description: Option<String>,
    routine: Json,
) -> Result<workout_template::Model> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Workout template name cannot be empty".to_string(),
        });
    }

    let template = workout_template::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        routine: Set(routine),
        created_by: Set(actor.user_id.clone()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = template.insert(db).await?;
    info!("Created workout template {} ({})", result.id, result.name);
    Ok(result)
}

/// Finds a workout template by id.
pub async fn get_workout_template<C>(
    db: &C,
    template_id: i64,
) -> Result<Option<workout_template::Model>>
where
    C: ConnectionTrait,
{
    WorkoutTemplate::find_by_id(template_id)
        .one(db)
        .await
        .map_err(Into::into)
}
