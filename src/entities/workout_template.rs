//! Workout template entity - A routine that budgets reference and workout plans copy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Workout template database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workout_templates")]
pub struct Model {
    /// Unique identifier for the template
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Template name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Routine as JSON (days, exercises, sets)
    pub routine: Json,
    /// User id of the author
    pub created_by: String,
    /// When the template was created
    pub created_at: DateTimeUtc,
}

/// `WorkoutTemplate` has no navigable relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
