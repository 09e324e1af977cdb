//! Budget entity - A reusable coaching template.
//!
//! A budget carries the content that plan sync materializes per subject:
//! nutrition targets, a workout template reference, a supplement list and a
//! daily steps goal. Public budgets are shared templates; private ones belong
//! to `created_by`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Template name (e.g., "Cut 2200")
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// JSON-encoded `NutritionTargets`, None when the budget has no nutrition content
    pub nutrition_targets: Option<Json>,
    /// Daily steps goal
    pub steps_goal: Option<i32>,
    /// Instructions shown with the steps goal
    pub steps_instructions: Option<String>,
    /// Workout template copied into the workout plan
    pub workout_template_id: Option<i64>,
    /// JSON array of `Supplement`
    pub supplements: Json,
    /// Meal ordering guidance copied into the nutrition plan
    pub eating_order: Option<String>,
    /// Eating rules copied into the nutrition plan
    pub eating_rules: Option<String>,
    /// Shared template visible to everyone (true) or owner-private (false)
    pub is_public: bool,
    /// User id of the owner
    pub created_by: String,
    /// When the budget was created
    pub created_at: DateTimeUtc,
    /// When the budget was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One budget has many assignments
    #[sea_orm(has_many = "super::budget_assignment::Entity")]
    Assignments,
}

impl Related<super::budget_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
