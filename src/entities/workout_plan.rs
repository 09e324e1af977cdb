//! Workout plan entity - A subject's materialized copy of a workout template.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Workout plan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workout_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lead_id: Option<i64>,
    pub customer_id: Option<i64>,
    /// Budget this plan was synced from, None for hand-made plans
    pub budget_id: Option<i64>,
    /// Template the routine was copied from
    pub template_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub routine: Json,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
