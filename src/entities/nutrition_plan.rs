//! Nutrition plan entity - A subject's materialized copy of a budget's nutrition targets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Nutrition plan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nutrition_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lead_id: Option<i64>,
    pub customer_id: Option<i64>,
    /// Budget this plan was synced from, None for hand-made plans
    pub budget_id: Option<i64>,
    /// Daily calories (kcal)
    pub calories: f64,
    /// Daily protein (g)
    pub protein: f64,
    /// Daily carbohydrates (g)
    pub carbs: f64,
    /// Daily fat (g)
    pub fat: f64,
    /// Daily fiber (g)
    pub fiber: f64,
    pub eating_order: Option<String>,
    pub eating_rules: Option<String>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
