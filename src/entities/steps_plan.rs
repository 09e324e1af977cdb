//! Steps plan entity - A subject's daily steps goal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "steps_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lead_id: Option<i64>,
    pub customer_id: Option<i64>,
    /// Budget this plan was synced from, None for hand-made plans
    pub budget_id: Option<i64>,
    pub steps_goal: i32,
    pub instructions: Option<String>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
