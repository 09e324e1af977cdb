//! Supplement plan entity - A subject's materialized copy of a budget's supplement list.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supplement plan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supplement_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lead_id: Option<i64>,
    pub customer_id: Option<i64>,
    /// Budget this plan was synced from, None for hand-made plans
    pub budget_id: Option<i64>,
    /// JSON array of supplements
    pub supplements: Json,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
