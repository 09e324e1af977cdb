//! Budget assignment entity - Links a budget to exactly one lead or customer.
//!
//! At most one row per subject is expected to have `is_active = true`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget assignment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_assignments")]
pub struct Model {
    /// Unique identifier for the assignment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Assigned budget
    pub budget_id: i64,
    /// Subject lead (mutually exclusive with `customer_id`)
    pub lead_id: Option<i64>,
    /// Subject customer (mutually exclusive with `lead_id`)
    pub customer_id: Option<i64>,
    /// Whether this is the subject's current assignment
    pub is_active: bool,
    /// User id that made the assignment
    pub assigned_by: String,
    /// Optional trainer notes
    pub notes: Option<String>,
    /// When the assignment was made
    pub assigned_at: DateTimeUtc,
}

/// Defines relationships between `BudgetAssignment` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assignment belongs to one budget
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::BudgetId",
        to = "super::budget::Column::Id"
    )]
    Budget,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
