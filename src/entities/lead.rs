//! Lead entity - A sales lead, optionally owned by a parent customer.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lead database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    /// Unique identifier for the lead
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Pipeline status (e.g., `"new"`, `"contacted"`, `"converted"`)
    pub status: String,
    /// Parent customer, if the lead belongs to one
    pub customer_id: Option<i64>,
    /// When the lead was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Lead and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each lead optionally belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
