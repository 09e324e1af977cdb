//! The entity a budget or plan is attached to: a lead or a customer, never both.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a lead or a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum SubjectRef {
    /// A sales lead
    Lead(i64),
    /// A customer account
    Customer(i64),
}

impl SubjectRef {
    /// Rebuilds a subject from the nullable `lead_id` / `customer_id` column pair.
    ///
    /// # Errors
    /// Returns `Error::InvalidSubject` unless exactly one column is populated.
    pub fn from_columns(lead_id: Option<i64>, customer_id: Option<i64>) -> Result<Self> {
        match (lead_id, customer_id) {
            (Some(id), None) => Ok(Self::Lead(id)),
            (None, Some(id)) => Ok(Self::Customer(id)),
            (Some(lead), Some(customer)) => Err(Error::InvalidSubject {
                message: format!("row references both lead {lead} and customer {customer}"),
            }),
            (None, None) => Err(Error::InvalidSubject {
                message: "row references neither a lead nor a customer".to_string(),
            }),
        }
    }

    /// Value for the `lead_id` column.
    #[must_use]
    pub const fn lead_id(self) -> Option<i64> {
        match self {
            Self::Lead(id) => Some(id),
            Self::Customer(_) => None,
        }
    }

    /// Value for the `customer_id` column.
    #[must_use]
    pub const fn customer_id(self) -> Option<i64> {
        match self {
            Self::Lead(_) => None,
            Self::Customer(id) => Some(id),
        }
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lead(id) => write!(f, "lead:{id}"),
            Self::Customer(id) => write!(f, "customer:{id}"),
        }
    }
}
