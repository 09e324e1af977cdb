//! Unified error type for coachdesk.
//!
//! Sync failures for a single plan kind are not errors; they are reported in
//! [`crate::core::sync::SyncReport`] so the primary action can still succeed.

use thiserror::Error;

/// Errors surfaced by coachdesk operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// JSON content stored on a row could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Referenced budget does not exist
    #[error("Budget not found: {id}")]
    BudgetNotFound {
        /// Budget id
        id: i64,
    },

    /// Referenced assignment does not exist
    #[error("Budget assignment not found: {id}")]
    AssignmentNotFound {
        /// Assignment id
        id: i64,
    },

    /// Referenced lead does not exist
    #[error("Lead not found: {id}")]
    LeadNotFound {
        /// Lead id
        id: i64,
    },

    /// Referenced customer does not exist
    #[error("Customer not found: {id}")]
    CustomerNotFound {
        /// Customer id
        id: i64,
    },

    /// Referenced workout template does not exist
    #[error("Workout template not found: {id}")]
    WorkoutTemplateNotFound {
        /// Template id
        id: i64,
    },

    /// Referenced plan row does not exist
    #[error("{kind} plan not found: {id}")]
    PlanNotFound {
        /// Plan kind name
        kind: &'static str,
        /// Plan id
        id: i64,
    },

    /// Caller may not perform the action
    #[error("User {user_id} is not allowed to {action} {target}")]
    Unauthorized {
        /// Acting user
        user_id: String,
        /// Attempted action ("read", "update", "delete", ...)
        action: &'static str,
        /// What the action targeted (e.g., "budget 7")
        target: String,
    },

    /// Public templates are read-only for non-admins; they must be cloned
    #[error("Budget {budget_id} is a shared public template; clone it to make changes")]
    PublicBudgetReadOnly {
        /// Target budget
        budget_id: i64,
    },

    /// Budget still referenced by assignments
    #[error("Budget {budget_id} is referenced by {assignments} assignment(s)")]
    BudgetInUse {
        /// Target budget
        budget_id: i64,
        /// Number of referencing assignment rows
        assignments: usize,
    },

    /// A row does not reference exactly one of lead or customer
    #[error("Invalid subject: {message}")]
    InvalidSubject {
        /// Details
        message: String,
    },

    /// Input failed validation
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Details
        message: String,
    },
}

impl Error {
    /// Whether this error means a referenced record is missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BudgetNotFound { .. }
                | Self::AssignmentNotFound { .. }
                | Self::LeadNotFound { .. }
                | Self::CustomerNotFound { .. }
                | Self::WorkoutTemplateNotFound { .. }
                | Self::PlanNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::BudgetNotFound { id: 1 }.is_not_found());
        assert!(Error::AssignmentNotFound { id: 1 }.is_not_found());
        assert!(
            Error::PlanNotFound {
                kind: "steps",
                id: 3
            }
            .is_not_found()
        );
        assert!(!Error::PublicBudgetReadOnly { budget_id: 1 }.is_not_found());
        assert!(
            !Error::InvalidInput {
                message: "x".to_string()
            }
            .is_not_found()
        );
    }

    #[test]
    fn test_unauthorized_message() {
        let err = Error::Unauthorized {
            user_id: "trainer-2".to_string(),
            action: "update",
            target: "budget 7".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "User trainer-2 is not allowed to update budget 7"
        );
    }
}
