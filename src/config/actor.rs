//! Acting user configuration for the maintenance binary.
//!
//! Library operations always receive the actor explicitly; only the binary
//! reads it from `COACHDESK_USER_ID` and `COACHDESK_USER_ROLE`.

use crate::core::actor::{Actor, Role};
use crate::errors::Result;

const DEFAULT_USER_ID: &str = "system";

/// Builds the acting user from the environment, defaulting to a `system` admin.
///
/// # Errors
/// Returns `Error::Config` if `COACHDESK_USER_ROLE` is set to an unknown role.
pub fn load_actor_from_env() -> Result<Actor> {
    let user_id =
        std::env::var("COACHDESK_USER_ID").unwrap_or_else(|_| DEFAULT_USER_ID.to_string());
    let role = match std::env::var("COACHDESK_USER_ROLE") {
        Ok(raw) => raw.parse::<Role>()?,
        Err(_) => Role::Admin,
    };
    Ok(Actor::new(user_id, role))
}
