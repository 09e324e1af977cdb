/// Database configuration and connection management
pub mod database;

/// Public budget template loading from config.toml
pub mod budgets;

/// Acting user configuration from environment variables
pub mod actor;
