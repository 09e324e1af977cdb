//! Public budget template loading from config.toml
//!
//! The templates defined in config.toml seed the shared public budgets on
//! startup. Existing public budgets with the same name are left untouched.

use crate::core::budget::{NewBudget, NutritionTargets, Supplement};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Public budget templates to seed
    #[serde(default)]
    pub budgets: Vec<BudgetTemplateConfig>,
}

/// Configuration for a single public budget template
#[derive(Debug, Deserialize, Clone)]
pub struct BudgetTemplateConfig {
    /// Template name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Daily nutrition targets
    pub nutrition_targets: Option<NutritionTargets>,
    /// Daily steps goal
    pub steps_goal: Option<i32>,
    /// Steps instructions
    pub steps_instructions: Option<String>,
    /// Supplements to take
    #[serde(default)]
    pub supplements: Vec<Supplement>,
    /// Meal ordering guidance
    pub eating_order: Option<String>,
    /// Eating rules
    pub eating_rules: Option<String>,
}

impl BudgetTemplateConfig {
    /// Converts the template into a public [`NewBudget`].
    #[must_use]
    pub fn to_new_budget(&self) -> NewBudget {
        NewBudget {
            name: self.name.clone(),
            description: self.description.clone(),
            nutrition_targets: self.nutrition_targets,
            steps_goal: self.steps_goal,
            steps_instructions: self.steps_instructions.clone(),
            workout_template_id: None,
            supplements: self.supplements.clone(),
            eating_order: self.eating_order.clone(),
            eating_rules: self.eating_rules.clone(),
            is_public: true,
        }
    }
}

/// Loads budget template configuration from a TOML file
///
/// # Errors
/// Returns `Error::Io` if the file cannot be read and `Error::Config` if the
/// TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_budget_config() {
        let toml_str = r#"
            [[budgets]]
            name = "Cut 2200"
            steps_goal = 8000
            eating_rules = "No sugary drinks"

            [budgets.nutrition_targets]
            calories = 2200.0
            protein = 160.0
            carbs = 220.0
            fat = 70.0
            fiber = 30.0

            [[budgets.supplements]]
            name = "Creatine"
            dosage = "5g"

            [[budgets]]
            name = "Walk more"
            steps_goal = 10000
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.budgets.len(), 2);

        let cut = config.budgets[0].to_new_budget();
        assert!(cut.is_public);
        assert_eq!(cut.nutrition_targets.unwrap().calories, 2200.0);
        assert_eq!(cut.supplements.len(), 1);
        assert_eq!(cut.supplements[0].dosage.as_deref(), Some("5g"));
        assert!(cut.supplements[0].timing.is_none());

        let walk = config.budgets[1].to_new_budget();
        assert!(walk.nutrition_targets.is_none());
        assert!(walk.supplements.is_empty());
        assert_eq!(walk.steps_goal, Some(10000));
    }

    #[test]
    fn test_empty_config_has_no_budgets() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.budgets.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("/nonexistent/coachdesk.toml");
        assert!(matches!(result, Err(Error::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let path = std::env::temp_dir().join("coachdesk-invalid-config.toml");
        std::fs::write(&path, "[[budgets]\nname = ").unwrap();
        let result = load_config(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
