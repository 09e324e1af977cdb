//! Budget business logic - Handles budget templates and their typed content.
//!
//! Budgets are either owner-private or shared public templates. Owners (and
//! admins) may edit private budgets in place; public templates are read-only
//! for everyone but admins and must be cloned before editing.

use crate::{
    core::{actor::Actor, workout},
    entities::{Budget, BudgetAssignment, budget, budget_assignment},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Daily macro targets carried by a budget and copied into nutrition plans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    /// Calories (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein: f64,
    /// Carbohydrates (g)
    pub carbs: f64,
    /// Fat (g)
    pub fat: f64,
    /// Fiber (g)
    #[serde(default)]
    pub fiber: f64,
}

impl NutritionTargets {
    /// Checks every target is a finite, non-negative number.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("fiber", self.fiber),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidInput {
                    message: format!("Nutrition target {field} must be a non-negative number"),
                });
            }
        }
        Ok(())
    }
}

/// A supplement entry on a budget or supplement plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplement {
    /// Supplement name (e.g., "Creatine")
    pub name: String,
    /// Dose (e.g., "5g")
    pub dosage: Option<String>,
    /// When to take it (e.g., "morning")
    pub timing: Option<String>,
}

/// Input for [`create_budget`].
#[derive(Debug, Clone, Default)]
pub struct NewBudget {
    pub name: String,
    pub description: Option<String>,
    pub nutrition_targets: Option<NutritionTargets>,
    pub steps_goal: Option<i32>,
    pub steps_instructions: Option<String>,
    pub workout_template_id: Option<i64>,
    pub supplements: Vec<Supplement>,
    pub eating_order: Option<String>,
    pub eating_rules: Option<String>,
    /// Only admins may create public budgets
    pub is_public: bool,
}

/// Partial update for [`update_budget`]. `None` leaves a field unchanged;
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub nutrition_targets: Option<Option<NutritionTargets>>,
    pub steps_goal: Option<Option<i32>>,
    pub steps_instructions: Option<Option<String>>,
    pub workout_template_id: Option<Option<i64>>,
    pub supplements: Option<Vec<Supplement>>,
    pub eating_order: Option<Option<String>>,
    pub eating_rules: Option<Option<String>>,
    /// Admin only
    pub is_public: Option<bool>,
}

fn budget_target(budget_id: i64) -> String {
    format!("budget {budget_id}")
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput {
            message: "Budget name cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_steps_goal(steps_goal: Option<i32>) -> Result<()> {
    match steps_goal {
        Some(goal) if goal <= 0 => Err(Error::InvalidInput {
            message: format!("Steps goal must be positive, got {goal}"),
        }),
        _ => Ok(()),
    }
}

fn validate_supplements(supplements: &[Supplement]) -> Result<()> {
    if supplements.iter().any(|s| s.name.trim().is_empty()) {
        return Err(Error::InvalidInput {
            message: "Supplement name cannot be empty".to_string(),
        });
    }
    Ok(())
}

async fn ensure_workout_template(db: &DatabaseConnection, template_id: Option<i64>) -> Result<()> {
    if let Some(id) = template_id {
        workout::get_workout_template(db, id)
            .await?
            .ok_or(Error::WorkoutTemplateNotFound { id })?;
    }
    Ok(())
}

fn targets_to_json(targets: Option<NutritionTargets>) -> Result<Option<Json>> {
    targets
        .map(serde_json::to_value)
        .transpose()
        .map_err(Into::into)
}

/// Decodes the budget's nutrition targets, `None` when it has none.
pub fn nutrition_targets(budget: &budget::Model) -> Result<Option<NutritionTargets>> {
    match &budget.nutrition_targets {
        None | Some(Json::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
    }
}

/// Decodes the budget's supplement list.
pub fn supplements(budget: &budget::Model) -> Result<Vec<Supplement>> {
    match &budget.supplements {
        Json::Null => Ok(Vec::new()),
        value => Ok(serde_json::from_value(value.clone())?),
    }
}

/// Whether the actor may read the budget: admins, the owner, or anyone for public budgets.
#[must_use]
pub fn can_read(actor: &Actor, budget: &budget::Model) -> bool {
    actor.is_admin() || budget.is_public || budget.created_by == actor.user_id
}

fn ensure_mutable(actor: &Actor, budget: &budget::Model, action: &'static str) -> Result<()> {
    if actor.is_admin() {
        return Ok(());
    }
    if budget.is_public {
        return Err(Error::PublicBudgetReadOnly {
            budget_id: budget.id,
        });
    }
    if budget.created_by != actor.user_id {
        return Err(Error::Unauthorized {
            user_id: actor.user_id.clone(),
            action,
            target: budget_target(budget.id),
        });
    }
    Ok(())
}

/// Creates a budget owned by the actor after validating its content.
pub async fn create_budget(
    db: &DatabaseConnection,
    actor: &Actor,
    new_budget: NewBudget,
) -> Result<budget::Model> {
    let name = validate_name(&new_budget.name)?;
    if let Some(targets) = &new_budget.nutrition_targets {
        targets.validate()?;
    }
    validate_steps_goal(new_budget.steps_goal)?;
    validate_supplements(&new_budget.supplements)?;

    if new_budget.is_public && !actor.is_admin() {
        return Err(Error::Unauthorized {
            user_id: actor.user_id.clone(),
            action: "create",
            target: "public budgets".to_string(),
        });
    }

    ensure_workout_template(db, new_budget.workout_template_id).await?;

    let now = chrono::Utc::now();
    let budget = budget::ActiveModel {
        name: Set(name),
        description: Set(new_budget.description),
        nutrition_targets: Set(targets_to_json(new_budget.nutrition_targets)?),
        steps_goal: Set(new_budget.steps_goal),
        steps_instructions: Set(new_budget.steps_instructions),
        workout_template_id: Set(new_budget.workout_template_id),
        supplements: Set(serde_json::to_value(&new_budget.supplements)?),
        eating_order: Set(new_budget.eating_order),
        eating_rules: Set(new_budget.eating_rules),
        is_public: Set(new_budget.is_public),
        created_by: Set(actor.user_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = budget.insert(db).await?;
    info!(
        "Created budget {} ({}) for {}, public={}",
        result.id, result.name, actor.user_id, result.is_public
    );
    Ok(result)
}

/// Finds a budget by id regardless of visibility.
pub async fn get_budget<C>(db: &C, budget_id: i64) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find_by_id(budget_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a budget the actor is allowed to read.
///
/// # Errors
/// `Error::BudgetNotFound` if it does not exist, `Error::Unauthorized` if it is
/// another user's private budget.
pub async fn get_readable_budget<C>(db: &C, actor: &Actor, budget_id: i64) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    let budget = get_budget(db, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    if !can_read(actor, &budget) {
        return Err(Error::Unauthorized {
            user_id: actor.user_id.clone(),
            action: "read",
            target: budget_target(budget_id),
        });
    }
    Ok(budget)
}

/// Lists budgets visible to the actor, ordered by name.
pub async fn list_visible_budgets(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<budget::Model>> {
    let mut query = Budget::find();
    if !actor.is_admin() {
        query = query.filter(
            Condition::any()
                .add(budget::Column::IsPublic.eq(true))
                .add(budget::Column::CreatedBy.eq(actor.user_id.as_str())),
        );
    }
    query
        .order_by_asc(budget::Column::Name)
        .order_by_asc(budget::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a budget the actor may mutate.
///
/// Already-materialized plans are not affected; run a re-sync to push the new
/// content to assigned subjects.
pub async fn update_budget(
    db: &DatabaseConnection,
    actor: &Actor,
    budget_id: i64,
    update: BudgetUpdate,
) -> Result<budget::Model> {
    let budget = get_budget(db, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;
    ensure_mutable(actor, &budget, "update")?;

    if update.is_public.is_some() && !actor.is_admin() {
        return Err(Error::Unauthorized {
            user_id: actor.user_id.clone(),
            action: "change visibility of",
            target: budget_target(budget_id),
        });
    }

    let mut model: budget::ActiveModel = budget.into();

    if let Some(name) = update.name {
        model.name = Set(validate_name(&name)?);
    }
    if let Some(description) = update.description {
        model.description = Set(description);
    }
    if let Some(targets) = update.nutrition_targets {
        if let Some(t) = &targets {
            t.validate()?;
        }
        model.nutrition_targets = Set(targets_to_json(targets)?);
    }
    if let Some(steps_goal) = update.steps_goal {
        validate_steps_goal(steps_goal)?;
        model.steps_goal = Set(steps_goal);
    }
    if let Some(instructions) = update.steps_instructions {
        model.steps_instructions = Set(instructions);
    }
    if let Some(template_id) = update.workout_template_id {
        ensure_workout_template(db, template_id).await?;
        model.workout_template_id = Set(template_id);
    }
    if let Some(list) = update.supplements {
        validate_supplements(&list)?;
        model.supplements = Set(serde_json::to_value(&list)?);
    }
    if let Some(eating_order) = update.eating_order {
        model.eating_order = Set(eating_order);
    }
    if let Some(eating_rules) = update.eating_rules {
        model.eating_rules = Set(eating_rules);
    }
    if let Some(is_public) = update.is_public {
        model.is_public = Set(is_public);
    }
    model.updated_at = Set(chrono::Utc::now());

    let result = model.update(db).await?;
    info!("Budget {} updated by {}", budget_id, actor.user_id);
    Ok(result)
}

/// Copies a readable budget into a new private budget owned by the actor.
pub async fn clone_budget(
    db: &DatabaseConnection,
    actor: &Actor,
    budget_id: i64,
    name: Option<String>,
) -> Result<budget::Model> {
    let source = get_readable_budget(db, actor, budget_id).await?;
    let name = match name {
        Some(name) => validate_name(&name)?,
        None => format!("{} (copy)", source.name),
    };

    let now = chrono::Utc::now();
    let copy = budget::ActiveModel {
        name: Set(name),
        description: Set(source.description),
        nutrition_targets: Set(source.nutrition_targets),
        steps_goal: Set(source.steps_goal),
        steps_instructions: Set(source.steps_instructions),
        workout_template_id: Set(source.workout_template_id),
        supplements: Set(source.supplements),
        eating_order: Set(source.eating_order),
        eating_rules: Set(source.eating_rules),
        is_public: Set(false),
        created_by: Set(actor.user_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = copy.insert(db).await?;
    info!(
        "Cloned budget {} into {} for {}",
        budget_id, result.id, actor.user_id
    );
    Ok(result)
}

/// Deletes a budget the actor may mutate.
///
/// # Errors
/// `Error::BudgetInUse` while any assignment still references the budget.
pub async fn delete_budget(db: &DatabaseConnection, actor: &Actor, budget_id: i64) -> Result<()> {
    let budget = get_budget(db, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;
    ensure_mutable(actor, &budget, "delete")?;

    let assignments = BudgetAssignment::find()
        .filter(budget_assignment::Column::BudgetId.eq(budget_id))
        .count(db)
        .await?;
    if assignments > 0 {
        return Err(Error::BudgetInUse {
            budget_id,
            assignments: usize::try_from(assignments).unwrap_or(usize::MAX),
        });
    }

    budget.delete(db).await?;
    info!("Budget {} deleted by {}", budget_id, actor.user_id);
    Ok(())
}

/// Creates each public template whose name is not already a public budget.
///
/// Returns the number of budgets created.
pub async fn seed_public_budgets(
    db: &DatabaseConnection,
    actor: &Actor,
    templates: &[NewBudget],
) -> Result<usize> {
    let mut created = 0;
    for template in templates {
        let exists = Budget::find()
            .filter(budget::Column::IsPublic.eq(true))
            .filter(budget::Column::Name.eq(template.name.trim()))
            .one(db)
            .await?
            .is_some();
        if exists {
            debug!("Public budget '{}' already present, skipping", template.name);
            continue;
        }

        let mut public = template.clone();
        public.is_public = true;
        create_budget(db, actor, public).await?;
        created += 1;
    }
    info!("Seeded {} public budget(s)", created);
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_budget_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let trainer = trainer_actor("trainer-1");

        let result = create_budget(
            &db,
            &trainer,
            NewBudget {
                name: "  ".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        let result = create_budget(
            &db,
            &trainer,
            NewBudget {
                name: "Bad macros".to_string(),
                nutrition_targets: Some(NutritionTargets {
                    protein: -1.0,
                    ..sample_targets()
                }),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        let result = create_budget(
            &db,
            &trainer,
            NewBudget {
                name: "No steps".to_string(),
                steps_goal: Some(0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        let result = create_budget(
            &db,
            &trainer,
            NewBudget {
                name: "Public by trainer".to_string(),
                is_public: true,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_budget_roundtrips_content() -> Result<()> {
        let db = setup_test_db().await?;
        let trainer = trainer_actor("trainer-1");

        let budget = create_budget(&db, &trainer, full_budget("Recomp")).await?;
        assert_eq!(budget.created_by, "trainer-1");
        assert!(!budget.is_public);

        let stored = get_budget(&db, budget.id).await?.unwrap();
        assert_eq!(nutrition_targets(&stored)?, Some(sample_targets()));
        let list = supplements(&stored)?;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Creatine");
        assert_eq!(stored.steps_goal, Some(8000));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_budget_unknown_workout_template() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_budget(
            &db,
            &admin_actor(),
            NewBudget {
                name: "Lift".to_string(),
                workout_template_id: Some(404),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::WorkoutTemplateNotFound { id: 404 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_readable_budget_rules() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = trainer_actor("trainer-1");
        let other = trainer_actor("trainer-2");

        let private = create_budget(&db, &owner, nutrition_budget("Private")).await?;
        let public = create_budget(&db, &admin_actor(), public_budget("Shared")).await?;

        assert!(get_readable_budget(&db, &owner, private.id).await.is_ok());
        assert!(get_readable_budget(&db, &admin_actor(), private.id).await.is_ok());
        assert!(matches!(
            get_readable_budget(&db, &other, private.id).await,
            Err(Error::Unauthorized { action: "read", .. })
        ));
        assert!(get_readable_budget(&db, &other, public.id).await.is_ok());
        assert!(matches!(
            get_readable_budget(&db, &other, 999).await,
            Err(Error::BudgetNotFound { id: 999 })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_visible_budgets() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = trainer_actor("trainer-1");
        let other = trainer_actor("trainer-2");

        create_budget(&db, &owner, nutrition_budget("Bravo")).await?;
        create_budget(&db, &other, nutrition_budget("Charlie")).await?;
        create_budget(&db, &admin_actor(), public_budget("Alpha")).await?;

        let names: Vec<String> = list_visible_budgets(&db, &owner)
            .await?
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Bravo"]);

        let all = list_visible_budgets(&db, &admin_actor()).await?;
        assert_eq!(all.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_budget_by_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = trainer_actor("trainer-1");
        let budget = create_budget(&db, &owner, nutrition_budget("Cut")).await?;

        let updated = update_budget(
            &db,
            &owner,
            budget.id,
            BudgetUpdate {
                name: Some("Cut v2".to_string()),
                steps_goal: Some(Some(12000)),
                nutrition_targets: Some(None),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.name, "Cut v2");
        assert_eq!(updated.steps_goal, Some(12000));
        assert_eq!(nutrition_targets(&updated)?, None);
        assert!(updated.updated_at >= budget.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_budget_authorization() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = trainer_actor("trainer-1");
        let other = trainer_actor("trainer-2");
        let private = create_budget(&db, &owner, nutrition_budget("Mine")).await?;
        let public = create_budget(&db, &admin_actor(), public_budget("Shared")).await?;

        let rename = || BudgetUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            update_budget(&db, &other, private.id, rename()).await,
            Err(Error::Unauthorized {
                action: "update",
                ..
            })
        ));
        assert!(matches!(
            update_budget(&db, &owner, public.id, rename()).await,
            Err(Error::PublicBudgetReadOnly { budget_id }) if budget_id == public.id
        ));
        assert!(matches!(
            update_budget(
                &db,
                &owner,
                private.id,
                BudgetUpdate {
                    is_public: Some(true),
                    ..Default::default()
                }
            )
            .await,
            Err(Error::Unauthorized { .. })
        ));

        let renamed = update_budget(&db, &admin_actor(), public.id, rename()).await?;
        assert_eq!(renamed.name, "Renamed");

        Ok(())
    }

    #[tokio::test]
    async fn test_clone_public_budget() -> Result<()> {
        let db = setup_test_db().await?;
        let trainer = trainer_actor("trainer-1");
        let public = create_budget(&db, &admin_actor(), public_budget("Shared")).await?;

        let copy = clone_budget(&db, &trainer, public.id, None).await?;
        assert_eq!(copy.name, "Shared (copy)");
        assert!(!copy.is_public);
        assert_eq!(copy.created_by, "trainer-1");
        assert_eq!(copy.nutrition_targets, public.nutrition_targets);
        assert_ne!(copy.id, public.id);

        // The copy is the trainer's to edit
        let edited = update_budget(
            &db,
            &trainer,
            copy.id,
            BudgetUpdate {
                steps_goal: Some(Some(5000)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(edited.steps_goal, Some(5000));

        let original = get_budget(&db, public.id).await?.unwrap();
        assert_eq!(original.steps_goal, public.steps_goal);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_budget() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = trainer_actor("trainer-1");
        let budget = create_budget(&db, &owner, nutrition_budget("Temp")).await?;

        assert!(matches!(
            delete_budget(&db, &trainer_actor("trainer-2"), budget.id).await,
            Err(Error::Unauthorized { .. })
        ));

        delete_budget(&db, &owner, budget.id).await?;
        assert!(get_budget(&db, budget.id).await?.is_none());
        assert!(matches!(
            delete_budget(&db, &owner, budget.id).await,
            Err(Error::BudgetNotFound { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_public_budgets_skips_existing() -> Result<()> {
        let db = setup_test_db().await?;
        let templates = vec![public_budget("Cut 2200"), public_budget("Walk more")];

        let created = seed_public_budgets(&db, &admin_actor(), &templates).await?;
        assert_eq!(created, 2);

        let created = seed_public_budgets(&db, &admin_actor(), &templates).await?;
        assert_eq!(created, 0);

        let all = list_visible_budgets(&db, &admin_actor()).await?;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|b| b.is_public));

        Ok(())
    }
}
