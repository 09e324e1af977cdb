//! Budget to plan synchronization.
//!
//! Materializes each dimension a budget defines (workout, nutrition,
//! supplements, steps) into the subject's plan tables. Content is copied by
//! value: later budget edits do not reach existing plans and plan edits never
//! flow back to the budget.
//!
//! Every dimension is synced in its own database transaction. A failure in
//! one dimension is recorded in the [`SyncReport`] and does not stop the
//! others; sync never returns an error to its caller.

use crate::{
    core::{
        actor::Actor,
        budget::{self, NutritionTargets, Supplement},
        plans::{PlanKind, deactivate_other_plans, find_active_for_budget},
        subject::SubjectRef,
        workout,
    },
    entities::{
        NutritionPlan, StepsPlan, SupplementPlan, WorkoutPlan, budget as budget_entity,
        nutrition_plan, steps_plan, supplement_plan, workout_plan,
    },
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// A dimension that could not be synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSyncFailure {
    /// Dimension that failed
    pub kind: PlanKind,
    /// Error description
    pub message: String,
}

/// Outcome of syncing one budget into one subject's plans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Dimensions that got a new plan row
    pub created: Vec<PlanKind>,
    /// Dimensions whose existing active row was updated in place
    pub updated: Vec<PlanKind>,
    /// Dimensions the budget does not define; left untouched
    pub skipped: Vec<PlanKind>,
    /// Dimensions that failed
    pub failures: Vec<PlanSyncFailure>,
}

impl SyncReport {
    /// True when no dimension failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Dimensions that now hold content from the budget.
    #[must_use]
    pub fn synced(&self) -> Vec<PlanKind> {
        let mut kinds: Vec<PlanKind> = self.created.iter().chain(&self.updated).copied().collect();
        kinds.sort();
        kinds
    }

    fn record_failure(&mut self, kind: PlanKind, error: &Error) {
        if error.is_not_found() {
            warn!("Could not sync {} plan, missing reference: {}", kind, error);
        } else {
            error!("Failed to sync {} plan: {}", kind, error);
        }
        self.failures.push(PlanSyncFailure {
            kind,
            message: error.to_string(),
        });
    }
}

/// Content one dimension of a budget materializes.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanContent {
    /// Copy this workout template
    Workout {
        /// Template to copy
        template_id: i64,
    },
    /// Macro targets plus eating guidance
    Nutrition {
        /// Targets, copied by value
        targets: NutritionTargets,
        /// Meal ordering guidance
        eating_order: Option<String>,
        /// Eating rules
        eating_rules: Option<String>,
    },
    /// Non-empty supplement list
    Supplement(Vec<Supplement>),
    /// Daily steps goal
    Steps {
        /// Steps per day
        goal: i32,
        /// Instructions shown with the goal
        instructions: Option<String>,
    },
}

impl PlanContent {
    /// Dimension this content belongs to.
    #[must_use]
    pub const fn kind(&self) -> PlanKind {
        match self {
            Self::Workout { .. } => PlanKind::Workout,
            Self::Nutrition { .. } => PlanKind::Nutrition,
            Self::Supplement(_) => PlanKind::Supplement,
            Self::Steps { .. } => PlanKind::Steps,
        }
    }
}

/// Reads what the budget defines for `kind`. `Ok(None)` means the dimension is
/// undefined and must be skipped.
pub fn plan_content(budget: &budget_entity::Model, kind: PlanKind) -> Result<Option<PlanContent>> {
    let content = match kind {
        PlanKind::Workout => budget
            .workout_template_id
            .map(|template_id| PlanContent::Workout { template_id }),
        PlanKind::Nutrition => {
            budget::nutrition_targets(budget)?.map(|targets| PlanContent::Nutrition {
                targets,
                eating_order: budget.eating_order.clone(),
                eating_rules: budget.eating_rules.clone(),
            })
        }
        PlanKind::Supplement => {
            let list = budget::supplements(budget)?;
            (!list.is_empty()).then_some(PlanContent::Supplement(list))
        }
        PlanKind::Steps => budget.steps_goal.map(|goal| PlanContent::Steps {
            goal,
            instructions: budget.steps_instructions.clone(),
        }),
    };
    Ok(content)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanChange {
    Created,
    Updated,
}

/// Mirrors the budget into the subject's four plan tables.
pub async fn sync_plans_from_budget(
    db: &DatabaseConnection,
    budget: &budget_entity::Model,
    subject: SubjectRef,
    actor: &Actor,
) -> SyncReport {
    let mut report = SyncReport::default();

    for kind in PlanKind::ALL {
        let content = match plan_content(budget, kind) {
            Ok(Some(content)) => content,
            Ok(None) => {
                report.skipped.push(kind);
                continue;
            }
            Err(e) => {
                report.record_failure(kind, &e);
                continue;
            }
        };

        match sync_dimension(db, budget.id, subject, actor, &content).await {
            Ok(PlanChange::Created) => report.created.push(kind),
            Ok(PlanChange::Updated) => report.updated.push(kind),
            Err(e) => report.record_failure(kind, &e),
        }
    }

    info!(
        "Synced budget {} into {}: created={:?} updated={:?} skipped={:?} failed={}",
        budget.id,
        subject,
        report.created,
        report.updated,
        report.skipped,
        report.failures.len()
    );
    report
}

async fn sync_dimension(
    db: &DatabaseConnection,
    budget_id: i64,
    subject: SubjectRef,
    actor: &Actor,
    content: &PlanContent,
) -> Result<PlanChange> {
    let txn = db.begin().await?;

    let change = match content {
        PlanContent::Workout { template_id } => {
            upsert_workout(&txn, budget_id, subject, actor, *template_id).await?
        }
        PlanContent::Nutrition {
            targets,
            eating_order,
            eating_rules,
        } => {
            let guidance = (eating_order.clone(), eating_rules.clone());
            upsert_nutrition(&txn, budget_id, subject, actor, *targets, guidance).await?
        }
        PlanContent::Supplement(list) => {
            upsert_supplements(&txn, budget_id, subject, actor, list).await?
        }
        PlanContent::Steps { goal, instructions } => {
            upsert_steps(&txn, budget_id, subject, actor, *goal, instructions.clone()).await?
        }
    };

    txn.commit().await?;
    Ok(change)
}

async fn upsert_workout<C>(
    db: &C,
    budget_id: i64,
    subject: SubjectRef,
    actor: &Actor,
    template_id: i64,
) -> Result<PlanChange>
where
    C: ConnectionTrait,
{
    let template = workout::get_workout_template(db, template_id)
        .await?
        .ok_or(Error::WorkoutTemplateNotFound { id: template_id })?;
    let now = chrono::Utc::now();

    let (change, plan) = match find_active_for_budget::<WorkoutPlan, _>(db, subject, budget_id).await? {
        Some(existing) => {
            let mut model: workout_plan::ActiveModel = existing.into();
            model.template_id = Set(Some(template.id));
            model.name = Set(template.name);
            model.description = Set(template.description);
            model.routine = Set(template.routine);
            model.updated_at = Set(now);
            (PlanChange::Updated, model.update(db).await?)
        }
        None => {
            let model = workout_plan::ActiveModel {
                lead_id: Set(subject.lead_id()),
                customer_id: Set(subject.customer_id()),
                budget_id: Set(Some(budget_id)),
                template_id: Set(Some(template.id)),
                name: Set(template.name),
                description: Set(template.description),
                routine: Set(template.routine),
                is_active: Set(true),
                created_by: Set(actor.user_id.clone()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            (PlanChange::Created, model.insert(db).await?)
        }
    };

    deactivate_other_plans::<WorkoutPlan, _>(db, subject, plan.id).await?;
    Ok(change)
}

async fn upsert_nutrition<C>(
    db: &C,
    budget_id: i64,
    subject: SubjectRef,
    actor: &Actor,
    targets: NutritionTargets,
    (eating_order, eating_rules): (Option<String>, Option<String>),
) -> Result<PlanChange>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();

    let (change, plan) =
        match find_active_for_budget::<NutritionPlan, _>(db, subject, budget_id).await? {
            Some(existing) => {
                let mut model: nutrition_plan::ActiveModel = existing.into();
                model.calories = Set(targets.calories);
                model.protein = Set(targets.protein);
                model.carbs = Set(targets.carbs);
                model.fat = Set(targets.fat);
                model.fiber = Set(targets.fiber);
                model.eating_order = Set(eating_order);
                model.eating_rules = Set(eating_rules);
                model.updated_at = Set(now);
                (PlanChange::Updated, model.update(db).await?)
            }
            None => {
                let model = nutrition_plan::ActiveModel {
                    lead_id: Set(subject.lead_id()),
                    customer_id: Set(subject.customer_id()),
                    budget_id: Set(Some(budget_id)),
                    calories: Set(targets.calories),
                    protein: Set(targets.protein),
                    carbs: Set(targets.carbs),
                    fat: Set(targets.fat),
                    fiber: Set(targets.fiber),
                    eating_order: Set(eating_order),
                    eating_rules: Set(eating_rules),
                    is_active: Set(true),
                    created_by: Set(actor.user_id.clone()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                (PlanChange::Created, model.insert(db).await?)
            }
        };

    deactivate_other_plans::<NutritionPlan, _>(db, subject, plan.id).await?;
    Ok(change)
}

async fn upsert_supplements<C>(
    db: &C,
    budget_id: i64,
    subject: SubjectRef,
    actor: &Actor,
    list: &[Supplement],
) -> Result<PlanChange>
where
    C: ConnectionTrait,
{
    let supplements = serde_json::to_value(list)?;
    let now = chrono::Utc::now();

    let (change, plan) =
        match find_active_for_budget::<SupplementPlan, _>(db, subject, budget_id).await? {
            Some(existing) => {
                let mut model: supplement_plan::ActiveModel = existing.into();
                model.supplements = Set(supplements);
                model.updated_at = Set(now);
                (PlanChange::Updated, model.update(db).await?)
            }
            None => {
                let model = supplement_plan::ActiveModel {
                    lead_id: Set(subject.lead_id()),
                    customer_id: Set(subject.customer_id()),
                    budget_id: Set(Some(budget_id)),
                    supplements: Set(supplements),
                    is_active: Set(true),
                    created_by: Set(actor.user_id.clone()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                (PlanChange::Created, model.insert(db).await?)
            }
        };

    deactivate_other_plans::<SupplementPlan, _>(db, subject, plan.id).await?;
    Ok(change)
}

async fn upsert_steps<C>(
    db: &C,
    budget_id: i64,
    subject: SubjectRef,
    actor: &Actor,
    goal: i32,
    instructions: Option<String>,
) -> Result<PlanChange>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();

    let (change, plan) = match find_active_for_budget::<StepsPlan, _>(db, subject, budget_id).await? {
        Some(existing) => {
            let mut model: steps_plan::ActiveModel = existing.into();
            model.steps_goal = Set(goal);
            model.instructions = Set(instructions);
            model.updated_at = Set(now);
            (PlanChange::Updated, model.update(db).await?)
        }
        None => {
            let model = steps_plan::ActiveModel {
                lead_id: Set(subject.lead_id()),
                customer_id: Set(subject.customer_id()),
                budget_id: Set(Some(budget_id)),
                steps_goal: Set(goal),
                instructions: Set(instructions),
                is_active: Set(true),
                created_by: Set(actor.user_id.clone()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            (PlanChange::Created, model.insert(db).await?)
        }
    };

    deactivate_other_plans::<StepsPlan, _>(db, subject, plan.id).await?;
    Ok(change)
}
