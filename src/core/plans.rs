//! Plan kinds and generic access to the four plan tables.
//!
//! Workout, nutrition, supplement and steps plans live in separate tables with
//! different content columns but the same bookkeeping: a subject (lead or
//! customer), an optional back-reference to the budget they were synced from,
//! and an active flag. [`PlanTable`] exposes that shared shape so filtering,
//! deactivation and deletion are written once.

use crate::{
    core::{budget::NutritionTargets, subject::SubjectRef},
    entities::{
        NutritionPlan, StepsPlan, SupplementPlan, WorkoutPlan, nutrition_plan, steps_plan,
        supplement_plan, workout_plan,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// The four plan dimensions a budget can define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    /// Workout routine copied from a workout template
    Workout,
    /// Daily macro targets
    Nutrition,
    /// Supplement list
    Supplement,
    /// Daily steps goal
    Steps,
}

impl PlanKind {
    /// Every kind, in sync order.
    pub const ALL: [Self; 4] = [Self::Workout, Self::Nutrition, Self::Supplement, Self::Steps];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workout => "workout",
            Self::Nutrition => "nutrition",
            Self::Supplement => "supplement",
            Self::Steps => "steps",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-independent view of a plan row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRow {
    pub kind: PlanKind,
    pub id: i64,
    pub lead_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub budget_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    /// One-line description of the plan content
    pub summary: String,
}

/// Shared bookkeeping columns of a plan table.
pub trait PlanTable: EntityTrait {
    /// Which dimension this table stores
    const KIND: PlanKind;

    fn id_column() -> Self::Column;
    fn lead_column() -> Self::Column;
    fn customer_column() -> Self::Column;
    fn budget_column() -> Self::Column;
    fn active_column() -> Self::Column;
    fn created_column() -> Self::Column;

    /// Projects a row into its kind-independent view.
    fn row(model: &Self::Model) -> PlanRow;
}

impl PlanTable for WorkoutPlan {
    const KIND: PlanKind = PlanKind::Workout;

    fn id_column() -> Self::Column {
        workout_plan::Column::Id
    }
    fn lead_column() -> Self::Column {
        workout_plan::Column::LeadId
    }
    fn customer_column() -> Self::Column {
        workout_plan::Column::CustomerId
    }
    fn budget_column() -> Self::Column {
        workout_plan::Column::BudgetId
    }
    fn active_column() -> Self::Column {
        workout_plan::Column::IsActive
    }
    fn created_column() -> Self::Column {
        workout_plan::Column::CreatedAt
    }

    fn row(model: &Self::Model) -> PlanRow {
        PlanRow {
            kind: Self::KIND,
            id: model.id,
            lead_id: model.lead_id,
            customer_id: model.customer_id,
            budget_id: model.budget_id,
            is_active: model.is_active,
            created_at: model.created_at,
            summary: model.name.clone(),
        }
    }
}

impl PlanTable for NutritionPlan {
    const KIND: PlanKind = PlanKind::Nutrition;

    fn id_column() -> Self::Column {
        nutrition_plan::Column::Id
    }
    fn lead_column() -> Self::Column {
        nutrition_plan::Column::LeadId
    }
    fn customer_column() -> Self::Column {
        nutrition_plan::Column::CustomerId
    }
    fn budget_column() -> Self::Column {
        nutrition_plan::Column::BudgetId
    }
    fn active_column() -> Self::Column {
        nutrition_plan::Column::IsActive
    }
    fn created_column() -> Self::Column {
        nutrition_plan::Column::CreatedAt
    }

    fn row(model: &Self::Model) -> PlanRow {
        PlanRow {
            kind: Self::KIND,
            id: model.id,
            lead_id: model.lead_id,
            customer_id: model.customer_id,
            budget_id: model.budget_id,
            is_active: model.is_active,
            created_at: model.created_at,
            summary: format!(
                "{:.0} kcal, P{:.0}/C{:.0}/F{:.0}",
                model.calories, model.protein, model.carbs, model.fat
            ),
        }
    }
}

impl PlanTable for SupplementPlan {
    const KIND: PlanKind = PlanKind::Supplement;

    fn id_column() -> Self::Column {
        supplement_plan::Column::Id
    }
    fn lead_column() -> Self::Column {
        supplement_plan::Column::LeadId
    }
    fn customer_column() -> Self::Column {
        supplement_plan::Column::CustomerId
    }
    fn budget_column() -> Self::Column {
        supplement_plan::Column::BudgetId
    }
    fn active_column() -> Self::Column {
        supplement_plan::Column::IsActive
    }
    fn created_column() -> Self::Column {
        supplement_plan::Column::CreatedAt
    }

    fn row(model: &Self::Model) -> PlanRow {
        let count = model.supplements.as_array().map_or(0, Vec::len);
        PlanRow {
            kind: Self::KIND,
            id: model.id,
            lead_id: model.lead_id,
            customer_id: model.customer_id,
            budget_id: model.budget_id,
            is_active: model.is_active,
            created_at: model.created_at,
            summary: format!("{count} supplement(s)"),
        }
    }
}

impl PlanTable for StepsPlan {
    const KIND: PlanKind = PlanKind::Steps;

    fn id_column() -> Self::Column {
        steps_plan::Column::Id
    }
    fn lead_column() -> Self::Column {
        steps_plan::Column::LeadId
    }
    fn customer_column() -> Self::Column {
        steps_plan::Column::CustomerId
    }
    fn budget_column() -> Self::Column {
        steps_plan::Column::BudgetId
    }
    fn active_column() -> Self::Column {
        steps_plan::Column::IsActive
    }
    fn created_column() -> Self::Column {
        steps_plan::Column::CreatedAt
    }

    fn row(model: &Self::Model) -> PlanRow {
        PlanRow {
            kind: Self::KIND,
            id: model.id,
            lead_id: model.lead_id,
            customer_id: model.customer_id,
            budget_id: model.budget_id,
            is_active: model.is_active,
            created_at: model.created_at,
            summary: format!("{} steps/day", model.steps_goal),
        }
    }
}

/// Rows belonging to the subject.
pub fn subject_condition<E: PlanTable>(subject: SubjectRef) -> Condition {
    match subject {
        SubjectRef::Lead(id) => Condition::all().add(E::lead_column().eq(id)),
        SubjectRef::Customer(id) => Condition::all().add(E::customer_column().eq(id)),
    }
}

/// The active row of kind `E` synced from `budget_id` for the subject, if any.
pub async fn find_active_for_budget<E, C>(
    db: &C,
    subject: SubjectRef,
    budget_id: i64,
) -> Result<Option<E::Model>>
where
    E: PlanTable,
    C: ConnectionTrait,
{
    E::find()
        .filter(subject_condition::<E>(subject))
        .filter(E::budget_column().eq(budget_id))
        .filter(E::active_column().eq(true))
        .order_by_desc(E::id_column())
        .one(db)
        .await
        .map_err(Into::into)
}

/// The subject's newest active row of kind `E`, if any.
pub async fn find_active<E, C>(db: &C, subject: SubjectRef) -> Result<Option<E::Model>>
where
    E: PlanTable,
    C: ConnectionTrait,
{
    E::find()
        .filter(subject_condition::<E>(subject))
        .filter(E::active_column().eq(true))
        .order_by_desc(E::created_column())
        .order_by_desc(E::id_column())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Marks every active row of kind `E` for the subject inactive except `keep_id`.
pub async fn deactivate_other_plans<E, C>(db: &C, subject: SubjectRef, keep_id: i64) -> Result<u64>
where
    E: PlanTable,
    C: ConnectionTrait,
{
    let result = E::update_many()
        .col_expr(E::active_column(), Expr::value(false))
        .filter(subject_condition::<E>(subject))
        .filter(E::active_column().eq(true))
        .filter(E::id_column().ne(keep_id))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        debug!(
            "Deactivated {} {} plan(s) for {}",
            result.rows_affected,
            E::KIND,
            subject
        );
    }
    Ok(result.rows_affected)
}

/// Deletes every row of kind `E` for (subject, budget), active or not.
pub async fn delete_plans_for_budget<E, C>(
    db: &C,
    subject: SubjectRef,
    budget_id: i64,
) -> Result<u64>
where
    E: PlanTable,
    C: ConnectionTrait,
{
    let result = E::delete_many()
        .filter(subject_condition::<E>(subject))
        .filter(E::budget_column().eq(budget_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Kind-independent rows of kind `E`, optionally restricted to one subject.
pub async fn plan_rows<E, C>(db: &C, subject: Option<SubjectRef>) -> Result<Vec<PlanRow>>
where
    E: PlanTable,
    C: ConnectionTrait,
{
    let mut query = E::find();
    if let Some(subject) = subject {
        query = query.filter(subject_condition::<E>(subject));
    }
    let models = query.order_by_asc(E::id_column()).all(db).await?;
    Ok(models.iter().map(E::row).collect())
}

/// The subject's current plan of each kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivePlans {
    pub workout: Option<workout_plan::Model>,
    pub nutrition: Option<nutrition_plan::Model>,
    pub supplement: Option<supplement_plan::Model>,
    pub steps: Option<steps_plan::Model>,
}

impl ActivePlans {
    /// Kinds that have an active plan.
    #[must_use]
    pub fn kinds(&self) -> Vec<PlanKind> {
        let present = [
            self.workout.is_some(),
            self.nutrition.is_some(),
            self.supplement.is_some(),
            self.steps.is_some(),
        ];
        PlanKind::ALL
            .into_iter()
            .zip(present)
            .filter_map(|(kind, present)| present.then_some(kind))
            .collect()
    }
}

/// Loads the subject's active plan of every kind.
pub async fn get_active_plans<C>(db: &C, subject: SubjectRef) -> Result<ActivePlans>
where
    C: ConnectionTrait,
{
    Ok(ActivePlans {
        workout: find_active::<WorkoutPlan, _>(db, subject).await?,
        nutrition: find_active::<NutritionPlan, _>(db, subject).await?,
        supplement: find_active::<SupplementPlan, _>(db, subject).await?,
        steps: find_active::<StepsPlan, _>(db, subject).await?,
    })
}

/// Overwrites a nutrition plan's targets. The originating budget is not touched.
pub async fn update_nutrition_plan(
    db: &DatabaseConnection,
    plan_id: i64,
    targets: NutritionTargets,
) -> Result<nutrition_plan::Model> {
    targets.validate()?;
    let plan = NutritionPlan::find_by_id(plan_id)
        .one(db)
        .await?
        .ok_or(Error::PlanNotFound {
            kind: PlanKind::Nutrition.as_str(),
            id: plan_id,
        })?;

    let mut model: nutrition_plan::ActiveModel = plan.into();
    model.calories = Set(targets.calories);
    model.protein = Set(targets.protein);
    model.carbs = Set(targets.carbs);
    model.fat = Set(targets.fat);
    model.fiber = Set(targets.fiber);
    model.updated_at = Set(chrono::Utc::now());

    let updated = model.update(db).await?;
    info!("Nutrition plan {} edited", plan_id);
    Ok(updated)
}

/// Overwrites a steps plan's goal and instructions. The originating budget is not touched.
pub async fn update_steps_plan(
    db: &DatabaseConnection,
    plan_id: i64,
    steps_goal: i32,
    instructions: Option<String>,
) -> Result<steps_plan::Model> {
    if steps_goal <= 0 {
        return Err(Error::InvalidInput {
            message: format!("Steps goal must be positive, got {steps_goal}"),
        });
    }
    let plan = StepsPlan::find_by_id(plan_id)
        .one(db)
        .await?
        .ok_or(Error::PlanNotFound {
            kind: PlanKind::Steps.as_str(),
            id: plan_id,
        })?;

    let mut model: steps_plan::ActiveModel = plan.into();
    model.steps_goal = Set(steps_goal);
    model.instructions = Set(instructions);
    model.updated_at = Set(chrono::Utc::now());

    let updated = model.update(db).await?;
    info!("Steps plan {} edited", plan_id);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_plan_kind_names() {
        let names: Vec<&str> = PlanKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["workout", "nutrition", "supplement", "steps"]);
        assert_eq!(PlanKind::Steps.to_string(), "steps");
    }

    #[tokio::test]
    async fn test_deactivate_other_plans_keeps_one() -> Result<()> {
        let db = setup_test_db().await?;
        let lead = create_test_lead(&db, "Dana", None).await?;
        let subject = SubjectRef::Lead(lead.id);

        let first = insert_test_steps_plan(&db, subject, Some(1), 6000).await?;
        let second = insert_test_steps_plan(&db, subject, Some(2), 9000).await?;

        let changed = deactivate_other_plans::<StepsPlan, _>(&db, subject, second.id).await?;
        assert_eq!(changed, 1);

        let active = find_active::<StepsPlan, _>(&db, subject).await?.unwrap();
        assert_eq!(active.id, second.id);

        let first = StepsPlan::find_by_id(first.id).one(&db).await?.unwrap();
        assert!(!first.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn test_subject_scoping() -> Result<()> {
        let db = setup_test_db().await?;
        let lead = create_test_lead(&db, "Dana", None).await?;
        let other = create_test_lead(&db, "Eli", None).await?;

        insert_test_steps_plan(&db, SubjectRef::Lead(lead.id), Some(1), 6000).await?;
        insert_test_steps_plan(&db, SubjectRef::Lead(other.id), Some(1), 7000).await?;

        let deleted =
            delete_plans_for_budget::<StepsPlan, _>(&db, SubjectRef::Lead(lead.id), 1).await?;
        assert_eq!(deleted, 1);

        let remaining = plan_rows::<StepsPlan, _>(&db, None).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].lead_id, Some(other.id));
        assert_eq!(remaining[0].summary, "7000 steps/day");

        Ok(())
    }

    #[tokio::test]
    async fn test_manual_plan_edits() -> Result<()> {
        let db = setup_test_db().await?;
        let lead = create_test_lead(&db, "Dana", None).await?;
        let plan = insert_test_steps_plan(&db, SubjectRef::Lead(lead.id), None, 6000).await?;

        let edited =
            update_steps_plan(&db, plan.id, 7500, Some("After dinner".to_string())).await?;
        assert_eq!(edited.steps_goal, 7500);
        assert_eq!(edited.instructions.as_deref(), Some("After dinner"));

        assert!(matches!(
            update_steps_plan(&db, plan.id, 0, None).await,
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            update_steps_plan(&db, 999, 5000, None).await,
            Err(Error::PlanNotFound { kind: "steps", id: 999 })
        ));
        assert!(matches!(
            update_nutrition_plan(&db, 999, sample_targets()).await,
            Err(Error::PlanNotFound { kind: "nutrition", id: 999 })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_active_plans_empty_for_new_subject() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;

        let plans = get_active_plans(&db, SubjectRef::Customer(customer.id)).await?;
        assert_eq!(plans, ActivePlans::default());
        assert!(plans.kinds().is_empty());

        Ok(())
    }
}
