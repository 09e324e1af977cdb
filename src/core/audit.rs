//! Orphaned plan detection.
//!
//! A synced plan row is orphaned when no assignment links its subject to the
//! budget it came from. Assignment deletion removes those rows in the same
//! transaction, so orphans only appear when rows were removed out of band.

use crate::{
    core::{
        assignment::list_assignments,
        plans::{PlanRow, PlanTable, plan_rows},
        subject::SubjectRef,
    },
    entities::{BudgetAssignment, NutritionPlan, StepsPlan, SupplementPlan, WorkoutPlan},
    errors::Result,
};
use sea_orm::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

type AssignmentKey = (Option<i64>, Option<i64>, i64);

async fn orphans_of<E, C>(db: &C, assigned: &HashSet<AssignmentKey>) -> Result<Vec<PlanRow>>
where
    E: PlanTable,
    C: ConnectionTrait,
{
    Ok(plan_rows::<E, _>(db, None)
        .await?
        .into_iter()
        .filter(|row| {
            row.budget_id
                .is_some_and(|budget_id| !assigned.contains(&(row.lead_id, row.customer_id, budget_id)))
        })
        .collect())
}

/// Every synced plan row whose (subject, budget) pair has no assignment.
pub async fn find_orphaned_plans<C>(db: &C) -> Result<Vec<PlanRow>>
where
    C: ConnectionTrait,
{
    let assigned: HashSet<AssignmentKey> = BudgetAssignment::find()
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.lead_id, a.customer_id, a.budget_id))
        .collect();

    let mut orphans = orphans_of::<WorkoutPlan, _>(db, &assigned).await?;
    orphans.extend(orphans_of::<NutritionPlan, _>(db, &assigned).await?);
    orphans.extend(orphans_of::<SupplementPlan, _>(db, &assigned).await?);
    orphans.extend(orphans_of::<StepsPlan, _>(db, &assigned).await?);

    for row in &orphans {
        warn!(
            "Orphaned {} plan {} (lead={:?}, customer={:?}, budget={:?})",
            row.kind, row.id, row.lead_id, row.customer_id, row.budget_id
        );
    }
    info!("Orphan audit found {} plan row(s)", orphans.len());
    Ok(orphans)
}

/// Plan rows still synced from `budget_id` for a subject that no longer has an
/// assignment to that budget.
pub async fn orphaned_plans_for<C>(db: &C, subject: SubjectRef, budget_id: i64) -> Result<Vec<PlanRow>>
where
    C: ConnectionTrait,
{
    let still_assigned = list_assignments(db, subject)
        .await?
        .iter()
        .any(|a| a.budget_id == budget_id);
    if still_assigned {
        return Ok(Vec::new());
    }

    let mut rows = plan_rows::<WorkoutPlan, _>(db, Some(subject)).await?;
    rows.extend(plan_rows::<NutritionPlan, _>(db, Some(subject)).await?);
    rows.extend(plan_rows::<SupplementPlan, _>(db, Some(subject)).await?);
    rows.extend(plan_rows::<StepsPlan, _>(db, Some(subject)).await?);
    rows.retain(|row| row.budget_id == Some(budget_id));
    Ok(rows)
}
