//! Assignment business logic - Activates budgets for subjects and removes them again.
//!
//! A subject has at most one active assignment. Activating a new one first
//! deactivates the others, all inside one database transaction, and then
//! syncs the budget into the subject's plans. Sync runs after the commit so a
//! sync failure never undoes the assignment; its result is returned to the
//! caller in [`AssignmentOutcome::sync`].

use crate::{
    core::{
        actor::Actor,
        audit,
        budget::get_readable_budget,
        people,
        plans::{PlanKind, delete_plans_for_budget},
        subject::SubjectRef,
        sync::{SyncReport, sync_plans_from_budget},
    },
    entities::{
        BudgetAssignment, NutritionPlan, StepsPlan, SupplementPlan, WorkoutPlan, budget,
        budget_assignment,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument, warn};

/// Result of [`assign_budget`].
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    /// The new active assignment
    pub assignment: budget_assignment::Model,
    /// The assigned budget
    pub budget: budget::Model,
    /// Mirrored assignment on the lead's parent customer, if one was created
    pub mirrored: Option<budget_assignment::Model>,
    /// Prior assignments of the subject that were deactivated
    pub deactivated: u64,
    /// Plan sync result; the assignment stands even if this has failures
    pub sync: SyncReport,
}

/// Result of [`delete_assignment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    /// Removed assignment id
    pub assignment_id: i64,
    /// Its subject
    pub subject: SubjectRef,
    /// Its budget
    pub budget_id: i64,
    /// Plan rows removed per kind
    pub removed: Vec<(PlanKind, u64)>,
}

impl CascadeReport {
    /// Total plan rows removed.
    #[must_use]
    pub fn total_removed(&self) -> u64 {
        self.removed.iter().map(|(_, n)| n).sum()
    }
}

/// Assignment rows belonging to the subject.
fn subject_condition(subject: SubjectRef) -> Condition {
    match subject {
        SubjectRef::Lead(id) => {
            Condition::all().add(budget_assignment::Column::LeadId.eq(id))
        }
        SubjectRef::Customer(id) => {
            Condition::all().add(budget_assignment::Column::CustomerId.eq(id))
        }
    }
}

/// The subject an assignment row points at.
pub fn assignment_subject(assignment: &budget_assignment::Model) -> Result<SubjectRef> {
    SubjectRef::from_columns(assignment.lead_id, assignment.customer_id)
}

/// Finds an assignment by id.
pub async fn get_assignment<C>(db: &C, assignment_id: i64) -> Result<Option<budget_assignment::Model>>
where
    C: ConnectionTrait,
{
    BudgetAssignment::find_by_id(assignment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The subject's active assignment, if any.
pub async fn get_active_assignment<C>(
    db: &C,
    subject: SubjectRef,
) -> Result<Option<budget_assignment::Model>>
where
    C: ConnectionTrait,
{
    BudgetAssignment::find()
        .filter(subject_condition(subject))
        .filter(budget_assignment::Column::IsActive.eq(true))
        .order_by_desc(budget_assignment::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All of the subject's assignments, newest first.
pub async fn list_assignments<C>(db: &C, subject: SubjectRef) -> Result<Vec<budget_assignment::Model>>
where
    C: ConnectionTrait,
{
    BudgetAssignment::find()
        .filter(subject_condition(subject))
        .order_by_desc(budget_assignment::Column::AssignedAt)
        .order_by_desc(budget_assignment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn deactivate_assignments<C>(db: &C, subject: SubjectRef) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = BudgetAssignment::update_many()
        .col_expr(budget_assignment::Column::IsActive, Expr::value(false))
        .filter(subject_condition(subject))
        .filter(budget_assignment::Column::IsActive.eq(true))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

async fn insert_assignment<C>(
    db: &C,
    budget_id: i64,
    subject: SubjectRef,
    actor: &Actor,
    notes: Option<String>,
) -> Result<budget_assignment::Model>
where
    C: ConnectionTrait,
{
    let assignment = budget_assignment::ActiveModel {
        budget_id: Set(budget_id),
        lead_id: Set(subject.lead_id()),
        customer_id: Set(subject.customer_id()),
        is_active: Set(true),
        assigned_by: Set(actor.user_id.clone()),
        notes: Set(notes),
        assigned_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    assignment.insert(db).await.map_err(Into::into)
}

/// Gives the parent customer the same active budget as its lead.
///
/// Returns `None` when the customer already has this budget active.
async fn mirror_to_customer<C>(
    db: &C,
    budget_id: i64,
    customer_id: i64,
    actor: &Actor,
    notes: Option<String>,
) -> Result<Option<budget_assignment::Model>>
where
    C: ConnectionTrait,
{
    let customer = SubjectRef::Customer(customer_id);
    if let Some(active) = get_active_assignment(db, customer).await? {
        if active.budget_id == budget_id {
            info!(
                "Customer {} already has budget {} active, not mirroring",
                customer_id, budget_id
            );
            return Ok(None);
        }
    }

    deactivate_assignments(db, customer).await?;
    let mirrored = insert_assignment(db, budget_id, customer, actor, notes).await?;
    Ok(Some(mirrored))
}

/// Makes `budget_id` the subject's active budget and syncs it into plans.
///
/// # Errors
/// `Error::BudgetNotFound` / `Error::Unauthorized` when the budget is missing
/// or not readable by the actor, `Error::LeadNotFound` /
/// `Error::CustomerNotFound` for an unknown subject. Plan sync problems are
/// not errors; see [`AssignmentOutcome::sync`].
#[instrument(skip(db, actor, notes), fields(user = %actor.user_id))]
pub async fn assign_budget(
    db: &DatabaseConnection,
    actor: &Actor,
    budget_id: i64,
    subject: SubjectRef,
    notes: Option<String>,
) -> Result<AssignmentOutcome> {
    let budget = get_readable_budget(db, actor, budget_id).await?;
    let parent_customer = people::parent_customer(db, subject).await?;

    let txn = db.begin().await?;
    let deactivated = deactivate_assignments(&txn, subject).await?;
    let assignment = insert_assignment(&txn, budget.id, subject, actor, notes.clone()).await?;
    let mirrored = match parent_customer {
        Some(customer_id) => mirror_to_customer(&txn, budget.id, customer_id, actor, notes).await?,
        None => None,
    };
    txn.commit().await?;

    info!(
        "Assigned budget {} to {} (assignment {}, {} deactivated)",
        budget.id, subject, assignment.id, deactivated
    );

    let sync = sync_plans_from_budget(db, &budget, subject, actor).await;
    if !sync.is_complete() {
        warn!(
            "Assignment {} saved but plan sync had {} failure(s)",
            assignment.id,
            sync.failures.len()
        );
    }

    Ok(AssignmentOutcome {
        assignment,
        budget,
        mirrored,
        deactivated,
        sync,
    })
}

/// Re-runs plan sync for an existing assignment, picking up budget edits.
///
/// # Errors
/// `Error::InvalidInput` if the assignment is no longer active; syncing it
/// would displace the plans of the subject's current budget.
pub async fn resync_assignment(
    db: &DatabaseConnection,
    actor: &Actor,
    assignment_id: i64,
) -> Result<SyncReport> {
    let assignment = get_assignment(db, assignment_id)
        .await?
        .ok_or(Error::AssignmentNotFound { id: assignment_id })?;
    if !assignment.is_active {
        return Err(Error::InvalidInput {
            message: format!(
                "Assignment {assignment_id} is inactive; assign budget {} again instead",
                assignment.budget_id
            ),
        });
    }
    let subject = assignment_subject(&assignment)?;
    let budget = get_readable_budget(db, actor, assignment.budget_id).await?;

    Ok(sync_plans_from_budget(db, &budget, subject, actor).await)
}

/// Deletes an assignment together with every plan row synced from it.
///
/// The assignment and the plan rows of all four kinds matching
/// (subject, budget) are removed in one transaction, active or not.
#[instrument(skip(db))]
pub async fn delete_assignment(db: &DatabaseConnection, assignment_id: i64) -> Result<CascadeReport> {
    let assignment = get_assignment(db, assignment_id)
        .await?
        .ok_or(Error::AssignmentNotFound { id: assignment_id })?;
    let subject = assignment_subject(&assignment)?;
    let budget_id = assignment.budget_id;

    let txn = db.begin().await?;
    assignment.delete(&txn).await?;
    let removed = vec![
        (
            PlanKind::Workout,
            delete_plans_for_budget::<WorkoutPlan, _>(&txn, subject, budget_id).await?,
        ),
        (
            PlanKind::Nutrition,
            delete_plans_for_budget::<NutritionPlan, _>(&txn, subject, budget_id).await?,
        ),
        (
            PlanKind::Supplement,
            delete_plans_for_budget::<SupplementPlan, _>(&txn, subject, budget_id).await?,
        ),
        (
            PlanKind::Steps,
            delete_plans_for_budget::<StepsPlan, _>(&txn, subject, budget_id).await?,
        ),
    ];
    txn.commit().await?;

    let report = CascadeReport {
        assignment_id,
        subject,
        budget_id,
        removed,
    };
    info!(
        "Deleted assignment {} for {} and {} plan row(s)",
        assignment_id,
        subject,
        report.total_removed()
    );

    let leftovers = audit::orphaned_plans_for(db, subject, budget_id).await?;
    if !leftovers.is_empty() {
        warn!(
            "{} plan row(s) for {} and budget {} survived deletion of assignment {}",
            leftovers.len(),
            subject,
            budget_id,
            assignment_id
        );
    }

    Ok(report)
}
