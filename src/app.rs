//! Application facade used by the dashboard.
//!
//! `CoachDesk` pairs the database connection with the query cache. Mutations
//! delegate to [`crate::core`] and then mark the cache keys they affect stale;
//! reads are served through the cache.

use crate::{
    cache::{QueryCache, QueryKey},
    core::{
        actor::Actor,
        assignment::{self, AssignmentOutcome, CascadeReport},
        budget::{self, BudgetUpdate, NewBudget},
        history,
        plans::{self, ActivePlans, PlanRow},
        subject::SubjectRef,
        sync::SyncReport,
    },
    entities::{budget as budget_entity, budget_assignment},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Shared state for every dashboard operation.
#[derive(Debug)]
pub struct CoachDesk {
    /// Database connection for all operations
    pub database: DatabaseConnection,
    /// Read-model cache
    pub cache: QueryCache,
}

impl CoachDesk {
    /// Creates a facade with an empty cache.
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database,
            cache: QueryCache::new(),
        }
    }

    /// Assigns a budget to a subject; see [`assignment::assign_budget`].
    pub async fn assign_budget(
        &self,
        actor: &Actor,
        budget_id: i64,
        subject: SubjectRef,
        notes: Option<String>,
    ) -> Result<AssignmentOutcome> {
        let outcome =
            assignment::assign_budget(&self.database, actor, budget_id, subject, notes).await?;

        self.cache.invalidate_subject(subject).await;
        if let Some(customer_id) = outcome.mirrored.as_ref().and_then(|m| m.customer_id) {
            self.cache
                .invalidate_subject(SubjectRef::Customer(customer_id))
                .await;
        }
        Ok(outcome)
    }

    /// Deletes an assignment and its plans; see [`assignment::delete_assignment`].
    pub async fn delete_assignment(&self, assignment_id: i64) -> Result<CascadeReport> {
        let report = assignment::delete_assignment(&self.database, assignment_id).await?;
        self.cache.invalidate_subject(report.subject).await;
        Ok(report)
    }

    /// Re-syncs an assignment's budget into its subject's plans.
    pub async fn resync_assignment(&self, actor: &Actor, assignment_id: i64) -> Result<SyncReport> {
        let existing = assignment::get_assignment(&self.database, assignment_id)
            .await?
            .ok_or(Error::AssignmentNotFound { id: assignment_id })?;
        let subject = assignment::assignment_subject(&existing)?;

        let report = assignment::resync_assignment(&self.database, actor, assignment_id).await?;
        self.cache.invalidate_subject(subject).await;
        Ok(report)
    }

    /// Creates a budget owned by the actor.
    pub async fn create_budget(
        &self,
        actor: &Actor,
        new_budget: NewBudget,
    ) -> Result<budget_entity::Model> {
        let created = budget::create_budget(&self.database, actor, new_budget).await?;
        self.cache.invalidate_budgets().await;
        Ok(created)
    }

    /// Updates a budget; materialized plans are left as they are.
    pub async fn update_budget(
        &self,
        actor: &Actor,
        budget_id: i64,
        update: BudgetUpdate,
    ) -> Result<budget_entity::Model> {
        let updated = budget::update_budget(&self.database, actor, budget_id, update).await?;
        self.cache.invalidate_budgets().await;
        Ok(updated)
    }

    /// Clones a readable budget into a private copy.
    pub async fn clone_budget(
        &self,
        actor: &Actor,
        budget_id: i64,
        name: Option<String>,
    ) -> Result<budget_entity::Model> {
        let copy = budget::clone_budget(&self.database, actor, budget_id, name).await?;
        self.cache.invalidate_budgets().await;
        Ok(copy)
    }

    /// Deletes an unassigned budget.
    pub async fn delete_budget(&self, actor: &Actor, budget_id: i64) -> Result<()> {
        budget::delete_budget(&self.database, actor, budget_id).await?;
        self.cache.invalidate_budgets().await;
        Ok(())
    }

    /// Budgets visible to the actor.
    pub async fn visible_budgets(&self, actor: &Actor) -> Result<Vec<budget_entity::Model>> {
        let key = QueryKey::Budgets(actor.user_id.clone());
        self.cache
            .get_or_fetch(key, || budget::list_visible_budgets(&self.database, actor))
            .await
    }

    /// The subject's assignments, newest first.
    pub async fn assignments_for(
        &self,
        subject: SubjectRef,
    ) -> Result<Vec<budget_assignment::Model>> {
        self.cache
            .get_or_fetch(QueryKey::Assignments(subject), || {
                assignment::list_assignments(&self.database, subject)
            })
            .await
    }

    /// The subject's active plan of every kind.
    pub async fn active_plans(&self, subject: SubjectRef) -> Result<ActivePlans> {
        self.cache
            .get_or_fetch(QueryKey::ActivePlans(subject), || {
                plans::get_active_plans(&self.database, subject)
            })
            .await
    }

    /// The subject's plan history, newest first.
    pub async fn plans_history(&self, subject: SubjectRef) -> Result<Vec<PlanRow>> {
        debug!("Loading plans history for {}", subject);
        self.cache
            .get_or_fetch(QueryKey::PlansHistory(subject), || {
                history::plans_history(&self.database, subject)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::plans::PlanKind;
    use crate::test_utils::*;

    async fn setup_desk() -> Result<CoachDesk> {
        Ok(CoachDesk::new(setup_test_db().await?))
    }

    #[tokio::test]
    async fn test_assign_invalidates_subject_views() -> Result<()> {
        let desk = setup_desk().await?;
        let actor = admin_actor();
        let lead = create_test_lead(&desk.database, "Dana", None).await?;
        let subject = SubjectRef::Lead(lead.id);
        let budget = desk.create_budget(&actor, nutrition_budget("B1")).await?;

        let before = desk.active_plans(subject).await?;
        assert!(before.kinds().is_empty());
        assert!(desk.cache.is_fresh(&QueryKey::ActivePlans(subject)).await);

        desk.assign_budget(&actor, budget.id, subject, None).await?;
        assert!(!desk.cache.is_fresh(&QueryKey::ActivePlans(subject)).await);

        let after = desk.active_plans(subject).await?;
        assert_eq!(after.kinds(), vec![PlanKind::Nutrition, PlanKind::Steps]);
        assert_eq!(after.nutrition.unwrap().calories, 2200.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_mirrored_customer_views_are_invalidated() -> Result<()> {
        let desk = setup_desk().await?;
        let actor = admin_actor();
        let customer = create_test_customer(&desk.database, "Acme").await?;
        let lead = create_test_lead(&desk.database, "Dana", Some(customer.id)).await?;
        let budget = desk.create_budget(&actor, nutrition_budget("B2")).await?;
        let customer_subject = SubjectRef::Customer(customer.id);

        assert!(desk.assignments_for(customer_subject).await?.is_empty());

        desk.assign_budget(&actor, budget.id, SubjectRef::Lead(lead.id), None)
            .await?;

        let customer_assignments = desk.assignments_for(customer_subject).await?;
        assert_eq!(customer_assignments.len(), 1);
        assert_eq!(customer_assignments[0].budget_id, budget.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_assignment_refreshes_history() -> Result<()> {
        let desk = setup_desk().await?;
        let actor = admin_actor();
        let lead = create_test_lead(&desk.database, "Dana", None).await?;
        let subject = SubjectRef::Lead(lead.id);
        let budget = desk.create_budget(&actor, full_budget("All")).await?;

        let outcome = desk.assign_budget(&actor, budget.id, subject, None).await?;
        assert_eq!(desk.plans_history(subject).await?.len(), 3);

        desk.delete_assignment(outcome.assignment.id).await?;
        assert!(desk.plans_history(subject).await?.is_empty());
        assert!(desk.assignments_for(subject).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_budget_list_refreshes_after_clone() -> Result<()> {
        let desk = setup_desk().await?;
        let admin = admin_actor();
        let trainer = trainer_actor("trainer-1");
        let public = desk.create_budget(&admin, public_budget("Shared")).await?;

        assert_eq!(desk.visible_budgets(&trainer).await?.len(), 1);

        desk.clone_budget(&trainer, public.id, Some("Mine".to_string()))
            .await?;
        let names: Vec<String> = desk
            .visible_budgets(&trainer)
            .await?
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Mine", "Shared"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_resync_unknown_assignment() -> Result<()> {
        let desk = setup_desk().await?;
        assert!(matches!(
            desk.resync_assignment(&admin_actor(), 404).await,
            Err(Error::AssignmentNotFound { id: 404 })
        ));
        Ok(())
    }
}
