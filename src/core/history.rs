//! Plans history - every plan a subject has had, across all kinds.

use crate::{
    core::{
        plans::{PlanRow, plan_rows},
        subject::SubjectRef,
    },
    entities::{NutritionPlan, StepsPlan, SupplementPlan, WorkoutPlan},
    errors::Result,
};
use sea_orm::ConnectionTrait;

/// All plan rows of the subject, newest first.
pub async fn plans_history<C>(db: &C, subject: SubjectRef) -> Result<Vec<PlanRow>>
where
    C: ConnectionTrait,
{
    let mut rows = plan_rows::<WorkoutPlan, _>(db, Some(subject)).await?;
    rows.extend(plan_rows::<NutritionPlan, _>(db, Some(subject)).await?);
    rows.extend(plan_rows::<SupplementPlan, _>(db, Some(subject)).await?);
    rows.extend(plan_rows::<StepsPlan, _>(db, Some(subject)).await?);

    rows.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
            .then_with(|| a.kind.cmp(&b.kind))
    });
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{assignment::assign_budget, budget::create_budget, plans::PlanKind};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_history_spans_budgets_and_kinds() -> Result<()> {
        let db = setup_test_db().await?;
        let actor = admin_actor();
        let lead = create_test_lead(&db, "Dana", None).await?;
        let subject = SubjectRef::Lead(lead.id);
        let b1 = create_budget(&db, &actor, nutrition_budget("B1")).await?;
        let b2 = create_budget(&db, &actor, full_budget("B2")).await?;

        assign_budget(&db, &actor, b1.id, subject, None).await?;
        assign_budget(&db, &actor, b2.id, subject, None).await?;

        let history = plans_history(&db, subject).await?;
        assert_eq!(history.len(), 5);
        assert_eq!(history.iter().filter(|r| r.is_active).count(), 3);
        assert_eq!(
            history
                .iter()
                .filter(|r| r.budget_id == Some(b1.id))
                .count(),
            2
        );
        assert!(
            history
                .iter()
                .any(|r| r.kind == PlanKind::Supplement && r.summary == "2 supplement(s)")
        );
        assert!(
            history
                .windows(2)
                .all(|pair| pair[0].created_at >= pair[1].created_at)
        );

        let other = create_test_lead(&db, "Eli", None).await?;
        assert!(plans_history(&db, SubjectRef::Lead(other.id)).await?.is_empty());

        Ok(())
    }
}
