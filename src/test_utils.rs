//! Shared test utilities for `CoachDesk`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        actor::{Actor, Role},
        budget::{NewBudget, NutritionTargets, Supplement},
        people, workout,
        subject::SubjectRef,
    },
    entities,
    errors::Result,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing_subscriber::EnvFilter;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .try_init();
}

/// An admin actor with user id `"admin"`.
pub fn admin_actor() -> Actor {
    Actor::new("admin", Role::Admin)
}

/// A regular trainer actor.
pub fn trainer_actor(user_id: &str) -> Actor {
    Actor::new(user_id, Role::User)
}

/// 2200 kcal, 160g protein, 220g carbs, 70g fat, 30g fiber.
pub fn sample_targets() -> NutritionTargets {
    NutritionTargets {
        calories: 2200.0,
        protein: 160.0,
        carbs: 220.0,
        fat: 70.0,
        fiber: 30.0,
    }
}

/// A private budget defining nutrition and steps only.
///
/// # Defaults
/// * nutrition: [`sample_targets`]
/// * `steps_goal`: 8000
/// * no workout template, no supplements
pub fn nutrition_budget(name: &str) -> NewBudget {
    NewBudget {
        name: name.to_string(),
        nutrition_targets: Some(sample_targets()),
        steps_goal: Some(8000),
        ..Default::default()
    }
}

/// A private budget defining nutrition, steps and two supplements.
/// Callers set `workout_template_id` themselves when they need one.
pub fn full_budget(name: &str) -> NewBudget {
    NewBudget {
        supplements: vec![
            Supplement {
                name: "Creatine".to_string(),
                dosage: Some("5g".to_string()),
                timing: Some("morning".to_string()),
            },
            Supplement {
                name: "Vitamin D".to_string(),
                dosage: Some("2000 IU".to_string()),
                timing: None,
            },
        ],
        eating_order: Some("Protein first".to_string()),
        ..nutrition_budget(name)
    }
}

/// Same as [`nutrition_budget`] but public.
pub fn public_budget(name: &str) -> NewBudget {
    NewBudget {
        is_public: true,
        ..nutrition_budget(name)
    }
}

/// Creates a customer without contact details.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::customer::Model> {
    people::create_customer(db, name, None, None).await
}

/// Creates a lead, optionally linked to a customer.
pub async fn create_test_lead(
    db: &DatabaseConnection,
    name: &str,
    customer_id: Option<i64>,
) -> Result<entities::lead::Model> {
    people::create_lead(db, name, None, None, customer_id).await
}

/// Creates a workout template with a one-exercise routine.
pub async fn create_test_workout_template(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::workout_template::Model> {
    workout::create_workout_template(
        db,
        &admin_actor(),
        name,
        None,
        serde_json::json!({ "days": [{ "name": "Day 1", "exercises": ["Squat 5x5"] }] }),
    )
    .await
}

/// Inserts an active steps plan directly, bypassing sync.
pub async fn insert_test_steps_plan(
    db: &DatabaseConnection,
    subject: SubjectRef,
    budget_id: Option<i64>,
    goal: i32,
) -> Result<entities::steps_plan::Model> {
    let now = chrono::Utc::now();
    let plan = entities::steps_plan::ActiveModel {
        lead_id: Set(subject.lead_id()),
        customer_id: Set(subject.customer_id()),
        budget_id: Set(budget_id),
        steps_goal: Set(goal),
        instructions: Set(None),
        is_active: Set(true),
        created_by: Set("test".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(plan.insert(db).await?)
}
