//! Entity module - SeaORM entity definitions for every coachdesk table.
//!
//! Each entity has a Model struct for data and an Entity struct for operations.
//! The four plan tables share a common shape (subject, budget back-reference,
//! active flag) which `crate::core::plans::PlanTable` exposes generically.

pub mod budget;
pub mod budget_assignment;
pub mod customer;
pub mod lead;
pub mod nutrition_plan;
pub mod steps_plan;
pub mod supplement_plan;
pub mod workout_plan;
pub mod workout_template;

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use budget_assignment::{
    Column as BudgetAssignmentColumn, Entity as BudgetAssignment, Model as BudgetAssignmentModel,
};
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use lead::{Column as LeadColumn, Entity as Lead, Model as LeadModel};
pub use nutrition_plan::{
    Column as NutritionPlanColumn, Entity as NutritionPlan, Model as NutritionPlanModel,
};
pub use steps_plan::{Column as StepsPlanColumn, Entity as StepsPlan, Model as StepsPlanModel};
pub use supplement_plan::{
    Column as SupplementPlanColumn, Entity as SupplementPlan, Model as SupplementPlanModel,
};
pub use workout_plan::{
    Column as WorkoutPlanColumn, Entity as WorkoutPlan, Model as WorkoutPlanModel,
};
pub use workout_template::{
    Column as WorkoutTemplateColumn, Entity as WorkoutTemplate, Model as WorkoutTemplateModel,
};
