//! Lead and customer operations.
//!
//! Leads and customers are the subjects budgets get assigned to. A lead may be
//! linked to a parent customer, in which case its assignments are mirrored
//! onto that customer.

use crate::{
    core::subject::SubjectRef,
    entities::{Customer, Lead, customer, lead},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;

const NEW_LEAD_STATUS: &str = "new";

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput {
            message: "Name cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Creates a customer.
pub async fn create_customer(
    db: &DatabaseConnection,
    name: &str,
    email: Option<String>,
    phone: Option<String>,
) -> Result<customer::Model> {
    let name = validate_name(name)?;

    let customer = customer::ActiveModel {
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = customer.insert(db).await?;
    info!("Created customer {} ({})", result.id, result.name);
    Ok(result)
}

/// Finds a customer by id.
pub async fn get_customer<C>(db: &C, customer_id: i64) -> Result<Option<customer::Model>>
where
    C: ConnectionTrait,
{
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a lead, optionally linked to an existing customer.
///
/// Fails with `Error::CustomerNotFound` if `customer_id` does not exist.
pub async fn create_lead(
    db: &DatabaseConnection,
    name: &str,
    email: Option<String>,
    phone: Option<String>,
    customer_id: Option<i64>,
) -> Result<lead::Model> {
    let name = validate_name(name)?;

    if let Some(id) = customer_id {
        get_customer(db, id)
            .await?
            .ok_or(Error::CustomerNotFound { id })?;
    }

    let lead = lead::ActiveModel {
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        status: Set(NEW_LEAD_STATUS.to_string()),
        customer_id: Set(customer_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = lead.insert(db).await?;
    info!("Created lead {} ({})", result.id, result.name);
    Ok(result)
}

/// Finds a lead by id.
pub async fn get_lead<C>(db: &C, lead_id: i64) -> Result<Option<lead::Model>>
where
    C: ConnectionTrait,
{
    Lead::find_by_id(lead_id).one(db).await.map_err(Into::into)
}

/// Links a lead to a parent customer.
///
/// Assignments made afterwards are mirrored onto the customer; earlier ones
/// are not touched.
pub async fn link_lead_to_customer(
    db: &DatabaseConnection,
    lead_id: i64,
    customer_id: i64,
) -> Result<lead::Model> {
    let lead = get_lead(db, lead_id)
        .await?
        .ok_or(Error::LeadNotFound { id: lead_id })?;
    get_customer(db, customer_id)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer_id })?;

    let mut lead_model: lead::ActiveModel = lead.into();
    lead_model.customer_id = Set(Some(customer_id));
    let updated = lead_model.update(db).await?;
    info!("Linked lead {} to customer {}", lead_id, customer_id);
    Ok(updated)
}

/// Verifies a subject exists and returns the parent customer of a lead.
///
/// Customers never have a parent, so `Ok(None)` is returned for them.
pub async fn parent_customer<C>(db: &C, subject: SubjectRef) -> Result<Option<i64>>
where
    C: ConnectionTrait,
{
    match subject {
        SubjectRef::Lead(id) => {
            let lead = get_lead(db, id).await?.ok_or(Error::LeadNotFound { id })?;
            Ok(lead.customer_id)
        }
        SubjectRef::Customer(id) => {
            get_customer(db, id)
                .await?
                .ok_or(Error::CustomerNotFound { id })?;
            Ok(None)
        }
    }
}
