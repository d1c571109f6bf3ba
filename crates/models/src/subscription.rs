use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors;

/// A user's paid subscription to an external service.
///
/// `id` and `created_at` are assigned by the database and never taken from clients.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: Date,
    /// `None` means open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_service_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("service_name must not be empty".into()));
    }
    Ok(())
}

pub fn validate_user_id(user_id: &str) -> Result<(), errors::ModelError> {
    if user_id.trim().is_empty() {
        return Err(errors::ModelError::Validation("user_id must not be empty".into()));
    }
    Ok(())
}

pub fn validate_price(price: i32) -> Result<(), errors::ModelError> {
    if price < 0 {
        return Err(errors::ModelError::Validation("price must be >= 0".into()));
    }
    Ok(())
}

pub fn validate_period(start: Date, end: Option<Date>) -> Result<(), errors::ModelError> {
    match end {
        Some(end) if end < start => Err(errors::ModelError::Validation(
            "end_date must not be before start_date".into(),
        )),
        _ => Ok(()),
    }
}
