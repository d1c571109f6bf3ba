use std::fmt::Display;

use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Model(ModelError::Validation(_)))
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Model(ModelError::Validation(_)) => 1001,
            Self::NotFound(_) => 1003,
            Self::Db(_) => 1200,
        }
    }

    /// Prefix the message with `ctx`, keeping the variant.
    pub fn context(self, ctx: impl Display) -> Self {
        match self {
            Self::Validation(m) | Self::Model(ModelError::Validation(m)) => Self::Validation(format!("{ctx}: {m}")),
            Self::NotFound(m) => Self::NotFound(format!("{ctx}: {m}")),
            Self::Db(m) => Self::Db(format!("{ctx}: {m}")),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}
