//! Service layer for subscription records.
//! - `subscription::repository` is the store: one trait, a SeaORM implementation
//!   and an in-memory one for tests.
//! - `subscription::service` holds the business rules on top of it.

pub mod errors;
pub mod subscription;
#[cfg(test)]
pub mod test_support;
