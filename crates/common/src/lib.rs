//! Pieces shared by every crate in the workspace: tracing setup and the
//! small response types that are not tied to a domain.

pub mod types;
pub mod utils;
