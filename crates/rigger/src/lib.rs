//! Core of the rigging job marketplace: domain model, job search, the
//! application workflow, and the ambient config/telemetry plumbing shared by
//! the API service.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod seed;
pub mod telemetry;

pub use error::AppError;
