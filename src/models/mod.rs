//! Database models and DTOs for all domain entities.

pub mod report;
pub mod user;
