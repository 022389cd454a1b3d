//! Business logic services.

pub mod auth;
pub mod report;
pub mod stats;
pub mod user;
