//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod assessment;
mod auth;
mod dashboard;

pub use assessment::{AssessmentService, Submission};
pub use auth::AuthService;
pub use dashboard::{DashboardService, DashboardSummary, FactorShare, StatCard, TrendPoint};
