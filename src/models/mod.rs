//! Data models for GeoVisits

pub mod import_report;
pub mod user;
pub mod visit;

// Re-export commonly used types
pub use import_report::{ImportReport, SkippedRow};
pub use user::{User, UserClaims};
pub use visit::{NewVisit, Visit, VisitPayload};
