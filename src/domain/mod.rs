//! Domain logic - pure counter rules independent of the file system

pub mod action;
pub mod audit;
pub mod build_number;
pub mod tag;
pub mod version;

pub use action::Action;
pub use audit::AuditEntry;
pub use build_number::BuildNumber;
pub use tag::TagPattern;
pub use version::{Version, VersionBump};
