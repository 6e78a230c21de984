pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod logging;
pub mod packager;
pub mod render;
pub mod store;
pub mod ui;

pub use error::{BuildstampError, Result};
pub use store::VersionStore;
