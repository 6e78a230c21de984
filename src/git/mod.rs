//! Git tagging for released versions
//!
//! The [Tagger] trait covers the two operations `gittag` needs. The concrete
//! implementations are:
//!
//! - [repository::Git2Tagger]: a real implementation using the `git2` crate
//! - [mock::MockTagger]: records calls, for testing

pub mod mock;
pub mod repository;

pub use mock::MockTagger;
pub use repository::Git2Tagger;

use crate::error::Result;

/// Creates and publishes version tags
pub trait Tagger {
    /// Create a lightweight tag at `HEAD`; fails if the tag already exists
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Push `refs/tags/<name>` to `remote`
    fn push_tag(&self, name: &str, remote: &str) -> Result<()>;
}
