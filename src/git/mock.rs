use std::cell::RefCell;
use std::collections::BTreeSet;

use crate::error::{BuildstampError, Result};
use crate::git::Tagger;

/// Mock tagger for testing without a repository
#[derive(Debug, Default)]
pub struct MockTagger {
    tags: RefCell<BTreeSet<String>>,
    pushed: RefCell<Vec<(String, String)>>,
}

impl MockTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `name` already exists
    pub fn add_tag(&self, name: impl Into<String>) {
        self.tags.borrow_mut().insert(name.into());
    }

    pub fn tags(&self) -> Vec<String> {
        self.tags.borrow().iter().cloned().collect()
    }

    /// `(tag, remote)` pairs pushed so far
    pub fn pushed(&self) -> Vec<(String, String)> {
        self.pushed.borrow().clone()
    }
}

impl Tagger for MockTagger {
    fn create_tag(&self, name: &str) -> Result<()> {
        if !self.tags.borrow_mut().insert(name.to_string()) {
            return Err(BuildstampError::tag(format!("Tag '{}' already exists", name)));
        }
        Ok(())
    }

    fn push_tag(&self, name: &str, remote: &str) -> Result<()> {
        if !self.tags.borrow().contains(name) {
            return Err(BuildstampError::remote(format!("No local tag '{}'", name)));
        }
        self.pushed
            .borrow_mut()
            .push((name.to_string(), remote.to_string()));
        Ok(())
    }
}
