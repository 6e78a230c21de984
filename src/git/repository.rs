use std::path::Path;

use git2::{Cred, CredentialType, ErrorClass, ErrorCode, PushOptions, RemoteCallbacks, Repository};

use crate::error::{BuildstampError, Result};
use crate::git::Tagger;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Tagger {
    repo: Repository,
}

impl Git2Tagger {
    /// Discover the repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path.as_ref()).map_err(|e| {
            BuildstampError::tag(format!(
                "Not in a git repository ({}): {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Git2Tagger { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Repository) -> Self {
        Git2Tagger { repo }
    }
}

/// Credentials callback: SSH keys from ~/.ssh, then the SSH agent, then defaults.
fn credentials(
    _url: &str,
    username_from_url: Option<&str>,
    allowed_types: CredentialType,
) -> std::result::Result<Cred, git2::Error> {
    let username = username_from_url.unwrap_or("git");

    if allowed_types.contains(CredentialType::SSH_KEY) {
        if let Some(home) = dirs::home_dir() {
            for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                let path = home.join(".ssh").join(key);
                if path.exists() {
                    if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                        return Ok(cred);
                    }
                }
            }
        }

        if let Ok(cred) = Cred::ssh_key_from_agent(username) {
            return Ok(cred);
        }
    }

    Cred::default()
}

impl Tagger for Git2Tagger {
    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        match self.repo.tag_lightweight(name, head.as_object(), false) {
            Ok(_) => Ok(()),
            Err(e) if e.code() == ErrorCode::Exists => {
                Err(BuildstampError::tag(format!("Tag '{}' already exists", name)))
            }
            Err(e) => Err(BuildstampError::tag(format!("Cannot create tag '{}': {}", name, e))),
        }
    }

    fn push_tag(&self, name: &str, remote: &str) -> Result<()> {
        let mut remote_handle = self
            .repo
            .find_remote(remote)
            .map_err(|_| BuildstampError::remote(format!("No remote named '{}' found", remote)))?;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(credentials);
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "Push rejected for {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        remote_handle
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| match e.class() {
                ErrorClass::Net => BuildstampError::remote(format!("Network error during push: {}", e)),
                ErrorClass::Reference => {
                    BuildstampError::remote(format!("Reference error during push: {}", e))
                }
                _ => BuildstampError::remote(format!("Failed to push tag '{}': {}", name, e)),
            })?;

        tracing::info!(tag = %name, remote = %remote, "pushed tag");
        Ok(())
    }
}
