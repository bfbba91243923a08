use crate::StoreError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the symbolic link that points at the most recently completed
/// directory within a staging role.
pub const LATEST_LINK_NAME: &str = "latest";

/// One of the staging roles used to track a build's lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildRole {
    InProgress,
    Successful,
    Failed,
}

impl BuildRole {
    fn dir_name(self) -> &'static str {
        match self {
            BuildRole::InProgress => "inprogress",
            BuildRole::Successful => "successful",
            BuildRole::Failed => "failed",
        }
    }
}

impl fmt::Display for BuildRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Directory layout for the Pallet build area.
///
/// Each staging role gets its own root under the builder root; completed
/// builds are moved (never copied) from the in-progress root into a
/// terminal role root, and every terminal root carries a `latest` link.
#[derive(Debug, Clone)]
pub struct BuildLayout {
    root: PathBuf,
}

impl BuildLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn role_root(&self, role: BuildRole) -> PathBuf {
        self.root.join(role.dir_name())
    }

    #[inline]
    pub fn inprogress_root(&self) -> PathBuf {
        self.role_root(BuildRole::InProgress)
    }

    #[inline]
    pub fn successful_root(&self) -> PathBuf {
        self.role_root(BuildRole::Successful)
    }

    #[inline]
    pub fn failed_root(&self) -> PathBuf {
        self.role_root(BuildRole::Failed)
    }

    #[inline]
    pub fn latest_link(&self, role: BuildRole) -> PathBuf {
        self.role_root(role).join(LATEST_LINK_NAME)
    }

    /// Ensure all role roots exist, creating parents as needed. Idempotent.
    pub fn ensure_roots(&self) -> Result<(), StoreError> {
        for role in [BuildRole::InProgress, BuildRole::Successful, BuildRole::Failed] {
            fs::create_dir_all(self.role_root(role))?;
        }
        Ok(())
    }
}
