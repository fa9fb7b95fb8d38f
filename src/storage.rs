// (c) 2025 Ross Younger

//! Per-user file storage
//!
//! Every file operation in a session is scoped under the authenticated
//! user's root directory; paths arriving off the wire are resolved
//! relative to that root.

use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::protocol::session::LISTING_SEPARATOR;

/// The storage root of one authenticated user
#[derive(Debug, Clone)]
pub(crate) struct UserRoot {
    username: String,
    path: PathBuf,
}

impl UserRoot {
    /// Resolves (creating if necessary) the root for `username` under the
    /// server's top-level storage directory.
    pub(crate) async fn ensure(storage_dir: &Path, username: &str) -> Result<Self> {
        let path = storage_dir.join(username);
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self {
            username: username.to_string(),
            path,
        })
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    /// Joins a wire-supplied relative path onto this root.
    pub(crate) fn resolve(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// All entries under the root (files and directories, recursively),
    /// relative to it, joined with the protocol's listing separator.
    pub(crate) fn listing(&self) -> Result<String> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.path).min_depth(1) {
            let entry = entry?;
            entries.push(
                entry
                    .path()
                    .strip_prefix(&self.path)?
                    .to_string_lossy()
                    .into_owned(),
            );
        }
        Ok(entries.join(LISTING_SEPARATOR))
    }
}
