//! Maps request targets onto paths under the document root.

use std::path::PathBuf;

use thiserror::Error;

/// File appended when a target names a directory.
pub const INDEX_FILE: &str = "index.html";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no resource for target {0:?}")]
    NotFound(String),
}

/// Removes every literal `../` from the target in a single pass.
///
/// This is lexical only. Text that forms a new `../` once the removal is done
/// is left alone (`..././` becomes `../`).
pub fn strip_traversal(target: &str) -> String {
    target.replace("../", "")
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    doc_root: String,
}

impl PathResolver {
    pub fn new(doc_root: impl Into<String>) -> Self {
        Self {
            doc_root: doc_root.into(),
        }
    }

    pub fn doc_root(&self) -> &str {
        &self.doc_root
    }

    /// Produces the candidate path for `target`.
    ///
    /// Directories resolve to their `index.html`. A trailing slash on anything
    /// that is not a directory is `NotFound`. Existence of a file is not checked.
    pub async fn resolve(&self, target: &str) -> Result<PathBuf, ResolveError> {
        let target = strip_traversal(target);
        if !target.starts_with('/') {
            return Err(ResolveError::NotFound(target));
        }

        let candidate = PathBuf::from(format!("{}{}", self.doc_root, target));

        let is_dir = tokio::fs::metadata(&candidate)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);

        if is_dir {
            return Ok(candidate.join(INDEX_FILE));
        }

        if target.ends_with('/') {
            return Err(ResolveError::NotFound(target));
        }

        Ok(candidate)
    }
}
