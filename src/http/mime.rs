//! Content-type inference from file extensions.

use std::path::Path;

/// Returns the content type for `path`, or `None` for unknown extensions.
pub fn content_type_for(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
