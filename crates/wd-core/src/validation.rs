use crate::error::AnalysisError;

/// Rejects change paths that could escape the review root: parent-directory
/// segments, absolute prefixes, and backslash separators. Violations are
/// recorded per-file by the executor, never thrown to the caller.
pub fn validate_change_path(path: &str) -> Result<(), AnalysisError> {
    let unsafe_path = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|segment| segment == "..");

    if unsafe_path {
        return Err(AnalysisError::UnsafePath {
            path: path.to_string(),
        });
    }
    Ok(())
}
