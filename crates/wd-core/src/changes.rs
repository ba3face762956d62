use crate::error::ChangeError;
use crate::types::change::{FileChange, SubjectRef};
use async_trait::async_trait;
use std::path::PathBuf;

/// Source of the file-level diffs for one change request. The hosting-service
/// client (GitLab, GitHub, ...) lives behind this boundary; the core only
/// sees the resulting change set.
#[async_trait]
pub trait ChangeSetProvider: Send + Sync {
    async fn changes(
        &self,
        subject: &SubjectRef,
        credentials: Option<&str>,
    ) -> Result<Vec<FileChange>, ChangeError>;
}

/// Maps a file extension to the hint handed to analysis capabilities.
pub fn language_hint(path: &str) -> Option<String> {
    let extension = path.rsplit('/').next()?.rsplit_once('.')?.1;
    let language = match extension.to_ascii_lowercase().as_str() {
        "rs" => "rust",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "jsx" => "javascript",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "swift" => "swift",
        "scala" => "scala",
        "sh" | "bash" => "shell",
        "sql" => "sql",
        "html" | "htm" => "html",
        "css" | "scss" | "less" => "css",
        "yml" | "yaml" => "yaml",
        "json" => "json",
        "toml" => "toml",
        "md" => "markdown",
        _ => return None,
    };
    Some(language.to_string())
}

/// Splits one unified diff into per-file changes. Each entry keeps the raw
/// patch body (hunk headers included) for its file; paths come from the
/// `diff --git` line, preferring the `b/` side.
pub fn parse_unified_diff(unified: &str) -> Vec<FileChange> {
    let mut changes: Vec<FileChange> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in unified.lines() {
        if line.starts_with("diff --git ") {
            if let Some((path, body)) = current.take() {
                changes.push(build_change(path, &body));
            }
            let path = parse_diff_path(line).unwrap_or_else(|| "unknown".to_string());
            current = Some((path, Vec::new()));
            continue;
        }
        if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((path, body)) = current.take() {
        changes.push(build_change(path, &body));
    }
    changes
}

fn build_change(path: String, body: &[&str]) -> FileChange {
    let language = language_hint(&path);
    FileChange {
        path,
        patch: body.join("\n"),
        language,
    }
}

fn parse_diff_path(line: &str) -> Option<String> {
    // diff --git a/src/lib.rs b/src/lib.rs
    let b_side = line.split(" b/").nth(1)?;
    if b_side.is_empty() {
        return None;
    }
    Some(b_side.to_string())
}

/// Change sets served from a directory of unified-diff files named
/// `<project>__<change_request>.diff`. Stands in for the hosting-service
/// client in local and test deployments.
pub struct DiffSpool {
    root: PathBuf,
}

impl DiffSpool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ChangeSetProvider for DiffSpool {
    async fn changes(
        &self,
        subject: &SubjectRef,
        _credentials: Option<&str>,
    ) -> Result<Vec<FileChange>, ChangeError> {
        let file = self.root.join(format!(
            "{}__{}.diff",
            subject.project_id, subject.change_request_id
        ));
        let unified = std::fs::read_to_string(&file).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ChangeError::NoChanges
            } else {
                ChangeError::Provider {
                    message: format!("{}: {err}", file.display()),
                }
            }
        })?;
        let changes = parse_unified_diff(&unified);
        if changes.is_empty() {
            return Err(ChangeError::NoChanges);
        }
        Ok(changes)
    }
}

/// Fixed change set, for tests and embedding.
pub struct StaticChangeSet {
    changes: Vec<FileChange>,
}

impl StaticChangeSet {
    pub fn new(changes: Vec<FileChange>) -> Self {
        Self { changes }
    }
}

#[async_trait]
impl ChangeSetProvider for StaticChangeSet {
    async fn changes(
        &self,
        _subject: &SubjectRef,
        _credentials: Option<&str>,
    ) -> Result<Vec<FileChange>, ChangeError> {
        if self.changes.is_empty() {
            return Err(ChangeError::NoChanges);
        }
        Ok(self.changes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FILE_DIFF: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
index 83db48f..bf269f4 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,4 @@
 fn existing() {}
+fn added() {}
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 # title
+new line
";

    #[test]
    fn splits_multi_file_diff() {
        let changes = parse_unified_diff(TWO_FILE_DIFF);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].path, "src/lib.rs");
        assert_eq!(changes[0].language.as_deref(), Some("rust"));
        assert!(changes[0].patch.contains("+fn added() {}"));
        assert!(!changes[0].patch.contains("README"));
        assert_eq!(changes[1].path, "README.md");
        assert!(changes[1].patch.contains("+new line"));
    }

    #[test]
    fn empty_input_yields_no_changes() {
        assert!(parse_unified_diff("").is_empty());
    }

    #[test]
    fn language_hint_covers_common_extensions() {
        assert_eq!(language_hint("a/b/main.rs").as_deref(), Some("rust"));
        assert_eq!(language_hint("script.PY").as_deref(), Some("python"));
        assert_eq!(language_hint("component.tsx").as_deref(), Some("typescript"));
        assert_eq!(language_hint("Makefile"), None);
        assert_eq!(language_hint("weird.xyz"), None);
    }

    #[tokio::test]
    async fn static_change_set_errors_when_empty() {
        let provider = StaticChangeSet::new(Vec::new());
        let subject = SubjectRef::new("p", "1");
        assert!(matches!(
            provider.changes(&subject, None).await,
            Err(ChangeError::NoChanges)
        ));
    }

    #[tokio::test]
    async fn diff_spool_reads_by_subject() {
        let dir = std::env::temp_dir().join(format!("wd-spool-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("proj__7.diff"), TWO_FILE_DIFF).unwrap();

        let spool = DiffSpool::new(&dir);
        let changes = spool
            .changes(&SubjectRef::new("proj", "7"), None)
            .await
            .unwrap();
        assert_eq!(changes.len(), 2);

        let missing = spool.changes(&SubjectRef::new("proj", "8"), None).await;
        assert!(matches!(missing, Err(ChangeError::NoChanges)));
        std::fs::remove_dir_all(&dir).ok();
    }
}
