use crate::analysis::{AnalysisCapability, ProviderConfig};
use crate::error::AnalysisError;
use crate::types::change::FileChange;
use crate::types::enums::Severity;
use crate::types::report::{AnalysisResult, Issue};
use async_trait::async_trait;

const MAX_LINE_LENGTH: usize = 120;

const SECRET_MARKERS: &[&str] = &["password", "secret", "api_key", "apikey", "access_token"];
const DEBUG_MARKERS: &[&str] = &["dbg!(", "console.log(", "println!(\"DEBUG", "pdb.set_trace("];
const TODO_MARKERS: &[&str] = &["TODO", "FIXME", "XXX"];

/// Deterministic pattern checks over the added lines of a patch. Not a
/// substitute for an LLM backend; exists so the pipeline is exercisable
/// end-to-end without network access, and as the degradation target when a
/// change carries no diff content.
#[derive(Default)]
pub struct HeuristicAnalysis;

impl HeuristicAnalysis {
    pub fn new() -> Self {
        Self
    }

    fn check_line(path: &str, line_no: u32, content: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let lower = content.to_ascii_lowercase();

        if content.starts_with("<<<<<<<") || content.starts_with(">>>>>>>") {
            issues.push(issue(
                Severity::Error,
                path,
                line_no,
                "unresolved merge conflict marker",
                Some("resolve the conflict before merging"),
            ));
        }
        if SECRET_MARKERS
            .iter()
            .any(|marker| lower.contains(&format!("{marker} = \"")) || lower.contains(&format!("{marker}=\"")))
        {
            issues.push(issue(
                Severity::Error,
                path,
                line_no,
                "possible hardcoded credential",
                Some("load secrets from the environment or a secret store"),
            ));
        }
        if DEBUG_MARKERS.iter().any(|marker| content.contains(marker)) {
            issues.push(issue(
                Severity::Warning,
                path,
                line_no,
                "debug output left in change",
                Some("remove debugging statements"),
            ));
        }
        if TODO_MARKERS.iter().any(|marker| content.contains(marker)) {
            issues.push(issue(
                Severity::Info,
                path,
                line_no,
                "unresolved TODO marker",
                None,
            ));
        }
        if content.len() > MAX_LINE_LENGTH {
            issues.push(issue(
                Severity::Info,
                path,
                line_no,
                "line exceeds 120 characters",
                None,
            ));
        }
        issues
    }
}

#[async_trait]
impl AnalysisCapability for HeuristicAnalysis {
    async fn analyze(
        &self,
        change: &FileChange,
        _config: &ProviderConfig,
        _rules: &[String],
    ) -> Result<AnalysisResult, AnalysisError> {
        if change.patch.trim().is_empty() {
            return Ok(AnalysisResult {
                score: 100,
                issues: Vec::new(),
                suggestions: Vec::new(),
                summary: format!("No diff content available for {}; skipped analysis", change.path),
            });
        }

        let mut issues = Vec::new();
        let mut line_no: u32 = 0;
        let mut in_hunk = false;

        for line in change.patch.lines() {
            if line.starts_with("@@") {
                line_no = parse_hunk_start(line).unwrap_or(1);
                in_hunk = true;
                continue;
            }
            if !in_hunk {
                continue;
            }
            if let Some(added) = line.strip_prefix('+') {
                if !line.starts_with("+++") {
                    issues.extend(Self::check_line(&change.path, line_no, added));
                    line_no = line_no.saturating_add(1);
                }
            } else if !line.starts_with('-') {
                line_no = line_no.saturating_add(1);
            }
        }

        let errors = count(&issues, Severity::Error);
        let warnings = count(&issues, Severity::Warning);
        let infos = count(&issues, Severity::Info);
        let penalty = errors * 20 + warnings * 10 + infos * 2;
        let score = 100u32.saturating_sub(penalty) as u8;

        let mut suggestions: Vec<String> = Vec::new();
        for item in &issues {
            if let Some(suggestion) = &item.suggestion {
                if !suggestions.iter().any(|existing| existing == suggestion) {
                    suggestions.push(suggestion.clone());
                }
            }
        }

        Ok(AnalysisResult {
            score,
            summary: format!(
                "{}: {} finding(s) across added lines",
                change.path,
                issues.len()
            ),
            issues,
            suggestions,
        })
    }
}

fn issue(
    severity: Severity,
    path: &str,
    line: u32,
    message: &str,
    suggestion: Option<&str>,
) -> Issue {
    Issue {
        severity,
        file: path.to_string(),
        line,
        message: message.to_string(),
        suggestion: suggestion.map(ToString::to_string),
        code_before: None,
        code_after: None,
    }
}

fn count(issues: &[Issue], severity: Severity) -> u32 {
    issues.iter().filter(|i| i.severity == severity).count() as u32
}

/// Extracts the new-file start line from `@@ -a,b +c,d @@`.
fn parse_hunk_start(header: &str) -> Option<u32> {
    let plus = header.split_whitespace().find(|part| part.starts_with('+'))?;
    let start = plus[1..].split(',').next()?;
    start.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig::new("heuristic", "builtin")
    }

    fn change(path: &str, patch: &str) -> FileChange {
        FileChange {
            path: path.to_string(),
            patch: patch.to_string(),
            language: None,
        }
    }

    #[tokio::test]
    async fn empty_patch_degrades_to_clean_result() {
        let capability = HeuristicAnalysis::new();
        let result = capability
            .analyze(&change("src/lib.rs", "   "), &config(), &[])
            .await
            .unwrap();
        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
        assert!(result.suggestions.is_empty());
        assert!(result.summary.contains("src/lib.rs"));
    }

    #[tokio::test]
    async fn flags_debug_output_on_new_file_line() {
        let patch = "\
--- a/src/main.rs
+++ b/src/main.rs
@@ -10,3 +10,5 @@
 fn run() {
+    dbg!(state);
     commit();
+    finish();
";
        let capability = HeuristicAnalysis::new();
        let result = capability
            .analyze(&change("src/main.rs", patch), &config(), &[])
            .await
            .unwrap();
        assert_eq!(result.issues.len(), 1);
        let found = &result.issues[0];
        assert_eq!(found.severity, Severity::Warning);
        assert_eq!(found.line, 11);
        assert_eq!(result.score, 90);
        assert_eq!(result.suggestions, vec!["remove debugging statements"]);
    }

    #[tokio::test]
    async fn flags_hardcoded_credentials_as_errors() {
        let patch = "@@ -1 +1,2 @@\n context\n+let api_key = \"sk-live-1234\";\n";
        let capability = HeuristicAnalysis::new();
        let result = capability
            .analyze(&change("src/auth.rs", patch), &config(), &[])
            .await
            .unwrap();
        assert!(result
            .issues
            .iter()
            .any(|issue| issue.severity == Severity::Error));
        assert!(result.score <= 80);
    }

    #[tokio::test]
    async fn removed_lines_do_not_advance_line_numbers() {
        let patch = "@@ -5,4 +5,3 @@\n keep\n-TODO old line\n keep\n+// TODO: revisit\n";
        let capability = HeuristicAnalysis::new();
        let result = capability
            .analyze(&change("src/x.rs", patch), &config(), &[])
            .await
            .unwrap();
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].line, 7);
    }
}
