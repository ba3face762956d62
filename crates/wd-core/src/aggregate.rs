use crate::executor::FileOutcome;
use crate::types::enums::Severity;
use crate::types::report::{FailureRecord, ReviewReport};
use chrono::Utc;

/// Folds per-file outcomes into one report. Pure apart from the timestamp:
/// the same inputs always produce the same issues, score, and summary text.
///
/// Scoring policy: the rounded mean of successful per-file scores; a run
/// with zero successful results scores 100 (an all-skipped review is clean,
/// not bad).
pub fn aggregate(
    successes: &[FileOutcome],
    failures: &[FailureRecord],
    total_files: u32,
    duration_ms: u64,
    provider: &str,
    model: &str,
) -> ReviewReport {
    let score = if successes.is_empty() {
        100
    } else {
        let sum: u32 = successes
            .iter()
            .map(|outcome| u32::from(outcome.result.score))
            .sum();
        (f64::from(sum) / successes.len() as f64).round() as u8
    };

    let issues: Vec<_> = successes
        .iter()
        .flat_map(|outcome| outcome.result.issues.iter().cloned())
        .collect();

    let mut suggestions: Vec<String> = Vec::new();
    for outcome in successes {
        for suggestion in &outcome.result.suggestions {
            if !suggestions.iter().any(|existing| existing == suggestion) {
                suggestions.push(suggestion.clone());
            }
        }
    }

    let errors = count(&issues, Severity::Error);
    let warnings_count = count(&issues, Severity::Warning);
    let infos = count(&issues, Severity::Info);

    let mut summary = format!(
        "Reviewed {} of {} files: {} error(s), {} warning(s), {} informational issue(s).",
        successes.len(),
        total_files,
        errors,
        warnings_count,
        infos
    );

    let (failed_files, warnings) = if failures.is_empty() {
        (None, None)
    } else {
        let warning = format!("{} file(s) could not be analyzed", failures.len());
        summary.push(' ');
        summary.push_str("Warning: ");
        summary.push_str(&warning);
        summary.push('.');
        (Some(failures.to_vec()), Some(vec![warning]))
    };

    ReviewReport {
        score,
        issues,
        suggestions,
        summary,
        reviewed_files: successes.len() as u32,
        total_files,
        failed_files,
        warnings,
        provider: provider.to_string(),
        model: model.to_string(),
        timestamp: Utc::now(),
        duration_ms,
    }
}

fn count(issues: &[crate::types::report::Issue], severity: Severity) -> usize {
    issues.iter().filter(|issue| issue.severity == severity).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::report::{AnalysisResult, Issue};

    fn outcome(file: &str, score: u8, issues: Vec<Issue>, suggestions: Vec<&str>) -> FileOutcome {
        FileOutcome {
            file: file.to_string(),
            result: AnalysisResult {
                score,
                issues,
                suggestions: suggestions.into_iter().map(ToString::to_string).collect(),
                summary: format!("reviewed {file}"),
            },
        }
    }

    fn one_issue(file: &str, line: u32, severity: Severity) -> Issue {
        Issue {
            severity,
            file: file.to_string(),
            line,
            message: "finding".to_string(),
            suggestion: None,
            code_before: None,
            code_after: None,
        }
    }

    #[test]
    fn partial_failure_report() {
        let successes = vec![
            outcome("f1.rs", 80, vec![one_issue("f1.rs", 3, Severity::Warning)], vec![]),
            outcome("f2.rs", 90, vec![one_issue("f2.rs", 7, Severity::Error)], vec![]),
        ];
        let failures = vec![FailureRecord {
            file: "f3.rs".to_string(),
            error: "timeout".to_string(),
        }];

        let report = aggregate(&successes, &failures, 3, 1200, "heuristic", "builtin");

        assert_eq!(report.score, 85);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.reviewed_files, 2);
        assert_eq!(report.total_files, 3);
        let failed = report.failed_files.as_ref().unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].file, "f3.rs");
        assert_eq!(failed[0].error, "timeout");
        let warnings = report.warnings.as_ref().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains('1'));
        assert!(report.summary.contains("1 error(s)"));
        assert!(report.summary.contains("1 warning(s)"));
    }

    #[test]
    fn zero_successes_scores_clean() {
        let report = aggregate(&[], &[], 0, 5, "heuristic", "builtin");
        assert_eq!(report.score, 100);
        assert!(report.issues.is_empty());
        assert!(report.failed_files.is_none());
        assert!(report.warnings.is_none());
        assert!(report.summary.contains("Reviewed 0 of 0 files"));
    }

    #[test]
    fn issues_keep_file_then_internal_order() {
        let successes = vec![
            outcome(
                "first.rs",
                100,
                vec![
                    one_issue("first.rs", 1, Severity::Info),
                    one_issue("first.rs", 9, Severity::Info),
                ],
                vec![],
            ),
            outcome("second.rs", 100, vec![one_issue("second.rs", 4, Severity::Info)], vec![]),
        ];
        let report = aggregate(&successes, &[], 2, 10, "heuristic", "builtin");
        let positions: Vec<(&str, u32)> = report
            .issues
            .iter()
            .map(|issue| (issue.file.as_str(), issue.line))
            .collect();
        assert_eq!(
            positions,
            vec![("first.rs", 1), ("first.rs", 9), ("second.rs", 4)]
        );
    }

    #[test]
    fn suggestions_are_deduplicated() {
        let successes = vec![
            outcome("a.rs", 100, vec![], vec!["use `?`", "add tests"]),
            outcome("b.rs", 100, vec![], vec!["add tests", "split module"]),
        ];
        let report = aggregate(&successes, &[], 2, 10, "heuristic", "builtin");
        assert_eq!(report.suggestions, vec!["use `?`", "add tests", "split module"]);
    }

    #[test]
    fn score_rounds_to_nearest() {
        let successes = vec![
            outcome("a.rs", 70, vec![], vec![]),
            outcome("b.rs", 75, vec![], vec![]),
        ];
        let report = aggregate(&successes, &[], 2, 10, "heuristic", "builtin");
        assert_eq!(report.score, 73); // 72.5 rounds away from zero
    }

    #[test]
    fn summary_is_deterministic() {
        let successes = vec![outcome("a.rs", 90, vec![one_issue("a.rs", 2, Severity::Error)], vec![])];
        let failures = vec![FailureRecord {
            file: "b.rs".to_string(),
            error: "x".to_string(),
        }];
        let first = aggregate(&successes, &failures, 2, 10, "p", "m");
        let second = aggregate(&successes, &failures, 2, 10, "p", "m");
        assert_eq!(first.summary, second.summary);
        assert_eq!(
            first.summary,
            "Reviewed 1 of 2 files: 1 error(s), 0 warning(s), 0 informational issue(s). \
             Warning: 1 file(s) could not be analyzed."
        );
    }
}
