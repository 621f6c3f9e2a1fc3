use serde::Deserialize;

/// One file touched by the pull request under review, as reported by the
/// host's changed-file listing. Immutable for the whole run.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    #[serde(rename = "filename")]
    pub path: String,
    pub status: FileStatus,
    #[serde(default)]
    pub patch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    // GitHub also reports copied/changed/unchanged; none of them exclude a
    // file from linting, so they all fold into one bucket.
    #[serde(other)]
    Other,
}

/// A single rule violation reported by the linter.
///
/// `message` and `rule_id` are always non-empty when an offense exists;
/// `line` may be absent and renders as "unknown".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offense {
    pub line: Option<u64>,
    pub message: String,
    pub rule_id: String,
}

/// Outcome of the AI repair step for one file. `summary` is `None` only when
/// the file had no offenses and the fixer short-circuited.
#[derive(Debug, Clone)]
pub struct FixResult {
    pub fixed_content: String,
    pub summary: Option<String>,
}

/// Head of the original pull request: the exact code the contributor pushed.
#[derive(Debug, Clone)]
pub struct PullRequestInfo {
    pub head_sha: String,
    pub head_ref: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPullRequest {
    pub number: u64,
    pub html_url: String,
}

/// A per-file prose summary, accumulated in PR-listing order.
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub path: String,
    pub summary: String,
}

/// Terminal state of one file's trip through the pipeline.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// No offenses (including binary/empty content where none are possible).
    Clean,
    /// Offenses existed but the model returned the original content.
    Unchanged,
    /// A fix branch and PR were published.
    Fixed { pr_url: String },
    /// A step failed; the error stayed inside this file's boundary.
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: String,
    pub outcome: FileOutcome,
}

/// What a full run produced, in host listing order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub fix_count: usize,
    pub files: Vec<FileReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_file_deserialization() {
        let json = r#"{
            "filename": "app/models/user.rb",
            "status": "modified",
            "patch": "@@ -1,3 +1,3 @@\n-x = 1\n+x  = 1"
        }"#;
        let file: ChangedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.path, "app/models/user.rb");
        assert_eq!(file.status, FileStatus::Modified);
        assert!(file.patch.is_some());
    }

    #[test]
    fn test_changed_file_without_patch() {
        // Binary files and very large diffs come back with no patch field.
        let json = r#"{"filename": "logo.png", "status": "added"}"#;
        let file: ChangedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.status, FileStatus::Added);
        assert!(file.patch.is_none());
    }

    #[test]
    fn test_unknown_status_folds_to_other() {
        let json = r#"{"filename": "lib/a.rb", "status": "copied"}"#;
        let file: ChangedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.status, FileStatus::Other);
    }

    #[test]
    fn test_created_pull_request_deserialization() {
        let json = r#"{
            "number": 42,
            "html_url": "https://github.com/owner/repo/pull/42",
            "state": "open"
        }"#;
        let pr: CreatedPullRequest = serde_json::from_str(json).unwrap();
        assert_eq!(pr.number, 42);
        assert!(pr.html_url.ends_with("/pull/42"));
    }
}
