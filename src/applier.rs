//! Publishing one accepted fix: branch, commit, pull request.
//!
//! The fix branch is based on the original PR's head (not the repository's
//! base branch), and the fix PR targets that same head ref, so merging it
//! lands directly on the contributor's branch.

use crate::error::GitHubError;
use crate::github::GithubApi;
use crate::orchestrator::ProcessingContext;
use crate::types::{CreatedPullRequest, FileSummary};

pub const BRANCH_PREFIX: &str = "ai-lint-fix";
pub const COMMIT_MESSAGE: &str = "Apply AI-generated lint fixes";

/// `ai-lint-fix/pr-12-20260806120000-app-models-user-rb`.
///
/// The path slug keeps per-file branches within one run distinct; runs of the
/// same PR started within the same second still collide, which is accepted.
pub fn branch_name(pr_number: u64, timestamp: &str, path: &str) -> String {
    format!(
        "{BRANCH_PREFIX}/pr-{pr_number}-{timestamp}-{}",
        path_slug(path)
    )
}

pub fn pr_title(pr_number: u64) -> String {
    format!("AI lint fixes for #{pr_number}")
}

/// The fix PR body lists every summary accumulated so far in the run, in
/// file-processing order.
pub fn render_pr_body(pr_number: u64, summaries: &[FileSummary]) -> String {
    let mut body = format!(
        "Automated lint fixes for #{pr_number}.\n\n\
         This pull request was generated by rubofix; review it before merging.\n"
    );
    for entry in summaries {
        body.push_str(&format!("\n### `{}`\n\n{}\n", entry.path, entry.summary));
    }
    body
}

fn path_slug(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Run the three-step publish transaction for one file. Any step failing is
/// fatal for this file only; the orchestrator keeps going with the rest.
pub async fn apply(
    github: &dyn GithubApi,
    ctx: &ProcessingContext,
    path: &str,
    fixed_content: &str,
) -> Result<CreatedPullRequest, GitHubError> {
    let branch = branch_name(ctx.pr_number, &ctx.timestamp, path);

    github.create_branch(&branch, &ctx.head_sha).await?;

    let blob_sha = github.blob_sha(path, &branch).await?;
    github
        .update_file(path, &branch, COMMIT_MESSAGE, fixed_content, &blob_sha)
        .await?;

    let title = pr_title(ctx.pr_number);
    let body = render_pr_body(ctx.pr_number, &ctx.accumulated_summaries);
    github
        .create_pull_request(&title, &body, &branch, &ctx.head_ref)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_name_format() {
        let name = branch_name(12, "20260806120000", "app/models/user.rb");
        assert_eq!(name, "ai-lint-fix/pr-12-20260806120000-app-models-user-rb");
    }

    #[test]
    fn test_branch_names_distinct_per_file_within_a_run() {
        let a = branch_name(12, "20260806120000", "a.rb");
        let b = branch_name(12, "20260806120000", "b.rb");
        assert_ne!(a, b);
    }

    #[test]
    fn test_pr_title_references_original_pr() {
        assert_eq!(pr_title(42), "AI lint fixes for #42");
    }

    #[test]
    fn test_pr_body_aggregates_summaries_in_order() {
        let summaries = vec![
            FileSummary {
                path: "a.rb".to_string(),
                summary: "Shortened a long line.".to_string(),
            },
            FileSummary {
                path: "b.rb".to_string(),
                summary: "Switched to single quotes.".to_string(),
            },
        ];
        let body = render_pr_body(7, &summaries);
        assert!(body.contains("#7"));
        let a_pos = body.find("### `a.rb`").unwrap();
        let b_pos = body.find("### `b.rb`").unwrap();
        assert!(a_pos < b_pos);
        assert!(body.contains("Shortened a long line."));
    }

    #[test]
    fn test_pr_body_without_summaries_still_renders() {
        let body = render_pr_body(7, &[]);
        assert!(body.contains("Automated lint fixes for #7"));
    }
}
