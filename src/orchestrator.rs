//! Drives the lint-fix pipeline across a pull request, one file at a time.
//!
//! Per-file states: Selected -> ContentFetched -> Linted -> {Clean |
//! OffensesFound} -> {Fixed | Unchanged | Failed}. A failure anywhere inside
//! a file's processing is logged and never reaches sibling files; only the
//! PR metadata and changed-file lookups are run-fatal.

use crate::ai::summary::SummaryGenerator;
use crate::ai::AiFixer;
use crate::applier;
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::github::GithubApi;
use crate::linter::{extract_offenses, has_offenses, LintRunner};
use crate::llm::ModelClient;
use crate::selector::eligible_files;
use crate::types::{ChangedFile, FileOutcome, FileReport, FileSummary, RunReport};
use chrono::Utc;

/// Mutable state for one run. Owned exclusively by the pipeline and touched
/// only between file iterations.
pub struct ProcessingContext {
    pub repo: String,
    pub pr_number: u64,
    pub head_sha: String,
    pub head_ref: String,
    /// Run timestamp used in branch names, second granularity.
    pub timestamp: String,
    /// Per-file summaries in processing order. Each fix PR body renders the
    /// entries accumulated up to and including its own file.
    pub accumulated_summaries: Vec<FileSummary>,
}

pub struct Pipeline<'a> {
    github: &'a dyn GithubApi,
    linter: &'a dyn LintRunner,
    model: &'a dyn ModelClient,
    fixer: AiFixer,
    summaries: SummaryGenerator,
    config: &'a AppConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        github: &'a dyn GithubApi,
        linter: &'a dyn LintRunner,
        model: &'a dyn ModelClient,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            github,
            linter,
            model,
            fixer: AiFixer::new(&config.model),
            summaries: SummaryGenerator::new(&config.model),
            config,
        }
    }

    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let pr_number = self.config.github.pr_number;

        let pull = self.github.pull_request(pr_number).await?;
        let files = self.github.changed_files(pr_number).await?;
        let selected = eligible_files(&files, &self.config.lint.extensions);

        tracing::info!(
            "PR #{}: {} changed file(s), {} eligible for linting",
            pr_number,
            files.len(),
            selected.len()
        );

        let mut ctx = ProcessingContext {
            repo: self.config.github.repository.clone(),
            pr_number,
            head_sha: pull.head_sha,
            head_ref: pull.head_ref,
            timestamp: Utc::now().format("%Y%m%d%H%M%S").to_string(),
            accumulated_summaries: Vec::new(),
        };
        tracing::info!("run context: {} at {}", ctx.repo, ctx.head_sha);

        let mut report = RunReport::default();
        for file in selected {
            let outcome = match self.process_file(&mut ctx, file).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("{}: {}", file.path, e);
                    FileOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            if matches!(outcome, FileOutcome::Fixed { .. }) {
                report.fix_count += 1;
            }
            report.files.push(FileReport {
                path: file.path.clone(),
                outcome,
            });
        }

        tracing::info!("run complete: {} fix(es) published", report.fix_count);
        Ok(report)
    }

    async fn process_file(
        &self,
        ctx: &mut ProcessingContext,
        file: &ChangedFile,
    ) -> Result<FileOutcome, PipelineError> {
        let content = self.github.file_content(&file.path, &ctx.head_sha).await?;
        if content.is_empty() {
            tracing::info!("{}: empty or binary content, no offenses possible", file.path);
            return Ok(FileOutcome::Clean);
        }

        let lint_report = self.linter.lint(&content)?;
        if !has_offenses(&lint_report) {
            tracing::info!("{}: clean", file.path);
            return Ok(FileOutcome::Clean);
        }
        let offenses = extract_offenses(&lint_report);
        tracing::info!("{}: {} offense(s)", file.path, offenses.len());

        let fix = self
            .fixer
            .fix(self.model, &content, &offenses, file.patch.as_deref())
            .await?;

        // A no-op AI response must not produce an empty branch/PR.
        if fix.fixed_content.trim() == content.trim() {
            tracing::info!("{}: model returned unchanged content, skipping", file.path);
            return Ok(FileOutcome::Unchanged);
        }

        let summary = self
            .summaries
            .summarize(self.model, &content, &fix.fixed_content, &offenses)
            .await;
        ctx.accumulated_summaries.push(FileSummary {
            path: file.path.clone(),
            summary,
        });

        let pr = applier::apply(self.github, ctx, &file.path, &fix.fixed_content).await?;
        tracing::info!("{}: opened fix PR #{} ({})", file.path, pr.number, pr.html_url);
        Ok(FileOutcome::Fixed {
            pr_url: pr.html_url,
        })
    }
}
