mod ai;
mod applier;
mod config;
mod error;
mod github;
mod linter;
mod llm;
mod orchestrator;
mod selector;
mod types;

use config::AppConfig;
use github::GithubClient;
use linter::RuboCopRunner;
use llm::openai::OpenAiCompatClient;
use orchestrator::Pipeline;
use tracing_subscriber::EnvFilter;
use types::{FileOutcome, RunReport};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(report) => {
            write_step_summary(&report);
            // Workflow command for the Actions log; per-file failures do not
            // change the exit code.
            println!(
                "::notice::rubofix published {} fix pull request(s)",
                report.fix_count
            );
        }
        Err(e) => {
            tracing::error!("run failed: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run() -> anyhow::Result<RunReport> {
    use anyhow::Context;

    let config = AppConfig::from_env().context("configuration")?;

    let github = GithubClient::new(&config.github).context("GitHub client setup")?;
    let linter = RuboCopRunner::new(&config.lint);
    let model = OpenAiCompatClient::new(&config.model).context("model client setup")?;

    let pipeline = Pipeline::new(&github, &linter, &model, &config);
    Ok(pipeline.run().await?)
}

fn write_step_summary(report: &RunReport) {
    let Ok(path) = std::env::var("GITHUB_STEP_SUMMARY") else {
        return;
    };
    if let Err(e) = append_to_file(&path, &render_step_summary(report)) {
        tracing::warn!("failed to write step summary: {}", e);
    }
}

fn render_step_summary(report: &RunReport) -> String {
    let mut summary = String::from("## rubofix\n\n| File | Outcome |\n| --- | --- |\n");
    for file in &report.files {
        let outcome = match &file.outcome {
            FileOutcome::Clean => "clean".to_string(),
            FileOutcome::Unchanged => "unchanged".to_string(),
            FileOutcome::Fixed { pr_url } => format!("fixed ({pr_url})"),
            FileOutcome::Failed { error } => format!("failed: {error}"),
        };
        summary.push_str(&format!("| `{}` | {} |\n", file.path, outcome));
    }
    summary.push_str(&format!(
        "\n{} fix pull request(s) published.\n",
        report.fix_count
    ));
    summary
}

fn append_to_file(path: &str, content: &str) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(content.as_bytes())
}
