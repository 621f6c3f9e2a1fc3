use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required config: {0}")]
    MissingRequired(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum LintingError {
    #[error("failed to run linter: {0}")]
    Execution(#[from] std::io::Error),

    #[error("malformed linter output: {0}")]
    MalformedOutput(String),
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("model returned no content")]
    EmptyResponse,

    #[error("rate limit exceeded: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl AiError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network(_))
    }

    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Everything that can stop processing of a single file, and the only error
/// kind that crosses the orchestrator's per-file boundary. Configuration
/// errors abort in `main` before a pipeline exists, so they are not here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Lint(#[from] LintingError),

    #[error(transparent)]
    Ai(#[from] AiError),
}
