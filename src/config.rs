use crate::error::ConfigError;
use secrecy::SecretString;

/// Immutable process configuration, built once from the environment at
/// startup and passed by reference into every component that needs it.
#[derive(Clone)]
pub struct AppConfig {
    pub github: GithubConfig,
    pub model: ModelConfig,
    pub lint: LintConfig,
}

#[derive(Clone)]
pub struct GithubConfig {
    pub token: SecretString,
    /// `owner/repo` slug of the repository the PR lives in.
    pub repository: String,
    pub pr_number: u64,
}

#[derive(Clone)]
pub struct ModelConfig {
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<SecretString>,
    pub temperature: f32,
    /// Output ceiling for the repair request, sized for a full file rewrite.
    pub fix_max_tokens: u32,
    /// Smaller ceiling for the prose summary request.
    pub summary_max_tokens: u32,
}

#[derive(Clone)]
pub struct LintConfig {
    pub command: String,
    pub extensions: Vec<String>,
}

// Local Ollama-compatible endpoint; running without a paid key is the default.
const DEFAULT_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_ENDPOINT: &str = "http://localhost:11434/v1/chat/completions";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = require_env("GITHUB_TOKEN")?;

        let repository = require_env("GITHUB_REPOSITORY")?;
        validate_repository(&repository)?;

        let pr_number = require_env("PR_NUMBER")?
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "PR_NUMBER".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        Ok(Self {
            github: GithubConfig {
                token: SecretString::from(token),
                repository,
                pr_number,
            },
            model: ModelConfig {
                model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
                endpoint: std::env::var("LLM_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
                api_key: std::env::var("LLM_API_KEY")
                    .ok()
                    .filter(|k| !k.is_empty())
                    .map(SecretString::from),
                ..ModelConfig::default()
            },
            lint: LintConfig {
                command: std::env::var("RUBOCOP_COMMAND")
                    .unwrap_or_else(|_| "rubocop".to_string()),
                ..LintConfig::default()
            },
        })
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingRequired(name.to_string())),
    }
}

fn validate_repository(repository: &str) -> Result<(), ConfigError> {
    let mut parts = repository.splitn(2, '/');
    let owner = parts.next().unwrap_or_default();
    let repo = parts.next().unwrap_or_default();
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(ConfigError::InvalidValue(
            "GITHUB_REPOSITORY".to_string(),
            "expected owner/repo".to_string(),
        ));
    }
    Ok(())
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            temperature: 0.1,
            fix_max_tokens: 4096,
            summary_max_tokens: 512,
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            command: "rubocop".to_string(),
            extensions: vec![
                ".rb".to_string(),
                ".rake".to_string(),
                ".gemspec".to_string(),
            ],
        }
    }
}
