//! GitHub REST client for the six host operations the pipeline needs.
//!
//! Everything the orchestrator touches goes through the [`GithubApi`] trait so
//! tests can swap in a recording fake.

use crate::config::GithubConfig;
use crate::error::GitHubError;
use crate::types::{ChangedFile, CreatedPullRequest, PullRequestInfo};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GITHUB_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = "rubofix";
const API_TIMEOUT_SECS: u64 = 60;
const FILES_PER_PAGE: usize = 100;

/// Maximum length for error body content in error messages
const MAX_ERROR_BODY_LEN: usize = 200;

#[async_trait]
pub trait GithubApi: Send + Sync {
    /// Head SHA and head ref of the PR. Shared by the whole run; failure
    /// here is run-fatal.
    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo, GitHubError>;

    async fn changed_files(&self, number: u64) -> Result<Vec<ChangedFile>, GitHubError>;

    /// File content at a ref, decoded from the transport encoding. Returns
    /// `""` for binary blobs; callers treat that as "no offenses possible".
    async fn file_content(&self, path: &str, git_ref: &str) -> Result<String, GitHubError>;

    async fn create_branch(&self, name: &str, sha: &str) -> Result<(), GitHubError>;

    /// Current blob SHA of a path on a branch, required by the update API
    /// for optimistic concurrency.
    async fn blob_sha(&self, path: &str, branch: &str) -> Result<String, GitHubError>;

    async fn update_file(
        &self,
        path: &str,
        branch: &str,
        message: &str,
        content: &str,
        blob_sha: &str,
    ) -> Result<(), GitHubError>;

    async fn create_pull_request(
        &self,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<CreatedPullRequest, GitHubError>;
}

pub struct GithubClient {
    client: Client,
    token: SecretString,
    repository: String,
    base_url: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            token: config.token.clone(),
            repository: config.repository.clone(),
            base_url: GITHUB_API_URL.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/vnd.github+json")
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn check_status(
        context: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_api_message(&body);
        Err(match status.as_u16() {
            401 | 403 => GitHubError::AuthenticationFailed(format!("{context}: {message}")),
            404 => GitHubError::NotFound(context.to_string()),
            code => GitHubError::Api {
                status: code,
                message: format!("{context}: {message}"),
            },
        })
    }

    async fn contents(&self, path: &str, git_ref: &str) -> Result<ContentResponse, GitHubError> {
        let url = format!("/repos/{}/contents/{}", self.repository, path);
        let response = self
            .request(Method::GET, &url)
            .query(&[("ref", git_ref)])
            .send()
            .await?;
        let response = Self::check_status(&format!("contents of {path}"), response).await?;
        response
            .json()
            .await
            .map_err(|e| GitHubError::InvalidResponse(format!("contents of {path}: {e}")))
    }
}

#[derive(Deserialize)]
struct PullResponse {
    head: HeadRef,
}

#[derive(Deserialize)]
struct HeadRef {
    sha: String,
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Deserialize)]
struct ContentResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Serialize)]
struct CreateRefRequest {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: String,
}

#[derive(Serialize)]
struct UpdateFileRequest {
    message: String,
    content: String,
    branch: String,
    sha: String,
}

#[derive(Serialize)]
struct CreatePrRequest {
    title: String,
    body: String,
    head: String,
    base: String,
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo, GitHubError> {
        let url = format!("/repos/{}/pulls/{}", self.repository, number);
        let response = self.request(Method::GET, &url).send().await?;
        let response = Self::check_status(&format!("pull request #{number}"), response).await?;
        let pull: PullResponse = response
            .json()
            .await
            .map_err(|e| GitHubError::InvalidResponse(format!("pull request #{number}: {e}")))?;
        Ok(PullRequestInfo {
            head_sha: pull.head.sha,
            head_ref: pull.head.ref_name,
        })
    }

    async fn changed_files(&self, number: u64) -> Result<Vec<ChangedFile>, GitHubError> {
        let url = format!("/repos/{}/pulls/{}/files", self.repository, number);
        let mut files = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .request(Method::GET, &url)
                .query(&[
                    ("per_page", FILES_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;
            let response =
                Self::check_status(&format!("files of pull request #{number}"), response).await?;
            let batch: Vec<ChangedFile> = response.json().await.map_err(|e| {
                GitHubError::InvalidResponse(format!("files of pull request #{number}: {e}"))
            })?;

            let batch_len = batch.len();
            files.extend(batch);
            if batch_len < FILES_PER_PAGE {
                return Ok(files);
            }
            page += 1;
        }
    }

    async fn file_content(&self, path: &str, git_ref: &str) -> Result<String, GitHubError> {
        let contents = self.contents(path, git_ref).await?;
        Ok(decode_blob(path, &contents.content, &contents.encoding))
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<(), GitHubError> {
        let url = format!("/repos/{}/git/refs", self.repository);
        let request = CreateRefRequest {
            ref_name: format!("refs/heads/{name}"),
            sha: sha.to_string(),
        };
        let response = self.request(Method::POST, &url).json(&request).send().await?;
        Self::check_status(&format!("create branch {name}"), response).await?;
        Ok(())
    }

    async fn blob_sha(&self, path: &str, branch: &str) -> Result<String, GitHubError> {
        Ok(self.contents(path, branch).await?.sha)
    }

    async fn update_file(
        &self,
        path: &str,
        branch: &str,
        message: &str,
        content: &str,
        blob_sha: &str,
    ) -> Result<(), GitHubError> {
        let url = format!("/repos/{}/contents/{}", self.repository, path);
        let request = UpdateFileRequest {
            message: message.to_string(),
            content: base64::engine::general_purpose::STANDARD.encode(content.as_bytes()),
            branch: branch.to_string(),
            sha: blob_sha.to_string(),
        };
        let response = self.request(Method::PUT, &url).json(&request).send().await?;
        Self::check_status(&format!("commit to {path}"), response).await?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<CreatedPullRequest, GitHubError> {
        let url = format!("/repos/{}/pulls", self.repository);
        let request = CreatePrRequest {
            title: title.to_string(),
            body: body.to_string(),
            head: head.to_string(),
            base: base.to_string(),
        };
        let response = self.request(Method::POST, &url).json(&request).send().await?;
        let response = Self::check_status("create pull request", response).await?;
        response
            .json()
            .await
            .map_err(|e| GitHubError::InvalidResponse(format!("create pull request: {e}")))
    }
}

/// Decode a contents-API blob. Binary payloads (anything that does not decode
/// to UTF-8 text) come back as `""` with a warning; the pipeline treats that
/// as "skip, no offenses possible".
fn decode_blob(path: &str, content: &str, encoding: &str) -> String {
    if encoding != "base64" {
        tracing::warn!("{}: unexpected blob encoding {:?}, skipping", path, encoding);
        return String::new();
    }

    // GitHub wraps base64 at 60 columns.
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = match base64::engine::general_purpose::STANDARD.decode(compact) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("{}: undecodable blob ({}), skipping", path, e);
            return String::new();
        }
    };

    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => {
            tracing::warn!("{}: binary content, skipping", path);
            String::new()
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    message: String,
}

/// Pull the `message` field out of a GitHub error body, falling back to the
/// sanitized raw body.
fn extract_api_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(body) {
        return parsed.message;
    }
    sanitize_error_body(body)
}

/// Truncate an opaque error body and redact it entirely if it smells like it
/// carries credentials.
fn sanitize_error_body(body: &str) -> String {
    const SECRET_PATTERNS: &[&str] = &["token", "secret", "bearer", "ghp_", "gho_", "github_pat_"];

    let truncated = if body.len() > MAX_ERROR_BODY_LEN {
        let cut: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{cut}... (truncated)")
    } else {
        body.to_string()
    };

    let lower = truncated.to_lowercase();
    for pattern in SECRET_PATTERNS {
        if lower.contains(pattern) {
            return "(error details redacted)".to_string();
        }
    }

    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_blob_roundtrip() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("def x; end\n");
        assert_eq!(decode_blob("a.rb", &encoded, "base64"), "def x; end\n");
    }

    #[test]
    fn test_decode_blob_with_github_line_wrapping() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("puts 'hello world'\n");
        let wrapped = format!("{}\n{}", &encoded[..10], &encoded[10..]);
        assert_eq!(decode_blob("a.rb", &wrapped, "base64"), "puts 'hello world'\n");
    }

    #[test]
    fn test_decode_blob_binary_yields_empty() {
        // 0xFF 0xFE is not valid UTF-8.
        let encoded = base64::engine::general_purpose::STANDARD.encode([0xFFu8, 0xFE, 0x00, 0x01]);
        assert_eq!(decode_blob("logo.png", &encoded, "base64"), "");
    }

    #[test]
    fn test_decode_blob_unknown_encoding_yields_empty() {
        assert_eq!(decode_blob("big.rb", "", "none"), "");
    }

    #[test]
    fn test_decode_blob_garbage_base64_yields_empty() {
        assert_eq!(decode_blob("a.rb", "!!!not-base64!!!", "base64"), "");
    }

    #[test]
    fn test_pull_response_deserialization() {
        let json = r#"{
            "number": 12,
            "head": {"sha": "abc123", "ref": "feature/login", "repo": {}},
            "base": {"sha": "def456", "ref": "main"}
        }"#;
        let pull: PullResponse = serde_json::from_str(json).unwrap();
        assert_eq!(pull.head.sha, "abc123");
        assert_eq!(pull.head.ref_name, "feature/login");
    }

    #[test]
    fn test_content_response_deserialization() {
        let json = r#"{
            "sha": "blob-sha",
            "content": "cHV0cyAxCg==\n",
            "encoding": "base64",
            "size": 7
        }"#;
        let contents: ContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(contents.sha, "blob-sha");
        assert_eq!(contents.encoding, "base64");
    }

    #[test]
    fn test_create_ref_request_serialization() {
        let request = CreateRefRequest {
            ref_name: "refs/heads/ai-lint-fix/pr-12-20260806120000-a-rb".to_string(),
            sha: "abc123".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"ref\":\"refs/heads/ai-lint-fix/pr-12-20260806120000-a-rb\""));
        assert!(json.contains("\"sha\":\"abc123\""));
    }

    #[test]
    fn test_update_file_request_encodes_content() {
        let request = UpdateFileRequest {
            message: "Apply AI-generated lint fixes".to_string(),
            content: base64::engine::general_purpose::STANDARD.encode("puts 1\n"),
            branch: "fix-branch".to_string(),
            sha: "blob-sha".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("cHV0cyAxCg=="));
        assert!(!json.contains("puts 1"));
    }

    #[test]
    fn test_extract_api_message_structured() {
        let body = r#"{"message": "Validation Failed", "documentation_url": "..."}"#;
        assert_eq!(extract_api_message(body), "Validation Failed");
    }

    #[test]
    fn test_extract_api_message_unstructured() {
        assert_eq!(extract_api_message("<html>Bad Gateway</html>"), "<html>Bad Gateway</html>");
    }

    #[test]
    fn test_sanitize_error_body_truncates() {
        let long = "x".repeat(500);
        let sanitized = sanitize_error_body(&long);
        assert!(sanitized.len() < 300);
        assert!(sanitized.ends_with("(truncated)"));
    }

    #[test]
    fn test_sanitize_error_body_redacts_secrets() {
        let body = r#"{"error": "bad credentials for ghp_abcdef"}"#;
        assert_eq!(sanitize_error_body(body), "(error details redacted)");
    }
}
