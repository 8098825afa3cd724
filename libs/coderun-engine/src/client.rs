//! HTTP client for a Piston-style execution service
//!
//! Two endpoints are consumed:
//! - `GET {base}/runtimes` lists the (language, version) pairs the service can run
//! - `POST {base}/execute` compiles (if needed) and runs a single submission
//!
//! Non-success responses are surfaced as [`ClientError::Api`], carrying the
//! service's `message` field when the body has one.

use crate::error::ClientError;
use async_trait::async_trait;
use coderun_common::config::Config;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// One entry of the service's runtime directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeDescriptor {
    pub language: String,
    pub version: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

impl RuntimeDescriptor {
    pub fn new(language: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            version: version.into(),
            aliases: Vec::new(),
            runtime: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
}

/// Body of `POST /execute`; timeouts are in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub language: String,
    pub version: String,
    pub files: Vec<SourceFile>,
    pub stdin: String,
    pub compile_timeout: u64,
    pub run_timeout: u64,
}

/// Outcome of one phase (compile or run)
///
/// `code` is null when the process was killed by a signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub output: String,
}

impl StageResult {
    pub fn succeeded(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub compile: Option<StageResult>,
    /// Absent when compilation failed
    #[serde(default)]
    pub run: Option<StageResult>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Source of the runtime directory
#[async_trait]
pub trait RuntimeSource: Send + Sync {
    async fn fetch_runtimes(&self) -> Result<Vec<RuntimeDescriptor>, ClientError>;
}

/// Something that can run a single [`ExecuteRequest`]
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, ClientError>;
}

#[derive(Debug, Clone)]
pub struct PistonClient {
    base_url: String,
    client: Client,
}

impl PistonClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build()?;

        info!(base_url = %base_url, "Created execution service client");

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(config.piston_url.clone(), config.http_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl RuntimeSource for PistonClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_runtimes(&self) -> Result<Vec<RuntimeDescriptor>, ClientError> {
        let response = self.client.get(self.url("runtimes")).send().await?;
        let runtimes: Vec<RuntimeDescriptor> = decode(response).await?;

        debug!(count = runtimes.len(), "Fetched runtime directory");
        Ok(runtimes)
    }
}

#[async_trait]
impl ExecutionBackend for PistonClient {
    #[instrument(
        skip(self, request),
        fields(language = %request.language, version = %request.version, run_timeout = request.run_timeout)
    )]
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, ClientError> {
        let response = self
            .client
            .post(self.url("execute"))
            .json(request)
            .send()
            .await?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = api_message(&body)
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
        debug!(status = status.as_u16(), message = %message, "Execution service returned an error");
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

fn api_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
}
