/// Single Execution Invoker
///
/// **Core Responsibility:**
/// Run one submission against one stdin through the remote service and
/// normalize the response into an [`ExecutionResult`].
///
/// **Critical Properties:**
/// - Never fails: every failure path becomes `ExecutionResult.error`
/// - Knows nothing about expected outputs or scoring
/// - Exactly one execute request per call, no internal retry
///
/// **Response Interpretation (in priority order):**
/// 1. Compile phase present with non-zero exit → no output, compile diagnostics as error
/// 2. Run phase non-zero exit with a signal → partial stdout, stderr or signal as error
/// 3. Otherwise → stdout as output, stderr as error when non-empty
///
/// A null exit code counts as non-zero.

use crate::cache::RuntimeCache;
use crate::client::{ExecuteRequest, ExecuteResponse, ExecutionBackend, SourceFile};
use crate::error::ExecuteError;
use crate::language::{find_runtime, resolve_language};
use async_trait::async_trait;
use coderun_common::config::{DEFAULT_COMPILE_TIMEOUT_MS, DEFAULT_TIME_LIMIT_SECS};
use coderun_common::types::ExecutionResult;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Safety limits to keep pathological submissions off the wire
pub const MAX_SOURCE_CODE_BYTES: usize = 1024 * 1024; // 1MB
pub const MAX_INPUT_BYTES: usize = 10 * 1024 * 1024; // 10MB

const COMPILATION_ERROR: &str = "Compilation error";

#[async_trait]
pub trait Executor: Send + Sync {
    /// `time_limit` is in seconds; `None` selects the default limit
    async fn execute(
        &self,
        code: &str,
        language: &str,
        input: &str,
        time_limit: Option<f64>,
    ) -> ExecutionResult;
}

pub struct CodeExecutor {
    backend: Arc<dyn ExecutionBackend>,
    runtimes: Arc<RuntimeCache>,
    compile_timeout_ms: u64,
    default_time_limit_secs: f64,
}

impl CodeExecutor {
    pub fn new(backend: Arc<dyn ExecutionBackend>, runtimes: Arc<RuntimeCache>) -> Self {
        Self {
            backend,
            runtimes,
            compile_timeout_ms: DEFAULT_COMPILE_TIMEOUT_MS,
            default_time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }

    pub fn with_compile_timeout_ms(mut self, compile_timeout_ms: u64) -> Self {
        self.compile_timeout_ms = compile_timeout_ms;
        self
    }

    pub fn with_default_time_limit_secs(mut self, secs: f64) -> Self {
        self.default_time_limit_secs = secs;
        self
    }

    async fn try_execute(
        &self,
        code: &str,
        language: &str,
        input: &str,
        time_limit: Option<f64>,
    ) -> Result<(String, Option<String>), ExecuteError> {
        if code.len() > MAX_SOURCE_CODE_BYTES {
            return Err(ExecuteError::SourceTooLarge(MAX_SOURCE_CODE_BYTES));
        }
        if input.len() > MAX_INPUT_BYTES {
            return Err(ExecuteError::InputTooLarge(MAX_INPUT_BYTES));
        }

        let resolved = resolve_language(language);
        let runtimes = self.runtimes.get().await?;
        let runtime = find_runtime(&runtimes, &resolved).ok_or_else(|| {
            ExecuteError::UnsupportedLanguage {
                label: language.to_string(),
                resolved: resolved.clone(),
            }
        })?;

        let request = ExecuteRequest {
            language: resolved.clone(),
            version: runtime.version.clone(),
            files: vec![SourceFile {
                name: None,
                content: code.to_string(),
            }],
            stdin: input.to_string(),
            compile_timeout: self.compile_timeout_ms,
            run_timeout: run_timeout_ms(time_limit, self.default_time_limit_secs),
        };

        debug!(
            language = %request.language,
            version = %request.version,
            run_timeout_ms = request.run_timeout,
            compile_timeout_ms = request.compile_timeout,
            "Submitting execution"
        );

        let response = self.backend.execute(&request).await?;
        interpret_response(&response)
    }
}

#[async_trait]
impl Executor for CodeExecutor {
    #[instrument(skip(self, code, input), fields(language = %language, code_len = code.len()))]
    async fn execute(
        &self,
        code: &str,
        language: &str,
        input: &str,
        time_limit: Option<f64>,
    ) -> ExecutionResult {
        let start = Instant::now();
        let outcome = self.try_execute(code, language, input, time_limit).await;
        let execution_time_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok((output, error)) => {
                debug!(
                    execution_ms = execution_time_ms,
                    has_error = error.is_some(),
                    "Execution finished"
                );
                ExecutionResult::success(output, error, execution_time_ms)
            }
            Err(e) => {
                warn!(error = %e, execution_ms = execution_time_ms, "Execution failed");
                ExecutionResult::failure(e.to_string(), execution_time_ms)
            }
        }
    }
}

/// Seconds → milliseconds; absent, zero, negative or NaN limits use `default_secs`
pub fn run_timeout_ms(time_limit: Option<f64>, default_secs: f64) -> u64 {
    let secs = match time_limit {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs,
        _ => default_secs,
    };
    (secs * 1000.0).round() as u64
}

/// Collapse a service response into (output, error)
pub fn interpret_response(
    response: &ExecuteResponse,
) -> Result<(String, Option<String>), ExecuteError> {
    if let Some(compile) = response.compile.as_ref().filter(|c| !c.succeeded()) {
        let error = first_non_empty(&[&compile.stderr, &compile.stdout])
            .unwrap_or(COMPILATION_ERROR)
            .to_string();
        return Ok((String::new(), Some(error)));
    }

    let run = response
        .run
        .as_ref()
        .ok_or(ExecuteError::MalformedResponse("missing run phase"))?;

    if !run.succeeded() {
        if let Some(signal) = &run.signal {
            let error = first_non_empty(&[&run.stderr])
                .map(str::to_string)
                .unwrap_or_else(|| format!("Process terminated by signal {}", signal));
            return Ok((run.stdout.clone(), Some(error)));
        }
    }

    let error = first_non_empty(&[&run.stderr]).map(str::to_string);
    Ok((run.stdout.clone(), error))
}

fn first_non_empty<'a>(candidates: &[&'a String]) -> Option<&'a str> {
    candidates
        .iter()
        .find(|candidate| !candidate.is_empty())
        .map(|candidate| candidate.as_str())
}
