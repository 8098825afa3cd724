/// Execution Service - Caller-Facing Facade
///
/// Composes the runtime cache, executor and test runner over one execution
/// service connection. This is what the API and CLI hold on to.
///
/// The cache lives as long as the service instance; callers that want
/// process-wide caching keep a single instance around.

use crate::cache::{Clock, RuntimeCache, SystemClock};
use crate::client::{ExecutionBackend, PistonClient, RuntimeDescriptor, RuntimeSource};
use crate::error::ClientError;
use crate::executor::{CodeExecutor, Executor};
use crate::runner::TestRunner;
use coderun_common::config::Config;
use coderun_common::types::{ExecutionResult, TestCase, TestCaseResult};
use std::sync::Arc;

pub struct ExecutionService {
    runtimes: Arc<RuntimeCache>,
    executor: Arc<CodeExecutor>,
    runner: TestRunner,
}

impl ExecutionService {
    /// Production wiring: one HTTP client serves both runtime listing and execution
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let client = Arc::new(PistonClient::from_config(config)?);
        Ok(Self::new(client.clone(), client, config))
    }

    pub fn new(
        source: Arc<dyn RuntimeSource>,
        backend: Arc<dyn ExecutionBackend>,
        config: &Config,
    ) -> Self {
        Self::with_clock(source, backend, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        source: Arc<dyn RuntimeSource>,
        backend: Arc<dyn ExecutionBackend>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let runtimes = Arc::new(RuntimeCache::with_clock(
            source,
            clock,
            config.runtime_cache_ttl,
        ));
        let executor = Arc::new(
            CodeExecutor::new(backend, Arc::clone(&runtimes))
                .with_compile_timeout_ms(config.compile_timeout_ms)
                .with_default_time_limit_secs(config.default_time_limit_secs),
        );
        let runner = TestRunner::new(executor.clone());

        Self {
            runtimes,
            executor,
            runner,
        }
    }

    /// Runtime directory, served from cache while fresh
    pub async fn runtimes(&self) -> Result<Arc<[RuntimeDescriptor]>, ClientError> {
        self.runtimes.get().await
    }

    pub async fn execute_code(
        &self,
        code: &str,
        language: &str,
        input: &str,
        time_limit: Option<f64>,
    ) -> ExecutionResult {
        self.executor.execute(code, language, input, time_limit).await
    }

    pub async fn run_testcases(
        &self,
        code: &str,
        language: &str,
        testcases: &[TestCase],
        time_limit: Option<f64>,
        memory_limit_mb: Option<u64>,
    ) -> Vec<TestCaseResult> {
        self.runner
            .run_all(code, language, testcases, time_limit, memory_limit_mb)
            .await
    }
}
