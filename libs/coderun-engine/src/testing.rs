// In-memory stand-ins for the execution service and the clock
use crate::cache::Clock;
use crate::client::{
    ExecuteRequest, ExecuteResponse, ExecutionBackend, RuntimeDescriptor, RuntimeSource,
    StageResult,
};
use crate::error::ClientError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct FakeClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }
}

/// Scripted execution service
///
/// Queued responses are served in order; once the queue is empty every
/// execution echoes its stdin back as stdout with exit code 0.
pub struct FakeSandbox {
    runtimes: Mutex<Vec<RuntimeDescriptor>>,
    fail_runtimes: AtomicBool,
    fetches: AtomicUsize,
    responses: Mutex<VecDeque<Result<ExecuteResponse, ClientError>>>,
    requests: Mutex<Vec<ExecuteRequest>>,
}

impl FakeSandbox {
    pub fn new(runtimes: Vec<RuntimeDescriptor>) -> Self {
        Self {
            runtimes: Mutex::new(runtimes),
            fail_runtimes: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_python() -> Self {
        Self::new(vec![RuntimeDescriptor::new("python", "3.10.0")])
    }

    pub fn set_runtimes(&self, runtimes: Vec<RuntimeDescriptor>) {
        *self.runtimes.lock().unwrap() = runtimes;
    }

    pub fn fail_runtimes(&self, fail: bool) {
        self.fail_runtimes.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn push_response(&self, response: Result<ExecuteResponse, ClientError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<ExecuteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RuntimeSource for FakeSandbox {
    async fn fetch_runtimes(&self) -> Result<Vec<RuntimeDescriptor>, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_runtimes.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: 503,
                message: "runtime listing unavailable".to_string(),
            });
        }
        Ok(self.runtimes.lock().unwrap().clone())
    }
}

#[async_trait]
impl ExecutionBackend for FakeSandbox {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let scripted = self.responses.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(run_response(Some(0), None, &request.stdin, "")))
    }
}

pub fn run_response(
    code: Option<i32>,
    signal: Option<&str>,
    stdout: &str,
    stderr: &str,
) -> ExecuteResponse {
    ExecuteResponse {
        compile: None,
        run: Some(StageResult {
            code,
            signal: signal.map(str::to_string),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            output: format!("{stdout}{stderr}"),
        }),
    }
}

pub fn compile_failure(code: i32, stdout: &str, stderr: &str) -> ExecuteResponse {
    ExecuteResponse {
        compile: Some(StageResult {
            code: Some(code),
            signal: None,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            output: format!("{stdout}{stderr}"),
        }),
        run: None,
    }
}
