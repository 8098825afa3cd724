use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    #[serde(default)]
    pub input: String,
    pub expected_output: String,
}

impl TestCase {
    pub fn new(
        id: impl Into<String>,
        input: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// Normalized outcome of one remote execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub output: String,
    pub error: Option<String>,
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    pub fn success(output: String, error: Option<String>, execution_time_ms: u64) -> Self {
        Self {
            output,
            error,
            execution_time_ms,
        }
    }

    /// Failure with no output, e.g. transport errors or rejected input
    pub fn failure(error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            output: String::new(),
            error: Some(error.into()),
            execution_time_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub testcase_id: String,
    pub passed: bool,
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub error: Option<String>,
    pub execution_time_ms: u64,
}

/// Aggregate view over a batch of test case results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub all_passed: bool,
    pub total_time_ms: u64,
}

impl RunSummary {
    pub fn from_results(results: &[TestCaseResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let total_time_ms = results.iter().map(|r| r.execution_time_ms).sum();

        Self {
            total,
            passed,
            failed: total - passed,
            all_passed: passed == total,
            total_time_ms,
        }
    }
}
