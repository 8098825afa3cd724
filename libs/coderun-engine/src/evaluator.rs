/// Test Evaluator - Output Comparison
///
/// **Core Responsibility:**
/// Compare an execution's output against a test case's expected output.
///
/// **Critical Properties:**
/// - Knows nothing about the execution service
/// - Knows nothing about language runtimes
/// - Pure function: (test case, execution result) → test case result
///
/// **Normalization Rules:**
/// - Trim leading whitespace: YES
/// - Trim trailing whitespace: YES
/// - Ignore newline differences (\n vs \r\n): only at the edges (via trim)
/// - Internal whitespace: preserved, exact match required
/// - Case sensitivity: YES
///
/// Pass/fail is decided by output comparison alone. A populated `error`
/// (for example interpreter warnings on stderr) does not fail a test whose
/// output matches.

use coderun_common::types::{ExecutionResult, TestCase, TestCaseResult};

fn normalize_output(output: &str) -> &str {
    output.trim()
}

pub fn outputs_match(actual: &str, expected: &str) -> bool {
    normalize_output(actual) == normalize_output(expected)
}

/// Judge one execution against its test case
pub fn evaluate_test(test_case: &TestCase, execution: ExecutionResult) -> TestCaseResult {
    let passed = outputs_match(&execution.output, &test_case.expected_output);

    TestCaseResult {
        testcase_id: test_case.id.clone(),
        passed,
        input: test_case.input.clone(),
        expected_output: test_case.expected_output.clone(),
        actual_output: execution.output,
        error: execution.error,
        execution_time_ms: execution.execution_time_ms,
    }
}

/// Result for a test case whose invocation blew up before producing a result
pub fn crashed_test(test_case: &TestCase, message: impl Into<String>) -> TestCaseResult {
    TestCaseResult {
        testcase_id: test_case.id.clone(),
        passed: false,
        input: test_case.input.clone(),
        expected_output: test_case.expected_output.clone(),
        actual_output: String::new(),
        error: Some(message.into()),
        execution_time_ms: 0,
    }
}
