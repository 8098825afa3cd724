// Test case orchestration
// Runs a submission against every test case, one at a time, in input order

use crate::evaluator::{crashed_test, evaluate_test};
use crate::executor::Executor;
use coderun_common::types::{TestCase, TestCaseResult};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

pub struct TestRunner {
    executor: Arc<dyn Executor>,
}

impl TestRunner {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Execute all test cases sequentially
    ///
    /// Always returns exactly one result per test case, in input order. A
    /// panicking invocation is recorded as a failed case and the batch goes on.
    ///
    /// `memory_limit_mb` is accepted but not forwarded to the execution service.
    #[instrument(
        skip(self, code, testcases),
        fields(language = %language, test_count = testcases.len())
    )]
    pub async fn run_all(
        &self,
        code: &str,
        language: &str,
        testcases: &[TestCase],
        time_limit: Option<f64>,
        memory_limit_mb: Option<u64>,
    ) -> Vec<TestCaseResult> {
        if let Some(limit) = memory_limit_mb {
            debug!(memory_limit_mb = limit, "Memory limit is not enforced by the execution service");
        }

        let mut results = Vec::with_capacity(testcases.len());

        for (idx, test_case) in testcases.iter().enumerate() {
            let invocation = AssertUnwindSafe(self.executor.execute(
                code,
                language,
                &test_case.input,
                time_limit,
            ))
            .catch_unwind()
            .await;

            let result = match invocation {
                Ok(execution) => evaluate_test(test_case, execution),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(test_id = %test_case.id, error = %message, "Test execution panicked");
                    crashed_test(test_case, message)
                }
            };

            debug!(
                test_num = idx + 1,
                test_id = %result.testcase_id,
                passed = result.passed,
                execution_ms = result.execution_time_ms,
                "Test result"
            );

            results.push(result);
        }

        info!(
            passed = results.iter().filter(|r| r.passed).count(),
            total = results.len(),
            "Test batch complete"
        );

        results
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Test execution panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coderun_common::types::ExecutionResult;
    use std::sync::Mutex;

    /// Echoes stdin, panics on the input "panic", records every call
    struct ScriptedExecutor {
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedExecutor {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Executor for ScriptedExecutor {
        async fn execute(
            &self,
            _code: &str,
            _language: &str,
            input: &str,
            _time_limit: Option<f64>,
        ) -> ExecutionResult {
            self.calls.lock().unwrap().push(input.to_string());
            if input == "panic" {
                panic!("executor exploded");
            }
            ExecutionResult::success(format!("{input}\n"), None, 3)
        }
    }

    fn cases(inputs: &[(&str, &str)]) -> Vec<TestCase> {
        inputs
            .iter()
            .enumerate()
            .map(|(idx, (input, expected))| TestCase::new((idx + 1).to_string(), *input, *expected))
            .collect()
    }

    #[tokio::test]
    async fn test_results_preserve_order_and_length() {
        let executor = Arc::new(ScriptedExecutor::new());
        let runner = TestRunner::new(executor.clone());
        let testcases = cases(&[("a", "a"), ("b", "x"), ("c", "c"), ("d", "d")]);

        let results = runner.run_all("code", "python", &testcases, None, None).await;

        assert_eq!(results.len(), 4);
        let ids: Vec<&str> = results.iter().map(|r| r.testcase_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        let passed: Vec<bool> = results.iter().map(|r| r.passed).collect();
        assert_eq!(passed, vec![true, false, true, true]);
        assert_eq!(*executor.calls.lock().unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let runner = TestRunner::new(Arc::new(ScriptedExecutor::new()));
        let results = runner.run_all("code", "python", &[], Some(1.0), Some(128)).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_case_is_isolated() {
        let executor = Arc::new(ScriptedExecutor::new());
        let runner = TestRunner::new(executor.clone());
        let testcases = cases(&[("one", "one"), ("panic", "anything"), ("three", "three")]);

        let results = runner.run_all("code", "python", &testcases, None, None).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert_eq!(results[1].error.as_deref(), Some("executor exploded"));
        assert_eq!(results[1].execution_time_ms, 0);
        assert_eq!(results[1].actual_output, "");
        assert!(results[2].passed);
        assert_eq!(executor.calls.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_panic_message_variants() {
        let static_str: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(42u8);

        assert_eq!(panic_message(static_str.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "Test execution panicked");
    }
}
