// CLI commands for running code against the execution service
use anyhow::{bail, Context, Result};
use coderun_common::config::Config;
use coderun_common::types::{ExecutionResult, RunSummary, TestCase, TestCaseResult};
use coderun_engine::ExecutionService;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Test case as written in a tests file; ids are optional
#[derive(Debug, Deserialize)]
struct TestCaseInput {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    input: String,
    expected_output: String,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    results: &'a [TestCaseResult],
    summary: RunSummary,
}

fn build_service(config: &Config) -> Result<ExecutionService> {
    debug!(
        piston_url = %config.piston_url,
        compile_timeout_ms = config.compile_timeout_ms,
        default_time_limit_secs = config.default_time_limit_secs,
        "Building execution service"
    );
    ExecutionService::from_config(config).context("Failed to create execution service client")
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read source file {}", path.display()))
}

/// Parse a tests file, numbering cases without an id by position
fn parse_testcases(content: &str) -> Result<Vec<TestCase>> {
    let inputs: Vec<TestCaseInput> =
        serde_json::from_str(content).context("Failed to parse test cases JSON")?;

    if inputs.is_empty() {
        bail!("Test cases file contains no test cases");
    }

    Ok(inputs
        .into_iter()
        .enumerate()
        .map(|(idx, tc)| TestCase {
            id: tc.id.unwrap_or_else(|| (idx + 1).to_string()),
            input: tc.input,
            expected_output: tc.expected_output,
        })
        .collect())
}

fn load_testcases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read test cases file {}", path.display()))?;
    parse_testcases(&content)
}

/// Print the runtime directory
pub async fn list_runtimes(config: &Config, json: bool) -> Result<bool> {
    let service = build_service(config)?;
    let runtimes = service
        .runtimes()
        .await
        .with_context(|| format!("Failed to fetch runtimes from {}", config.piston_url))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runtimes.to_vec())?);
        return Ok(true);
    }

    println!("📦 {} runtimes available at {}", runtimes.len(), config.piston_url);
    for runtime in runtimes.iter() {
        if runtime.aliases.is_empty() {
            println!("  {} {}", runtime.language, runtime.version);
        } else {
            println!(
                "  {} {} (aliases: {})",
                runtime.language,
                runtime.version,
                runtime.aliases.join(", ")
            );
        }
    }

    Ok(true)
}

/// Execute a source file once and print its output
pub async fn execute_file(
    config: &Config,
    file: &Path,
    language: &str,
    input: &str,
    time_limit: Option<f64>,
    json: bool,
) -> Result<bool> {
    let code = read_source(file)?;
    let service = build_service(config)?;

    info!(language = %language, code_len = code.len(), "Executing source file");
    let result = service.execute_code(&code, language, input, time_limit).await;
    debug!(
        execution_ms = result.execution_time_ms,
        has_error = result.error.is_some(),
        "Execution finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_execution(&result));
    }

    Ok(exec_succeeded(&result))
}

/// Exit status for `exec`
///
/// Any `error` fails the command, including a clean run that only wrote to
/// stderr: a result does not record which phase the error text came from.
fn exec_succeeded(result: &ExecutionResult) -> bool {
    result.error.is_none()
}

/// Judge a source file against a tests file
pub async fn run_tests(
    config: &Config,
    file: &Path,
    language: &str,
    tests: &Path,
    time_limit: Option<f64>,
    memory_limit: Option<u64>,
    json: bool,
) -> Result<bool> {
    let code = read_source(file)?;
    let testcases = load_testcases(tests)?;
    let service = build_service(config)?;

    info!(
        language = %language,
        test_count = testcases.len(),
        memory_limit_mb = ?memory_limit,
        "Starting test batch"
    );

    if !json {
        println!("🚀 Running {} test cases ({})", testcases.len(), language);
        println!();
    }

    let results = service
        .run_testcases(&code, language, &testcases, time_limit, memory_limit)
        .await;
    let summary = RunSummary::from_results(&results);
    info!(passed = summary.passed, total = summary.total, "Test batch finished");

    if json {
        let report = RunReport {
            results: &results,
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (idx, result) in results.iter().enumerate() {
            print!("{}", format_test_result(idx + 1, result));
        }
        println!();
        println!(
            "Passed {} / {} ({}ms total)",
            summary.passed, summary.total, summary.total_time_ms
        );
    }

    Ok(summary.all_passed)
}

fn format_execution(result: &ExecutionResult) -> String {
    let mut out = String::new();
    out.push_str(&result.output);
    if !result.output.is_empty() && !result.output.ends_with('\n') {
        out.push('\n');
    }
    if let Some(error) = &result.error {
        out.push_str(&format!("✗ Error: {}\n", error.trim_end()));
    }
    out.push_str(&format!("⏱  {}ms\n", result.execution_time_ms));
    out
}

fn format_test_result(num: usize, result: &TestCaseResult) -> String {
    let mut out = String::new();
    let mark = if result.passed { "✓" } else { "✗" };
    out.push_str(&format!(
        "  {} Test {} (id: {}) {}ms\n",
        mark, num, result.testcase_id, result.execution_time_ms
    ));

    if !result.passed {
        out.push_str(&format!("    Expected: \"{}\"\n", result.expected_output.trim()));
        out.push_str(&format!("    Got:      \"{}\"\n", result.actual_output.trim()));
    }
    if let Some(error) = &result.error {
        let first_line = error.lines().next().unwrap_or("");
        out.push_str(&format!("    stderr: {}\n", first_line));
    }
    out
}
