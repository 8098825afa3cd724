mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use coderun_common::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "coderun")]
#[command(about = "coderun CLI - Run code against test cases on a remote execution service", long_about = None)]
struct Cli {
    /// Execution service base URL (overrides PISTON_URL)
    #[arg(long, global = true)]
    piston_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List runtimes supported by the execution service
    Runtimes,

    /// Execute a source file once
    ///
    /// Exits non-zero whenever the result carries an error, which includes
    /// anything the program wrote to stderr.
    Exec {
        /// Source file to execute
        #[arg(short, long)]
        file: PathBuf,

        /// Language label (e.g., Python, C++, java)
        #[arg(short, long)]
        language: String,

        /// Standard input passed to the program
        #[arg(short, long, default_value = "")]
        input: String,

        /// Time limit in seconds
        #[arg(short, long)]
        time_limit: Option<f64>,
    },

    /// Run a source file against a JSON file of test cases
    Run {
        /// Source file to judge
        #[arg(short, long)]
        file: PathBuf,

        /// Language label (e.g., Python, C++, java)
        #[arg(short, long)]
        language: String,

        /// JSON array of {id?, input, expected_output}
        #[arg(long)]
        tests: PathBuf,

        /// Time limit in seconds
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Memory limit in MB (not enforced by the execution service)
        #[arg(short, long)]
        memory_limit: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.piston_url {
        config.piston_url = url.trim_end_matches('/').to_string();
    }

    let ok = match cli.command {
        Commands::Runtimes => commands::list_runtimes(&config, cli.json).await?,
        Commands::Exec {
            file,
            language,
            input,
            time_limit,
        } => commands::execute_file(&config, &file, &language, &input, time_limit, cli.json).await?,
        Commands::Run {
            file,
            language,
            tests,
            time_limit,
            memory_limit,
        } => {
            commands::run_tests(
                &config,
                &file,
                &language,
                &tests,
                time_limit,
                memory_limit,
                cli.json,
            )
            .await?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
