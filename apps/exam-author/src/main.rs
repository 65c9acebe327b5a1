//! # exam-author
//!
//! Command-line front end for the exam-authoring wizard.
//!
//! ```bash
//! exam-author check exam.json
//! exam-author fields exam.json --step 3
//! exam-author submit exam.json
//! exam-author author --from draft.json
//! ```

use clap::{Parser, Subcommand};
use exam_author::cli::{cmd_author, cmd_check, cmd_fields, cmd_submit};
use exam_author::client::ExamApiClient;
use exam_author::config::Config;
use exam_author::error::AppError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "exam-author")]
#[command(version)]
#[command(about = "Author multiple-choice exams step by step")]
struct Cli {
    /// Exam service base URL (overrides EXAM_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Auth token (overrides EXAM_AUTH_TOKEN and EXAM_AUTH_COOKIE)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an exam document
    Check {
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the field descriptors for one step as JSON
    Fields {
        file: PathBuf,

        /// Step number, 1-based
        #[arg(long)]
        step: Option<usize>,
    },

    /// Validate an exam document and save it to the exam service
    Submit { file: PathBuf },

    /// Author an exam interactively
    Author {
        /// Start from an existing document
        #[arg(long)]
        from: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn client_for(config: &Config) -> Result<ExamApiClient, AppError> {
    ExamApiClient::with_timeout(&config.api_url, config.timeout)
        .map_err(|e| AppError::Config(format!("cannot build HTTP client: {e}")))
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Check { file, json } => {
            let valid = cmd_check(&file, json, &mut stdout)?;
            Ok(if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Fields { file, step } => {
            cmd_fields(&file, step, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Submit { file } => {
            let config = Config::load()?.with_overrides(cli.api_url, cli.token);
            let client = client_for(&config)?;
            cmd_submit(&file, &client, &config.tokens(), &mut stdout).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Author { from } => {
            let config = Config::load()?.with_overrides(cli.api_url, cli.token);
            let client = client_for(&config)?;
            cmd_author(from.as_deref(), &client, &config.tokens()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
