//! copydesk - CLI entry point

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use copydesk::ai::credentials::CredentialManager;
use copydesk::ai::models::resolve_model;
use copydesk::ai::prompts::AnalysisKind;
use copydesk::document::read_manuscript;
use copydesk::export::export_docx;
use copydesk::{AnalysisPipeline, Error, GeminiClient, Progress, Report, Result, ReviewConfig, ReviewSession};

#[derive(Parser)]
#[command(name = "copydesk")]
#[command(about = "Check journal manuscripts against house rules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review a manuscript and export a DOCX report
    Review {
        /// Manuscript to review (.docx, .txt or .md)
        input: PathBuf,
        /// Which check to run
        #[arg(long, value_enum, default_value = "all")]
        check: CheckArg,
        /// Report output path (defaults to <input>-report.docx)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Model name (skips discovery)
        #[arg(long)]
        model: Option<String>,
        /// API key (overrides GEMINI_API_KEY and the stored credential)
        #[arg(long)]
        api_key: Option<String>,
        /// Maximum characters per analysis chunk
        #[arg(long)]
        chunk_len: Option<usize>,
        /// Seconds to wait between chunk calls
        #[arg(long)]
        inter_call_delay: Option<u64>,
        /// Seconds to wait after a rate-limit signal
        #[arg(long)]
        backoff: Option<u64>,
    },

    /// Manage the stored API key
    #[command(subcommand)]
    Key(KeyCommands),
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Store an API key in the OS keychain
    Set {
        key: String,
    },
    /// Show whether an API key is configured
    Status,
    /// Remove the stored API key
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum CheckArg {
    Structure,
    Grammar,
    References,
    All,
}

impl CheckArg {
    fn kinds(self) -> Vec<AnalysisKind> {
        match self {
            CheckArg::Structure => vec![AnalysisKind::Structure],
            CheckArg::Grammar => vec![AnalysisKind::Grammar],
            CheckArg::References => vec![AnalysisKind::References],
            CheckArg::All => vec![
                AnalysisKind::Structure,
                AnalysisKind::Grammar,
                AnalysisKind::References,
            ],
        }
    }
}

/// Progress surface for a terminal run.
#[derive(Default)]
struct ConsoleProgress {
    last: Option<(usize, usize)>,
}

impl Progress for ConsoleProgress {
    fn on_progress(&mut self, completed: usize, total: usize) {
        self.last = Some((completed, total));
        eprintln!("  [{}/{}] part finished", completed, total);
    }

    fn on_status(&mut self, message: &str) {
        eprintln!("  {}", message);
    }
}

#[tokio::main]
async fn main() {
    // Load .env from the working directory or its parent.
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,copydesk=info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Review {
            input,
            check,
            out,
            model,
            api_key,
            chunk_len,
            inter_call_delay,
            backoff,
        } => {
            let mut config = ReviewConfig::from_env()?;
            if let Some(len) = chunk_len {
                config.max_chunk_len = len;
            }
            if let Some(secs) = inter_call_delay {
                config.inter_call_delay = Duration::from_secs(secs);
            }
            if let Some(secs) = backoff {
                config.rate_limit_backoff = Duration::from_secs(secs);
            }
            config.validate()?;

            review(input, check, out, model, api_key, config).await
        }
        Commands::Key(command) => key(command),
    }
}

async fn review(
    input: PathBuf,
    check: CheckArg,
    out: Option<PathBuf>,
    model: Option<String>,
    api_key: Option<String>,
    config: ReviewConfig,
) -> Result<()> {
    let api_key = resolve_api_key(api_key)?;
    let model = resolve_model(&api_key, model.as_deref()).await?;
    let client = GeminiClient::new(api_key, model);
    let pipeline = AnalysisPipeline::new(client, config);

    let text = read_manuscript(&input)?;
    tracing::info!("[Review] Manuscript loaded: {} chars", text.chars().count());

    let mut session = ReviewSession::new();
    session.load_text(text);

    for kind in check.kinds() {
        eprintln!("Running {} check...", kind.label().to_lowercase());
        let mut progress = ConsoleProgress::default();
        let report = {
            let text = session.document_text().unwrap_or_default();
            pipeline.review(kind, text, &mut progress).await
        };
        if let Some((completed, total)) = progress.last {
            session.note_progress(completed, total);
        }
        if report.is_empty() {
            eprintln!("  Nothing to analyze.");
        } else {
            println!("{}", report.render());
        }
        session.record_report(kind, report);
    }

    let mut combined = Report::new();
    for (_, report) in session.reports() {
        combined.extend(report.clone());
    }

    if combined.is_empty() {
        eprintln!("No analyzable content; no report exported.");
        return Ok(());
    }

    let out = out.unwrap_or_else(|| default_report_path(&input));
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manuscript".to_string());
    export_docx(
        &combined.render(),
        &format!("Editorial review of {}", file_name),
        &out,
    )?;
    eprintln!("Report exported to {}", out.display());
    Ok(())
}

fn key(command: KeyCommands) -> Result<()> {
    match command {
        KeyCommands::Set { key } => {
            CredentialManager::store_api_key(key.trim()).map_err(Error::Config)?;
            println!("API key stored.");
        }
        KeyCommands::Status => {
            if CredentialManager::has_api_key() {
                println!("API key is configured.");
            } else {
                println!("No API key configured.");
            }
        }
        KeyCommands::Clear => {
            CredentialManager::delete_api_key().map_err(Error::Config)?;
            println!("API key removed.");
        }
    }
    Ok(())
}

/// Key precedence: explicit flag, then environment, then the keychain.
fn resolve_api_key(flag: Option<String>) -> Result<String> {
    if let Some(key) = flag {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }
    CredentialManager::get_api_key().map_err(|_| {
        Error::Config(
            "no API key found: pass --api-key, set GEMINI_API_KEY, or run `copydesk key set`"
                .to_string(),
        )
    })
}

fn default_report_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manuscript".to_string());
    input.with_file_name(format!("{}-report.docx", stem))
}
