//! Notegrade CLI
//!
//! Command-line interface for scoring generated connection notes.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate a note against a profile
//! notegrade evaluate --profile profile.json --note note.txt
//!
//! # Pipe the note from stdin
//! cat note.txt | notegrade evaluate --profile profile.json
//!
//! # Show the rubric question behind each result
//! notegrade evaluate --profile profile.json --note note.txt --explain
//!
//! # JSON output
//! notegrade evaluate --request request.json --format json
//!
//! # Process a batch of profile URLs
//! notegrade batch --input linkedin_profiles.json --profiles profiles/ --notes notes.json
//!
//! # Validate a profile
//! notegrade profile validate profile.json
//! ```
//!
//! ## Exit Codes
//!
//! - 0: All criteria passed
//! - 1: At least one criterion failed (or a batch item was skipped)
//! - 3: Error

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use notegrade_core::{candidate_tokens, EvaluationRequest, Evaluator, ProfileRecord, VerdictRecord};
use notegrade_runtime::{
    explained_verdict_lines, verdict_lines, ApiKey, BatchDriver, BatchInput,
    CannedNoteGenerator, InteractiveDriver, JsonProfileSource, Pipeline, PipelineBuilder,
    RuntimeConfig,
};

/// Notegrade: quality checks for connection notes
#[derive(Parser)]
#[command(name = "notegrade")]
#[command(version)]
#[command(about = "Score generated connection notes against a four-point rubric", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one note against the profile it was written for
    Evaluate {
        /// Path to the profile (YAML or JSON)
        #[arg(short, long, conflicts_with = "request")]
        profile: Option<PathBuf>,

        /// Path to the note (reads from stdin if not provided)
        #[arg(short, long, conflicts_with = "request")]
        note: Option<PathBuf>,

        /// Path to a JSON request holding both note and profile
        #[arg(short, long)]
        request: Option<PathBuf>,

        /// Character limit for the length criterion
        #[arg(long, default_value_t = notegrade_core::DEFAULT_MAX_LENGTH)]
        max_length: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Print the rubric question above each result
        #[arg(long)]
        explain: bool,
    },

    /// Generate and evaluate notes for a list of profile URLs
    Batch {
        /// File with `profile_urls` (JSON or YAML)
        #[arg(short, long, default_value = "linkedin_profiles.json")]
        input: PathBuf,

        #[command(flatten)]
        runtime: RuntimeArgs,

        /// Where to write results (overrides config)
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// Prompt for one profile URL and report on its note
    Interactive {
        #[command(flatten)]
        runtime: RuntimeArgs,
    },

    /// Profile commands
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(clap::Args)]
struct RuntimeArgs {
    /// Runtime configuration file (YAML or JSON)
    #[arg(short, long, env = "NOTEGRADE_CONFIG")]
    config: Option<PathBuf>,

    /// Profile directory or bundle file (overrides config)
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Pre-generated notes file (overrides config)
    #[arg(long)]
    notes: Option<PathBuf>,

    /// Profiles processed at once (overrides config)
    #[arg(long)]
    concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Validate a profile file
    Validate {
        /// Path to the profile file
        path: PathBuf,
    },

    /// Show profile details and the tokens the rubric samples
    Show {
        /// Path to the profile file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(3)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            profile,
            note,
            request,
            max_length,
            format,
            explain,
        } => evaluate_command(profile, note, request, max_length, format, explain),

        Commands::Batch {
            input,
            runtime,
            results,
        } => batch_command(input, runtime, results),

        Commands::Interactive { runtime } => interactive_command(runtime),

        Commands::Profile { action } => match action {
            ProfileAction::Validate { path } => validate_profile(path),
            ProfileAction::Show { path } => show_profile(path),
        },
    }
}

fn evaluate_command(
    profile_path: Option<PathBuf>,
    note_path: Option<PathBuf>,
    request_path: Option<PathBuf>,
    max_length: usize,
    format: OutputFormat,
    explain: bool,
) -> Result<ExitCode> {
    let request = match (request_path, profile_path) {
        (Some(path), _) => EvaluationRequest::from_json_file(&path)
            .with_context(|| format!("Failed to load request from {:?}", path))?,
        (None, Some(path)) => {
            let profile = load_profile(&path)?;
            let note = read_note(note_path)?;
            EvaluationRequest::new(note, profile)
        }
        (None, None) => bail!("Either --profile or --request is required"),
    };

    let verdict = Evaluator::new()
        .with_max_length(max_length)
        .evaluate(&request.note, &request.profile);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&verdict)?;
            println!("{}", json);
        }
        OutputFormat::Text => print_verdict(&verdict, explain),
    }

    Ok(if verdict.all_passed() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    })
}

fn read_note(note_path: Option<PathBuf>) -> Result<String> {
    let content = match note_path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read note from {:?}", path))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
    };

    // Editors and shells add a final newline that is not part of the note
    Ok(content.trim_end_matches(['\n', '\r']).to_string())
}

fn print_verdict(verdict: &VerdictRecord, explain: bool) {
    if verdict.all_passed() {
        println!("PASS");
    } else {
        let failed: Vec<&str> = verdict.failed().iter().map(|c| c.key()).collect();
        println!("FAIL ({})", failed.join(", "));
    }
    println!();
    let lines = if explain {
        explained_verdict_lines(verdict)
    } else {
        verdict_lines(verdict)
    };
    for line in lines {
        println!("{}", line);
    }
}

fn batch_command(input: PathBuf, args: RuntimeArgs, results: Option<PathBuf>) -> Result<ExitCode> {
    let config = load_config(&args)?;
    let results_path = results.unwrap_or_else(|| config.results_path.clone());
    let batch = BatchInput::from_file(&input)
        .with_context(|| format!("Failed to load batch input from {:?}", input))?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let outcome = runtime.block_on(async {
        let pipeline = build_pipeline(&config).await?;
        let driver = BatchDriver::new(Arc::new(pipeline), config.concurrency);
        Ok::<_, anyhow::Error>(driver.run(&batch).await)
    })?;

    outcome
        .write_results(&results_path)
        .with_context(|| format!("Failed to write results to {:?}", results_path))?;

    println!(
        "Processed {} profiles. Results saved to {}",
        outcome.tally.processed,
        results_path.display()
    );
    for skipped in &outcome.skipped {
        eprintln!("Skipped {}: {}", skipped.profile_url, skipped.reason);
    }

    Ok(if outcome.all_passed() && outcome.skipped.is_empty() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    })
}

fn interactive_command(args: RuntimeArgs) -> Result<ExitCode> {
    let config = load_config(&args)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let run = runtime.block_on(async {
        let pipeline = build_pipeline(&config).await?;
        let driver = InteractiveDriver::new(Arc::new(pipeline));
        let stdin = io::stdin();
        let run = driver.run(stdin.lock(), io::stdout()).await?;
        Ok::<_, anyhow::Error>(run)
    })?;

    Ok(if run.verdict.all_passed() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    })
}

fn load_config(args: &RuntimeArgs) -> Result<RuntimeConfig> {
    let mut config = match &args.config {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => RuntimeConfig::default(),
    };

    if let Some(profiles) = &args.profiles {
        config.sources.profiles = Some(profiles.clone());
    }
    if let Some(notes) = &args.notes {
        config.sources.notes = Some(notes.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn build_pipeline(config: &RuntimeConfig) -> Result<Pipeline> {
    let Some(profiles_path) = &config.sources.profiles else {
        bail!("No profile source configured (set sources.profiles or pass --profiles)");
    };
    let Some(notes_path) = &config.sources.notes else {
        bail!("No notes file configured (set sources.notes or pass --notes)");
    };

    let profiles = JsonProfileSource::open(profiles_path)
        .await
        .with_context(|| format!("Failed to open profiles at {:?}", profiles_path))?;
    let notes = CannedNoteGenerator::from_file(notes_path)
        .await
        .with_context(|| format!("Failed to load notes from {:?}", notes_path))?;

    let api_key = match ApiKey::from_env() {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::debug!(error = %e, "Continuing without an API key");
            None
        }
    };

    let pipeline = PipelineBuilder::new()
        .profiles(Arc::new(profiles))
        .generator(Arc::new(notes))
        .api_key(api_key)
        .config(config.clone())
        .build()?;
    Ok(pipeline)
}

fn load_profile(path: &Path) -> Result<ProfileRecord> {
    ProfileRecord::from_file(path).with_context(|| format!("Failed to load profile from {:?}", path))
}

fn validate_profile(path: PathBuf) -> Result<ExitCode> {
    match ProfileRecord::from_file(&path) {
        Ok(profile) => {
            println!("Profile is valid: {}", display_or_dash(&profile.name));
            if profile.is_sparse() {
                println!();
                println!("Warning: no experience, education or skills entry to match against");
            }
            Ok(ExitCode::from(0))
        }
        Err(e) => {
            eprintln!("Profile validation failed: {}", e);
            Ok(ExitCode::from(1))
        }
    }
}

fn show_profile(path: PathBuf) -> Result<ExitCode> {
    let profile = load_profile(&path)?;

    println!("Name: {}", display_or_dash(&profile.name));
    println!("Headline: {}", display_or_dash(&profile.headline));
    println!("Summary: {}", display_or_dash(&profile.summary));
    println!();

    for (label, entries) in [
        ("Experience", &profile.experience),
        ("Education", &profile.education),
        ("Skills", &profile.skills),
    ] {
        println!("{}: {} entries", label, entries.len());
        for entry in entries {
            println!("  - {}", entry);
        }
    }
    println!();

    let tokens = candidate_tokens(&profile);
    if tokens.is_empty() {
        println!("Detail tokens: none");
    } else {
        println!("Detail tokens: {}", tokens.join(", "));
    }

    Ok(ExitCode::from(0))
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
