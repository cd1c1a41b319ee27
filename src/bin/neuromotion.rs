//! Neuromotion CLI - Command-line interface for the repetition engine
//!
//! Commands:
//! - run: Replay a recorded landmark frame stream through the engine
//! - validate: Validate an exercise plan JSON file
//! - plan: Print the built-in rehabilitation plan

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use neuromotion::engine::{EngineConfig, RepEngine};
use neuromotion::plan::ExercisePlan;
use neuromotion::types::FrameInput;
use neuromotion::ENGINE_VERSION;

/// Neuromotion - On-device repetition detection engine for camera-guided
/// rehabilitation exercises
#[derive(Parser)]
#[command(name = "neuromotion")]
#[command(author = "Neuromotion Health")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Count exercise repetitions from recorded landmark streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded frame stream through the engine
    Run {
        /// Input NDJSON frame stream (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Exercise plan JSON file (built-in rehabilitation plan if omitted)
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Engine configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// What to emit per frame
        #[arg(long, default_value = "events")]
        output_format: OutputFormat,

        /// Print the session summary after the stream ends
        #[arg(long)]
        summary: bool,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Validate an exercise plan JSON file
    Validate {
        /// Plan JSON file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the built-in rehabilitation plan
    Plan,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One report per frame
    Reports,
    /// Only frames on which a repetition was accepted
    Events,
    /// No per-frame output (pair with --summary)
    Quiet,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), NeuromotionCliError> {
    match cli.command {
        Commands::Run {
            input,
            plan,
            config,
            output_format,
            summary,
            flush,
        } => cmd_run(
            &input,
            plan.as_deref(),
            config.as_deref(),
            output_format,
            summary,
            flush,
        ),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Plan => cmd_plan(),
    }
}

fn cmd_run(
    input: &Path,
    plan_path: Option<&Path>,
    config_path: Option<&Path>,
    output_format: OutputFormat,
    summary: bool,
    flush: bool,
) -> Result<(), NeuromotionCliError> {
    let plan = match plan_path {
        Some(path) => ExercisePlan::from_json(&fs::read_to_string(path)?)?,
        None => ExercisePlan::default_rehab(),
    };

    let config = match config_path {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    let mut engine = RepEngine::with_config(plan, config);

    let stdin = io::stdin();
    let reader: Box<dyn BufRead> = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(NeuromotionCliError::NoInput);
        }
        Box::new(stdin.lock())
    } else {
        Box::new(io::BufReader::new(fs::File::open(input)?))
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut frames = 0usize;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let frame: FrameInput = serde_json::from_str(&line).map_err(|e| {
            NeuromotionCliError::ParseError(format!("Failed to parse frame {}: {}", frames, e))
        })?;
        frames += 1;

        let report = engine.observe(&frame);
        let emit = match output_format {
            OutputFormat::Reports => true,
            OutputFormat::Events => report.rep_accepted,
            OutputFormat::Quiet => false,
        };

        if emit {
            serde_json::to_writer(&mut out, &report)?;
            out.write_all(b"\n")?;
            if flush {
                out.flush()?;
            }
        }
    }

    if frames == 0 {
        return Err(NeuromotionCliError::NoFrames);
    }

    if summary {
        writeln!(out, "{}", engine.summary_json()?)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), NeuromotionCliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::Read::read_to_string(&mut io::stdin(), &mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    match ExercisePlan::from_json(&data) {
        Ok(plan) => {
            if json {
                let report = ValidationReport {
                    valid: true,
                    exercises: plan.len(),
                    error: None,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Plan valid: {} exercises", plan.len());
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let report = ValidationReport {
                    valid: false,
                    exercises: 0,
                    error: Some(e.to_string()),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Plan invalid: {}", e);
            }
            Err(NeuromotionCliError::ValidationFailed)
        }
    }
}

fn cmd_plan() -> Result<(), NeuromotionCliError> {
    let plan = ExercisePlan::default_rehab();
    println!("{}", serde_json::to_string_pretty(plan.exercises())?);
    Ok(())
}

// Error types

#[derive(Debug)]
enum NeuromotionCliError {
    Io(io::Error),
    Engine(neuromotion::EngineError),
    Json(serde_json::Error),
    ParseError(String),
    NoInput,
    NoFrames,
    ValidationFailed,
}

impl From<io::Error> for NeuromotionCliError {
    fn from(e: io::Error) -> Self {
        NeuromotionCliError::Io(e)
    }
}

impl From<neuromotion::EngineError> for NeuromotionCliError {
    fn from(e: neuromotion::EngineError) -> Self {
        NeuromotionCliError::Engine(e)
    }
}

impl From<serde_json::Error> for NeuromotionCliError {
    fn from(e: serde_json::Error) -> Self {
        NeuromotionCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<NeuromotionCliError> for CliError {
    fn from(e: NeuromotionCliError) -> Self {
        match e {
            NeuromotionCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            NeuromotionCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'neuromotion validate' on the plan file".to_string()),
            },
            NeuromotionCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            NeuromotionCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Each input line must be one frame JSON object".to_string()),
            },
            NeuromotionCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a TTY and no input file was given".to_string(),
                hint: Some("Pipe an NDJSON frame stream or pass --input".to_string()),
            },
            NeuromotionCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure the input file is not empty".to_string()),
            },
            NeuromotionCliError::ValidationFailed => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: "Plan failed validation".to_string(),
                hint: Some("Fix the reported error and retry".to_string()),
            },
        }
    }
}

#[derive(serde::Serialize)]
struct ValidationReport {
    valid: bool,
    exercises: usize,
    error: Option<String>,
}
