//! Hanoi CLI - animate, list and time Towers of Hanoi solutions
//!
//! The animate command plays a run back in the terminal. While it runs,
//! `p`, `r`, `c` and `s` typed on stdin pause, resume, cancel or report
//! status; Ctrl+C cancels.

use clap::{Args, Parser, Subcommand, ValueEnum};
use hanoi::core::solver::moves;
use hanoi::events::observers::Metrics;
use hanoi::render::{render_line, render_rods, render_step};
use hanoi::{
    Algorithm, Controller, ControllerConfig, HanoiEvent, LoggingObserver, MetricsObserver, Move,
    PegId, RunPhase,
};
use serde::Serialize;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

/// Largest puzzle drawn as rods; bigger ones print one line per move
const MAX_DRAWN_DISKS: u8 = 10;

/// Hanoi CLI - animated Towers of Hanoi with pause, resume and cancel
#[derive(Parser)]
#[command(name = "hanoi-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Validate configuration and exit
    #[arg(long)]
    validate_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for CLI responses
#[derive(Clone, Copy, ValueEnum, Default, PartialEq)]
enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for programmatic use
    Json,
}

/// Puzzle options shared by every solving command
#[derive(Args, Clone)]
struct PuzzleArgs {
    /// Number of disks (defaults to the configured default)
    #[arg(short, long)]
    disks: Option<u32>,

    /// Move generator (recursive, iterative)
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    /// Peg holding the disks at the start
    #[arg(long)]
    from: Option<PegId>,

    /// Peg the disks end on
    #[arg(long)]
    to: Option<PegId>,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate a solution with pause/resume/cancel control
    Animate {
        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// Pause between moves in milliseconds
        #[arg(long)]
        frame_ms: Option<u64>,

        /// Read p/r/c/s commands from stdin while running
        #[arg(short, long)]
        interactive: bool,

        /// Print one line per move instead of drawing rods
        #[arg(long)]
        compact: bool,

        /// Print Prometheus metrics after the run
        #[arg(long)]
        metrics: bool,
    },

    /// Print the move sequence
    Moves {
        #[command(flatten)]
        puzzle: PuzzleArgs,
    },

    /// Time the headless solver
    Bench {
        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// Number of timed runs
        #[arg(short, long, default_value = "5")]
        runs: usize,
    },

    /// Time both algorithms and check they produce the same moves
    Compare {
        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// Number of timed runs per algorithm
        #[arg(short, long, default_value = "5")]
        runs: usize,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
#[allow(clippy::enum_variant_names)]
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

// ============================================================================
// Response Types
// ============================================================================

/// Outcome of an animated run
#[derive(Serialize)]
struct AnimateResponse {
    run_id: u64,
    algorithm: Algorithm,
    n_disks: u8,
    phase: RunPhase,
    moves_applied: u64,
    total_moves: u64,
    elapsed_ms: f64,
    solved: bool,
    /// Prometheus text, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<String>,
}

/// Full move listing
#[derive(Serialize)]
struct MovesResponse {
    algorithm: Algorithm,
    n_disks: u8,
    total_moves: u64,
    moves: Vec<Move>,
}

/// Headless timings for one algorithm
#[derive(Serialize)]
struct BenchResponse {
    algorithm: Algorithm,
    n_disks: u8,
    moves: u64,
    runs: usize,
    min_ms: f64,
    mean_ms: f64,
    max_ms: f64,
}

/// Side-by-side headless timings
#[derive(Serialize)]
struct CompareResponse {
    n_disks: u8,
    results: Vec<BenchResponse>,
    sequences_match: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(io::stderr)
        .init();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.validate_config {
        return execute_validate_config(&config);
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            eprintln!("Error: A subcommand is required. Use --help for usage.");
            return ExitCode::from(2);
        }
    };

    let result = match command {
        Commands::Animate {
            puzzle,
            frame_ms,
            interactive,
            compact,
            metrics,
        } => {
            let options = AnimateOptions {
                interactive,
                compact,
                metrics,
            };
            execute_animate(cli.format, config, &puzzle, frame_ms, options).await
        }

        Commands::Moves { puzzle } => execute_moves(cli.format, config, &puzzle),

        Commands::Bench { puzzle, runs } => execute_bench(cli.format, config, &puzzle, runs),

        Commands::Compare { puzzle, runs } => execute_compare(cli.format, config, &puzzle, runs),

        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

fn load_config(path: Option<&PathBuf>) -> Result<ControllerConfig, String> {
    match path {
        Some(path) => ControllerConfig::from_json_file(path),
        None => Ok(ControllerConfig::default()),
    }
}

/// Apply command-line overrides and build a controller sized for the puzzle
fn build_controller(
    mut config: ControllerConfig,
    puzzle: &PuzzleArgs,
) -> Result<Controller, String> {
    if let Some(algorithm) = puzzle.algorithm {
        config = config.with_algorithm(algorithm);
    }
    if puzzle.from.is_some() || puzzle.to.is_some() {
        let source = puzzle.from.unwrap_or(config.source);
        let target = puzzle.to.unwrap_or(config.target);
        if source == target {
            return Err(format!("--from and --to must differ (both {})", source));
        }
        config = config.with_pegs(source, target);
    }

    let mut controller = Controller::new(config).map_err(|e| e.to_string())?;
    let n = puzzle
        .disks
        .unwrap_or_else(|| u32::from(controller.config().default_disks));
    if n == 0 {
        return Err(hanoi::ControllerError::InvalidDiskCount {
            n,
            max: controller.config().max_disks,
        }
        .to_string());
    }
    controller.set_disk_count(n).map_err(|e| e.to_string())?;
    Ok(controller)
}

// ============================================================================
// Command Implementations
// ============================================================================

struct AnimateOptions {
    interactive: bool,
    compact: bool,
    metrics: bool,
}

/// Operator command read from stdin
#[derive(Debug, Clone, Copy, PartialEq)]
enum RunCommand {
    Pause,
    Resume,
    Cancel,
    Status,
}

impl RunCommand {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Some(RunCommand::Pause),
            "r" | "resume" => Some(RunCommand::Resume),
            "c" | "cancel" | "q" | "quit" => Some(RunCommand::Cancel),
            "s" | "status" => Some(RunCommand::Status),
            _ => None,
        }
    }
}

async fn execute_animate(
    format: OutputFormat,
    mut config: ControllerConfig,
    puzzle: &PuzzleArgs,
    frame_ms: Option<u64>,
    options: AnimateOptions,
) -> Result<(), String> {
    if let Some(ms) = frame_ms {
        config = config.with_frame_interval(Duration::from_millis(ms));
    }
    let mut controller = build_controller(config, puzzle)?;
    let bus = controller.events().clone();

    let logger = tokio::spawn(LoggingObserver::new(&bus).run());
    let metrics = options.metrics.then(|| {
        let observer = MetricsObserver::new(&bus);
        let handle = observer.metrics();
        (tokio::spawn(observer.run()), handle)
    });

    let draw = !options.compact && controller.disk_count() <= MAX_DRAWN_DISKS;
    if format == OutputFormat::Text && draw {
        println!("{}\n", render_rods(&controller.snapshot()));
    }
    let renderer = tokio::spawn(render_events(bus.subscribe(), format, draw));
    drop(bus);

    let mut commands = if options.interactive {
        Some(spawn_stdin_reader())
    } else {
        None
    };

    let handle = controller.start().map_err(|e| e.to_string())?;
    let total_moves = handle.total_moves();
    let mut join = tokio::task::spawn_blocking(move || handle.join());

    let report = loop {
        tokio::select! {
            joined = &mut join => {
                break joined
                    .map_err(|e| format!("Run task failed: {}", e))?
                    .map_err(|e| e.to_string())?;
            }
            command = recv_command(&mut commands) => match command {
                Some(command) => apply_command(&controller, command, total_moves),
                // Stdin closed; keep running without commands
                None => commands = None,
            },
            _ = tokio::signal::ctrl_c() => {
                debug!("Ctrl+C received, cancelling run");
                controller.cancel();
            }
        }
    };

    // Closing the bus lets every subscriber drain and stop
    drop(controller);
    let _ = renderer.await;
    let _ = logger.await;

    let metrics = match metrics {
        Some((task, handle)) => {
            let _ = task.await;
            let snapshot = handle
                .lock()
                .map(|m| m.clone())
                .unwrap_or_else(|poisoned| poisoned.into_inner().clone());
            Some(snapshot)
        }
        None => None,
    };

    let response = AnimateResponse {
        run_id: report.run_id,
        algorithm: report.algorithm,
        n_disks: report.n_disks,
        phase: report.phase,
        moves_applied: report.moves_applied,
        total_moves: report.total_moves,
        elapsed_ms: report.elapsed_ms(),
        solved: report.is_completed(),
        metrics: metrics.as_ref().map(Metrics::to_prometheus),
    };

    match format {
        // The event stream is JSON lines; the summary is one more line
        OutputFormat::Json => println!("{}", to_json_line(&response)?),
        OutputFormat::Text => {
            output_response(format, &AnimateResponse { metrics: None, ..response })?;
            if let Some(metrics) = &metrics {
                print!("\n{}", metrics.report());
            }
        }
    }

    Ok(())
}

/// Draw every applied move until the bus closes
async fn render_events(
    mut receiver: broadcast::Receiver<HanoiEvent>,
    format: OutputFormat,
    draw: bool,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => match format {
                OutputFormat::Json => {
                    if let Ok(line) = to_json_line(&event) {
                        println!("{}", line);
                    }
                }
                OutputFormat::Text => render_text_event(&event, draw),
            },
            Err(broadcast::error::RecvError::Closed) => break,
            Err(broadcast::error::RecvError::Lagged(count)) => {
                warn!(skipped = count, "Renderer lagged, skipped {} frames", count);
            }
        }
    }
}

fn render_text_event(event: &HanoiEvent, draw: bool) {
    match event {
        HanoiEvent::RunStarted {
            n_disks,
            algorithm,
            total_moves,
            ..
        } => {
            println!(
                "Solving {} disks with the {} algorithm ({} moves)",
                n_disks, algorithm, total_moves
            );
        }
        HanoiEvent::MoveApplied { applied, state, .. } => {
            let total = hanoi::core::move_count(state.n_disks());
            println!("{}", render_step(applied, total));
            if draw {
                println!("{}\n", render_rods(state));
            } else {
                println!("  {}", render_line(state));
            }
        }
        HanoiEvent::RunPaused { moves_applied, .. } => {
            println!("Paused after {} moves", moves_applied);
        }
        HanoiEvent::RunResumed { .. } => println!("Resumed"),
        HanoiEvent::RunFailed { reason, .. } => println!("Run failed: {}", reason),
        _ => {}
    }
}

/// Forward stdin lines as commands from a detached thread
///
/// A plain thread is used so a pending read never holds up shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<RunCommand> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = thread::Builder::new()
        .name("hanoi-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match RunCommand::parse(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => eprintln!("Unknown command '{}' (p, r, c, s)", line.trim()),
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Failed to start stdin reader, commands disabled");
    }
    rx
}

async fn recv_command(
    commands: &mut Option<mpsc::UnboundedReceiver<RunCommand>>,
) -> Option<RunCommand> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn apply_command(controller: &Controller, command: RunCommand, total_moves: u64) {
    let accepted = match command {
        RunCommand::Pause => controller.pause(),
        RunCommand::Resume => controller.resume(),
        RunCommand::Cancel => controller.cancel(),
        RunCommand::Status => {
            eprintln!(
                "{}: {}/{} moves",
                controller.phase(),
                controller.moves_applied(),
                total_moves
            );
            true
        }
    };
    if !accepted {
        eprintln!("Ignored {:?}: run is {}", command, controller.phase());
    }
}

fn execute_moves(
    format: OutputFormat,
    config: ControllerConfig,
    puzzle: &PuzzleArgs,
) -> Result<(), String> {
    let controller = build_controller(config, puzzle)?;
    let config = controller.config();
    let n_disks = controller.disk_count();
    let sequence = moves(
        controller.algorithm(),
        n_disks,
        config.source,
        config.target,
        config.auxiliary,
    );

    match format {
        OutputFormat::Json => output_response(
            format,
            &MovesResponse {
                algorithm: controller.algorithm(),
                n_disks,
                total_moves: sequence.len() as u64,
                moves: sequence,
            },
        ),
        OutputFormat::Text => {
            let width = sequence.len().to_string().len();
            for (i, mv) in sequence.iter().enumerate() {
                println!("{:>width$}: {}", i + 1, mv, width = width);
            }
            Ok(())
        }
    }
}

fn execute_bench(
    format: OutputFormat,
    config: ControllerConfig,
    puzzle: &PuzzleArgs,
    runs: usize,
) -> Result<(), String> {
    let controller = build_controller(config, puzzle)?;
    let response = bench_algorithm(&controller, runs)?;
    output_response(format, &response)
}

fn execute_compare(
    format: OutputFormat,
    config: ControllerConfig,
    puzzle: &PuzzleArgs,
    runs: usize,
) -> Result<(), String> {
    let mut controller = build_controller(config, puzzle)?;
    let n_disks = controller.disk_count();

    let mut results = Vec::with_capacity(Algorithm::ALL.len());
    for algorithm in Algorithm::ALL {
        controller.select_algorithm(algorithm);
        results.push(bench_algorithm(&controller, runs)?);
    }

    let config = controller.config();
    let (from, to, aux) = (config.source, config.target, config.auxiliary);
    let sequences_match = moves(Algorithm::Recursive, n_disks, from, to, aux)
        == moves(Algorithm::Iterative, n_disks, from, to, aux);

    output_response(
        format,
        &CompareResponse {
            n_disks,
            results,
            sequences_match,
        },
    )
}

/// Run the headless solver `runs` times and summarize
fn bench_algorithm(controller: &Controller, runs: usize) -> Result<BenchResponse, String> {
    if runs == 0 {
        return Err("runs must be >= 1".to_string());
    }

    let mut timings = Vec::with_capacity(runs);
    let mut moves = 0;
    for _ in 0..runs {
        let report = controller.run_headless().map_err(|e| e.to_string())?;
        moves = report.moves;
        timings.push(report.elapsed_ms());
    }

    let min_ms = timings.iter().copied().fold(f64::INFINITY, f64::min);
    let max_ms = timings.iter().copied().fold(0.0, f64::max);
    let mean_ms = timings.iter().sum::<f64>() / runs as f64;

    Ok(BenchResponse {
        algorithm: controller.algorithm(),
        n_disks: controller.disk_count(),
        moves,
        runs,
        min_ms,
        mean_ms,
        max_ms,
    })
}

fn generate_completions(shell: Shell) {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as ClapShell};

    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => ClapShell::Bash,
        Shell::Zsh => ClapShell::Zsh,
        Shell::Fish => ClapShell::Fish,
        Shell::PowerShell => ClapShell::PowerShell,
    };
    generate(shell, &mut cmd, "hanoi-cli", &mut io::stdout());
}

fn execute_validate_config(config: &ControllerConfig) -> ExitCode {
    match config.validate() {
        Ok(()) => {
            println!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(errors) => {
            eprintln!("Configuration errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Output Helpers
// ============================================================================

/// Serialize to a single line of JSON
fn to_json_line<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to serialize response: {}", e))
}

fn output_response<T: Serialize>(format: OutputFormat, response: &T) -> Result<(), String> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(response)
                .map_err(|e| format!("Failed to serialize response: {}", e))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            let value = serde_json::to_value(response)
                .map_err(|e| format!("Failed to serialize response: {}", e))?;
            print_value(&value, 0);
        }
    }
    Ok(())
}

/// Print a JSON value as indented `key: value` lines
fn print_value(value: &serde_json::Value, indent: usize) {
    let prefix = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                match val {
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        println!("{}{}:", prefix, key);
                        print_value(val, indent + 1);
                    }
                    _ => println!("{}{}: {}", prefix, key, format_simple_value(val)),
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, val) in arr.iter().enumerate() {
                match val {
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        println!("{}[{}]:", prefix, i);
                        print_value(val, indent + 1);
                    }
                    _ => println!("{}- {}", prefix, format_simple_value(val)),
                }
            }
        }
        _ => println!("{}{}", prefix, format_simple_value(value)),
    }
}

fn format_simple_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "null".to_string(),
        _ => value.to_string(),
    }
}
