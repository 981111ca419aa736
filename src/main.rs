//! Synheart Gesture Engine CLI
//!
//! Recognizes gestures in JSON-lines input samples.

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use synheart_gesture_engine::{
    config::Config,
    core::templates,
    input::{SourceError, DEFAULT_CHANNEL_CAPACITY},
    stats::{create_shared_stats, create_shared_stats_with_persistence, PersistedStats},
    ChannelSource, ComboStep, GestureDefinition, GestureEngine, Key, MatchEvent, Point, Recognizer,
    Sample, ScriptedSource, VERSION,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Default swipe dead zone, in input units.
const SWIPE_DEAD_ZONE: f64 = 100.0;

/// Default swipe angle tolerance, in degrees.
const SWIPE_ANGLE: f64 = 30.0;

/// Default score threshold for built-in shapes.
const SHAPE_THRESHOLD: f64 = 0.05;

#[derive(Parser)]
#[command(name = "synheart-gesture")]
#[command(author = "Synheart")]
#[command(version = VERSION)]
#[command(about = "Real-time gesture recognition over input samples", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize gestures in JSON-lines samples read from stdin
    Run {
        /// JSON file with gesture definitions (built-in set if omitted)
        #[arg(long)]
        gestures: Option<PathBuf>,

        /// Tick interval in milliseconds (config value if omitted)
        #[arg(long)]
        tick_ms: Option<u64>,
    },

    /// Replay a recorded JSON-lines sample file on simulated ticks
    Replay {
        /// Sample file, one JSON sample per line
        file: PathBuf,

        /// JSON file with gesture definitions (built-in set if omitted)
        #[arg(long)]
        gestures: Option<PathBuf>,
    },

    /// Rank a stroke against the built-in templates
    Classify {
        /// JSON array of points, e.g. [{"x": 0, "y": 0}, ...]
        file: PathBuf,
    },

    /// List built-in shape templates
    Templates,

    /// Show persisted engine statistics
    Status,

    /// Show configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries match events
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { gestures, tick_ms } => cmd_run(gestures.as_deref(), tick_ms),
        Commands::Replay { file, gestures } => cmd_replay(&file, gestures.as_deref()),
        Commands::Classify { file } => cmd_classify(&file),
        Commands::Templates => {
            cmd_templates();
            Ok(())
        }
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    }
}

fn cmd_run(gestures: Option<&Path>, tick_ms: Option<u64>) -> anyhow::Result<()> {
    let config = load_config();
    let tick = tick_ms
        .map(Duration::from_millis)
        .unwrap_or(config.tick_interval);
    let stats = create_shared_stats_with_persistence(config.stats_path());

    let (sender, source) = ChannelSource::new(DEFAULT_CHANNEL_CAPACITY);
    let mut engine = GestureEngine::new(config)
        .with_source(source)
        .with_stats(stats.clone());
    register_all(&mut engine, load_gestures(gestures)?);

    eprintln!("Synheart Gesture Engine v{VERSION}");
    eprintln!(
        "Tracking {} gestures, tick every {}ms. Reading samples from stdin.",
        engine.registry().len(),
        tick.as_millis()
    );
    eprintln!("Press Ctrl+C to stop");

    // Stdin reader thread
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for (index, line) in stdin.lock().lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Stopped reading stdin: {e}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let sample = match serde_json::from_str::<Sample>(&line) {
                Ok(sample) => sample,
                Err(e) => {
                    warn!("Skipping line {}: {e}", index + 1);
                    continue;
                }
            };
            match sender.send(sample) {
                Ok(()) => {}
                Err(SourceError::Full) => warn!("Sample queue full, dropping sample"),
                Err(SourceError::Disconnected) => break,
            }
        }
    });

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        for event in engine.tick(Utc::now()) {
            print_event(&event)?;
        }
        if !engine.is_source_open() {
            info!("Input closed");
            break;
        }
        thread::sleep(tick);
    }

    if let Err(e) = stats.save() {
        warn!("Could not save engine stats: {e}");
    }
    eprintln!();
    eprintln!("{}", stats.summary());
    Ok(())
}

fn cmd_replay(file: &Path, gestures: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config();
    let tick = chrono::Duration::from_std(config.tick_interval)
        .context("Tick interval out of range")?;
    if tick <= chrono::Duration::zero() {
        bail!("Tick interval must be positive for replay");
    }

    let samples = read_samples(file)?;
    let Some(first) = samples.first().map(|s| s.timestamp) else {
        eprintln!("No samples in {file:?}");
        return Ok(());
    };
    let source = ScriptedSource::new(samples);
    let last = source.last_timestamp().unwrap_or(first);
    eprintln!("Replaying {} samples from {file:?}", source.remaining());

    let stats = create_shared_stats();
    let mut engine = GestureEngine::new(config)
        .with_source(source)
        .with_stats(stats.clone());
    register_all(&mut engine, load_gestures(gestures)?);

    let end = last + chrono::Duration::from_std(engine.retention()).unwrap_or(tick);
    let mut now: DateTime<Utc> = first;
    while now <= end {
        for event in engine.tick(now) {
            print_event(&event)?;
        }
        now += tick;
    }

    eprintln!("{}", stats.summary());
    Ok(())
}

fn cmd_classify(file: &Path) -> anyhow::Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("Could not read {file:?}"))?;
    let stroke: Vec<Point> =
        serde_json::from_str(&content).with_context(|| format!("Invalid point list in {file:?}"))?;

    let recognizer = Recognizer::from(load_config().recognizer);
    let builtin = templates::builtin();
    let mut prepared = Vec::with_capacity(builtin.len());
    for template in &builtin {
        prepared.push((template.name, recognizer.prepare(&template.points)?));
    }

    let ranked = recognizer.rank(
        &stroke,
        prepared.iter().map(|(name, points)| (*name, points.as_slice())),
    )?;

    println!("{:<10} {:>8}", "TEMPLATE", "SCORE");
    for entry in ranked {
        println!("{:<10} {:>8.4}", entry.name, entry.score);
    }
    Ok(())
}

fn cmd_templates() {
    println!("Built-in templates");
    println!("==================");
    for template in templates::builtin() {
        println!("  {:<10} {} points", template.name, template.points.len());
    }
}

fn cmd_status() -> anyhow::Result<()> {
    let config = load_config();
    let stats_path = config.stats_path();

    println!("Synheart Gesture Engine Status");
    println!("==============================");
    println!();

    if !stats_path.exists() {
        println!("No previous session data found.");
        return Ok(());
    }

    let content = std::fs::read_to_string(&stats_path)
        .with_context(|| format!("Could not read {stats_path:?}"))?;
    let stats: PersistedStats = serde_json::from_str(&content)
        .with_context(|| format!("Invalid stats file {stats_path:?}"))?;

    println!("Cumulative Statistics:");
    println!("  Ticks: {}", stats.ticks);
    println!("  Samples ingested: {}", stats.samples_ingested);
    println!("  Samples rejected: {}", stats.samples_rejected);
    println!("  Samples pruned: {}", stats.samples_pruned);
    println!("  Samples evicted: {}", stats.samples_evicted);
    println!("  Matches: {}", stats.matches);
    println!("  Rejected registrations: {}", stats.registrations_rejected);
    println!(
        "  Last updated: {}",
        stats.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!("Using default configuration: {e}");
        Config::default()
    })
}

/// Gestures from `path`, or the built-in set.
fn load_gestures(path: Option<&Path>) -> anyhow::Result<Vec<GestureDefinition>> {
    let Some(path) = path else {
        return Ok(default_gestures());
    };
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Could not read {path:?}"))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid gesture file {path:?}"))
}

/// Four directional swipes, three shapes and a save chord.
fn default_gestures() -> Vec<GestureDefinition> {
    let swipe = |id: &str, x: f64, y: f64| {
        GestureDefinition::swipe(id, Point::new(x, y), SWIPE_DEAD_ZONE, SWIPE_ANGLE)
            .with_time_window(Duration::from_millis(500))
    };
    let shape = |id: &str, points: Vec<Point>| {
        GestureDefinition::shape(id, points, SHAPE_THRESHOLD)
            .with_time_window(Duration::from_secs(3))
    };

    vec![
        swipe("swipe-right", 1.0, 0.0),
        swipe("swipe-left", -1.0, 0.0),
        // Screen coordinates: y grows downward
        swipe("swipe-up", 0.0, -1.0),
        swipe("swipe-down", 0.0, 1.0),
        shape("square", templates::square()),
        shape("triangle", templates::triangle()),
        shape("circle", templates::circle()),
        GestureDefinition::combo(
            "save",
            vec![ComboStep::down(Key::Code(17)), ComboStep::down(Key::Char('s'))],
        )
        .with_time_window(Duration::from_millis(800)),
    ]
}

fn register_all(engine: &mut GestureEngine, gestures: Vec<GestureDefinition>) {
    for definition in gestures {
        // Rejections are logged by the engine
        let _ = engine.register_gesture(definition);
    }
}

fn read_samples(path: &Path) -> anyhow::Result<Vec<Sample>> {
    let file = std::fs::File::open(path).with_context(|| format!("Could not open {path:?}"))?;
    let mut samples = Vec::new();
    for (index, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sample: Sample = serde_json::from_str(&line)
            .with_context(|| format!("Invalid sample on line {}", index + 1))?;
        samples.push(sample);
    }
    Ok(samples)
}

fn print_event(event: &MatchEvent) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")
}
