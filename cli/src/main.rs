//! gridsig CLI - binary entry point.
//!
//! # Architecture
//!
//! The CLI resolves settings, opens the peer link, and hands both to
//! [`gridsig_core::SessionDriver`]:
//!
//! ```text
//! main() -> Settings (config file + env + flags) -> Transport (stdio | tcp)
//!        -> SessionDriver::run() -> SessionOutcome -> report + flag file
//! ```
//!
//! stdout may be the peer link, so nothing but protocol lines is ever
//! written there. Logs go to a file; the flag and the session summary go to
//! stderr.

mod transport;

use std::{
    env,
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gridsig_config::{GridsigConfig, Settings, parse_seed};
use gridsig_core::{
    FlagStore, GeneratorSettings, Journal, Peer, PatternGenerator, SessionDriver, SessionOutcome,
    SessionStats,
};
use gridsig_types::{Canonicalizer, Grid};

use transport::Transport;

#[derive(Debug, Parser)]
#[command(name = "gridsig")]
#[command(about = "Register grid patterns with a peer, then recognize their rotations")]
struct Cli {
    /// Connect to HOST:PORT instead of speaking over stdin/stdout
    #[arg(long, value_name = "HOST:PORT")]
    connect: Option<String>,
    /// Config file (default: ~/.gridsig/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// PRNG seed for pattern generation, decimal or 0x-hex
    #[arg(long, value_parser = parse_seed_arg)]
    seed: Option<u64>,
    /// Record a transcript and CSV tables of the session
    #[arg(long)]
    journal: bool,
    /// Directory for journal files
    #[arg(long, value_name = "DIR")]
    journal_dir: Option<PathBuf>,
    /// Where to write the flag
    #[arg(long, value_name = "PATH")]
    flag_path: Option<PathBuf>,
}

fn parse_seed_arg(raw: &str) -> Result<u64, String> {
    parse_seed(raw).ok_or_else(|| format!("invalid seed {raw:?}"))
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if self.journal {
            settings.journal_enabled = true;
        }
        if let Some(dir) = &self.journal_dir {
            settings.journal_dir = dir.clone();
        }
        if let Some(path) = &self.flag_path {
            settings.flag_path = path.clone();
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the peer
    // link by writing to stdout.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();
    let opened = log_file_candidates().into_iter().find_map(|path| {
        let file = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));
        match file {
            Ok(file) => Some((path, file)),
            Err(e) => {
                warnings.push(format!("Cannot log to {}: {e}", path.display()));
                None
            }
        }
    });
    (opened, warnings)
}

/// `~/.gridsig/logs/gridsig.log`, then the same path under the working
/// directory.
fn log_file_candidates() -> Vec<PathBuf> {
    let home = GridsigConfig::path().and_then(|config| config.parent().map(PathBuf::from));
    home.into_iter()
        .chain([PathBuf::from(".gridsig")])
        .map(|dir| dir.join("logs").join("gridsig.log"))
        .collect()
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let config = match &cli.config {
        Some(path) => GridsigConfig::load_from(path)?,
        None => GridsigConfig::load()?.unwrap_or_default(),
    };
    let mut settings = config.resolve(|key| env::var(key).ok())?;
    cli.apply(&mut settings);
    Ok(settings)
}

fn open_journal(settings: &Settings) -> Journal {
    if !settings.journal_enabled {
        return Journal::disabled();
    }
    match Journal::open(&settings.journal_dir) {
        Ok(journal) => journal,
        Err(e) => {
            tracing::warn!(
                dir = %settings.journal_dir.display(),
                "Failed to open journal; continuing without it: {e}"
            );
            Journal::disabled()
        }
    }
}

fn drive<P: Peer>(
    peer: P,
    canon: Canonicalizer,
    generator: PatternGenerator,
    journal: Journal,
) -> Result<(SessionOutcome, SessionStats)> {
    let mut driver = SessionDriver::new(peer, canon, generator).with_journal(journal);
    let outcome = driver.run().context("session aborted")?;
    Ok((outcome, driver.stats()))
}

fn report(outcome: &SessionOutcome, stats: SessionStats, flags: &FlagStore) {
    match outcome {
        SessionOutcome::Success { flag } => {
            eprintln!("{flag}");
            if let Err(e) = flags.persist(flag) {
                tracing::warn!(path = %flags.path().display(), "Failed to persist flag: {e}");
            }
        }
        SessionOutcome::Partial { summary } => eprintln!("Partial result: {summary}"),
        SessionOutcome::Disconnected { phase } => {
            eprintln!("Peer closed the connection during {phase}");
        }
    }
    eprintln!("Session: {stats}");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = load_settings(&cli)?;
    tracing::debug!(?settings, "Settings resolved");

    let grid = Grid::new().context("segment table is misconfigured")?;
    let generator = PatternGenerator::new(GeneratorSettings::new(
        settings.seed,
        settings.min_pattern_size,
        settings.max_pattern_size,
        settings.max_attempts,
    )?);
    let canon = Canonicalizer::new(grid);
    let journal = open_journal(&settings);

    let transport = match &cli.connect {
        Some(addr) => Transport::connect(addr)?,
        None => Transport::stdio(),
    };
    tracing::info!(transport = transport.describe(), seed = settings.seed, "Session starting");

    let (outcome, stats) = match transport {
        Transport::Stdio(peer) => drive(peer, canon, generator, journal)?,
        Transport::Tcp(peer) => drive(peer, canon, generator, journal)?,
    };

    report(&outcome, stats, &FlagStore::new(&settings.flag_path));
    Ok(())
}
