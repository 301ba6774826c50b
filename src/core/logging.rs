//! Logging and diagnostics.
//!
//! - JSON file logging through `tracing-appender` (daily rolling, non-blocking)
//! - `log` crate events bridged into `tracing`
//! - gzip compression of rolled-over log files
//! - miette hook for errors printed after the terminal is restored

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "combat-tracker.log";

/// `<data_dir>/combat-tracker/logs`, or `./logs` when there is no data dir.
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("combat-tracker").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize logging for TUI mode.
///
/// Everything goes to the rolling JSON file; there is no stdout layer since
/// ratatui owns the terminal. `RUST_LOG` overrides the default `info` filter.
///
/// The returned guard must outlive the application so buffered lines get
/// flushed on shutdown.
pub fn init_tui(log_dir: &Path) -> WorkerGuard {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(file_layer).init();

    // `init()` normally installs the bridge already
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!(error = %e, "log bridge already installed");
    }

    init_miette();

    let log_dir_clone = log_dir.to_path_buf();
    std::thread::spawn(move || {
        compress_old_logs(&log_dir_clone);
    });

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );

    guard
}

/// Rolled files look like `combat-tracker.log.YYYY-MM-DD`; today's file is
/// still being written to.
fn should_compress(file_name: &str, today_suffix: &str) -> bool {
    file_name
        .strip_prefix(LOG_FILE_PREFIX)
        .is_some_and(|rest| rest.starts_with('.'))
        && !file_name.ends_with(today_suffix)
        && !file_name.ends_with(".gz")
}

fn compress_old_logs(log_dir: &Path) {
    let today_suffix = chrono::Local::now().format("%Y-%m-%d").to_string();

    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !should_compress(name, &today_suffix) {
            continue;
        }
        match compress_file(&path) {
            Ok(()) => log::info!("Compressed old log: {:?}", path),
            Err(e) => log::warn!("Failed to compress old log {:?}: {}", path, e),
        }
    }
}

fn compress_file(path: &Path) -> io::Result<()> {
    let file = fs::File::open(path)?;
    let mut reader = io::BufReader::new(file);

    let mut gz_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_name.push(".gz");
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No parent directory"))?;
    let gz_path = parent.join(gz_name);

    if gz_path.exists() {
        return Ok(());
    }

    let output = fs::File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(())
}

fn init_miette() {
    let color = io::stderr().is_terminal();

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .unicode(true)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .color(color)
                .build(),
        )
    }))
    .ok(); // already set
}
