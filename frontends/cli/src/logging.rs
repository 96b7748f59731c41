use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log to `log_path` (and stderr when `verbose`).
///
/// Defaults to INFO level, can be overridden with the RUST_LOG env var.
/// Falls back to stderr only if the log file can't be opened.
pub fn init(log_path: &Path, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = open_log_file(log_path);
    if log_file.is_none() {
        eprintln!(
            "Warning: Could not open log file {:?}, logging to stderr",
            log_path
        );
    }

    let file_layer = log_file.map(|file| {
        fmt::layer().with_writer(file).with_ansi(false) // Disable ANSI colors for file output
    });
    let stderr_layer =
        (verbose || file_layer.is_none()).then(|| fmt::layer().with_writer(std::io::stderr));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
