use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: Option<String>,
    /// JSON log file. Without one, logs go to stderr.
    pub file: Option<PathBuf>,
    pub verbose: bool,
}

impl LogConfig {
    #[must_use]
    pub fn from_config(config: &AppConfig, verbose: bool, file: Option<PathBuf>) -> Self {
        Self {
            level: config.log_level.clone(),
            file: file.or_else(|| config.log_file.clone()),
            verbose,
        }
    }

    #[must_use]
    pub fn directive(&self) -> String {
        match (&self.level, self.verbose) {
            (Some(level), _) if !level.trim().is_empty() => level.trim().to_string(),
            (_, true) => "debug".to_string(),
            _ if self.file.is_some() => "info".to_string(),
            _ => "warn".to_string(),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()))
    }
}

/// Installs the global subscriber. The returned guard flushes the file
/// writer on drop and must be held until exit.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = config.filter();

    let Some(path) = &config.file else {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false),
        );
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("Failed to set tracing subscriber");
        }
        return None;
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
        && let Err(e) = fs::create_dir_all(parent)
    {
        eprintln!("Failed to create log directory: {e}");
        return None;
    }

    let file = match fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open log file: {e}");
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
        return None;
    }

    tracing::info!(path = %path.display(), "File logging initialized");

    Some(guard)
}
