//! Process-wide log setup for the CLI driver.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name for a run started now, e.g. `logs_2024-01-31_12-00-00.txt`.
pub fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("logs_{}.txt", now.format("%Y-%m-%d_%H-%M-%S"))
}

fn open_log_file(dir: &Path) -> anyhow::Result<(File, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(log_file_name(chrono::Local::now()));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Installs the global subscriber: stderr always, plus a timestamped file in
/// `logs_dir` when given. `RUST_LOG` overrides `default_filter`.
///
/// Returns the path of the log file, if one was opened.
pub fn init(default_filter: &str, logs_dir: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, path) = match logs_dir {
        Some(dir) => {
            let (file, path) = open_log_file(dir)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name() {
        let when = chrono::Local
            .with_ymd_and_hms(2024, 1, 31, 9, 5, 7)
            .single()
            .unwrap();
        assert_eq!(log_file_name(when), "logs_2024-01-31_09-05-07.txt");
    }

    #[test]
    fn test_open_log_file_creates_dir() {
        let dir = std::env::temp_dir().join(format!("eve_logs_{}", std::process::id()));
        let (_, path) = open_log_file(&dir).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
