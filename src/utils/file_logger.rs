use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::error;

use crate::utils::dir::DirUtils;
use crate::utils::errors::EmptyResult;

/// Append-only history of install and uninstall events.
pub struct FileLogger {
    log_path: PathBuf,
    enabled: bool,
}

impl FileLogger {
    pub fn new(file_name: &str, enabled: bool) -> Self {
        let log_dir = DirUtils::config_dir()
            .unwrap_or(PathBuf::from("./"))
            .join("logs");
        Self::in_dir(&log_dir, file_name, enabled)
    }

    pub fn in_dir(log_dir: &Path, file_name: &str, enabled: bool) -> Self {
        if enabled && let Err(err) = create_dir_all(log_dir) {
            error!("Failed to create log directory: {}", err);
        }

        FileLogger {
            log_path: log_dir.join(file_name),
            enabled,
        }
    }

    pub fn log(&self, message: &str) {
        if !self.enabled {
            return;
        }

        if let Err(err) = self._log(message) {
            error!(
                "Failed to write to log file {}: {}",
                self.log_path.display(),
                err
            );
        }
    }

    fn _log(&self, message: &str) -> EmptyResult {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::in_dir(dir.path(), "history.log", true);
        logger.log("installed foo 1.0.0");
        logger.log("uninstalled foo 1.0.0");

        let content = std::fs::read_to_string(dir.path().join("history.log")).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[1].ends_with("uninstalled foo 1.0.0"));
    }

    #[test]
    fn disabled_logger_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::in_dir(dir.path(), "history.log", false);
        logger.log("installed foo 1.0.0");
        assert!(!dir.path().join("history.log").exists());
    }
}
