//! External tool output log — everything terraform, ansible, and ssh print
//! is appended here instead of cluttering the terminal.

use std::io::Write;
use std::path::PathBuf;
use std::process::Output;

use anyhow::{Context, Result};
use chrono::Utc;

/// Append-only log file for captured tool output.
pub struct ToolLog {
    path: PathBuf,
}

impl ToolLog {
    /// Create a log writer for `path`. The file is created on first append.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append a captured [`Output`] under a timestamped header.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened or written.
    pub fn append(&self, label: &str, output: &Output) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        writeln!(
            file,
            "--- {} {} (exit: {}) ---",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            label,
            output.status.code().map_or_else(|| "signal".to_string(), |c| c.to_string()),
        )?;
        file.write_all(&output.stdout)?;
        file.write_all(&output.stderr)?;
        Ok(())
    }

    /// Append a plain message under a timestamped header.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened or written.
    pub fn note(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        writeln!(
            file,
            "--- {} {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            message
        )?;
        Ok(())
    }
}
