//! Output coordination for the CLI: plain text, JSON, or quiet.

use std::io::{self, Write};

/// Central output coordinator that respects json/quiet modes.
pub struct OutputContext {
    mode: OutputMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text.
    Plain,
    /// JSON on stdout only.
    Json,
    /// Minimal output (errors still reach stderr).
    Quiet,
}

impl OutputContext {
    /// Create from CLI-style flags. `--json` wins over `--quiet`.
    #[must_use]
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        let mode = if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Plain
        };
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }
    pub fn is_quiet(&self) -> bool {
        self.mode == OutputMode::Quiet
    }
    pub fn is_plain(&self) -> bool {
        self.mode == OutputMode::Plain
    }

    pub fn print(&self, message: &str) {
        if self.is_plain() {
            println!("{message}");
        }
    }

    pub fn success(&self, message: &str) {
        if self.is_plain() {
            println!("✓ {message}");
        }
    }

    pub fn warning(&self, message: &str) {
        if self.is_plain() {
            eprintln!("⚠ {message}");
        }
    }

    pub fn info(&self, message: &str) {
        if self.is_plain() {
            println!("{message}");
        }
    }

    /// Errors always reach stderr, regardless of mode.
    pub fn error(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    /// # Panics
    ///
    /// Panics if serialization fails (e.g., non-string map keys, recursive
    /// structures).
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if self.is_json() {
            // Stream to stdout to avoid allocating large JSON strings.
            let stdout = io::stdout();
            let mut out = io::BufWriter::new(stdout.lock());
            if let Err(err) = serde_json::to_writer(&mut out, value) {
                assert!(
                    err.is_io(),
                    "JSON serialization failed - value is not serializable"
                );
            }
            let _ = out.write_all(b"\n");
        }
    }
}
