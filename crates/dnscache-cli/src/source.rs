//! Record source that runs the system's DNS cache diagnostic command.

use std::process::Command;

use tracing::debug;

use dnscache_core::{RecordSource, StoreError, StoreResult};

/// Command that prints the resolver cache on Windows
pub const DEFAULT_COMMAND: &str = "ipconfig /displaydns";

/// Runs a command line and captures its standard output as diagnostic text.
#[derive(Debug, Clone)]
pub struct CommandSource {
    command_line: String,
}

impl CommandSource {
    /// `command_line` is split on whitespace into program and arguments.
    pub fn new(command_line: impl Into<String>) -> Self {
        Self { command_line: command_line.into() }
    }

    fn failed(&self, reason: String) -> StoreError {
        StoreError::SourceFailed { source_name: self.command_line.clone(), reason }
    }
}

impl Default for CommandSource {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND)
    }
}

impl RecordSource for CommandSource {
    fn name(&self) -> String {
        self.command_line.clone()
    }

    fn read_text(&self) -> StoreResult<String> {
        let mut parts = self.command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| self.failed("empty command line".to_string()))?;

        let output = Command::new(program)
            .args(parts)
            .output()
            .map_err(|e| self.failed(format!("could not start: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failed(format!("exited with {}: {}", output.status, stderr.trim())));
        }

        debug!(command = %self.command_line, bytes = output.stdout.len(), "captured diagnostic output");
        // Console code pages are not always UTF-8; keep what decodes
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_rejected() {
        let source = CommandSource::new("   ");
        assert!(matches!(source.read_text(), Err(StoreError::SourceFailed { .. })));
    }

    #[test]
    fn test_missing_program_rejected() {
        let source = CommandSource::new("definitely-not-a-real-program-dnscache --flag");
        match source.read_text() {
            Err(StoreError::SourceFailed { source_name, .. }) => {
                assert_eq!(source_name, "definitely-not-a-real-program-dnscache --flag");
            }
            other => panic!("Expected SourceFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout() {
        let source = CommandSource::new("echo Record Name");
        assert_eq!(source.read_text().unwrap(), "Record Name\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_failure() {
        let source = CommandSource::new("false");
        assert!(matches!(source.read_text(), Err(StoreError::SourceFailed { .. })));
    }
}
