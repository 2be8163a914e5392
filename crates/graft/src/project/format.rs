//! Output formatting.
//!
//! The generator renders canonical text itself; a formatter only restyles it
//! to the project's conventions. Failures are not fatal: the caller falls back
//! to the unformatted text and records a warning.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::diagnostic::GraftError;
use crate::manifest::FormatterSpec;

/// Restyles rendered source text.
pub trait Formatter {
    fn format(&self, text: &str, path: &Path) -> Result<String, GraftError>;
}

/// Returns text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, text: &str, _path: &Path) -> Result<String, GraftError> {
        Ok(text.to_string())
    }
}

/// Pipes text through an external program, e.g. `prettier --stdin-filepath {path}`.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    command: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_spec(spec: &FormatterSpec) -> Self {
        Self::new(spec.command.clone(), spec.args.clone())
    }

    fn args_for(&self, path: &Path) -> Vec<String> {
        let path = path.to_string_lossy();
        self.args.iter().map(|a| a.replace("{path}", &path)).collect()
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, text: &str, path: &Path) -> Result<String, GraftError> {
        let failed = |message: String| GraftError::FormatFailed {
            path: path.to_path_buf(),
            message,
        };

        let mut child = Command::new(&self.command)
            .args(self.args_for(path))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("could not start '{}': {}", self.command, e)))?;

        // Feed stdin from a thread so a formatter that streams output cannot
        // block on a full pipe.
        let stdin = child.stdin.take();
        let input = text.to_string();
        let writer = std::thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(()),
        });

        let output = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
        match writer.join() {
            Ok(result) => result.map_err(|e| failed(e.to_string()))?,
            Err(_) => return Err(failed("stdin writer panicked".into())),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!("exited with {}: {}", output.status, stderr.trim())));
        }

        String::from_utf8(output.stdout).map_err(|e| failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_formatter() {
        let text = "export class A {}\n";
        assert_eq!(NoopFormatter.format(text, Path::new("a.ts")).unwrap(), text);
    }

    #[test]
    fn test_path_placeholder() {
        let formatter = CommandFormatter::new("prettier", vec!["--stdin-filepath".into(), "{path}".into()]);
        assert_eq!(
            formatter.args_for(Path::new("src/a.ts")),
            vec!["--stdin-filepath", "src/a.ts"]
        );
    }

    #[test]
    fn test_missing_program_fails() {
        let formatter = CommandFormatter::new("graft-no-such-formatter", vec![]);
        let err = formatter.format("x", Path::new("a.ts")).unwrap_err();
        assert!(matches!(err, GraftError::FormatFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_formatter_pipes_text() {
        let formatter = CommandFormatter::new("cat", vec![]);
        assert_eq!(formatter.format("const a = 1;\n", Path::new("a.ts")).unwrap(), "const a = 1;\n");
    }
}
