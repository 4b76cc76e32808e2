use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use spdlog::debug;

use crate::content::converter::{ConversionError, MarkupConverter};

const PANDOC_ARGS: [&str; 5] = ["-f", "markdown", "-t", "html", "--mathml"];

/// Runs an external converter: markup on stdin, HTML on stdout, diagnostics on
/// stderr. The child runs inside `base_dir`; our own working directory is never touched.
pub struct CommandConverter {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandConverter {
    pub fn pandoc(program: &str) -> Self {
        CommandConverter {
            program: program.to_string(),
            args: PANDOC_ARGS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl MarkupConverter for CommandConverter {
    fn convert(&self, markup: &str, base_dir: &Path) -> Result<String, ConversionError> {
        debug!("Running {} {:?} in {}", self.program, self.args, base_dir.display());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(base_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConversionError(format!("Could not run {}: {}", self.program, e)))?;

        // The converter reads its whole input before writing anything, so
        // filling stdin first cannot deadlock on a full stdout pipe.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(markup.as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(ConversionError(format!("Error writing to {}: {}", self.program, e)));
                }
            }
        }

        let output = child.wait_with_output()
            .map_err(|e| ConversionError(format!("Error waiting for {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let diagnostic = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(ConversionError(diagnostic));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn command(program: &str, args: &[&str]) -> CommandConverter {
        CommandConverter {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_output_is_returned_as_is() {
        let converter = command("cat", &[]);
        let html = converter.convert("<p>already html</p>\n", Path::new("/")).unwrap();
        assert_eq!(html, "<p>already html</p>\n");
    }

    #[test]
    fn test_runs_inside_base_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let converter = command("pwd", &[]);
        let out = converter.convert("", tmp.path()).unwrap();
        let expected = tmp.path().canonicalize().unwrap();
        assert_eq!(Path::new(out.trim()).canonicalize().unwrap(), expected);
    }

    #[test]
    fn test_stderr_becomes_diagnostic() {
        let converter = command("sh", &["-c", "echo 'bad math' >&2; exit 3"]);
        let err = converter.convert("$x$", Path::new("/")).unwrap_err();
        assert_eq!(err, ConversionError("bad math".to_string()));
    }

    #[test]
    fn test_silent_failure_reports_status() {
        let converter = command("false", &[]);
        let err = converter.convert("text", Path::new("/")).unwrap_err();
        assert!(err.0.starts_with("false exited with"));
    }

    #[test]
    fn test_missing_program() {
        let converter = CommandConverter::pandoc("definitely-not-a-converter-binary");
        let err = converter.convert("text", Path::new("/")).unwrap_err();
        assert!(err.0.contains("Could not run definitely-not-a-converter-binary"));
    }
}
