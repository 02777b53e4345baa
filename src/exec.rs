//! Synchronous pdftk invocation and verdict policy.
//!
//! ## Why a blocking model?
//!
//! Each document performs at most one external-process invocation and that
//! invocation must complete before the document's output can feed another
//! command, so there is nothing to overlap: `std::process::Command` with
//! captured streams is the whole story. No timeout is modelled — a hang in
//! pdftk hangs the caller.
//!
//! ## Warning tolerance
//!
//! pdftk exits non-zero for recoverable conditions (repaired xref, dropped
//! duplicate keys) while still writing a usable output file. The verdict
//! policy in [`verdict`] converts such a run into a success only when *all*
//! of the following hold: an output path was requested, a file exists there,
//! the file is non-empty, and the caller opted in via
//! [`crate::ExecConfig::tolerate_warnings`].

use crate::error::{PdftkError, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Captured result of one pdftk invocation.
#[derive(Debug)]
pub struct ProcessOutcome {
    /// Whether the process reported success (exit status 0).
    pub success: bool,
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    /// The text recorded as the document's error message: stderr, falling
    /// back to stdout when stderr is empty.
    pub fn error_text(&self) -> String {
        let err = self.stderr.trim();
        if err.is_empty() {
            self.stdout.trim().to_string()
        } else {
            err.to_string()
        }
    }
}

/// Run the binary once with the given arguments, capturing both streams.
pub fn run(binary: &Path, args: &[OsString]) -> Result<ProcessOutcome> {
    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| PdftkError::SpawnFailed {
            binary: binary.to_path_buf(),
            source,
        })?;

    let outcome = ProcessOutcome {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(
        code = ?outcome.code,
        stdout_bytes = outcome.stdout.len(),
        stderr_bytes = outcome.stderr.len(),
        "pdftk exited"
    );
    Ok(outcome)
}

/// Apply the partial-failure tolerance policy to a finished run.
///
/// Success exit ⇒ success. Failure exit ⇒ success only if an output path was
/// requested, a non-empty file exists there, and the caller tolerates
/// warnings.
pub fn verdict(outcome: &ProcessOutcome, output: Option<&Path>, tolerate_warnings: bool) -> bool {
    if outcome.success {
        return true;
    }
    if !tolerate_warnings {
        return false;
    }
    let Some(path) = output else {
        return false;
    };
    match std::fs::metadata(path) {
        Ok(meta) => {
            let usable = meta.len() > 0;
            if usable {
                warn!(
                    code = ?outcome.code,
                    output = %path.display(),
                    "pdftk exited with warnings; accepting non-empty output"
                );
            }
            usable
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn outcome(success: bool) -> ProcessOutcome {
        ProcessOutcome {
            success,
            code: if success { Some(0) } else { Some(3) },
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn nonempty_file() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.4").unwrap();
        f
    }

    #[test]
    fn success_exit_is_success_regardless_of_output() {
        assert!(verdict(&outcome(true), None, false));
        assert!(verdict(&outcome(true), Some(Path::new("/nonexistent")), false));
    }

    #[test]
    fn failure_with_nonempty_output_and_tolerance_is_success() {
        let f = nonempty_file();
        assert!(verdict(&outcome(false), Some(f.path()), true));
    }

    #[test]
    fn failure_with_tolerance_disabled_stays_failure() {
        let f = nonempty_file();
        assert!(!verdict(&outcome(false), Some(f.path()), false));
    }

    #[test]
    fn failure_with_missing_output_stays_failure() {
        assert!(!verdict(
            &outcome(false),
            Some(Path::new("/no/such/file.pdf")),
            true
        ));
    }

    #[test]
    fn failure_with_empty_output_stays_failure() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert!(!verdict(&outcome(false), Some(f.path()), true));
    }

    #[test]
    fn failure_with_no_output_requested_stays_failure() {
        assert!(!verdict(&outcome(false), None, true));
    }

    #[test]
    fn error_text_prefers_stderr() {
        let o = ProcessOutcome {
            success: false,
            code: Some(1),
            stdout: "some stdout\n".into(),
            stderr: "Error: bad input\n".into(),
        };
        assert_eq!(o.error_text(), "Error: bad input");

        let o = ProcessOutcome {
            success: false,
            code: Some(1),
            stdout: "Error on stdout only\n".into(),
            stderr: String::new(),
        };
        assert_eq!(o.error_text(), "Error on stdout only");
    }
}
