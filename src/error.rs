//! Error types for the rpdftk library.
//!
//! Every failure the crate can produce falls into one of four families:
//!
//! * **Contract violations** — caller misuse detectable before pdftk is ever
//!   spawned: a multi-input document handed to a single-input operation, a
//!   page range with no resolvable handle, a second `execute()` on a document
//!   that already ran. Surfaced immediately, never retried.
//!
//! * **Dependency failures** — a nested document used as an input failed to
//!   execute; propagated as the consumer's own precondition failure before
//!   any command is assembled.
//!
//! * **Execution failures** — pdftk exited with a failure status and the
//!   warning-tolerance conditions were not met, or it could not be spawned
//!   at all. The captured stderr/stdout text is the retrievable message.
//!
//! * **I/O failures** — post-execution file operations (copying to a
//!   caller-given destination, reading the realized output for streaming)
//!   failed independently of the process verdict.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rpdftk operations.
pub type Result<T> = std::result::Result<T, PdftkError>;

/// All errors returned by the rpdftk library.
#[derive(Debug, Error)]
pub enum PdftkError {
    // ── Contract violations ───────────────────────────────────────────────
    /// The selected operation works on exactly one input file.
    #[error(
        "Operation '{operation}' requires exactly one input file, but {count} are registered"
    )]
    SingleInputRequired { operation: String, count: usize },

    /// A page range omitted its handle and the registry has no unique default.
    #[error(
        "Page range has no handle and the document has {inputs} input file(s)\n\
         A handle can only be defaulted when exactly one file is registered."
    )]
    MissingHandle { inputs: usize },

    /// `execute()` was called on a document that already ran.
    #[error("Document was already executed; each document runs pdftk at most once")]
    AlreadyExecuted,

    /// `save_as`/`read_output` on a document whose output was suppressed.
    #[error("Document produced no output file (dump operations write to stdout only)")]
    NothingToSave,

    // ── Dependency failures ───────────────────────────────────────────────
    /// A nested document registered as input '{handle}' failed to execute.
    #[error("Input document '{handle}' failed to execute: {message}")]
    UpstreamFailed { handle: String, message: String },

    // ── Execution failures ────────────────────────────────────────────────
    /// The pdftk binary could not be spawned at all.
    #[error(
        "Failed to run '{binary}': {source}\n\
         Is pdftk installed and on PATH? Override the binary with ExecConfig::binary()."
    )]
    SpawnFailed {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// pdftk exited with a failure status and warning tolerance did not apply.
    #[error("pdftk failed: {message}")]
    ExecutionFailed { message: String },

    // ── I/O failures ──────────────────────────────────────────────────────
    /// Could not allocate the temporary output file.
    #[error("Failed to create temporary output file: {source}")]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    /// Copying the realized output to the caller's destination failed.
    #[error("Failed to save output to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the realized output file back failed.
    #[error("Failed to read output file '{path}': {source}")]
    ReadOutputFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_input_display_names_operation_and_count() {
        let e = PdftkError::SingleInputRequired {
            operation: "burst".into(),
            count: 2,
        };
        let msg = e.to_string();
        assert!(msg.contains("burst"), "got: {msg}");
        assert!(msg.contains('2'), "got: {msg}");
    }

    #[test]
    fn missing_handle_display() {
        let e = PdftkError::MissingHandle { inputs: 3 };
        assert!(e.to_string().contains("3 input file(s)"));
    }

    #[test]
    fn execution_failed_carries_message() {
        let e = PdftkError::ExecutionFailed {
            message: "Error: Unable to find file.".into(),
        };
        assert!(e.to_string().contains("Unable to find file"));
    }
}
