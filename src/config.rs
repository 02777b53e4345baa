//! Execution configuration.
//!
//! Everything that changes *how* a document runs pdftk — which binary, which
//! rotation-token dialect, whether a warning exit still counts as success —
//! lives in one [`ExecConfig`] struct built via its builder. Keeping the
//! knobs together makes configs trivial to share across documents and to
//! diff when two runs behave differently.

use std::path::{Path, PathBuf};

/// Configuration shared by [`crate::Document`] instances.
///
/// # Example
/// ```rust
/// use rpdftk::ExecConfig;
///
/// let config = ExecConfig::builder()
///     .binary("/usr/local/bin/pdftk")
///     .tolerate_warnings(true)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Path or name of the pdftk binary. Default: `pdftk` (resolved via
    /// `PATH`).
    pub binary: PathBuf,

    /// Emit legacy single-letter rotation tokens (`N E S W L R D`) instead
    /// of the word form. Needed for pdftk ≤ 1.44. Default: false.
    pub legacy_rotation: bool,

    /// Treat a failure exit as success when a non-empty output file was
    /// still produced. Default: false.
    ///
    /// pdftk reports recoverable conditions (repaired xref tables, dropped
    /// duplicate dictionary keys) with a warning exit code while writing a
    /// perfectly usable output. Enabling this accepts such runs; the exit
    /// status alone then no longer decides the verdict.
    pub tolerate_warnings: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("pdftk"),
            legacy_rotation: false,
            tolerate_warnings: false,
        }
    }
}

impl ExecConfig {
    /// Create a new builder for `ExecConfig`.
    pub fn builder() -> ExecConfigBuilder {
        ExecConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExecConfig`].
#[derive(Debug)]
pub struct ExecConfigBuilder {
    config: ExecConfig,
}

impl ExecConfigBuilder {
    pub fn binary(mut self, binary: impl AsRef<Path>) -> Self {
        self.config.binary = binary.as_ref().to_path_buf();
        self
    }

    pub fn legacy_rotation(mut self, v: bool) -> Self {
        self.config.legacy_rotation = v;
        self
    }

    pub fn tolerate_warnings(mut self, v: bool) -> Self {
        self.config.tolerate_warnings = v;
        self
    }

    pub fn build(self) -> ExecConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ExecConfig::default();
        assert_eq!(c.binary, PathBuf::from("pdftk"));
        assert!(!c.legacy_rotation);
        assert!(!c.tolerate_warnings);
    }

    #[test]
    fn builder_overrides() {
        let c = ExecConfig::builder()
            .binary("/opt/pdftk/bin/pdftk")
            .legacy_rotation(true)
            .tolerate_warnings(true)
            .build();
        assert_eq!(c.binary, PathBuf::from("/opt/pdftk/bin/pdftk"));
        assert!(c.legacy_rotation);
        assert!(c.tolerate_warnings);
    }
}
