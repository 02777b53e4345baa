//! # rpdftk
//!
//! Fluent builder and executor for the [pdftk] command-line toolkit.
//!
//! ## Why this crate?
//!
//! pdftk's command line is powerful but positional and easy to get wrong:
//! input handles, an `input_pw` section, one operation keyword, range tokens
//! with qualifiers and rotations, an `output` clause, and trailing options
//! all have to land in exactly the right order. This crate turns a chain of
//! document-manipulation calls into a single correctly-ordered invocation,
//! runs it synchronously, and interprets the outcome — including pdftk's
//! habit of exiting non-zero for recoverable warnings while still writing a
//! perfectly usable output file.
//!
//! ## Pipeline Overview
//!
//! ```text
//! configure ──▶ resolve ──▶ assemble ──▶ execute ──▶ interpret
//! (fluent calls) (nested docs, (argv in pdftk (one blocking (verdict +
//!                temp output)   order)         process)      error text)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rpdftk::{Document, Pages, Rotation};
//!
//! fn main() -> Result<(), rpdftk::PdftkError> {
//!     let mut doc = Document::new();
//!     doc.add_file("report.pdf", Some("A"), None)
//!         .add_file("scan.pdf", Some("B"), Some("open-password"))
//!         .cat(Pages::span(1, 12), Some("A"), None, None)
//!         .cat(Pages::All, Some("B"), None, Some(Rotation::East))
//!         .compress();
//!     doc.save_as("combined.pdf")?;
//!     Ok(())
//! }
//! ```
//!
//! Chaining documents — an executed document's output can feed another:
//!
//! ```rust,no_run
//! use rpdftk::{Document, Pages};
//!
//! # fn main() -> Result<(), rpdftk::PdftkError> {
//! let mut filled = Document::new();
//! filled.add_file("form.pdf", None, None).fill_form("data.fdf").flatten();
//!
//! let mut bundle = Document::new();
//! bundle.add_document(filled, Some("F"), None)
//!     .add_file("cover.pdf", Some("C"), None)
//!     .cat(Pages::All, Some("C"), None, None)
//!     .cat(Pages::All, Some("F"), None, None);
//! bundle.save_as("bundle.pdf")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `rpdftk` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! rpdftk = { version = "0.3", default-features = false }
//! ```
//!
//! ## Execution semantics
//!
//! * Each [`Document`] runs pdftk **at most once**; `execute()` rejects a
//!   second call, while `save_as`/`read_output`/dump getters replay the
//!   recorded verdict.
//! * Passwords never appear in logs: only a redacted command rendering is
//!   ever emitted through `tracing`.
//! * [`ExecConfig::tolerate_warnings`] opts into accepting a failure exit
//!   when a non-empty output file was still produced.
//!
//! [pdftk]: https://www.pdflabs.com/tools/pdftk-the-pdf-toolkit/

// ── Modules ──────────────────────────────────────────────────────────────

pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod exec;
pub mod handle;
pub mod operation;
pub mod options;
pub mod range;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExecConfig, ExecConfigBuilder};
pub use document::{Document, OutputTarget};
pub use error::{PdftkError, Result};
pub use handle::HandleAllocator;
pub use operation::Operation;
pub use options::{OptionEntry, OptionSet};
pub use range::{PageRange, PageRef, Pages, Qualifier, Rotation};
