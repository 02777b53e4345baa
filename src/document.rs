//! The public chainable document facade.
//!
//! A [`Document`] accumulates input files, one operation, page ranges, and
//! options through fluent calls, then runs pdftk exactly once and owns the
//! result:
//!
//! ```rust,no_run
//! use rpdftk::{Document, Pages};
//!
//! # fn main() -> Result<(), rpdftk::PdftkError> {
//! let mut doc = Document::new();
//! doc.add_file("report.pdf", Some("A"), None)
//!     .add_file("appendix.pdf", Some("B"), None)
//!     .cat(Pages::span(1, 12), Some("A"), None, None)
//!     .cat(Pages::All, Some("B"), None, None);
//! doc.save_as("combined.pdf")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Execution model
//!
//! Configuration is deferred; nothing touches the filesystem or spawns a
//! process until `execute()`, `save_as()`, `read_output()`, a dump getter,
//! or an immediate operation (`burst`, `generate_fdf`) forces a run. A
//! document runs pdftk **at most once**: the public [`Document::execute`]
//! rejects a second call outright, while the internal path used by
//! `save_as`/dumps simply replays the recorded verdict.
//!
//! ## Nested documents
//!
//! Another `Document` can be registered as an input. The consumer takes
//! ownership, so the upstream's temporary output file cannot be released
//! while still referenced, and triggers the upstream's execution (exactly
//! once) before assembling its own command. An upstream failure surfaces as
//! [`PdftkError::UpstreamFailed`] without spawning anything downstream.

use crate::command::{assemble, ResolvedInput};
use crate::config::ExecConfig;
use crate::error::{PdftkError, Result};
use crate::exec;
use crate::handle::HandleAllocator;
use crate::operation::Operation;
use crate::options::OptionSet;
use crate::range::{PageRange, Pages, Qualifier, Rotation};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Where the assembled command sends its output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Allocate a temporary file owned by the document (default).
    #[default]
    AutoTemp,
    /// A caller-given path (or burst filename pattern).
    Path(PathBuf),
    /// No `output` argument at all; used by dump operations.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecState {
    NotStarted,
    Done(bool),
}

#[derive(Debug)]
enum Source {
    Path(PathBuf),
    /// An upstream document whose realized output becomes this input. Owned
    /// so its temp file stays alive as long as this registry references it.
    Document(Box<Document>),
}

#[derive(Debug)]
struct InputFile {
    handle: String,
    password: Option<String>,
    source: Source,
}

/// Per-variant dump cache. `None` means never computed; `Some("")` means
/// computed and legitimately empty — the two are distinct on purpose.
#[derive(Debug, Default)]
struct DumpCache {
    data: Option<String>,
    data_utf8: Option<String>,
    fields: Option<String>,
    fields_utf8: Option<String>,
}

/// A single pdftk invocation under construction, and its result once run.
#[derive(Debug)]
pub struct Document {
    config: ExecConfig,
    allocator: HandleAllocator,
    inputs: Vec<InputFile>,
    operation: Option<Operation>,
    ranges: Vec<PageRange>,
    options: OptionSet,
    output: OutputTarget,
    state: ExecState,
    /// Keeps the auto-allocated output alive for the document's lifetime.
    temp_output: Option<NamedTempFile>,
    output_path: Option<PathBuf>,
    captured_stdout: String,
    error: Option<String>,
    dumps: DumpCache,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with the default [`ExecConfig`].
    pub fn new() -> Self {
        Self::with_config(ExecConfig::default())
    }

    /// Create a document with an explicit configuration.
    pub fn with_config(config: ExecConfig) -> Self {
        Self {
            config,
            allocator: HandleAllocator::new(),
            inputs: Vec::new(),
            operation: None,
            ranges: Vec::new(),
            options: OptionSet::new(),
            output: OutputTarget::default(),
            state: ExecState::NotStarted,
            temp_output: None,
            output_path: None,
            captured_stdout: String::new(),
            error: None,
            dumps: DumpCache::default(),
        }
    }

    // ── File registry ─────────────────────────────────────────────────────

    /// Register an input file under `handle`, or under the next
    /// auto-generated handle (A, B, …) when `handle` is `None`.
    ///
    /// The allocator does not check caller-supplied handles: explicitly
    /// registering "B" and later relying on auto-allocation can produce a
    /// duplicate, which pdftk itself rejects at run time.
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        handle: Option<&str>,
        password: Option<&str>,
    ) -> &mut Self {
        let handle = handle
            .map(String::from)
            .unwrap_or_else(|| self.allocator.next_handle());
        self.inputs.push(InputFile {
            handle,
            password: password.map(String::from),
            source: Source::Path(path.as_ref().to_path_buf()),
        });
        self
    }

    /// Register another document's output as an input file.
    ///
    /// Takes ownership of `document`; it is executed (if it has not yet run)
    /// the first time this document assembles its command.
    pub fn add_document(
        &mut self,
        document: Document,
        handle: Option<&str>,
        password: Option<&str>,
    ) -> &mut Self {
        let handle = handle
            .map(String::from)
            .unwrap_or_else(|| self.allocator.next_handle());
        self.inputs.push(InputFile {
            handle,
            password: password.map(String::from),
            source: Source::Document(Box::new(document)),
        });
        self
    }

    /// Number of registered input files.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Handles of the registered inputs, in registration order.
    pub fn handles(&self) -> Vec<&str> {
        self.inputs.iter().map(|i| i.handle.as_str()).collect()
    }

    // ── Assembly operations (deferred) ────────────────────────────────────

    /// Append a `cat` page range. Sets the operation to `cat`, overwriting
    /// any previously selected operation (last write wins).
    pub fn cat(
        &mut self,
        pages: Pages,
        handle: Option<&str>,
        qualifier: Option<Qualifier>,
        rotation: Option<Rotation>,
    ) -> &mut Self {
        self.operation = Some(Operation::Cat);
        self.ranges.push(PageRange::new(
            pages,
            handle.map(String::from),
            qualifier,
            rotation,
        ));
        self
    }

    /// Append a `shuffle` page range (collate one page at a time from each
    /// range). Overwrites any previously selected operation.
    pub fn shuffle(
        &mut self,
        pages: Pages,
        handle: Option<&str>,
        qualifier: Option<Qualifier>,
        rotation: Option<Rotation>,
    ) -> &mut Self {
        self.operation = Some(Operation::Shuffle);
        self.ranges.push(PageRange::new(
            pages,
            handle.map(String::from),
            qualifier,
            rotation,
        ));
        self
    }

    // ── Form and overlay operations (deferred) ────────────────────────────

    /// Fill the form fields of the single input from an FDF/XFDF file.
    pub fn fill_form(&mut self, fdf: impl AsRef<Path>) -> &mut Self {
        self.operation = Some(Operation::FillForm(fdf.as_ref().to_path_buf()));
        self
    }

    /// Apply `background` underneath every page of the single input.
    pub fn background(&mut self, pdf: impl AsRef<Path>) -> &mut Self {
        self.operation = Some(Operation::Background(pdf.as_ref().to_path_buf()));
        self
    }

    /// Apply a multi-page background, page for page.
    pub fn multi_background(&mut self, pdf: impl AsRef<Path>) -> &mut Self {
        self.operation = Some(Operation::Multibackground(pdf.as_ref().to_path_buf()));
        self
    }

    /// Stamp `stamp` on top of every page of the single input.
    pub fn stamp(&mut self, pdf: impl AsRef<Path>) -> &mut Self {
        self.operation = Some(Operation::Stamp(pdf.as_ref().to_path_buf()));
        self
    }

    /// Stamp a multi-page overlay, page for page.
    pub fn multi_stamp(&mut self, pdf: impl AsRef<Path>) -> &mut Self {
        self.operation = Some(Operation::Multistamp(pdf.as_ref().to_path_buf()));
        self
    }

    // ── Single-shot operations (execute immediately) ──────────────────────

    /// Split the single input into one file per page and execute now.
    ///
    /// `pattern` is a printf-style filename pattern; defaults to pdftk's
    /// conventional `pg_%04d.pdf`.
    pub fn burst(&mut self, pattern: Option<&str>) -> Result<()> {
        self.operation = Some(Operation::Burst);
        self.output = OutputTarget::Path(PathBuf::from(pattern.unwrap_or("pg_%04d.pdf")));
        self.execute()
    }

    /// Write an FDF description of the single input's form fields to `path`
    /// and execute now.
    pub fn generate_fdf(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.operation = Some(Operation::GenerateFdf);
        self.output = OutputTarget::Path(path.as_ref().to_path_buf());
        self.execute()
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Set the permission list applied with encryption, e.g.
    /// `"Printing CopyContents"`.
    pub fn allow(&mut self, permissions: &str) -> &mut Self {
        self.options.set_value("allow", permissions, false);
        self
    }

    /// Set the owner password. Sensitive: excluded from all diagnostics.
    pub fn owner_pw(&mut self, password: &str) -> &mut Self {
        self.options.set_value("owner_pw", password, true);
        self
    }

    /// Set the user (open) password. Sensitive: excluded from all
    /// diagnostics.
    pub fn user_pw(&mut self, password: &str) -> &mut Self {
        self.options.set_value("user_pw", password, true);
        self
    }

    /// Make viewers regenerate field appearances. Advisory: do not combine
    /// with [`Document::flatten`].
    pub fn need_appearances(&mut self) -> &mut Self {
        self.options.push_flag("need_appearances");
        self
    }

    /// Merge form fields into the page content.
    pub fn flatten(&mut self) -> &mut Self {
        self.options.push_flag("flatten");
        self
    }

    pub fn compress(&mut self) -> &mut Self {
        self.options.push_flag("compress");
        self
    }

    pub fn uncompress(&mut self) -> &mut Self {
        self.options.push_flag("uncompress");
        self
    }

    pub fn keep_first_id(&mut self) -> &mut Self {
        self.options.push_flag("keep_first_id");
        self
    }

    pub fn keep_final_id(&mut self) -> &mut Self {
        self.options.push_flag("keep_final_id");
        self
    }

    pub fn drop_xfa(&mut self) -> &mut Self {
        self.options.push_flag("drop_xfa");
        self
    }

    pub fn drop_xmp(&mut self) -> &mut Self {
        self.options.push_flag("drop_xmp");
        self
    }

    pub fn encrypt_40bit(&mut self) -> &mut Self {
        self.options.push_flag("encrypt_40bit");
        self
    }

    pub fn encrypt_128bit(&mut self) -> &mut Self {
        self.options.push_flag("encrypt_128bit");
        self
    }

    /// Send output to an explicit path instead of an auto temp file.
    pub fn output(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.output = OutputTarget::Path(path.as_ref().to_path_buf());
        self
    }

    // ── Execution ─────────────────────────────────────────────────────────

    /// Run pdftk once with the assembled command.
    ///
    /// Strict at-most-once: after any prior run — successful or not — this
    /// returns [`PdftkError::AlreadyExecuted`] without spawning a second
    /// process. Contract violations detected before the spawn (single-input
    /// rule, missing range handle) leave the document un-executed so the
    /// caller can correct and retry.
    pub fn execute(&mut self) -> Result<()> {
        if self.state != ExecState::NotStarted {
            return Err(PdftkError::AlreadyExecuted);
        }
        self.run()
    }

    /// Idempotent execution used by everything that needs a realized result:
    /// first caller triggers the run, later callers replay the verdict.
    fn ensure_executed(&mut self) -> Result<()> {
        match self.state {
            ExecState::NotStarted => self.run(),
            ExecState::Done(true) => Ok(()),
            ExecState::Done(false) => Err(PdftkError::ExecutionFailed {
                message: self
                    .error
                    .clone()
                    .unwrap_or_else(|| "previous execution failed".to_string()),
            }),
        }
    }

    fn run(&mut self) -> Result<()> {
        // Upstream documents complete strictly before this command is
        // assembled. ensure_executed keeps each upstream run to exactly one
        // process invocation across repeated assemblies.
        let mut resolved = Vec::with_capacity(self.inputs.len());
        for input in &mut self.inputs {
            let path = match &mut input.source {
                Source::Path(p) => p.clone(),
                Source::Document(doc) => {
                    doc.ensure_executed()
                        .map_err(|e| PdftkError::UpstreamFailed {
                            handle: input.handle.clone(),
                            message: e.to_string(),
                        })?;
                    match doc.output_path() {
                        Some(p) => p.to_path_buf(),
                        None => {
                            return Err(PdftkError::UpstreamFailed {
                                handle: input.handle.clone(),
                                message: "upstream document produced no output file".to_string(),
                            })
                        }
                    }
                }
            };
            resolved.push(ResolvedInput {
                handle: input.handle.clone(),
                path,
                password: input.password.clone(),
            });
        }

        let out_path: Option<PathBuf> = match &self.output {
            OutputTarget::Suppressed => None,
            OutputTarget::Path(p) => Some(p.clone()),
            OutputTarget::AutoTemp => {
                let tmp = tempfile::Builder::new()
                    .prefix("rpdftk-")
                    .suffix(".pdf")
                    .tempfile()
                    .map_err(|source| PdftkError::TempFile { source })?;
                let path = tmp.path().to_path_buf();
                self.temp_output = Some(tmp);
                Some(path)
            }
        };

        let cmd = assemble(
            &resolved,
            self.operation.as_ref(),
            &self.ranges,
            out_path.as_deref(),
            &self.options,
            self.config.legacy_rotation,
        )?;
        debug!(
            binary = %self.config.binary.display(),
            command = %cmd.display,
            "invoking pdftk"
        );

        let outcome = match exec::run(&self.config.binary, &cmd.args) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = ExecState::Done(false);
                self.error = Some(e.to_string());
                self.output_path = out_path;
                return Err(e);
            }
        };

        let ok = exec::verdict(&outcome, out_path.as_deref(), self.config.tolerate_warnings);
        self.state = ExecState::Done(ok);
        self.output_path = out_path;
        self.captured_stdout = outcome.stdout.clone();

        if ok {
            info!(code = ?outcome.code, "pdftk run succeeded");
            Ok(())
        } else {
            let message = outcome.error_text();
            self.error = Some(message.clone());
            Err(PdftkError::ExecutionFailed { message })
        }
    }

    // ── Result retrieval ──────────────────────────────────────────────────

    /// Path of the realized output file, once executed. `None` before
    /// execution and for dump-only documents.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// The terminal error message recorded by a failed run.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether this document has already run pdftk.
    pub fn is_executed(&self) -> bool {
        self.state != ExecState::NotStarted
    }

    /// Execute if needed, then **copy** the realized output to `path`.
    ///
    /// Copying (rather than moving) keeps the document's own output intact,
    /// so repeated `save_as` calls and downstream consumers both work. A
    /// copy failure is [`PdftkError::SaveFailed`], distinct from any
    /// execution failure.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_executed()?;
        let src = self.output_path.clone().ok_or(PdftkError::NothingToSave)?;
        let dest = path.as_ref();
        std::fs::copy(&src, dest).map_err(|source| PdftkError::SaveFailed {
            path: dest.to_path_buf(),
            source,
        })?;
        info!(from = %src.display(), to = %dest.display(), "saved output");
        Ok(())
    }

    /// Execute if needed, then read the realized output into memory for
    /// streaming to a client.
    pub fn read_output(&mut self) -> Result<Vec<u8>> {
        self.ensure_executed()?;
        let src = self.output_path.clone().ok_or(PdftkError::NothingToSave)?;
        std::fs::read(&src).map_err(|source| PdftkError::ReadOutputFailed { path: src, source })
    }

    // ── Dumps ─────────────────────────────────────────────────────────────

    /// Dump document metadata (`dump_data`). Cached per encoding variant.
    pub fn get_data(&mut self) -> Result<&str> {
        self.dump(Operation::DumpData { utf8: false })
    }

    /// Dump document metadata as UTF-8 (`dump_data_utf8`).
    pub fn get_data_utf8(&mut self) -> Result<&str> {
        self.dump(Operation::DumpData { utf8: true })
    }

    /// Dump form-field descriptions (`dump_data_fields`).
    pub fn get_data_fields(&mut self) -> Result<&str> {
        self.dump(Operation::DumpDataFields { utf8: false })
    }

    /// Dump form-field descriptions as UTF-8 (`dump_data_fields_utf8`).
    pub fn get_data_fields_utf8(&mut self) -> Result<&str> {
        self.dump(Operation::DumpDataFields { utf8: true })
    }

    /// Run a dump operation once and cache its trimmed stdout.
    ///
    /// The cache distinguishes never-computed (`None`) from computed-but-
    /// empty (`Some("")`). Selecting a dump overwrites any previously set
    /// operation and suppresses the output argument; since a document runs
    /// at most once, asking for a second *different* dump on the same
    /// document fails with [`PdftkError::AlreadyExecuted`].
    fn dump(&mut self, op: Operation) -> Result<&str> {
        if self.dump_slot(&op).is_none() {
            self.operation = Some(op.clone());
            self.output = OutputTarget::Suppressed;
            self.execute()?;
            let text = self.captured_stdout.trim().to_string();
            *self.dump_slot_mut(&op) = Some(text);
        }
        Ok(self.dump_slot(&op).as_deref().unwrap_or_default())
    }

    fn dump_slot(&self, op: &Operation) -> &Option<String> {
        match op {
            Operation::DumpData { utf8: false } => &self.dumps.data,
            Operation::DumpData { utf8: true } => &self.dumps.data_utf8,
            Operation::DumpDataFields { utf8: false } => &self.dumps.fields,
            Operation::DumpDataFields { utf8: true } => &self.dumps.fields_utf8,
            _ => unreachable!("dump_slot called with a non-dump operation"),
        }
    }

    fn dump_slot_mut(&mut self, op: &Operation) -> &mut Option<String> {
        match op {
            Operation::DumpData { utf8: false } => &mut self.dumps.data,
            Operation::DumpData { utf8: true } => &mut self.dumps.data_utf8,
            Operation::DumpDataFields { utf8: false } => &mut self.dumps.fields,
            Operation::DumpDataFields { utf8: true } => &mut self.dumps.fields_utf8,
            _ => unreachable!("dump_slot_mut called with a non-dump operation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_handles_follow_allocator_sequence() {
        let mut doc = Document::new();
        doc.add_file("a.pdf", None, None)
            .add_file("b.pdf", Some("X"), None)
            .add_file("c.pdf", None, None);
        // Caller-supplied handles do not advance the allocator.
        assert_eq!(doc.handles(), vec!["A", "X", "B"]);
    }

    #[test]
    fn cat_then_shuffle_overwrites_operation_keeping_ranges() {
        let mut doc = Document::new();
        doc.add_file("a.pdf", None, None)
            .cat(Pages::span(1, 3), None, None, None)
            .shuffle(Pages::All, None, None, None);
        assert_eq!(doc.operation, Some(Operation::Shuffle));
        assert_eq!(doc.ranges.len(), 2);
    }

    #[test]
    fn burst_with_two_inputs_fails_before_any_spawn() {
        let mut doc = Document::new();
        doc.add_file("a.pdf", None, None).add_file("b.pdf", None, None);
        let err = doc.burst(None).unwrap_err();
        assert!(matches!(
            err,
            PdftkError::SingleInputRequired { count: 2, .. }
        ));
        // Contract violations leave the document un-executed.
        assert!(!doc.is_executed());
    }

    #[test]
    fn execute_on_missing_binary_records_terminal_failure() {
        let config = ExecConfig::builder()
            .binary("/nonexistent/rpdftk-test-binary")
            .build();
        let mut doc = Document::with_config(config);
        doc.add_file("a.pdf", None, None)
            .cat(Pages::All, None, None, None);

        let err = doc.execute().unwrap_err();
        assert!(matches!(err, PdftkError::SpawnFailed { .. }));
        assert!(doc.is_executed());
        assert!(doc.error_message().is_some());

        // Second attempt is rejected without retrying the spawn.
        let err = doc.execute().unwrap_err();
        assert!(matches!(err, PdftkError::AlreadyExecuted));
    }

    #[test]
    fn option_helpers_accumulate_in_call_order() {
        let mut doc = Document::new();
        doc.add_file("a.pdf", None, None)
            .flatten()
            .owner_pw("s")
            .allow("Printing")
            .encrypt_128bit();
        assert_eq!(
            doc.options.args(),
            vec!["flatten", "owner_pw", "s", "allow", "Printing", "encrypt_128bit"]
        );
    }

    #[test]
    fn save_as_without_output_file_is_nothing_to_save() {
        // A document that already "ran" a dump has no output path.
        let mut doc = Document::new();
        doc.state = ExecState::Done(true);
        doc.output_path = None;
        let err = doc.save_as("out.pdf").unwrap_err();
        assert!(matches!(err, PdftkError::NothingToSave));
    }
}
