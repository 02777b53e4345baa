//! Command assembly: turn a document's configuration into pdftk's exact
//! argument vector.
//!
//! pdftk's grammar is positional and order-sensitive:
//!
//! ```text
//! pdftk <H>=<path>... [input_pw <H>=<pw>...] [<operation> [<arg>]]
//!       [<range-token>...] [output <path>] [<option-token>...]
//! ```
//!
//! The assembler is a pure function over already-resolved inputs (nested
//! documents have been executed and realized to paths by the time it runs),
//! which keeps it independently testable against golden argument vectors.
//!
//! Two renderings are produced: the real argv handed to the process, and a
//! redacted display string safe for logs — input passwords and sensitive
//! options never appear in the latter.

use crate::error::{PdftkError, Result};
use crate::operation::Operation;
use crate::options::OptionSet;
use crate::range::PageRange;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One input file after dependency resolution: handle, realized path, and
/// optional open password.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub handle: String,
    pub path: PathBuf,
    pub password: Option<String>,
}

/// The assembled command: real argv plus a redacted rendering for logs.
#[derive(Debug)]
pub struct AssembledCommand {
    pub args: Vec<OsString>,
    /// Space-joined redacted form. The only rendering that may be logged.
    pub display: String,
}

/// Assemble the full pdftk argument vector.
///
/// `output` is `Some` for auto-temp and explicit targets, `None` when the
/// output argument is suppressed (dump operations). Enforces the
/// single-input rule for the operations that carry it.
pub fn assemble(
    inputs: &[ResolvedInput],
    operation: Option<&Operation>,
    ranges: &[PageRange],
    output: Option<&Path>,
    options: &OptionSet,
    legacy_rotation: bool,
) -> Result<AssembledCommand> {
    if let Some(op) = operation {
        if op.requires_single_input() && inputs.len() != 1 {
            return Err(PdftkError::SingleInputRequired {
                operation: op.keyword().to_string(),
                count: inputs.len(),
            });
        }
    }

    let mut args: Vec<OsString> = Vec::new();
    let mut display: Vec<String> = Vec::new();

    // Input files: H=path.
    for input in inputs {
        let mut token = OsString::from(format!("{}=", input.handle));
        token.push(input.path.as_os_str());
        args.push(token);
        display.push(format!("{}={}", input.handle, input.path.display()));
    }

    // Open passwords: one input_pw section with H=password entries.
    if inputs.iter().any(|i| i.password.is_some()) {
        args.push("input_pw".into());
        display.push("input_pw".into());
        for input in inputs {
            if let Some(pw) = &input.password {
                args.push(format!("{}={}", input.handle, pw).into());
                display.push(format!("{}=[hidden]", input.handle));
            }
        }
    }

    // Operation keyword and argument. No operation means pdftk filter mode.
    if let Some(op) = operation {
        args.push(op.keyword().into());
        display.push(op.keyword().to_string());
        if let Some(arg) = op.argument() {
            args.push(arg.as_os_str().to_os_string());
            display.push(arg.display().to_string());
        }

        // Range tokens apply only to cat/shuffle.
        if op.takes_ranges() {
            let default_handle = if inputs.len() == 1 {
                Some(inputs[0].handle.as_str())
            } else {
                None
            };
            for range in ranges {
                for token in range.render(default_handle, inputs.len(), legacy_rotation)? {
                    args.push(token.clone().into());
                    display.push(token);
                }
            }
        }
    }

    if let Some(path) = output {
        args.push("output".into());
        args.push(path.as_os_str().to_os_string());
        display.push("output".into());
        display.push(path.display().to_string());
    }

    for token in options.args() {
        args.push(token.into());
    }
    display.extend(options.redacted());

    Ok(AssembledCommand {
        args,
        display: display.join(" "),
    })
}
