//! CLI binary for rpdftk.
//!
//! A thin shim over the library crate that maps subcommands and flags to a
//! [`Document`] and prints results.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rpdftk::{Document, ExecConfig, PageRange, PageRef, Pages, Qualifier, Rotation};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Concatenate two files
  rpdftk cat a.pdf b.pdf -o combined.pdf

  # Pages 1-12 of A, then all of B rotated east
  rpdftk cat A=a.pdf B=b.pdf --range A1-12 --range Beast -o out.pdf

  # Reversed odd pages (descending ranges are a feature, not an error)
  rpdftk cat a.pdf --range 12-1odd -o reversed.pdf

  # Collate scanned fronts and backs
  rpdftk shuffle A=fronts.pdf B=backs.pdf --range A --range Bend-1 -o book.pdf

  # Split into one file per page
  rpdftk burst report.pdf --pattern 'page_%02d.pdf'

  # Fill a form and flatten it
  rpdftk fill-form form.pdf data.fdf -o filled.pdf --flatten

  # Stamp a letterhead under every page
  rpdftk background letter.pdf letterhead.pdf -o final.pdf

  # Dump metadata / form fields
  rpdftk dump-data report.pdf --utf8
  rpdftk dump-fields form.pdf

RANGE TOKENS:
  [HANDLE][start[-end]][odd|even][rotation]
  where rotation is one of: north east south west left right down.
  Omitting pages selects the handle's full range; start > end reverses
  the page order. With a single input the handle may be omitted.

ENVIRONMENT VARIABLES:
  RPDFTK_BINARY       Path to the pdftk binary (default: pdftk on PATH)
  RPDFTK_OWNER_PW     Owner password applied to the output
  RPDFTK_USER_PW      User (open) password applied to the output
"#;

/// Drive the pdftk toolkit with checked, correctly-ordered command lines.
#[derive(Parser, Debug)]
#[command(
    name = "rpdftk",
    version,
    about = "Concatenate, shuffle, split, fill, stamp, and inspect PDFs via pdftk",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the pdftk binary.
    #[arg(long, global = true, env = "RPDFTK_BINARY", default_value = "pdftk")]
    binary: PathBuf,

    /// Emit legacy single-letter rotation tokens (pdftk <= 1.44).
    #[arg(long, global = true)]
    legacy_rotation: bool,

    /// Accept a pdftk warning exit when a non-empty output was produced.
    #[arg(long, global = true)]
    tolerate_warnings: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Concatenate pages from one or more inputs.
    Cat(AssembleArgs),
    /// Collate pages, one at a time from each range in turn.
    Shuffle(AssembleArgs),
    /// Split a single input into one file per page.
    Burst {
        /// Input file, optionally HANDLE=path.
        input: String,
        /// printf-style output filename pattern.
        #[arg(long, default_value = "pg_%04d.pdf")]
        pattern: String,
        /// Password for an encrypted input.
        #[arg(long)]
        password: Option<String>,
    },
    /// Fill form fields from an FDF/XFDF file.
    FillForm {
        /// Input form PDF, optionally HANDLE=path.
        input: String,
        /// FDF or XFDF data file.
        data: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Merge the filled fields into the page content.
        #[arg(long)]
        flatten: bool,
        /// Make viewers regenerate field appearances.
        #[arg(long, conflicts_with = "flatten")]
        need_appearances: bool,
        /// Remove the XFA form layer.
        #[arg(long)]
        drop_xfa: bool,
        /// Password for an encrypted input.
        #[arg(long)]
        password: Option<String>,
    },
    /// Stamp an overlay on top of every page.
    Stamp(OverlayArgs),
    /// Apply a background underneath every page.
    Background(OverlayArgs),
    /// Dump document metadata to stdout.
    DumpData {
        input: String,
        #[arg(long)]
        utf8: bool,
        #[arg(long)]
        password: Option<String>,
    },
    /// Dump form-field descriptions to stdout.
    DumpFields {
        input: String,
        #[arg(long)]
        utf8: bool,
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Args, Debug)]
struct AssembleArgs {
    /// Input files, each optionally HANDLE=path.
    #[arg(required = true)]
    inputs: Vec<String>,

    #[arg(short, long)]
    output: PathBuf,

    /// Page-range token (repeatable); see RANGE TOKENS in --help.
    #[arg(long = "range")]
    ranges: Vec<String>,

    /// Owner password applied to the output.
    #[arg(long, env = "RPDFTK_OWNER_PW", hide_env_values = true)]
    owner_pw: Option<String>,

    /// User (open) password applied to the output.
    #[arg(long, env = "RPDFTK_USER_PW", hide_env_values = true)]
    user_pw: Option<String>,

    /// Permission list applied with encryption, e.g. "Printing".
    #[arg(long)]
    allow: Option<String>,

    /// Use 128-bit output encryption.
    #[arg(long)]
    encrypt_128bit: bool,

    /// Recompress page streams in the output.
    #[arg(long)]
    compress: bool,
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// Input file, optionally HANDLE=path.
    input: String,
    /// Overlay/background PDF.
    overlay: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    /// Apply the overlay page for page instead of repeating page one.
    #[arg(long)]
    multi: bool,
    /// Password for an encrypted input.
    #[arg(long)]
    password: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = ExecConfig::builder()
        .binary(&cli.binary)
        .legacy_rotation(cli.legacy_rotation)
        .tolerate_warnings(cli.tolerate_warnings)
        .build();

    match cli.command {
        Command::Cat(args) => assemble(config, args, false),
        Command::Shuffle(args) => assemble(config, args, true),
        Command::Burst {
            input,
            pattern,
            password,
        } => {
            let mut doc = Document::with_config(config);
            add_input(&mut doc, &input, password.as_deref());
            doc.burst(Some(&pattern)).map_err(into_anyhow)?;
            Ok(())
        }
        Command::FillForm {
            input,
            data,
            output,
            flatten,
            need_appearances,
            drop_xfa,
            password,
        } => {
            let mut doc = Document::with_config(config);
            add_input(&mut doc, &input, password.as_deref());
            doc.fill_form(&data).output(&output);
            if flatten {
                doc.flatten();
            }
            if need_appearances {
                doc.need_appearances();
            }
            if drop_xfa {
                doc.drop_xfa();
            }
            doc.execute().map_err(into_anyhow)?;
            Ok(())
        }
        Command::Stamp(args) => overlay(config, args, true),
        Command::Background(args) => overlay(config, args, false),
        Command::DumpData {
            input,
            utf8,
            password,
        } => dump(config, &input, password.as_deref(), utf8, false),
        Command::DumpFields {
            input,
            utf8,
            password,
        } => dump(config, &input, password.as_deref(), utf8, true),
    }
}

fn assemble(config: ExecConfig, args: AssembleArgs, shuffle: bool) -> Result<()> {
    let mut doc = Document::with_config(config);
    for input in &args.inputs {
        add_input(&mut doc, input, None);
    }
    let ranges: Vec<PageRange> = args
        .ranges
        .iter()
        .map(|s| parse_range(s))
        .collect::<Result<_>>()?;
    for r in ranges {
        if shuffle {
            doc.shuffle(r.pages, r.handle.as_deref(), r.qualifier, r.rotation);
        } else {
            doc.cat(r.pages, r.handle.as_deref(), r.qualifier, r.rotation);
        }
    }
    // pdftk concatenates all inputs in order when no ranges are given, but
    // the operation keyword must still be present.
    if args.ranges.is_empty() {
        let handles: Vec<String> = doc.handles().iter().map(|h| h.to_string()).collect();
        for handle in handles {
            if shuffle {
                doc.shuffle(Pages::All, Some(&handle), None, None);
            } else {
                doc.cat(Pages::All, Some(&handle), None, None);
            }
        }
    }
    if let Some(pw) = &args.owner_pw {
        doc.owner_pw(pw);
    }
    if let Some(pw) = &args.user_pw {
        doc.user_pw(pw);
    }
    if let Some(perms) = &args.allow {
        doc.allow(perms);
    }
    if args.encrypt_128bit {
        doc.encrypt_128bit();
    }
    if args.compress {
        doc.compress();
    }
    doc.output(&args.output);
    doc.execute().map_err(into_anyhow)?;
    Ok(())
}

fn overlay(config: ExecConfig, args: OverlayArgs, stamp: bool) -> Result<()> {
    let mut doc = Document::with_config(config);
    add_input(&mut doc, &args.input, args.password.as_deref());
    match (stamp, args.multi) {
        (true, false) => doc.stamp(&args.overlay),
        (true, true) => doc.multi_stamp(&args.overlay),
        (false, false) => doc.background(&args.overlay),
        (false, true) => doc.multi_background(&args.overlay),
    };
    doc.output(&args.output);
    doc.execute().map_err(into_anyhow)?;
    Ok(())
}

fn dump(
    config: ExecConfig,
    input: &str,
    password: Option<&str>,
    utf8: bool,
    fields: bool,
) -> Result<()> {
    let mut doc = Document::with_config(config);
    add_input(&mut doc, input, password);
    let text = match (fields, utf8) {
        (false, false) => doc.get_data(),
        (false, true) => doc.get_data_utf8(),
        (true, false) => doc.get_data_fields(),
        (true, true) => doc.get_data_fields_utf8(),
    }
    .map_err(into_anyhow)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

/// Register an input given as `path` or `HANDLE=path`.
fn add_input(doc: &mut Document, input: &str, password: Option<&str>) {
    match split_handle(input) {
        Some((handle, path)) => doc.add_file(path, Some(handle), password),
        None => doc.add_file(input, None, password),
    };
}

/// Split `HANDLE=path` when the prefix is one or more uppercase letters.
/// `C:\file.pdf` has a single-letter prefix too, but a lowercase drive
/// letter or any path without `=` falls through to auto-handling.
fn split_handle(input: &str) -> Option<(&str, &str)> {
    let (prefix, rest) = input.split_once('=')?;
    if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_uppercase()) {
        Some((prefix, rest))
    } else {
        None
    }
}

/// Parse one CLI range token: `[HANDLE][start[-end]][odd|even][rotation]`.
///
/// Rotations are accepted in word form only; the legacy single-letter
/// spelling is an *output* dialect selected by `--legacy-rotation` and would
/// be ambiguous with handles on input.
fn parse_range(token: &str) -> Result<PageRange> {
    let mut rest = token;

    let handle_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_uppercase())
        .count();
    let handle = (handle_len > 0).then(|| rest[..handle_len].to_string());
    rest = &rest[handle_len..];

    let pages = match parse_page_ref(&mut rest)? {
        None => Pages::All,
        Some(start) => {
            if let Some(tail) = rest.strip_prefix('-') {
                rest = tail;
                match parse_page_ref(&mut rest)? {
                    Some(end) => Pages::Span(start, end),
                    None => bail!("Range '{token}': expected a page number or 'end' after '-'"),
                }
            } else {
                Pages::Single(start)
            }
        }
    };

    let qualifier = if let Some(tail) = rest.strip_prefix("odd") {
        rest = tail;
        Some(Qualifier::Odd)
    } else if let Some(tail) = rest.strip_prefix("even") {
        rest = tail;
        Some(Qualifier::Even)
    } else {
        None
    };

    let mut rotation = None;
    for (word, rot) in [
        ("north", Rotation::North),
        ("east", Rotation::East),
        ("south", Rotation::South),
        ("west", Rotation::West),
        ("left", Rotation::Left),
        ("right", Rotation::Right),
        ("down", Rotation::Down),
    ] {
        if let Some(tail) = rest.strip_prefix(word) {
            rest = tail;
            rotation = Some(rot);
            break;
        }
    }

    if !rest.is_empty() {
        bail!(
            "Range '{token}': unexpected trailing '{rest}' \
             (expected odd/even or a rotation word)"
        );
    }

    Ok(PageRange::new(pages, handle, qualifier, rotation))
}

/// Consume a leading page reference (`123` or `end`) if present.
fn parse_page_ref(rest: &mut &str) -> Result<Option<PageRef>> {
    if let Some(tail) = rest.strip_prefix("end") {
        *rest = tail;
        return Ok(Some(PageRef::End));
    }
    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Ok(None);
    }
    let n: u32 = rest[..digits]
        .parse()
        .with_context(|| format!("Invalid page number '{}'", &rest[..digits]))?;
    if n == 0 {
        bail!("Pages are 1-indexed, got 0");
    }
    *rest = &rest[digits..];
    Ok(Some(PageRef::Page(n)))
}

fn into_anyhow(e: rpdftk::PdftkError) -> anyhow::Error {
    anyhow::Error::new(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_span() {
        let r = parse_range("A1-5").unwrap();
        assert_eq!(r.handle.as_deref(), Some("A"));
        assert_eq!(r.pages, Pages::span(1, 5));
        assert!(r.qualifier.is_none());
        assert!(r.rotation.is_none());
    }

    #[test]
    fn parse_handle_only_is_full_range() {
        let r = parse_range("B").unwrap();
        assert_eq!(r.handle.as_deref(), Some("B"));
        assert_eq!(r.pages, Pages::All);
    }

    #[test]
    fn parse_descending_with_qualifier_and_rotation() {
        let r = parse_range("A12-1oddleft").unwrap();
        assert_eq!(r.pages, Pages::span(12, 1));
        assert_eq!(r.qualifier, Some(Qualifier::Odd));
        assert_eq!(r.rotation, Some(Rotation::Left));
    }

    #[test]
    fn parse_end_markers() {
        let r = parse_range("3-end").unwrap();
        assert!(r.handle.is_none());
        assert_eq!(r.pages, Pages::Span(PageRef::Page(3), PageRef::End));

        let r = parse_range("Aend-1").unwrap();
        assert_eq!(r.pages, Pages::Span(PageRef::End, PageRef::Page(1)));
    }

    #[test]
    fn parse_even_is_not_mistaken_for_end() {
        let r = parse_range("Aeven").unwrap();
        assert_eq!(r.pages, Pages::All);
        assert_eq!(r.qualifier, Some(Qualifier::Even));
    }

    #[test]
    fn parse_rejects_unknown_qualifier() {
        let err = parse_range("A1-5prime").unwrap_err();
        assert!(err.to_string().contains("prime"), "got: {err}");
    }

    #[test]
    fn parse_rejects_page_zero() {
        assert!(parse_range("A0-5").is_err());
    }

    #[test]
    fn split_handle_only_on_uppercase_prefix() {
        assert_eq!(split_handle("A=a.pdf"), Some(("A", "a.pdf")));
        assert_eq!(split_handle("IN=dir/x.pdf"), Some(("IN", "dir/x.pdf")));
        assert_eq!(split_handle("a.pdf"), None);
        assert_eq!(split_handle("name=weird.pdf"), None);
    }
}
