//! The single top-level pdftk operation a command performs.
//!
//! A [`crate::Document`] holds at most one operation; setting a new one
//! overwrites the previous (last-write-wins, matching pdftk wrappers'
//! observed behaviour). No operation at all is also valid — pdftk then runs
//! in *filter* mode, copying the single input to the output while applying
//! options such as encryption and permissions.

use std::fmt;
use std::path::PathBuf;

/// The active pdftk operation and its operation-specific argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Concatenate pages from the registered inputs.
    Cat,
    /// Collate pages, taking one page at a time from each range in turn.
    Shuffle,
    /// Split a single input into one file per page.
    Burst,
    /// Fill form fields from an FDF/XFDF file.
    FillForm(PathBuf),
    /// Apply a one-page background underneath every page.
    Background(PathBuf),
    /// Apply a multi-page background, page for page.
    Multibackground(PathBuf),
    /// Stamp a one-page overlay on top of every page.
    Stamp(PathBuf),
    /// Stamp a multi-page overlay, page for page.
    Multistamp(PathBuf),
    /// Generate an FDF file describing the input's form fields.
    GenerateFdf,
    /// Dump document metadata to stdout.
    DumpData { utf8: bool },
    /// Dump form-field descriptions to stdout.
    DumpDataFields { utf8: bool },
}

impl Operation {
    /// The operation keyword pdftk expects on the command line.
    pub fn keyword(&self) -> &'static str {
        match self {
            Operation::Cat => "cat",
            Operation::Shuffle => "shuffle",
            Operation::Burst => "burst",
            Operation::FillForm(_) => "fill_form",
            Operation::Background(_) => "background",
            Operation::Multibackground(_) => "multibackground",
            Operation::Stamp(_) => "stamp",
            Operation::Multistamp(_) => "multistamp",
            Operation::GenerateFdf => "generate_fdf",
            Operation::DumpData { utf8: false } => "dump_data",
            Operation::DumpData { utf8: true } => "dump_data_utf8",
            Operation::DumpDataFields { utf8: false } => "dump_data_fields",
            Operation::DumpDataFields { utf8: true } => "dump_data_fields_utf8",
        }
    }

    /// The operation argument (a file path), if this operation takes one.
    pub fn argument(&self) -> Option<&PathBuf> {
        match self {
            Operation::FillForm(p)
            | Operation::Background(p)
            | Operation::Multibackground(p)
            | Operation::Stamp(p)
            | Operation::Multistamp(p) => Some(p),
            _ => None,
        }
    }

    /// Whether pdftk requires exactly one input file for this operation.
    ///
    /// `multibackground` and `multistamp` are the deliberate exceptions in
    /// the overlay family.
    pub fn requires_single_input(&self) -> bool {
        matches!(
            self,
            Operation::Burst
                | Operation::GenerateFdf
                | Operation::FillForm(_)
                | Operation::Background(_)
                | Operation::Stamp(_)
                | Operation::DumpData { .. }
                | Operation::DumpDataFields { .. }
        )
    }

    /// Whether accumulated page ranges apply to this operation.
    pub fn takes_ranges(&self) -> bool {
        matches!(self, Operation::Cat | Operation::Shuffle)
    }

    /// Whether this operation writes its result to stdout rather than to an
    /// output file.
    pub fn dumps_to_stdout(&self) -> bool {
        matches!(
            self,
            Operation::DumpData { .. } | Operation::DumpDataFields { .. }
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_match_pdftk_grammar() {
        assert_eq!(Operation::Cat.keyword(), "cat");
        assert_eq!(Operation::Shuffle.keyword(), "shuffle");
        assert_eq!(Operation::DumpData { utf8: true }.keyword(), "dump_data_utf8");
        assert_eq!(
            Operation::DumpDataFields { utf8: false }.keyword(),
            "dump_data_fields"
        );
        assert_eq!(
            Operation::FillForm("f.fdf".into()).keyword(),
            "fill_form"
        );
    }

    #[test]
    fn single_input_rule() {
        assert!(Operation::Burst.requires_single_input());
        assert!(Operation::GenerateFdf.requires_single_input());
        assert!(Operation::Stamp("s.pdf".into()).requires_single_input());
        assert!(Operation::DumpData { utf8: false }.requires_single_input());
        assert!(!Operation::Multistamp("s.pdf".into()).requires_single_input());
        assert!(!Operation::Multibackground("b.pdf".into()).requires_single_input());
        assert!(!Operation::Cat.requires_single_input());
    }

    #[test]
    fn only_cat_and_shuffle_take_ranges() {
        assert!(Operation::Cat.takes_ranges());
        assert!(Operation::Shuffle.takes_ranges());
        assert!(!Operation::Burst.takes_ranges());
        assert!(!Operation::FillForm("f.fdf".into()).takes_ranges());
    }
}
