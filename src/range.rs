//! Page-range vocabulary and token rendering.
//!
//! pdftk's `cat`/`shuffle` operations take range tokens of the form
//! `[handle][start[-end]][qualifier][rotation]`, e.g. `A1-12odd`, `B`,
//! `A5-1east`. This module holds the typed vocabulary ([`Pages`],
//! [`Qualifier`], [`Rotation`]) and renders a [`PageRange`] into the exact
//! tokens pdftk expects.
//!
//! Two deliberate grammar points:
//!
//! * A descending span (`5-1`) is a first-class pdftk feature meaning
//!   reversed page order. Rendering preserves the literal order given and
//!   never normalizes it.
//! * Rotation has two spellings: the word form (`north`, `left`, …) and the
//!   legacy single-letter form (`N`, `L`, …) accepted by pdftk ≤ 1.44. Which
//!   one is emitted is a configuration switch, never auto-detected.

use crate::error::{PdftkError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to one page position: a concrete page number or the
/// document's last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageRef {
    /// A 1-indexed page number.
    Page(u32),
    /// pdftk's literal `end` marker.
    End,
}

impl From<u32> for PageRef {
    fn from(page: u32) -> Self {
        PageRef::Page(page)
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Page(n) => write!(f, "{n}"),
            PageRef::End => f.write_str("end"),
        }
    }
}

/// Which pages of one input file a range selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pages {
    /// The file's full page range (handle-only token).
    All,
    /// A single page.
    Single(PageRef),
    /// A span from start to end. `start > end` selects pages in descending
    /// order and is rendered literally.
    Span(PageRef, PageRef),
    /// An explicit list of pages; each becomes an independent single-page
    /// token sharing the range's handle, qualifier, and rotation.
    List(Vec<u32>),
}

impl Pages {
    /// Convenience constructor for a single page.
    pub fn single(page: u32) -> Self {
        Pages::Single(PageRef::Page(page))
    }

    /// Convenience constructor for a span of concrete page numbers.
    pub fn span(start: u32, end: u32) -> Self {
        Pages::Span(PageRef::Page(start), PageRef::Page(end))
    }

    /// Span from a concrete page to the document's last page.
    pub fn to_end(start: u32) -> Self {
        Pages::Span(PageRef::Page(start), PageRef::End)
    }
}

/// Parity filter narrowing a page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    Odd,
    Even,
}

impl Qualifier {
    /// The token pdftk expects.
    pub fn token(self) -> &'static str {
        match self {
            Qualifier::Odd => "odd",
            Qualifier::Even => "even",
        }
    }
}

/// Page rotation, absolute (compass) or relative (left/right/down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// Absolute 0°.
    North,
    /// Absolute 90°.
    East,
    /// Absolute 180°.
    South,
    /// Absolute 270°.
    West,
    /// Relative −90°.
    Left,
    /// Relative +90°.
    Right,
    /// Relative +180°.
    Down,
}

impl Rotation {
    /// Rotation in degrees: absolute orientation for the compass variants,
    /// signed adjustment for the relative ones.
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::North => 0,
            Rotation::East => 90,
            Rotation::South => 180,
            Rotation::West => 270,
            Rotation::Left => -90,
            Rotation::Right => 90,
            Rotation::Down => 180,
        }
    }

    /// Whether this rotation adjusts the current orientation rather than
    /// setting an absolute one.
    pub fn is_relative(self) -> bool {
        matches!(self, Rotation::Left | Rotation::Right | Rotation::Down)
    }

    /// The token pdftk expects: word form, or the legacy single-letter form
    /// understood by pdftk ≤ 1.44.
    pub fn token(self, legacy: bool) -> &'static str {
        match (self, legacy) {
            (Rotation::North, false) => "north",
            (Rotation::East, false) => "east",
            (Rotation::South, false) => "south",
            (Rotation::West, false) => "west",
            (Rotation::Left, false) => "left",
            (Rotation::Right, false) => "right",
            (Rotation::Down, false) => "down",
            (Rotation::North, true) => "N",
            (Rotation::East, true) => "E",
            (Rotation::South, true) => "S",
            (Rotation::West, true) => "W",
            (Rotation::Left, true) => "L",
            (Rotation::Right, true) => "R",
            (Rotation::Down, true) => "D",
        }
    }
}

/// One page-range entry accumulated by `cat`/`shuffle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    pub pages: Pages,
    /// Handle of the input file this range selects from. `None` defaults to
    /// the single registered file at render time.
    pub handle: Option<String>,
    pub qualifier: Option<Qualifier>,
    pub rotation: Option<Rotation>,
}

impl PageRange {
    pub fn new(
        pages: Pages,
        handle: Option<String>,
        qualifier: Option<Qualifier>,
        rotation: Option<Rotation>,
    ) -> Self {
        Self {
            pages,
            handle,
            qualifier,
            rotation,
        }
    }

    /// Render this range into pdftk tokens.
    ///
    /// `default_handle` is used when the range carries no handle of its own;
    /// it must be `Some` exactly when the registry holds a single file.
    /// `List` ranges expand into one token per page. `legacy` selects the
    /// single-letter rotation spelling.
    pub fn render(
        &self,
        default_handle: Option<&str>,
        input_count: usize,
        legacy: bool,
    ) -> Result<Vec<String>> {
        let handle = match self.handle.as_deref().or(default_handle) {
            Some(h) => h,
            None => {
                return Err(PdftkError::MissingHandle {
                    inputs: input_count,
                })
            }
        };

        let suffix = {
            let mut s = String::new();
            if let Some(q) = self.qualifier {
                s.push_str(q.token());
            }
            if let Some(r) = self.rotation {
                s.push_str(r.token(legacy));
            }
            s
        };

        let tokens = match &self.pages {
            Pages::All => vec![format!("{handle}{suffix}")],
            Pages::Single(p) => vec![format!("{handle}{p}{suffix}")],
            Pages::Span(start, end) => vec![format!("{handle}{start}-{end}{suffix}")],
            Pages::List(pages) => pages
                .iter()
                .map(|p| format!("{handle}{p}{suffix}"))
                .collect(),
        };
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(pages: Pages, handle: Option<&str>) -> PageRange {
        PageRange::new(pages, handle.map(String::from), None, None)
    }

    #[test]
    fn simple_span() {
        let r = range(Pages::span(1, 3), Some("B"));
        assert_eq!(r.render(None, 2, false).unwrap(), vec!["B1-3"]);
    }

    #[test]
    fn descending_span_is_preserved_not_normalized() {
        let r = PageRange::new(
            Pages::span(5, 1),
            Some("A".into()),
            Some(Qualifier::Odd),
            None,
        );
        assert_eq!(r.render(None, 1, false).unwrap(), vec!["A5-1odd"]);
    }

    #[test]
    fn list_expands_to_independent_single_page_tokens() {
        let r = range(Pages::List(vec![1, 3]), Some("B"));
        assert_eq!(r.render(None, 2, false).unwrap(), vec!["B1", "B3"]);
    }

    #[test]
    fn list_shares_qualifier_and_rotation() {
        let r = PageRange::new(
            Pages::List(vec![2, 4]),
            Some("A".into()),
            Some(Qualifier::Even),
            Some(Rotation::East),
        );
        assert_eq!(
            r.render(None, 1, false).unwrap(),
            vec!["A2eveneast", "A4eveneast"]
        );
    }

    #[test]
    fn all_renders_handle_only() {
        let r = range(Pages::All, Some("C"));
        assert_eq!(r.render(None, 3, false).unwrap(), vec!["C"]);
    }

    #[test]
    fn span_to_end_marker() {
        let r = range(Pages::to_end(7), Some("A"));
        assert_eq!(r.render(None, 1, false).unwrap(), vec!["A7-end"]);
    }

    #[test]
    fn handle_defaults_to_single_registered_file() {
        let r = range(Pages::single(4), None);
        assert_eq!(r.render(Some("A"), 1, false).unwrap(), vec!["A4"]);
    }

    #[test]
    fn missing_handle_with_multiple_inputs_is_an_error() {
        let r = range(Pages::single(4), None);
        let err = r.render(None, 2, false).unwrap_err();
        assert!(matches!(err, PdftkError::MissingHandle { inputs: 2 }));
    }

    #[test]
    fn rotation_left_is_relative_minus_90() {
        assert_eq!(Rotation::Left.degrees(), -90);
        assert!(Rotation::Left.is_relative());
        assert_eq!(Rotation::Left.token(false), "left");
        assert_eq!(Rotation::Left.token(true), "L");
    }

    #[test]
    fn rotation_token_tables() {
        let words = [
            (Rotation::North, "north", "N", 0),
            (Rotation::East, "east", "E", 90),
            (Rotation::South, "south", "S", 180),
            (Rotation::West, "west", "W", 270),
            (Rotation::Right, "right", "R", 90),
            (Rotation::Down, "down", "D", 180),
        ];
        for (rot, word, letter, deg) in words {
            assert_eq!(rot.token(false), word);
            assert_eq!(rot.token(true), letter);
            assert_eq!(rot.degrees(), deg);
        }
        assert!(!Rotation::West.is_relative());
    }

    #[test]
    fn legacy_mode_applies_inside_range_token() {
        let r = PageRange::new(
            Pages::span(1, 2),
            Some("A".into()),
            None,
            Some(Rotation::Down),
        );
        assert_eq!(r.render(None, 1, true).unwrap(), vec!["A1-2D"]);
        assert_eq!(r.render(None, 1, false).unwrap(), vec!["A1-2down"]);
    }
}
