//! Input-file handle allocation.
//!
//! pdftk names each input file with a short uppercase handle (`A=in.pdf`).
//! When the caller does not supply one, the allocator hands out handles in
//! spreadsheet-column order: A, B, …, Z, AA, AB, … — a bijective base-26
//! enumeration, computed from an integer counter rather than by incrementing
//! strings.
//!
//! The allocator never inspects caller-supplied handles, so a caller that
//! explicitly registers "B" can collide with a later auto-generated "B".
//! pdftk itself rejects duplicate handles at run time; see
//! [`crate::Document::add_file`].

/// Generates the deterministic handle sequence A, B, …, Z, AA, AB, ….
#[derive(Debug, Default, Clone)]
pub struct HandleAllocator {
    next_index: u64,
}

impl HandleAllocator {
    /// Create an allocator starting at "A".
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next handle in the sequence and advance the counter.
    pub fn next_handle(&mut self) -> String {
        let handle = index_to_handle(self.next_index);
        self.next_index += 1;
        handle
    }
}

/// Map a 0-based index to its bijective base-26 uppercase representation.
///
/// 0→"A", 25→"Z", 26→"AA", 27→"AB", 701→"ZZ", 702→"AAA".
pub fn index_to_handle(index: u64) -> String {
    let mut n = index;
    let mut letters = String::new();
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
        if n == 0 {
            break;
        }
        // Bijective numeration: there is no zero digit, so borrow one.
        n -= 1;
    }
    letters.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_28_handles_follow_spreadsheet_order() {
        let mut alloc = HandleAllocator::new();
        let mut expected: Vec<String> = (b'A'..=b'Z').map(|c| (c as char).to_string()).collect();
        expected.push("AA".into());
        expected.push("AB".into());
        let got: Vec<String> = (0..28).map(|_| alloc.next_handle()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn pinned_indices() {
        assert_eq!(index_to_handle(0), "A");
        assert_eq!(index_to_handle(25), "Z");
        assert_eq!(index_to_handle(26), "AA");
        assert_eq!(index_to_handle(27), "AB");
        assert_eq!(index_to_handle(701), "ZZ");
        assert_eq!(index_to_handle(702), "AAA");
    }

    #[test]
    fn handles_are_never_reused() {
        let mut alloc = HandleAllocator::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(alloc.next_handle()));
        }
    }
}
