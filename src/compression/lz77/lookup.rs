//! Prefix lookup table used by the LZ77 encoders to find back-references.

use std::collections::HashMap;

/// Shortest back-reference either LZ77 variant can encode.
pub const MIN_MATCH: usize = 3;

/// Largest back-reference distance (12-bit offset field, stored minus one).
pub const WINDOW: usize = 0x1000;

/// A back-reference candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Number of bytes covered.
    pub length: usize,
    /// Distance back from the current position (at least 1).
    pub offset: usize,
}

/// Maps every 3-byte prefix seen so far to the positions it occurred at.
///
/// Positions are inserted lazily as the encoder advances, so a search at
/// `pos` only ever sees earlier positions. Candidates are scanned nearest
/// first; on equal length the nearer one wins.
#[derive(Debug)]
pub struct LookupTable {
    table: HashMap<[u8; MIN_MATCH], Vec<usize>>,
    next_insert: usize,
    max_match: usize,
    min_offset: usize,
}

impl LookupTable {
    /// Creates a table that reports matches of up to `max_match` bytes and
    /// rejects references closer than `min_offset`.
    #[must_use]
    pub fn new(max_match: usize, min_offset: usize) -> Self {
        Self {
            table: HashMap::new(),
            next_insert: 0,
            max_match,
            min_offset: min_offset.max(1),
        }
    }

    fn insert_until(&mut self, data: &[u8], pos: usize) {
        while self.next_insert < pos {
            let i = self.next_insert;
            if let Some(key) = prefix(data, i) {
                self.table.entry(key).or_default().push(i);
            }
            self.next_insert += 1;
        }
    }

    /// Finds the longest match for `data[pos..]` within the window.
    ///
    /// `pos` must not decrease between calls.
    pub fn search(&mut self, data: &[u8], pos: usize) -> Option<Match> {
        self.insert_until(data, pos);
        if pos == 0 {
            return None;
        }
        let key = prefix(data, pos)?;
        let limit = self.max_match.min(data.len() - pos);
        let candidates = self.table.get(&key)?;

        let mut best: Option<Match> = None;
        for &candidate in candidates.iter().rev() {
            let offset = pos - candidate;
            if offset < self.min_offset {
                continue;
            }
            if offset > WINDOW {
                break;
            }
            let length = MIN_MATCH
                + data[candidate + MIN_MATCH..]
                    .iter()
                    .zip(&data[pos + MIN_MATCH..pos + limit])
                    .take_while(|(a, b)| a == b)
                    .count();
            if best.is_none_or(|b| length > b.length) {
                best = Some(Match { length, offset });
            }
            if length == limit {
                break;
            }
        }
        best
    }
}

fn prefix(data: &[u8], pos: usize) -> Option<[u8; MIN_MATCH]> {
    data.get(pos..pos + MIN_MATCH)?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nearest_longest_match() {
        let data = b"abcXabcdYabcd";
        let mut table = LookupTable::new(18, 1);
        assert_eq!(table.search(data, 0), None);
        let found = table.search(data, 9).unwrap();
        assert_eq!(found, Match { length: 4, offset: 5 });
    }

    #[test]
    fn respects_minimum_offset() {
        let data = [7u8; 16];
        let mut near = LookupTable::new(18, 1);
        assert_eq!(near.search(&data, 1).unwrap().offset, 1);

        let mut far = LookupTable::new(18, 2);
        assert_eq!(far.search(&data, 1), None);
        assert_eq!(far.search(&data, 2).unwrap().offset, 2);
    }

    #[test]
    fn match_is_capped() {
        let data = [0u8; 64];
        let mut table = LookupTable::new(18, 1);
        assert_eq!(table.search(&data, 1).unwrap().length, 18);
        assert_eq!(table.search(&data, 60).unwrap().length, 4);
    }

    #[test]
    fn too_short_tail_has_no_match() {
        let data = b"abab";
        let mut table = LookupTable::new(18, 1);
        assert_eq!(table.search(data, 2), None);
    }
}
