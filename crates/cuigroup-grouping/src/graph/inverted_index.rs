//! Concept → postings index for candidate generation.

use crate::index::ConceptId;

/// Postings lists of record slots per concept id.
///
/// Slots within a posting list are strictly ascending because records are
/// indexed in slot order.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: Vec<Vec<u32>>,
}

impl InvertedIndex {
    /// Build from per-slot concept slices.
    pub fn build(sets: &[&[ConceptId]]) -> Self {
        let width = sets
            .iter()
            .filter_map(|s| s.last())
            .max()
            .map_or(0, |&max| max as usize + 1);
        let mut postings: Vec<Vec<u32>> = vec![Vec::new(); width];
        for (slot, concepts) in sets.iter().enumerate() {
            for &c in concepts.iter() {
                postings[c as usize].push(slot as u32);
            }
        }
        Self { postings }
    }

    /// Slots carrying `concept`, ascending.
    pub fn postings(&self, concept: ConceptId) -> &[u32] {
        self.postings
            .get(concept as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Slots carrying `concept` with an index strictly greater than `slot`.
    pub fn postings_after(&self, concept: ConceptId, slot: u32) -> &[u32] {
        let list = self.postings(concept);
        let start = list.partition_point(|&s| s <= slot);
        &list[start..]
    }

    /// Number of concept ids with at least one posting.
    pub fn concept_count(&self) -> usize {
        self.postings.iter().filter(|p| !p.is_empty()).count()
    }

    /// Sum of all posting list lengths.
    pub fn posting_total(&self) -> usize {
        self.postings.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postings_are_ascending_and_tail_is_exclusive() {
        let a: &[u32] = &[0, 2];
        let b: &[u32] = &[2];
        let c: &[u32] = &[];
        let d: &[u32] = &[0, 1, 2];
        let index = InvertedIndex::build(&[a, b, c, d]);

        assert_eq!(index.postings(2), &[0, 1, 3]);
        assert_eq!(index.postings(1), &[3]);
        assert_eq!(index.postings_after(2, 1), &[3]);
        assert_eq!(index.postings_after(2, 0), &[1, 3]);
        assert!(index.postings_after(0, 3).is_empty());
        assert!(index.postings(42).is_empty());
        assert_eq!(index.concept_count(), 3);
        assert_eq!(index.posting_total(), 6);
    }

    #[test]
    fn empty_input_has_no_postings() {
        let index = InvertedIndex::build(&[]);
        assert_eq!(index.concept_count(), 0);
        assert!(index.postings(0).is_empty());
    }
}
