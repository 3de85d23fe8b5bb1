//! Key-based alignment of two collections of names

use std::collections::{BTreeSet, HashSet};

/// Classification of two key collections under set semantics.
///
/// Each bucket keeps the order the keys had in their source collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    pub shared: Vec<String>,
    pub left_only: Vec<String>,
    pub right_only: Vec<String>,
}

impl Alignment {
    /// `(left_only, right_only, shared)` counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.left_only.len(), self.right_only.len(), self.shared.len())
    }
}

/// Split `a` and `b` into shared, left-only, and right-only keys.
pub fn align<S: AsRef<str>>(a: &[S], b: &[S]) -> Alignment {
    let set_a: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let set_b: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();

    let mut alignment = Alignment::default();
    for key in a.iter().map(AsRef::as_ref) {
        if set_b.contains(key) {
            alignment.shared.push(key.to_string());
        } else {
            alignment.left_only.push(key.to_string());
        }
    }
    alignment.right_only = b
        .iter()
        .map(AsRef::as_ref)
        .filter(|key| !set_a.contains(key))
        .map(str::to_string)
        .collect();
    alignment
}

/// Count `(left_only, right_only, shared)` keys of `a` and `b`.
pub fn count_diffs<S: AsRef<str>>(a: &[S], b: &[S]) -> (usize, usize, usize) {
    align(a, b).counts()
}

/// Iterator over the sorted union of two key collections.
///
/// Yields `(index, key_a, key_b)` where a side that lacks the key yields an
/// empty string in its slot.
#[derive(Debug, Clone)]
pub struct PairedIter {
    union: std::vec::IntoIter<String>,
    left: HashSet<String>,
    right: HashSet<String>,
    position: usize,
}

impl Iterator for PairedIter {
    type Item = (usize, String, String);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.union.next()?;
        let index = self.position;
        self.position += 1;

        let key_a = if self.left.contains(&key) { key.clone() } else { String::new() };
        let key_b = if self.right.contains(&key) { key } else { String::new() };
        Some((index, key_a, key_b))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.union.size_hint()
    }
}

impl ExactSizeIterator for PairedIter {}

/// Walk the sorted union of `a` and `b` for side-by-side display.
pub fn paired_iterate<S: AsRef<str>>(a: &[S], b: &[S]) -> PairedIter {
    let left: HashSet<String> = a.iter().map(|s| s.as_ref().to_string()).collect();
    let right: HashSet<String> = b.iter().map(|s| s.as_ref().to_string()).collect();
    let union: BTreeSet<String> = left.union(&right).cloned().collect();

    PairedIter {
        union: union.into_iter().collect::<Vec<_>>().into_iter(),
        left,
        right,
        position: 0,
    }
}

/// Alias kept for callers that think of the walk as "common elements".
pub fn common_elements<S: AsRef<str>>(a: &[S], b: &[S]) -> PairedIter {
    paired_iterate(a, b)
}
