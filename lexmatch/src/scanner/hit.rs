//! A single keyword occurrence reported by a scan.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A keyword occurrence: begin offset inclusive, end offset exclusive,
/// and the value stored for the matched keyword.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match<V> {
    begin: usize,
    end: usize,
    value: V,
}

#[allow(clippy::len_without_is_empty)]
impl<V> Match<V> {
    /// creates a match triple.
    pub fn new(begin: usize, end: usize, value: V) -> Match<V> {
        Match { begin, end, value }
    }

    /// byte offset of the first matched character.
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// byte offset one past the last matched character.
    pub fn end(&self) -> usize {
        self.end
    }

    /// length of the matched keyword, in bytes. Never zero.
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// the value stored for the matched keyword.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// consumes the match, returning the value.
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V: PartialOrd> PartialOrd for Match<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.begin, self.end).cmp(&(other.begin, other.end)) {
            Ordering::Equal => self.value.partial_cmp(&other.value),
            ordering => Some(ordering),
        }
    }
}

impl<V: Ord> Ord for Match<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.begin, self.end)
            .cmp(&(other.begin, other.end))
            .then_with(|| self.value.cmp(&other.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_order_before_values() {
        let early = Match::new(0, 4, 9);
        let late = Match::new(15, 19, 1);
        assert!(early < late);
        assert_eq!(early.len(), 4);
        assert_eq!(late.len(), 4);
    }

    #[test]
    fn serializes_as_a_plain_triple() {
        let hit = Match::new(3, 9, "adj".to_string());
        let json = serde_json::to_string(&hit).unwrap();
        assert_eq!(json, r#"{"begin":3,"end":9,"value":"adj"}"#);
        let back: Match<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hit);
    }
}
