//! Read-only queries over a built automaton: full-text scanning, exact
//! keyword lookup, and the thin wrappers consumers call per processed
//! line.

mod hit;

pub use self::hit::Match;

use crate::automaton::KeywordAutomaton;
use crate::constants::ROOT_STATE;

impl<V> KeywordAutomaton<V> {
    /// Scans `text` once, invoking `on_hit` with `(begin, end, value)` for
    /// every keyword occurrence, overlapping occurrences included.
    ///
    /// Offsets are byte offsets into `text`; `end` is exclusive and always
    /// lands on a character boundary. `on_hit` returns `true` to continue
    /// the scan and `false` to stop it immediately. Returns whether any
    /// occurrence was found. A read lock on the value slice is held for
    /// the duration of the scan.
    pub fn scan<F>(&self, text: &str, mut on_hit: F) -> bool
    where
        F: FnMut(usize, usize, &V) -> bool,
    {
        let values = self.store().read_values();
        let mut state = ROOT_STATE;
        let mut matched = false;

        for (pos, ch) in text.char_indices() {
            state = match self.alphabet().lookup(ch) {
                Some(sym) => self.next_state(state, sym),
                // a character occurring in no keyword always falls
                // through to the root
                None => ROOT_STATE,
            };

            let end = pos + ch.len_utf8();
            for &index in self.outputs_at(state) {
                matched = true;
                let begin = end - self.store().length(index) as usize;
                if !on_hit(begin, end, &values[index as usize]) {
                    return true;
                }
            }
        }

        matched
    }

    /// Collects every keyword occurrence in `text`, in the order the scan
    /// reports them (by end offset, longest first at equal ends).
    pub fn search_all(&self, text: &str) -> Vec<Match<V>>
    where
        V: Clone,
    {
        let mut matches = Vec::new();
        self.scan(text, |begin, end, value| {
            matches.push(Match::new(begin, end, value.clone()));
            true
        });
        matches
    }

    /// `true` if any keyword occurs anywhere in `text`.
    ///
    /// Stops scanning at the first occurrence.
    pub fn contains_substring(&self, text: &str) -> bool {
        self.scan(text, |_, _, _| false)
    }

    /// Looks `key` up as a whole keyword, without the failure machinery.
    ///
    /// Walks plain transitions from the root and succeeds only when every
    /// character consumes one and the final state owns a keyword itself.
    /// A proper prefix of a longer keyword is not a match, nor is a
    /// keyword occurring merely as a substring of `key`.
    pub fn exact_match(&self, key: &str) -> Option<usize> {
        let mut state = ROOT_STATE;
        for ch in key.chars() {
            let sym = self.alphabet().lookup(ch)?;
            state = self.child(state, sym)?;
        }
        let index = self.owned_at(state)?;
        debug_assert_eq!(self.store().length(index) as usize, key.len());
        Some(index as usize)
    }

    /// `true` if `key` is exactly one of the inserted keywords.
    pub fn contains_key(&self, key: &str) -> bool {
        self.exact_match(key).is_some()
    }

    /// a clone of the value stored for `key`, if present.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.exact_match(key).and_then(|index| self.value(index))
    }
}
