//! One-shot construction of the keyword automaton.
//!
//! Keywords are staged in a plain trie first. `build` then flattens the
//! trie into the double array breadth-first, computes the Aho-Corasick
//! failure links, and merges each state's output set with the set of its
//! failure target. The builder owns every table until the automaton is
//! complete; nothing partially built is ever handed out.

use std::collections::{BTreeMap, VecDeque};

use log::debug;

use super::alphabet::KeyAlphabet;
use super::store::ValueStore;
use super::{probe, BuildError, KeywordAutomaton, StateRecord};
use crate::constants::{INVALID_KEYWORD, MAX_SLOTS, NO_OWNER, ROOT_STATE};
use crate::types::{KeywordIndex, StateIndex, SymbolNumber};

/// Staging trie node. Children stay in a sorted map until the allocation
/// phase flattens them into the double array.
struct TrieNode {
    children: BTreeMap<SymbolNumber, u32>,
    keyword: KeywordIndex,
}

impl TrieNode {
    fn new() -> TrieNode {
        TrieNode {
            children: BTreeMap::new(),
            keyword: INVALID_KEYWORD,
        }
    }
}

/// Builder for [`KeywordAutomaton`].
///
/// Stage entries with [`insert`](AutomatonBuilder::insert), then call
/// [`build`](AutomatonBuilder::build) once. There is no insertion into a
/// finished automaton.
pub struct AutomatonBuilder<V> {
    nodes: Vec<TrieNode>,
    alphabet: KeyAlphabet,
    store: ValueStore<V>,
}

impl<V> AutomatonBuilder<V> {
    /// Creates an empty builder.
    pub fn new() -> AutomatonBuilder<V> {
        AutomatonBuilder {
            nodes: vec![TrieNode::new()],
            alphabet: KeyAlphabet::new(),
            store: ValueStore::new(),
        }
    }

    /// Stages one keyword with its value.
    ///
    /// Re-inserting a keyword replaces its value and leaves the trie
    /// untouched, so duplicates never change the automaton's size.
    pub fn insert(&mut self, keyword: &str, value: V) -> Result<(), BuildError> {
        if keyword.is_empty() {
            return Err(BuildError::EmptyKeyword);
        }
        if u32::try_from(keyword.len()).is_err() {
            return Err(BuildError::KeywordTooLong(keyword.len()));
        }

        let mut node = 0usize;
        for ch in keyword.chars() {
            let sym = self.alphabet.intern(ch)?;
            node = match self.nodes[node].children.get(&sym) {
                Some(&next) => next as usize,
                None => {
                    if self.nodes.len() >= MAX_SLOTS {
                        return Err(BuildError::StateOverflow);
                    }
                    let next = self.nodes.len() as u32;
                    self.nodes.push(TrieNode::new());
                    self.nodes[node].children.insert(sym, next);
                    next as usize
                }
            };
        }

        match self.nodes[node].keyword {
            INVALID_KEYWORD => {
                let index = self.store.push(keyword, value);
                self.nodes[node].keyword = index;
            }
            index => self.store.replace(index, value),
        }
        Ok(())
    }

    /// Flattens the staged trie into the finished automaton.
    pub fn build(self) -> Result<KeywordAutomaton<V>, BuildError> {
        let AutomatonBuilder {
            nodes,
            alphabet,
            store,
        } = self;

        let mut states = vec![StateRecord::free(); (nodes.len() * 2).max(16)];
        states[ROOT_STATE as usize].owner = ROOT_STATE;

        // Allocation phase: breadth-first over the trie, claiming every
        // child of a state at once under a single base. The child set of a
        // state never changes after its base is chosen, so no relocation
        // can become necessary.
        let mut slot_of: Vec<StateIndex> = vec![ROOT_STATE; nodes.len()];
        let mut first_free: usize = 1;
        let mut queue: VecDeque<u32> = VecDeque::with_capacity(nodes.len());
        queue.push_back(0);

        while let Some(node_id) = queue.pop_front() {
            let node = &nodes[node_id as usize];
            if node.children.is_empty() {
                continue;
            }
            let slot = slot_of[node_id as usize];

            let first = node.children.keys().next().unwrap().as_usize();
            let last = node.children.keys().next_back().unwrap().as_usize();
            let mut base = first_free.saturating_sub(first);
            loop {
                let needed = base + last + 1;
                if needed > MAX_SLOTS {
                    return Err(BuildError::StateOverflow);
                }
                if needed > states.len() {
                    states.resize(needed, StateRecord::free());
                }
                if node
                    .children
                    .keys()
                    .all(|sym| states[base + sym.as_usize()].owner == NO_OWNER)
                {
                    break;
                }
                base += 1;
            }

            states[slot as usize].base = base as u32;
            for (sym, &child) in &node.children {
                let child_slot = base + sym.as_usize();
                debug_assert_eq!(states[child_slot].owner, NO_OWNER);
                states[child_slot].owner = slot;
                states[child_slot].owned = nodes[child as usize].keyword;
                slot_of[child as usize] = child_slot as StateIndex;
                queue.push_back(child);
            }
            while first_free < states.len() && states[first_free].owner != NO_OWNER {
                first_free += 1;
            }
        }

        // Failure-link and output-merge phase, breadth-first so every
        // state's failure target is finished before the state itself.
        let mut outputs: Vec<KeywordIndex> = Vec::new();
        let mut queue: VecDeque<u32> = VecDeque::with_capacity(nodes.len());
        for &child in nodes[0].children.values() {
            states[slot_of[child as usize] as usize].fail = ROOT_STATE;
            queue.push_back(child);
        }

        while let Some(node_id) = queue.pop_front() {
            let node = &nodes[node_id as usize];
            let slot = slot_of[node_id as usize] as usize;

            // Merged output set: the state's own terminal keyword first,
            // then everything its failure target already reports.
            let start = outputs.len();
            if states[slot].owned != INVALID_KEYWORD {
                outputs.push(states[slot].owned);
            }
            let fail_rec = states[states[slot].fail as usize];
            let fail_start = fail_rec.output_start as usize;
            outputs.extend_from_within(fail_start..fail_start + fail_rec.output_len as usize);
            if outputs.len() > MAX_SLOTS {
                return Err(BuildError::StateOverflow);
            }
            states[slot].output_start = start as u32;
            states[slot].output_len = (outputs.len() - start) as u32;

            for (&sym, &child) in &node.children {
                let child_slot = slot_of[child as usize];
                let mut from = states[slot].fail;
                let target = loop {
                    if let Some(next) = probe(&states, from, sym) {
                        break next;
                    }
                    if from == ROOT_STATE {
                        break ROOT_STATE;
                    }
                    from = states[from as usize].fail;
                };
                states[child_slot as usize].fail = if target == child_slot {
                    ROOT_STATE
                } else {
                    target
                };
                queue.push_back(child);
            }
        }

        let last_used = states
            .iter()
            .rposition(|rec| rec.owner != NO_OWNER)
            .unwrap_or(0);
        states.truncate(last_used + 1);
        states.shrink_to_fit();
        outputs.shrink_to_fit();

        debug!(
            "built keyword automaton: {} keywords over {} symbols, {} states in {} slots, {} merged outputs",
            store.len(),
            alphabet.len(),
            nodes.len(),
            states.len(),
            outputs.len()
        );

        Ok(KeywordAutomaton::from_parts(
            states,
            outputs,
            alphabet,
            store,
            nodes.len() as u32,
        ))
    }
}

impl<V> Default for AutomatonBuilder<V> {
    fn default() -> AutomatonBuilder<V> {
        AutomatonBuilder::new()
    }
}

impl<V> KeywordAutomaton<V> {
    /// Builds an automaton from keyword → value entries in one shot.
    ///
    /// Later entries win when a keyword repeats. An empty collection
    /// yields a valid automaton that matches nothing.
    pub fn build<I, S>(entries: I) -> Result<KeywordAutomaton<V>, BuildError>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
    {
        let mut builder = AutomatonBuilder::new();
        for (keyword, value) in entries {
            builder.insert(keyword.as_ref(), value)?;
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_single_keyword() {
        let automaton = KeywordAutomaton::build(vec![("keyword", 7u32)]).unwrap();
        assert_eq!(automaton.len(), 1);
        assert_eq!(automaton.get("keyword"), Some(7));
        assert_eq!(automaton.exact_match("keyword"), Some(0));

        let hits = automaton.search_all("keyword");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].begin(), 0);
        assert_eq!(hits[0].end(), 7);
        assert_eq!(*hits[0].value(), 7);
    }

    #[test]
    fn empty_keyword_is_rejected() {
        let result = KeywordAutomaton::<u32>::build(vec![("", 1)]);
        assert!(matches!(result, Err(BuildError::EmptyKeyword)));

        let mut builder = AutomatonBuilder::new();
        builder.insert("fine", 1).unwrap();
        assert!(matches!(builder.insert("", 2), Err(BuildError::EmptyKeyword)));
    }

    #[test]
    fn empty_input_builds_empty_automaton() {
        let automaton = KeywordAutomaton::<u32>::build(Vec::<(&str, u32)>::new()).unwrap();
        assert_eq!(automaton.len(), 0);
        assert!(automaton.is_empty());
        assert_eq!(automaton.state_count(), 1);
        assert!(!automaton.contains_substring("anything at all"));
        assert_eq!(automaton.get("anything"), None);
    }

    #[test]
    fn duplicate_keyword_keeps_size_and_takes_last_value() {
        let automaton =
            KeywordAutomaton::build(vec![("mark", 1u32), ("other", 2), ("mark", 9)]).unwrap();
        assert_eq!(automaton.len(), 2);
        assert_eq!(automaton.get("mark"), Some(9));
        assert_eq!(automaton.get("other"), Some(2));
    }

    #[test]
    fn size_counts_distinct_keys() {
        let entries = vec![("a", 0u32), ("b", 1), ("a", 2), ("c", 3), ("b", 4)];
        let automaton = KeywordAutomaton::build(entries).unwrap();
        assert_eq!(automaton.len(), 3);
    }

    #[test]
    fn incremental_insert_then_build() {
        let mut builder = AutomatonBuilder::new();
        builder.insert("nomen", "n").unwrap();
        builder.insert("verbum", "v").unwrap();
        let automaton = builder.build().unwrap();
        assert_eq!(automaton.get("nomen"), Some("n"));
        assert_eq!(automaton.get("verbum"), Some("v"));
        assert_eq!(automaton.get("nome"), None);
    }

    #[test]
    fn keyword_table_is_introspectable() {
        let automaton = KeywordAutomaton::build(vec![("alpha", 0u32), ("beta", 1)]).unwrap();
        let keywords: Vec<&str> = automaton.keywords().collect();
        assert_eq!(keywords, vec!["alpha", "beta"]);
        let index = automaton.exact_match("beta").unwrap();
        assert_eq!(automaton.keyword(index), Some("beta"));
        assert_eq!(automaton.value(index), Some(1));
    }

    #[test]
    fn footprint_accessors_are_consistent() {
        let automaton =
            KeywordAutomaton::build(vec![("band", 0u32), ("banana", 1), ("bandana", 2)]).unwrap();
        // "band", "banana" and "bandana" share prefixes in the trie
        assert!(automaton.state_count() > 1);
        assert!(automaton.state_count() <= 1 + "bandbananabandana".len());
        assert!(automaton.heap_bytes() >= automaton.state_count() * 24);
    }
}
