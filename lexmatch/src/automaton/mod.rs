//! The compact keyword automaton and its construction.
//!
//! States live in one flat record table in double-array form: a state is
//! the slot it occupies, the transition on symbol `c` is the slot
//! `base + c`, and a candidate slot belongs to the probing state only if
//! its owner field says so. Failure links and merged output sets follow
//! the Aho-Corasick construction and are fixed at build time.

mod alphabet;
mod builder;
mod store;

pub use self::builder::AutomatonBuilder;
pub(crate) use self::alphabet::KeyAlphabet;
pub(crate) use self::store::ValueStore;

use crate::constants::{INVALID_KEYWORD, NO_BASE, NO_OWNER, ROOT_STATE};
use crate::types::{KeywordIndex, StateIndex, SymbolNumber};

/// Error aborting automaton construction.
///
/// Construction either returns a complete automaton or one of these; no
/// partially built structure escapes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A keyword was empty. A zero-length match cannot be anchored.
    #[error("empty keyword")]
    EmptyKeyword,
    /// The keywords used more than 65535 distinct characters.
    #[error("alphabet overflow: more than 65535 distinct keyword characters")]
    AlphabetOverflow,
    /// The automaton outgrew 32-bit state indexing.
    #[error("state table overflow")]
    StateOverflow,
    /// A single keyword was too long for a 32-bit length.
    #[error("keyword of {0} bytes is too long")]
    KeywordTooLong(usize),
}

/// One slot of the flat state table.
///
/// `owner` doubles as the occupancy marker: a slot whose owner is
/// [`NO_OWNER`] is free and may be claimed by the allocator. Two states
/// sharing a base region can never answer for each other because every
/// probe compares `owner` against the probing state.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub(crate) struct StateRecord {
    pub(crate) base: u32,
    pub(crate) owner: StateIndex,
    pub(crate) fail: StateIndex,
    pub(crate) owned: KeywordIndex,
    pub(crate) output_start: u32,
    pub(crate) output_len: u32,
}

impl StateRecord {
    pub(crate) fn free() -> StateRecord {
        StateRecord {
            base: NO_BASE,
            owner: NO_OWNER,
            fail: ROOT_STATE,
            owned: INVALID_KEYWORD,
            output_start: 0,
            output_len: 0,
        }
    }
}

/// Probes one transition in a state table.
#[inline(always)]
pub(crate) fn probe(
    states: &[StateRecord],
    state: StateIndex,
    sym: SymbolNumber,
) -> Option<StateIndex> {
    let rec = &states[state as usize];
    if rec.base == NO_BASE {
        return None;
    }
    let slot = rec.base as usize + sym.as_usize();
    match states.get(slot) {
        Some(candidate) if candidate.owner == state => Some(slot as StateIndex),
        _ => None,
    }
}

/// Immutable multi-keyword matching automaton.
///
/// Built once with [`AutomatonBuilder`] or [`KeywordAutomaton::build`],
/// then safe for unsynchronized concurrent reads: scanning and lookup
/// never write. The one mutator, [`set`](KeywordAutomaton::set), replaces
/// a payload behind its own lock without touching topology.
#[derive(Debug)]
pub struct KeywordAutomaton<V> {
    states: Vec<StateRecord>,
    outputs: Vec<KeywordIndex>,
    alphabet: KeyAlphabet,
    store: ValueStore<V>,
    num_states: u32,
}

impl<V> KeywordAutomaton<V> {
    /// number of keywords held, after deduplication.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// `true` if no keyword was inserted.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// number of automaton states, including the root.
    pub fn state_count(&self) -> usize {
        self.num_states as usize
    }

    /// heap footprint of the state and output tables, in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.states.len() * std::mem::size_of::<StateRecord>()
            + self.outputs.len() * std::mem::size_of::<KeywordIndex>()
    }

    /// the keyword behind an index returned by
    /// [`exact_match`](KeywordAutomaton::exact_match).
    pub fn keyword(&self, index: usize) -> Option<&str> {
        u32::try_from(index).ok().and_then(|i| self.store.keyword(i))
    }

    /// a clone of the value behind a keyword index.
    pub fn value(&self, index: usize) -> Option<V>
    where
        V: Clone,
    {
        u32::try_from(index).ok().and_then(|i| self.store.value(i))
    }

    /// iterates over all keywords in insertion order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.store.keywords()
    }

    /// Replaces the value for an existing keyword in place.
    ///
    /// Returns `false` when the keyword is absent. Topology and keyword
    /// length are untouched, so concurrent scans keep reading the same
    /// state tables. Takes the value-slice write lock; must not be called
    /// from inside a [`scan`](KeywordAutomaton::scan) callback, which
    /// holds the read lock.
    pub fn set(&self, keyword: &str, value: V) -> bool {
        match self.exact_match(keyword) {
            Some(index) => {
                self.store.replace_shared(index as KeywordIndex, value);
                true
            }
            None => false,
        }
    }

    #[inline(always)]
    pub(crate) fn child(&self, state: StateIndex, sym: SymbolNumber) -> Option<StateIndex> {
        probe(&self.states, state, sym)
    }

    /// Transition with root semantics: follow failure links until some
    /// state accepts `sym`; the root absorbs any symbol it has no
    /// transition for.
    #[inline(always)]
    pub(crate) fn next_state(&self, mut state: StateIndex, sym: SymbolNumber) -> StateIndex {
        loop {
            if let Some(next) = self.child(state, sym) {
                return next;
            }
            if state == ROOT_STATE {
                return ROOT_STATE;
            }
            state = self.states[state as usize].fail;
        }
    }

    #[inline(always)]
    pub(crate) fn outputs_at(&self, state: StateIndex) -> &[KeywordIndex] {
        let rec = &self.states[state as usize];
        let start = rec.output_start as usize;
        &self.outputs[start..start + rec.output_len as usize]
    }

    #[inline(always)]
    pub(crate) fn owned_at(&self, state: StateIndex) -> Option<KeywordIndex> {
        match self.states[state as usize].owned {
            INVALID_KEYWORD => None,
            index => Some(index),
        }
    }

    #[inline(always)]
    pub(crate) fn alphabet(&self) -> &KeyAlphabet {
        &self.alphabet
    }

    #[inline(always)]
    pub(crate) fn store(&self) -> &ValueStore<V> {
        &self.store
    }

    pub(crate) fn from_parts(
        states: Vec<StateRecord>,
        outputs: Vec<KeywordIndex>,
        alphabet: KeyAlphabet,
        store: ValueStore<V>,
        num_states: u32,
    ) -> KeywordAutomaton<V> {
        KeywordAutomaton {
            states,
            outputs,
            alphabet,
            store,
            num_states,
        }
    }
}
