/*! Multi-pattern keyword matching with a compact finite-state automaton.

Locates every occurrence of a fixed keyword dictionary in arbitrary text
in a single linear scan. The automaton is an Aho-Corasick machine encoded
as a double-array trie: flat integer-indexed state tables instead of a
heap-allocated node graph, built once from a keyword → value map and
immutable afterwards. Dictionary-aware linter workers build one automaton
per run and query it per processed line.

# Usage example

```
use lexmatch::automaton::KeywordAutomaton;

let automaton = KeywordAutomaton::build(vec![
    ("test", 1u32),
    ("tent", 2),
    ("tank", 3),
    ("rest", 4),
]).unwrap();

let hits = automaton.search_all("resting in the test");
assert_eq!(hits.len(), 2);
assert_eq!((hits[0].begin(), hits[0].end(), *hits[0].value()), (0, 4, 4));

assert_eq!(automaton.get("tank"), Some(3));
assert_eq!(automaton.get("tan"), None);
```
*/

#![warn(missing_docs)]

pub mod automaton;
pub mod scanner;

pub(crate) mod constants;
pub(crate) mod types;
