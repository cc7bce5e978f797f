/// Dense number assigned to an input character interned during
/// construction. Symbol 0 is reserved and never assigned, so every live
/// transition offset is strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SymbolNumber(pub(crate) u16);

impl SymbolNumber {
    #[inline(always)]
    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }
}

/// Index of a slot in the flat state table. A state is identified by the
/// slot it occupies, with the root always at slot 0.
pub type StateIndex = u32;

/// Index of a keyword in the value store, in insertion order.
pub type KeywordIndex = u32;
