/// A set over the slots `0..16`, used both for available pieces and for
/// available board positions. Iteration is in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlotSet(u16);

impl SlotSet {
    pub const CAPACITY: u8 = 16;

    pub fn empty() -> Self {
        SlotSet(0)
    }

    pub fn full() -> Self {
        SlotSet(u16::MAX)
    }

    pub fn contains(self, slot: u8) -> bool {
        slot < Self::CAPACITY && self.0 & (1 << slot) != 0
    }

    /// Returns false if `slot` was already present.
    ///
    /// Panics if `slot >= 16`.
    pub fn insert(&mut self, slot: u8) -> bool {
        assert!(slot < Self::CAPACITY, "slot {slot} out of range");
        let was_present = self.contains(slot);
        self.0 |= 1 << slot;
        !was_present
    }

    /// Returns false if `slot` was not present.
    pub fn remove(&mut self, slot: u8) -> bool {
        let was_present = self.contains(slot);
        if was_present {
            self.0 &= !(1 << slot);
        }
        was_present
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The single member, if the set has exactly one.
    pub fn only(self) -> Option<u8> {
        (self.len() == 1).then(|| self.0.trailing_zeros() as u8)
    }

    /// The smallest member.
    pub fn first(self) -> Option<u8> {
        (!self.is_empty()).then(|| self.0.trailing_zeros() as u8)
    }

    /// The `n`th member in ascending order.
    pub fn nth(self, n: usize) -> Option<u8> {
        self.iter().nth(n)
    }

    pub fn iter(self) -> SlotIter {
        SlotIter(self.0)
    }

    pub fn to_vec(self) -> Vec<u8> {
        self.iter().collect()
    }
}

#[derive(Debug, Clone)]
pub struct SlotIter(u16);

impl Iterator for SlotIter {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.0 == 0 {
            return None;
        }
        let slot = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SlotIter {}

impl IntoIterator for SlotSet {
    type Item = u8;
    type IntoIter = SlotIter;

    fn into_iter(self) -> SlotIter {
        self.iter()
    }
}

impl FromIterator<u8> for SlotSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = SlotSet::empty();
        for slot in iter {
            set.insert(slot);
        }
        set
    }
}
