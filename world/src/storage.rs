//! Bounded cargo containers carried by ships.

/// Number of rounds an ammunition store can hold.
pub(crate) const AMMUNITION_CAPACITY: u32 = 5;
/// Number of cargo slots in a treasure store.
pub(crate) const TREASURE_SLOTS: usize = 3;

/// Ammunition store consumed one round at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AmmunitionStore {
    rounds: u32,
}

impl AmmunitionStore {
    pub(crate) const fn full() -> Self {
        Self {
            rounds: AMMUNITION_CAPACITY,
        }
    }

    pub(crate) const fn empty() -> Self {
        Self { rounds: 0 }
    }

    pub(crate) const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Removes a single round, reporting whether one was available.
    pub(crate) fn take_round(&mut self) -> bool {
        if self.rounds == 0 {
            return false;
        }
        self.rounds -= 1;
        true
    }

    /// Adds up to `count` rounds and returns how many fit.
    pub(crate) fn add(&mut self, count: u32) -> u32 {
        let added = count.min(AMMUNITION_CAPACITY - self.rounds);
        self.rounds += added;
        added
    }

    pub(crate) fn clear(&mut self) {
        self.rounds = 0;
    }
}

/// Slot-indexed treasure hold.
///
/// Slots keep their index for as long as they are occupied, so removing one
/// treasure never relabels another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TreasureStore {
    slots: [Option<u32>; TREASURE_SLOTS],
}

impl TreasureStore {
    pub(crate) const fn slots(&self) -> [Option<u32>; TREASURE_SLOTS] {
        self.slots
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub(crate) fn total_value(&self) -> u32 {
        self.slots.iter().flatten().sum()
    }

    /// Stores the treasure in the first free slot, reporting success.
    pub(crate) fn stow(&mut self, value: u32) -> bool {
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Value stored in the slot; negative or out-of-range indices hold nothing.
    pub(crate) fn peek(&self, slot: i32) -> Option<u32> {
        let index = usize::try_from(slot).ok()?;
        self.slots.get(index).copied().flatten()
    }

    pub(crate) fn discard(&mut self, slot: i32) {
        if let Some(entry) = usize::try_from(slot)
            .ok()
            .and_then(|index| self.slots.get_mut(index))
        {
            *entry = None;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots = [None; TREASURE_SLOTS];
    }
}
