use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable handle to one scalar slot in a host state vector.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<SlotId>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotId(NonZeroU32);

impl SlotId {
    /// Create a SlotId from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Index as `usize`, for addressing state vectors.
    pub fn as_usize(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.index())
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = SlotId::from_index(i);
            assert_eq!(id.index(), i);
            assert_eq!(id.as_usize(), i as usize);
        }
    }

    #[test]
    fn option_slot_is_small() {
        assert_eq!(
            core::mem::size_of::<SlotId>(),
            core::mem::size_of::<Option<SlotId>>()
        );
    }
}
