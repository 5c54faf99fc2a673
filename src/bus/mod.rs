//! Bus and device bookkeeping plus the wire-level transaction sequences.
//!
//! | Module        | Owns                                   |
//! |---------------|----------------------------------------|
//! | `registry`    | the two bus slots and their handles    |
//! | `directory`   | discovered device records              |
//! | `transaction` | stateless register/probe sequences     |

pub mod directory;
pub mod registry;
pub mod transaction;

use crate::config::BUS_COUNT;

/// Validated bus identifier (`0` or `1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusId(u8);

impl BusId {
    pub const BUS0: Self = Self(0);
    pub const BUS1: Self = Self(1);

    /// `None` for any id outside the fixed two-slot range.
    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < BUS_COUNT {
            Some(Self(id))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Slot index into the registry arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for BusId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "bus{}", self.0)
    }
}
