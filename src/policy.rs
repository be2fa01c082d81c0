//! Capability policy
//!
//! Which atomicity strategy this build uses, decided once at compile time from
//! the target (see [arch](crate::arch)). Nothing here branches at runtime; the
//! values are reported for diagnostics and checked by tests.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use enumflags2::{bitflags, BitFlags};

use crate::{arch, width::Width};

pub use crate::arch::Selected;

/// Hardware capabilities a strategy can rely on
#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Capability {
    /// Byte exclusive load/store (`LDREXB`/`STREXB`)
    ExclusiveByte = 1 << 0,
    /// Halfword exclusive load/store (`LDREXH`/`STREXH`)
    ExclusiveHalfword = 1 << 1,
    /// Word exclusive load/store (`LDREX`/`STREX`)
    ExclusiveWord = 1 << 2,
    /// Interrupt state can be read, masked and restored
    InterruptMask = 1 << 3,
}
impl Capability {
    /// The exclusive load/store variant for a width
    pub const fn exclusive_for(width: Width) -> Self {
        match width {
            Width::Byte => Self::ExclusiveByte,
            Width::Halfword => Self::ExclusiveHalfword,
            Width::Word => Self::ExclusiveWord,
        }
    }
}

/// How compare-and-set is made atomic
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
  strum::Display, strum::AsRefStr, strum::EnumCount, strum::EnumIter
)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Strategy {
    /// Lock-free, backed by the exclusivity monitor
    ExclusiveAccess,
    /// A short critical section with interrupts masked
    InterruptMasking,
}
impl Strategy {
    /// Capabilities this strategy needs to operate on cells of `width`
    pub fn required_capabilities(self, width: Width) -> BitFlags<Capability> {
        match self {
            Self::ExclusiveAccess => Capability::exclusive_for(width).into(),
            Self::InterruptMasking => Capability::InterruptMask.into(),
        }
    }
    /// Can this strategy run on cells of `width` on this target?
    pub fn is_available_for(self, width: Width) -> bool {
        CAPABILITIES.contains(self.required_capabilities(width))
    }
}

/// The strategy this build uses
pub const STRATEGY: Strategy = arch::STRATEGY;

/// What the target core offers
pub const CAPABILITIES: BitFlags<Capability> = arch::CAPABILITIES;

/// Summary of the compile-time selection
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Platform {
    /// Selected strategy
    pub strategy: Strategy,
    /// Capabilities of the target core
    pub capabilities: BitFlags<Capability>,
}

/// Report the compile-time selection
///
/// ```
/// use sync_cells::{policy, Width};
/// use strum::IntoEnumIterator;
/// let platform = policy::platform();
/// assert!(Width::iter().all(|w| platform.strategy.is_available_for(w)));
/// ```
pub fn platform() -> Platform {
    Platform { strategy: STRATEGY, capabilities: CAPABILITIES }
}
