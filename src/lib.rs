//! Compare-and-set, increment and decrement on 8, 16 and 32-bit cells, for
//! single-core targets where threads and interrupt handlers share memory and
//! there are no OS locks
//!
//! ### Comes with
//! - [atomic_cas], the one primitive everything else is built from. A failed
//!   call always hands back the cell's current value, so retry loops need no
//!   extra read,
//! - [atomic_incr] / [atomic_decr] (and [atomic_update_with]) as retry loops
//!   over it, with an overridable [RetryPolicy] ([Unbounded] by default,
//!   [Bounded], [BackOff]),
//! - [Shared] cells ([SharedU8] ... [SharedI32]) for callers that own the storage, and
//! - Strategy selection at compile time ([policy]): exclusive load/store on
//!   ARMv7-M and later, interrupt masking ([critical]) on ARMv6-M, and an
//!   emulation of either on hosted targets.
//!
//! Only 8, 16 and 32-bit integers are accepted; anything else fails to compile:
//! ```compile_fail
//! let mut x = 0u64;
//! unsafe { sync_cells::atomic_incr(&mut x, 1) };
//! ```
//!
//! ### Optional features
//! - `std` (default): hosted emulation backend; [BackOff] yields the thread.
//!   Turn default features off for bare-metal targets.
//! - `emulate-interrupt-mask`: use the interrupt-masking strategy on hosted targets
//! - `serde`: Enable de/serialization of the [policy] report types
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod arch;
pub mod cas;
mod cell;
pub mod critical;
mod error;
pub mod ops;
pub mod policy;
pub mod retry;
mod width;

pub use cas::{atomic_cas, atomic_load, CasStrategy, Exclusive, Masking};
pub use cell::*;
pub use critical::{CriticalSection, InterruptState};
pub use error::{Error, Result};
pub use ops::{atomic_decr, atomic_decr_with, atomic_incr, atomic_incr_with, atomic_update_with};
pub use policy::{Capability, Platform, Strategy};
pub use retry::{BackOff, Bounded, RetryPolicy, Unbounded};
pub use width::{RawWord, Width, Word};
