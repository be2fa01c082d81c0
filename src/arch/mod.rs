//! Architecture access
//!
//! The platform capability surface the primitives are built on, as traits, and
//! exactly one native implementation per target family:
//!
//! - Cortex-M cores with exclusive load/store (ARMv7-M, ARMv8-M): `LDREX`/`STREX`
//!   in byte, halfword and word variants.
//! - Cortex-M cores without them (ARMv6-M): `PRIMASK` masking.
//! - Hosted targets (`std`): an emulation of either strategy, for development
//!   and testing. The masking emulation is selected with the
//!   `emulate-interrupt-mask` feature.
//!
//! The choice is made once, by `cfg`, and exported as [Native] and
//! [Selected](crate::policy::Selected).
use crate::{critical::InterruptState, width::RawWord};

/// Single-copy-atomic access to a cell of one width.
///
/// # Safety
/// Implementations must access exactly `size_of::<R>()` bytes at the target
/// and nothing else.
pub unsafe trait CellAccess<R: RawWord> {
    /// Plain load
    ///
    /// # Safety
    /// `target` must be valid and aligned for `R`.
    unsafe fn load(target: *const R) -> R;
    /// Plain store
    ///
    /// # Safety
    /// `target` must be valid and aligned for `R`.
    unsafe fn store(target: *mut R, value: R);
}

/// Paired exclusive load/store for one width.
///
/// # Safety
/// `store_exclusive` must only succeed when no other exclusive-tagged access to
/// the target happened since the matching `load_exclusive` on this core.
pub unsafe trait ExclusiveAccess<R: RawWord>: CellAccess<R> {
    /// Load and register an exclusivity reservation on `target`
    ///
    /// # Safety
    /// `target` must be valid and aligned for `R`.
    unsafe fn load_exclusive(target: *const R) -> R;
    /// Store if the reservation still holds. `true` when the store happened.
    ///
    /// May fail without a competing writer.
    ///
    /// # Safety
    /// `target` must be valid and aligned for `R`.
    unsafe fn store_exclusive(target: *mut R, value: R) -> bool;
    /// Drop any outstanding reservation
    fn clear_exclusive();
}

/// Read, mask and restore the interrupt state of the core.
///
/// # Safety
/// While the state is [Disabled](InterruptState::Disabled), no other execution
/// context may run on the core.
pub unsafe trait InterruptControl {
    /// Current interrupt state
    fn state() -> InterruptState;
    /// Mask interrupt delivery
    ///
    /// # Safety
    /// The caller must later [restore](Self::restore) the state it observed.
    unsafe fn disable();
    /// Put back a state previously returned by [state](Self::state)
    ///
    /// # Safety
    /// Restoring [Enabled](InterruptState::Enabled) from inside another
    /// context's critical section breaks that section.
    unsafe fn restore(state: InterruptState);
}

#[cfg(all(target_arch = "arm", target_os = "none", target_has_atomic = "32"))]
#[path = "cortex_m_exclusive.rs"]
mod native;

#[cfg(all(target_arch = "arm", target_os = "none", not(target_has_atomic = "32")))]
#[path = "cortex_m_primask.rs"]
mod native;

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
#[path = "host.rs"]
mod native;

pub use native::{Native, Selected};
pub(crate) use native::{CAPABILITIES, STRATEGY};

#[cfg(test)]
pub(crate) mod sim;
