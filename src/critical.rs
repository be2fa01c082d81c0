//! Interrupt-masked critical sections
//!
//! On a single core, a context that cannot be interrupted cannot be raced. A
//! [CriticalSection] captures the interrupt state on entry, masks interrupt
//! delivery, and puts back exactly the captured state when it is dropped, on
//! every exit path. Nested sections therefore never unmask interrupts that an
//! outer section masked.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use core::marker::PhantomData;

use crate::arch::InterruptControl;

/// Whether interrupt delivery is enabled
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, Hash,
  strum::Display, strum::AsRefStr, strum::EnumCount, strum::EnumIter
)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum InterruptState {
    /// Interrupts are delivered
    Enabled,
    /// Interrupts are masked
    Disabled,
}

/// A scope with interrupts masked through `I`.
///
/// Dropping the guard restores the state observed by [enter](Self::enter).
#[must_use = "interrupts are restored as soon as the guard is dropped"]
pub struct CriticalSection<I: InterruptControl> {
    entry: InterruptState,
    _control: PhantomData<I>,
    // Pinned to the context that masked interrupts.
    _local: PhantomData<*const ()>,
}

impl<I: InterruptControl> CriticalSection<I> {
    /// Capture the interrupt state, then mask interrupts.
    ///
    /// # Safety
    /// Guards must be dropped in the reverse order of their creation. Dropping
    /// an outer guard while an inner one is alive re-enables interrupts inside
    /// the inner section. [free] upholds this by construction.
    #[inline(always)]
    pub unsafe fn enter() -> Self {
        let entry = I::state();
        I::disable();
        Self { entry, _control: PhantomData, _local: PhantomData }
    }

    /// The interrupt state that will be restored on drop
    pub fn entry_state(&self) -> InterruptState { self.entry }
}

impl<I: InterruptControl> Drop for CriticalSection<I> {
    #[inline(always)]
    fn drop(&mut self) {
        // SAFETY: `entry` was read from the same controller when this guard
        // was created.
        unsafe { I::restore(self.entry) }
    }
}

/// Run `f` with interrupts masked through `I`.
///
/// ```
/// use sync_cells::{arch::InterruptControl, critical, InterruptState};
///
/// // A controller for a core whose interrupts are never delivered
/// struct Quiet;
/// unsafe impl InterruptControl for Quiet {
///     fn state() -> InterruptState { InterruptState::Disabled }
///     unsafe fn disable() {}
///     unsafe fn restore(_: InterruptState) {}
/// }
///
/// let x = critical::free::<Quiet, _>(|cs| {
///     assert_eq!(cs.entry_state(), InterruptState::Disabled);
///     3 + 4
/// });
/// assert_eq!(x, 7);
/// ```
#[inline(always)]
pub fn free<I: InterruptControl, R>(f: impl FnOnce(&CriticalSection<I>) -> R) -> R {
    // SAFETY: the guard is dropped at the end of this frame, after any guard
    // `f` created.
    let cs = unsafe { CriticalSection::<I>::enter() };
    f(&cs)
}
