//! Simulated hardware for unit tests
//!
//! [SimMonitor] is an exclusive monitor that can be told to fail stores
//! spuriously or to let another context write between the exclusive load and
//! the exclusive store. [SimInterrupts] is an interrupt controller that records
//! the state the cell was accessed under. All state is thread local, so tests
//! may run in parallel.
use core::{cell::Cell, ptr};
use std::thread_local;

use super::{CellAccess, ExclusiveAccess, InterruptControl};
use crate::{critical::InterruptState, width::RawWord};

thread_local! {
    static RESERVED: Cell<Option<usize>> = const { Cell::new(None) };
    static SPURIOUS: Cell<u32> = const { Cell::new(0) };
    static INTERLOPER: Cell<Option<u32>> = const { Cell::new(None) };
    static CLEARS: Cell<u32> = const { Cell::new(0) };
    static STORES: Cell<u32> = const { Cell::new(0) };
    static MASK: Cell<InterruptState> = const { Cell::new(InterruptState::Enabled) };
    static ACCESSED_UNDER: Cell<Option<InterruptState>> = const { Cell::new(None) };
}

/// Put every simulated register back to its reset value
pub fn reset() {
    RESERVED.with(|c| c.set(None));
    SPURIOUS.with(|c| c.set(0));
    INTERLOPER.with(|c| c.set(None));
    CLEARS.with(|c| c.set(0));
    STORES.with(|c| c.set(0));
    MASK.with(|c| c.set(InterruptState::Enabled));
    ACCESSED_UNDER.with(|c| c.set(None));
}

/// Fail the next `n` exclusive stores without touching memory
pub fn fail_next_stores(n: u32) { SPURIOUS.with(|c| c.set(n)) }

/// Have another context write `value` right before the next exclusive store
pub fn interleave_write(value: u32) { INTERLOPER.with(|c| c.set(Some(value))) }

/// Number of times the reservation was explicitly cleared
pub fn clears() -> u32 { CLEARS.with(Cell::get) }

/// Number of exclusive stores attempted
pub fn stores() -> u32 { STORES.with(Cell::get) }

/// Whether a reservation is outstanding
pub fn reservation_held() -> bool { RESERVED.with(Cell::get).is_some() }

/// Current simulated interrupt state
pub fn interrupt_state() -> InterruptState { MASK.with(Cell::get) }

/// Force the simulated interrupt state
pub fn set_interrupt_state(state: InterruptState) { MASK.with(|c| c.set(state)) }

/// Interrupt state during the most recent cell access
pub fn accessed_under() -> Option<InterruptState> { ACCESSED_UNDER.with(Cell::get) }

/// Exclusive monitor with fault injection
pub struct SimMonitor;

unsafe impl<R: RawWord> CellAccess<R> for SimMonitor {
    unsafe fn load(target: *const R) -> R { ptr::read_volatile(target) }
    unsafe fn store(target: *mut R, value: R) { ptr::write_volatile(target, value) }
}

unsafe impl<R: RawWord> ExclusiveAccess<R> for SimMonitor {
    unsafe fn load_exclusive(target: *const R) -> R {
        RESERVED.with(|c| c.set(Some(target as usize)));
        ptr::read_volatile(target)
    }

    unsafe fn store_exclusive(target: *mut R, value: R) -> bool {
        STORES.with(|c| c.set(c.get() + 1));
        if let Some(other) = INTERLOPER.with(Cell::take) {
            ptr::write_volatile(target, R::from_bits(other));
            RESERVED.with(|c| c.set(None));
        }
        let spurious = SPURIOUS.with(|c| {
            let n = c.get();
            c.set(n.saturating_sub(1));
            n > 0
        });
        let reserved = RESERVED.with(Cell::take);
        if spurious || reserved != Some(target as usize) {
            return false;
        }
        ptr::write_volatile(target, value);
        true
    }

    fn clear_exclusive() {
        CLEARS.with(|c| c.set(c.get() + 1));
        RESERVED.with(|c| c.set(None));
    }
}

/// Interrupt controller that records the state cells are accessed under
pub struct SimInterrupts;

unsafe impl InterruptControl for SimInterrupts {
    fn state() -> InterruptState { interrupt_state() }
    unsafe fn disable() { set_interrupt_state(InterruptState::Disabled) }
    unsafe fn restore(state: InterruptState) { set_interrupt_state(state) }
}

unsafe impl<R: RawWord> CellAccess<R> for SimInterrupts {
    unsafe fn load(target: *const R) -> R {
        ACCESSED_UNDER.with(|c| c.set(Some(interrupt_state())));
        ptr::read_volatile(target)
    }
    unsafe fn store(target: *mut R, value: R) {
        ACCESSED_UNDER.with(|c| c.set(Some(interrupt_state())));
        ptr::write_volatile(target, value)
    }
}
