//! Hosted emulation of the single-core primitives
//!
//! Threads stand in for execution contexts. Cell accesses go through
//! `core::sync::atomic` at the cell's own width, so neighbouring bytes are never
//! touched and concurrent plain loads are not data races.
//!
//! - Exclusive access (default): `load_exclusive` records a per-thread
//!   reservation holding the loaded value; `store_exclusive` is a
//!   compare-exchange against it. Unlike `STREX` it never fails spuriously, so
//!   hosted runs are deterministic; spurious failures are exercised with the
//!   simulated monitor in the unit tests.
//! - Interrupt masking (`emulate-interrupt-mask`): "interrupts disabled" is a
//!   process-wide owner slot. A thread that masks while another owns the slot
//!   waits, which is what a second core would observe if the first had masked
//!   interrupts on a single-core machine.
#[cfg(not(feature = "std"))]
compile_error!("hosted targets need the `std` feature; only Cortex-M has a native backend");

use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};
use enumflags2::{make_bitflags, BitFlags};
use paste::paste;

use super::CellAccess;
use crate::policy::{Capability, Strategy};

/// The emulated core
pub struct Native;

macro_rules! host_access {
  ($($Raw:ident),+) => {
    paste! {
      $(
        unsafe impl CellAccess<$Raw> for Native {
          #[inline(always)]
          unsafe fn load(target: *const $Raw) -> $Raw {
            [<Atomic $Raw:camel>]::from_ptr(target as *mut $Raw).load(Ordering::SeqCst)
          }
          #[inline(always)]
          unsafe fn store(target: *mut $Raw, value: $Raw) {
            [<Atomic $Raw:camel>]::from_ptr(target).store(value, Ordering::SeqCst)
          }
        }

        #[cfg(not(feature = "emulate-interrupt-mask"))]
        unsafe impl super::ExclusiveAccess<$Raw> for Native {
          #[inline]
          unsafe fn load_exclusive(target: *const $Raw) -> $Raw {
            let value = <Self as CellAccess<$Raw>>::load(target);
            exclusive::reserve(target as usize, value as u32);
            value
          }
          #[inline]
          unsafe fn store_exclusive(target: *mut $Raw, value: $Raw) -> bool {
            match exclusive::take(target as usize) {
              Some(loaded) => [<Atomic $Raw:camel>]::from_ptr(target)
                .compare_exchange(loaded as $Raw, value, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok(),
              None => false,
            }
          }
          #[inline]
          fn clear_exclusive() { exclusive::clear() }
        }
      )+
    }
  };
}

host_access!(u8, u16, u32);

#[cfg(not(feature = "emulate-interrupt-mask"))]
pub use exclusive::{Selected, CAPABILITIES, STRATEGY};
#[cfg(feature = "emulate-interrupt-mask")]
pub use masking::{Selected, CAPABILITIES, STRATEGY};

#[cfg(not(feature = "emulate-interrupt-mask"))]
mod exclusive {
    use core::cell::Cell;
    use std::thread_local;

    use super::*;
    use crate::cas::Exclusive;

    /// Strategy behind every operation that does not name one
    pub type Selected = Exclusive<Native>;
    pub const STRATEGY: Strategy = Strategy::ExclusiveAccess;
    pub const CAPABILITIES: BitFlags<Capability> =
        make_bitflags!(Capability::{ExclusiveByte | ExclusiveHalfword | ExclusiveWord});

    thread_local! {
        /// Address and zero-extended value of the last exclusive load
        static RESERVATION: Cell<Option<(usize, u32)>> = const { Cell::new(None) };
    }

    pub(super) fn reserve(address: usize, value: u32) {
        RESERVATION.with(|r| r.set(Some((address, value))));
    }

    /// Consume the reservation if it covers `address`
    pub(super) fn take(address: usize) -> Option<u32> {
        RESERVATION.with(|r| r.take())
            .and_then(|(reserved, value)| (reserved == address).then_some(value))
    }

    pub(super) fn clear() {
        RESERVATION.with(|r| r.set(None));
    }
}

#[cfg(feature = "emulate-interrupt-mask")]
mod masking {
    use core::sync::atomic::AtomicUsize;
    use std::thread_local;

    use super::*;
    use crate::{arch::InterruptControl, cas::Masking, critical::InterruptState, BackOff};

    /// Strategy behind every operation that does not name one
    pub type Selected = Masking<Native>;
    pub const STRATEGY: Strategy = Strategy::InterruptMasking;
    pub const CAPABILITIES: BitFlags<Capability> = make_bitflags!(Capability::{InterruptMask});

    const UNMASKED: usize = 0;

    /// Context that currently has interrupts masked
    static MASK_OWNER: AtomicUsize = AtomicUsize::new(UNMASKED);
    static NEXT_CONTEXT: AtomicUsize = AtomicUsize::new(UNMASKED + 1);

    thread_local! {
        static CONTEXT: usize = NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed);
    }

    fn context() -> usize { CONTEXT.with(|c| *c) }

    unsafe impl InterruptControl for Native {
        fn state() -> InterruptState {
            if MASK_OWNER.load(Ordering::Acquire) == context() {
                InterruptState::Disabled
            } else {
                InterruptState::Enabled
            }
        }

        unsafe fn disable() {
            let me = context();
            if MASK_OWNER.load(Ordering::Relaxed) == me {
                return;
            }
            let backoff = BackOff::new();
            while MASK_OWNER
                .compare_exchange_weak(UNMASKED, me, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
            {
                backoff.wait();
            }
        }

        unsafe fn restore(state: InterruptState) {
            if state == InterruptState::Enabled && MASK_OWNER.load(Ordering::Relaxed) == context() {
                MASK_OWNER.store(UNMASKED, Ordering::Release);
            }
        }
    }

}

#[cfg(all(test, not(feature = "emulate-interrupt-mask")))]
mod tests {
    use super::*;
    use crate::arch::ExclusiveAccess;

    #[test]
    fn store_needs_matching_reservation() {
        let mut cells = [1u16, 2u16];
        let first = cells.as_mut_ptr();
        let second = first.wrapping_add(1);
        unsafe {
            assert_eq!(<Native as ExclusiveAccess<u16>>::load_exclusive(first), 1);
            assert!(!<Native as ExclusiveAccess<u16>>::store_exclusive(second, 9), "reservation is for another address");
            assert!(!<Native as ExclusiveAccess<u16>>::store_exclusive(first, 9), "failed store consumed the reservation");

            <Native as ExclusiveAccess<u16>>::load_exclusive(first);
            <Native as ExclusiveAccess<u16>>::clear_exclusive();
            assert!(!<Native as ExclusiveAccess<u16>>::store_exclusive(first, 9), "cleared reservation");
        }
        assert_eq!(cells, [1, 2]);
    }

    #[test]
    fn intervening_write_breaks_reservation() {
        let mut cell = 5u32;
        let p: *mut u32 = &mut cell;
        unsafe {
            <Native as ExclusiveAccess<u32>>::load_exclusive(p);
            <Native as CellAccess<u32>>::store(p, 6);
            assert!(!<Native as ExclusiveAccess<u32>>::store_exclusive(p, 7));
            assert_eq!(<Native as CellAccess<u32>>::load(p), 6);
        }
    }
}
