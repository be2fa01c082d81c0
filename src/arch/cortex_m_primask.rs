//! ARMv6-M: no exclusive instructions, so mask interrupts with `PRIMASK`
use core::ptr;
use cortex_m::{interrupt, register::primask};
use enumflags2::{make_bitflags, BitFlags};

use super::{CellAccess, InterruptControl};
use crate::{
    cas::Masking,
    critical::InterruptState,
    policy::{Capability, Strategy},
};

/// The core's `PRIMASK` register and bus
pub struct Native;

/// Strategy behind every operation that does not name one
pub type Selected = Masking<Native>;
pub(crate) const STRATEGY: Strategy = Strategy::InterruptMasking;
pub(crate) const CAPABILITIES: BitFlags<Capability> = make_bitflags!(Capability::{InterruptMask});

unsafe impl InterruptControl for Native {
    #[inline(always)]
    fn state() -> InterruptState {
        if primask::read().is_active() {
            InterruptState::Enabled
        } else {
            InterruptState::Disabled
        }
    }

    #[inline(always)]
    unsafe fn disable() { interrupt::disable() }

    #[inline(always)]
    unsafe fn restore(state: InterruptState) {
        if state == InterruptState::Enabled {
            interrupt::enable()
        }
    }
}

macro_rules! plain_access {
  ($($Raw:ident),+) => {
    $(
      unsafe impl CellAccess<$Raw> for Native {
        #[inline(always)]
        unsafe fn load(target: *const $Raw) -> $Raw { ptr::read_volatile(target) }
        #[inline(always)]
        unsafe fn store(target: *mut $Raw, value: $Raw) { ptr::write_volatile(target, value) }
      }
    )+
  };
}

plain_access!(u8, u16, u32);
