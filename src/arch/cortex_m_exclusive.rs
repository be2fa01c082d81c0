//! ARMv7-M / ARMv8-M: load/store-exclusive instructions
use core::{arch::asm, ptr};
use enumflags2::{make_bitflags, BitFlags};

use super::{CellAccess, ExclusiveAccess};
use crate::{
    cas::Exclusive,
    policy::{Capability, Strategy},
};

/// The core's own exclusive monitor
pub struct Native;

/// Strategy behind every operation that does not name one
pub type Selected = Exclusive<Native>;
pub(crate) const STRATEGY: Strategy = Strategy::ExclusiveAccess;
pub(crate) const CAPABILITIES: BitFlags<Capability> =
    make_bitflags!(Capability::{ExclusiveByte | ExclusiveHalfword | ExclusiveWord});

macro_rules! exclusive_access {
  ($($Raw:ident => $ldrex:literal / $strex:literal,)+) => {
    $(
      unsafe impl CellAccess<$Raw> for Native {
        #[inline(always)]
        unsafe fn load(target: *const $Raw) -> $Raw { ptr::read_volatile(target) }
        #[inline(always)]
        unsafe fn store(target: *mut $Raw, value: $Raw) { ptr::write_volatile(target, value) }
      }

      unsafe impl ExclusiveAccess<$Raw> for Native {
        #[inline(always)]
        unsafe fn load_exclusive(target: *const $Raw) -> $Raw {
          let value: u32;
          asm!(
            $ldrex,
            value = out(reg) value,
            target = in(reg) target,
            options(nostack, preserves_flags),
          );
          value as $Raw
        }
        #[inline(always)]
        unsafe fn store_exclusive(target: *mut $Raw, value: $Raw) -> bool {
          // `out` rather than `lateout`: STREX needs a status register
          // distinct from its operands.
          let status: u32;
          asm!(
            $strex,
            status = out(reg) status,
            value = in(reg) value as u32,
            target = in(reg) target,
            options(nostack, preserves_flags),
          );
          status == 0
        }
        #[inline(always)]
        fn clear_exclusive() {
          // SAFETY: CLREX only resets the local monitor.
          unsafe { asm!("clrex", options(nomem, nostack, preserves_flags)) }
        }
      }
    )+
  };
}

exclusive_access! {
  u8 => "ldrexb {value}, [{target}]" / "strexb {status}, {value}, [{target}]",
  u16 => "ldrexh {value}, [{target}]" / "strexh {status}, {value}, [{target}]",
  u32 => "ldrex {value}, [{target}]" / "strex {status}, {value}, [{target}]",
}
