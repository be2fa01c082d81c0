//! Supported cell widths
//!
//! The set of integer types the primitives accept is closed: 8, 16 and 32 bit,
//! signed or unsigned. Every other type fails to satisfy [Word] and is rejected
//! at compile time.
//!
//! Each [Word] is carried over the bus as its [RawWord], the unsigned type of the
//! same width. Signed values are transported bit for bit, so `i8` uses the byte
//! instructions, `i16` the halfword ones, and so on.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use core::{fmt, mem};

mod sealed {
    /// Keeps [Word](super::Word) and [RawWord](super::RawWord) closed
    pub trait Sealed {}
}

/// Bit widths a cell may have
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
  strum::Display, strum::AsRefStr, strum::EnumCount, strum::EnumIter
)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Width {
    /// 8 bits
    Byte,
    /// 16 bits
    Halfword,
    /// 32 bits
    Word,
}
impl Width {
    /// Number of bits
    pub const fn bits(self) -> u32 {
        match self {
            Self::Byte => 8,
            Self::Halfword => 16,
            Self::Word => 32,
        }
    }
    /// Number of bytes touched by a single access of this width
    pub const fn bytes(self) -> usize { (self.bits() / 8) as usize }
}

/// An unsigned type with a matching hardware access size.
///
/// Architecture backends implement their load/store variants once per raw word.
pub trait RawWord: sealed::Sealed + Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Width of a single access
    const WIDTH: Width;
    /// Zero-extend into a register-sized value
    fn to_bits(self) -> u32;
    /// Truncate a register-sized value
    fn from_bits(bits: u32) -> Self;
}

/// A value type that can live in a shared cell.
pub trait Word: sealed::Sealed + Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// The unsigned type of the same width used for bus access
    type Raw: RawWord;
    /// Width of the cell
    const WIDTH: Width = <Self::Raw as RawWord>::WIDTH;
    /// Reinterpret as the raw word
    fn into_raw(self) -> Self::Raw;
    /// Reinterpret a raw word
    fn from_raw(raw: Self::Raw) -> Self;
    /// Two's complement addition
    fn wrapping_add(self, rhs: Self) -> Self;
    /// Two's complement subtraction
    fn wrapping_sub(self, rhs: Self) -> Self;
}

macro_rules! make_raw_word {
  ($($Raw:ident => $Width:ident,)+) => {
    $(
      impl sealed::Sealed for $Raw {}
      impl RawWord for $Raw {
        const WIDTH: Width = Width::$Width;
        #[inline(always)]
        fn to_bits(self) -> u32 { self as u32 }
        #[inline(always)]
        fn from_bits(bits: u32) -> Self { bits as $Raw }
      }
    )+
  };
}

macro_rules! make_word {
  (@Unsigned $Unit:ident) => {
    impl Word for $Unit {
      type Raw = $Unit;
      #[inline(always)]
      fn into_raw(self) -> Self::Raw { self }
      #[inline(always)]
      fn from_raw(raw: Self::Raw) -> Self { raw }
      #[inline(always)]
      fn wrapping_add(self, rhs: Self) -> Self { $Unit::wrapping_add(self, rhs) }
      #[inline(always)]
      fn wrapping_sub(self, rhs: Self) -> Self { $Unit::wrapping_sub(self, rhs) }
    }
  };
  (@Signed $Unit:ident as $Raw:ident) => {
    impl sealed::Sealed for $Unit {}
    impl Word for $Unit {
      type Raw = $Raw;
      #[inline(always)]
      fn into_raw(self) -> Self::Raw { self as $Raw }
      #[inline(always)]
      fn from_raw(raw: Self::Raw) -> Self { raw as $Unit }
      #[inline(always)]
      fn wrapping_add(self, rhs: Self) -> Self { $Unit::wrapping_add(self, rhs) }
      #[inline(always)]
      fn wrapping_sub(self, rhs: Self) -> Self { $Unit::wrapping_sub(self, rhs) }
    }
    // Cells are accessed through a pointer cast to the raw word.
    const _: () = assert!(
      mem::size_of::<$Unit>() == mem::size_of::<$Raw>()
        && mem::align_of::<$Unit>() == mem::align_of::<$Raw>()
    );
  };
  ([$($Unsigned:ident,)+] [$($Signed:ident as $Raw:ident,)+]) => {
    $(make_word!{@Unsigned $Unsigned})+
    $(make_word!{@Signed $Signed as $Raw})+
  };
}

make_raw_word! {
  u8 => Byte,
  u16 => Halfword,
  u32 => Word,
}

make_word! {
  [u8, u16, u32,]
  [i8 as u8, i16 as u16, i32 as u32,]
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn widths_match_access_sizes() {
        assert_eq!(<u8 as Word>::WIDTH, Width::Byte);
        assert_eq!(<i16 as Word>::WIDTH, Width::Halfword);
        assert_eq!(<i32 as Word>::WIDTH, Width::Word);
        Width::iter().for_each(|w| assert_eq!(w.bytes() * 8, w.bits() as usize));
    }

    #[test]
    fn signed_values_survive_raw_transport() {
        assert_eq!(i8::from_raw((-3i8).into_raw()), -3);
        assert_eq!((-1i16).into_raw(), u16::MAX);
        assert_eq!(i32::from_raw(0x8000_0000), i32::MIN);
        assert_eq!(u16::from_bits(0x0001_ffff), u16::MAX);
        assert_eq!(0xabu8.to_bits(), 0xab);
    }

    #[test]
    fn arithmetic_wraps_at_width() {
        assert_eq!(Word::wrapping_add(u8::MAX, 1), 0);
        assert_eq!(Word::wrapping_sub(0u16, 1), u16::MAX);
        assert_eq!(Word::wrapping_add(i8::MAX, 1), i8::MIN);
    }
}
