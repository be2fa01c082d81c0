//! Shared cells
//!
//! [Shared] owns its storage and exposes the primitives without raw pointers.
//! It has the layout of the plain integer, so it can also be laid over memory
//! shared with code that uses the raw-pointer API.
use core::{cell::UnsafeCell, fmt};
use paste::paste;

use crate::{
    cas::{self, CasStrategy},
    ops,
    policy::Selected,
    retry::RetryPolicy,
    width::Word,
};

/// A cell that any execution context may update atomically.
#[repr(transparent)]
pub struct Shared<W: Word> {
    value: UnsafeCell<W>,
}

// SAFETY: every shared access goes through the selected strategy.
unsafe impl<W: Word> Sync for Shared<W> {}

impl<W: Word> Shared<W> {
    /// Instantiate
    pub const fn new(value: W) -> Self { Self { value: UnsafeCell::new(value) } }
    /// Pointer to the cell, for the raw-pointer API
    pub const fn as_ptr(&self) -> *mut W { self.value.get() }
    /// Exclusive access needs no atomicity
    pub fn get_mut(&mut self) -> &mut W { self.value.get_mut() }
    /// Take the value
    pub fn into_inner(self) -> W { self.value.into_inner() }
}

impl<W: Word> Shared<W>
where
    Selected: CasStrategy<W::Raw>,
{
    /// Current value
    pub fn load(&self) -> W {
        // SAFETY: `as_ptr` is valid and aligned for the lifetime of `self`.
        unsafe { cas::atomic_load(self.as_ptr()) }
    }
    /// Store `desired` if the cell holds `*expected`; see [atomic_cas](crate::atomic_cas).
    pub fn compare_and_set(&self, expected: &mut W, desired: W) -> bool {
        // SAFETY: as for `load`.
        unsafe { cas::atomic_cas(self.as_ptr(), expected, desired) }
    }
    /// Add `delta`, returning the new value
    pub fn incr(&self, delta: W) -> W {
        // SAFETY: as for `load`.
        unsafe { ops::atomic_incr(self.as_ptr(), delta) }
    }
    /// Subtract `delta`, returning the new value
    pub fn decr(&self, delta: W) -> W {
        // SAFETY: as for `load`.
        unsafe { ops::atomic_decr(self.as_ptr(), delta) }
    }
    /// [incr](Self::incr) with a retry policy
    pub fn incr_with<P: RetryPolicy>(&self, delta: W, policy: P) -> Result<W, P::Error> {
        // SAFETY: as for `load`.
        unsafe { ops::atomic_incr_with(self.as_ptr(), delta, policy) }
    }
    /// [decr](Self::decr) with a retry policy
    pub fn decr_with<P: RetryPolicy>(&self, delta: W, policy: P) -> Result<W, P::Error> {
        // SAFETY: as for `load`.
        unsafe { ops::atomic_decr_with(self.as_ptr(), delta, policy) }
    }
    /// Replace the value with `f(value)`, returning what was stored.
    ///
    /// `f` may run more than once.
    pub fn update(&self, f: impl FnMut(W) -> W) -> W {
        match self.update_with(crate::retry::Unbounded, f) {
            Ok(w) => w,
            Err(never) => match never {},
        }
    }
    /// [update](Self::update) with a retry policy
    pub fn update_with<P: RetryPolicy>(&self, policy: P, f: impl FnMut(W) -> W) -> Result<W, P::Error> {
        // SAFETY: as for `load`.
        unsafe { ops::atomic_update_with(self.as_ptr(), policy, f) }
    }
}

impl<W: Word + Default> Default for Shared<W> {
    fn default() -> Self { Self::new(W::default()) }
}

impl<W: Word> From<W> for Shared<W> {
    fn from(value: W) -> Self { Self::new(value) }
}

impl<W: Word> fmt::Debug for Shared<W>
where
    Selected: CasStrategy<W::Raw>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.load()).finish()
    }
}

impl<W: Word + fmt::Display> fmt::Display for Shared<W>
where
    Selected: CasStrategy<W::Raw>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.load())
    }
}

/// Names a [Shared] cell for each supported width
macro_rules! make_shared {
  ($($Unit:ident,)+) => {
    paste!{
      $(
        #[doc = r#"A [Shared] ["# $Unit r#"] cell."#]
        #[doc = r"```"]
        #[doc = "use sync_cells::" [<Shared $Unit:camel>] " as C;"]
        #[doc = "use " $Unit " as U;"]
        #[doc = r#"let c = C::new(U::MAX - 1);"# ]
        #[doc = r#"assert_eq!(c.incr(1), U::MAX);"# ]
        #[doc = r#"assert_eq!(c.incr(1), U::MIN, "wraps on overflow");"# ]
        #[doc = r#"assert_eq!(c.decr(1), U::MAX, "wraps on underflow");"# ]
        #[doc = r#"let mut stale = U::MIN;"# ]
        #[doc = r#"assert!(!c.compare_and_set(&mut stale, 7), "stale expectation fails");"# ]
        #[doc = r#"assert_eq!(stale, U::MAX, "and learns the current value");"# ]
        #[doc = r#"assert!(c.compare_and_set(&mut stale, 7));"# ]
        #[doc = r#"assert_eq!(c.load(), 7);"# ]
        #[doc = r"```"]
        pub type [<Shared $Unit:camel>] = Shared<$Unit>;
      )+
    }
  };
}

make_shared! {
  u8, u16, u32,
  i8, i16, i32,
}
