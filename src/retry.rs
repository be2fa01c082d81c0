//! Retry policies
//!
//! What a read-modify-write loop does after it loses a race. The default,
//! [Unbounded], retries immediately and forever: with a handful of contexts on
//! one core somebody always makes progress. Call sites with more contention
//! can bound the loop with [Bounded] or spread retries out with [BackOff].
//!
//! ## Example
//! ```rust
//! use sync_cells::{atomic_incr_with, Bounded};
//!
//! let mut hits = 0u32;
//! let mut policy = Bounded::new(3);
//! let n = unsafe { atomic_incr_with(&mut hits, 1, &mut policy) };
//! assert_eq!(n, Ok(1));
//! ```
use core::{cell::Cell, convert::Infallible, hint::spin_loop};

use crate::error::Error;

/// Consulted after every lost race
pub trait RetryPolicy {
    /// Why the policy gives up
    type Error;
    /// Called once per failed compare-and-set. `Ok` retries, `Err` stops the
    /// loop and is returned to the caller.
    fn on_conflict(&mut self) -> Result<(), Self::Error>;
}

impl<P: RetryPolicy + ?Sized> RetryPolicy for &mut P {
    type Error = P::Error;
    #[inline(always)]
    fn on_conflict(&mut self) -> Result<(), Self::Error> { (**self).on_conflict() }
}

/// Retry immediately, without limit.
///
/// Livelock is possible under sustained contention.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Unbounded;

impl RetryPolicy for Unbounded {
    type Error = Infallible;
    #[inline(always)]
    fn on_conflict(&mut self) -> Result<(), Infallible> { Ok(()) }
}

/// Give up after `limit` lost races, otherwise defer to `P`.
///
/// ```rust
/// use sync_cells::{Bounded, Error, RetryPolicy};
/// let mut p = Bounded::new(1);
/// assert_eq!(p.on_conflict(), Ok(()));
/// assert_eq!(p.on_conflict(), Err(Error::RetriesExhausted { attempts: 2 }));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bounded<P = Unbounded> {
    inner: P,
    limit: u32,
    attempts: u32,
}

impl Bounded {
    /// Allow `limit` retries, each immediate
    pub const fn new(limit: u32) -> Self { Self::with(Unbounded, limit) }
}

impl<P> Bounded<P> {
    /// Allow `limit` retries, paced by `inner`
    pub const fn with(inner: P, limit: u32) -> Self { Self { inner, limit, attempts: 0 } }
    /// Lost races seen so far
    pub fn attempts(&self) -> u32 { self.attempts }
    /// Retries allowed
    pub fn limit(&self) -> u32 { self.limit }
    /// Start counting again
    pub fn reset(&mut self) { self.attempts = 0 }
}

impl<P: RetryPolicy<Error = Infallible>> RetryPolicy for Bounded<P> {
    type Error = Error;
    fn on_conflict(&mut self) -> Result<(), Error> {
        self.attempts = self.attempts.saturating_add(1);
        if self.attempts > self.limit {
            log::warn!("giving up after {} lost compare-and-set races", self.attempts);
            return Err(Error::RetriesExhausted { attempts: self.attempts });
        }
        match self.inner.on_conflict() {
            Ok(()) => Ok(()),
            Err(never) => match never {},
        }
    }
}

/// Maximum spin iteration limit.
const MAX_SPIN: u32 = 1 << 16;

/// Default starting spin count.
const START_VALUE: u32 = 1 << 2;

/// Yield threshold used only under the `std` feature.
#[cfg(feature = "std")]
const YIELD_THRESHOLD: u32 = 1 << 10;

/// Bit shift applied during [`BackOff::relax`] to reduce spin intensity.
const RELAX_DIV_BIT_VAL: u32 = 1;

/// Exponential backoff between retries.
///
/// Each [`wait`](BackOff::wait) spins for the current count, then doubles it
/// up to a fixed cap. Under `std`, once the count passes a threshold the
/// thread also yields.
///
/// Never use this from an interrupt handler on a single core: the context it
/// waits for cannot run until the handler returns.
///
/// # Examples
///
/// ```rust
/// use sync_cells::{atomic_update_with, BackOff};
///
/// let mut flags = 0b0001u8;
/// let mut backoff = BackOff::new();
/// let set = unsafe { atomic_update_with(&mut flags, &mut backoff, |f| f | 0b0100) };
/// assert_eq!(set, Ok(0b0101));
/// ```
#[derive(Debug)]
pub struct BackOff {
    spin: Cell<u32>,
}

impl BackOff {
    /// Creates a new [`BackOff`] with a default starting spin count.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            spin: Cell::new(START_VALUE),
        }
    }

    /// Creates a new [`BackOff`] with a custom starting spin value.
    ///
    /// # Examples
    /// ```
    /// use sync_cells::BackOff;
    /// let b = BackOff::new_with(128);
    /// assert_eq!(b.current(), 128);
    /// ```
    #[inline(always)]
    pub const fn new_with(start: u32) -> Self {
        Self {
            spin: Cell::new(start),
        }
    }

    /// Spins for the current count, then doubles it.
    #[inline]
    pub fn wait(&self) {
        let end = self.spin.get();

        for _ in 0..end {
            spin_loop();
        }

        self.spin.set((end << 1).clamp(1, MAX_SPIN));

        #[cfg(feature = "std")]
        if end > YIELD_THRESHOLD {
            log::trace!("backoff at {end} spins, yielding");
            std::thread::yield_now();
        }
    }

    /// Halves the spin count, e.g. after a success.
    #[inline(always)]
    pub fn relax(&self) {
        let c_spin = self.spin.get();
        self.spin.set(c_spin >> RELAX_DIV_BIT_VAL);
    }

    /// Returns the current spin iteration value.
    #[inline(always)]
    pub fn current(&self) -> u32 {
        self.spin.get()
    }

    /// Resets the backoff spin count to the default starting value.
    #[inline(always)]
    pub fn reset(&self) {
        self.spin.set(START_VALUE);
    }

    /// Resets the backoff spin count to a specified value.
    #[inline(always)]
    pub fn reset_to(&self, spin: u32) {
        self.spin.set(spin);
    }
}

impl Default for BackOff {
    fn default() -> Self { Self::new() }
}

impl RetryPolicy for BackOff {
    type Error = Infallible;
    #[inline]
    fn on_conflict(&mut self) -> Result<(), Infallible> {
        self.wait();
        Ok(())
    }
}
