//! Increment, decrement and general read-modify-write
//!
//! All of these are retry loops over [compare-and-set](crate::cas): take the
//! current value as a guess, compute the new value from it, try to install it.
//! A failed attempt has already refreshed the guess, so the loop recomputes
//! straight away. Arithmetic wraps at the cell's width.
use core::convert::Infallible;

use crate::{
    cas::{self, CasStrategy},
    policy::Selected,
    retry::{RetryPolicy, Unbounded},
    width::Word,
};

/// Apply `f` atomically with an explicit strategy, returning the value stored.
///
/// `f` may run several times and must be a pure function of its argument.
///
/// # Safety
/// `target` must be valid and aligned for `W`, and every concurrent write to it
/// must go through strategy `S`.
#[inline]
pub unsafe fn update<S, W, P, F>(target: *mut W, mut policy: P, mut f: F) -> Result<W, P::Error>
where
    S: CasStrategy<W::Raw>,
    W: Word,
    P: RetryPolicy,
    F: FnMut(W) -> W,
{
    // Any value is a valid first guess; a plain read just makes the first
    // attempt likely to succeed.
    let mut current = cas::load::<S, W>(target);
    loop {
        let candidate = f(current);
        if cas::compare_and_set::<S, W>(target, &mut current, candidate) {
            return Ok(candidate);
        }
        policy.on_conflict()?;
    }
}

#[inline(always)]
fn infallible<W>(r: Result<W, Infallible>) -> W {
    match r {
        Ok(w) => w,
        Err(never) => match never {},
    }
}

/// Apply `f` atomically, retrying as `policy` allows.
///
/// # Safety
/// As for [atomic_cas](crate::atomic_cas).
#[inline]
pub unsafe fn atomic_update_with<W, P, F>(target: *mut W, policy: P, f: F) -> Result<W, P::Error>
where
    W: Word,
    P: RetryPolicy,
    F: FnMut(W) -> W,
    Selected: CasStrategy<W::Raw>,
{
    update::<Selected, W, P, F>(target, policy, f)
}

/// Atomically add `delta`, returning the new value.
///
/// ```
/// use sync_cells::atomic_incr;
/// let mut pending = 250u8;
/// assert_eq!(unsafe { atomic_incr(&mut pending, 5) }, 255);
/// assert_eq!(unsafe { atomic_incr(&mut pending, 1) }, 0, "wraps at the width");
/// ```
///
/// # Safety
/// As for [atomic_cas](crate::atomic_cas).
#[inline]
pub unsafe fn atomic_incr<W>(target: *mut W, delta: W) -> W
where
    W: Word,
    Selected: CasStrategy<W::Raw>,
{
    infallible(atomic_incr_with(target, delta, Unbounded))
}

/// Atomically subtract `delta`, returning the new value.
///
/// ```
/// use sync_cells::atomic_decr;
/// let mut credit = 3i16;
/// assert_eq!(unsafe { atomic_decr(&mut credit, 5) }, -2);
/// ```
///
/// # Safety
/// As for [atomic_cas](crate::atomic_cas).
#[inline]
pub unsafe fn atomic_decr<W>(target: *mut W, delta: W) -> W
where
    W: Word,
    Selected: CasStrategy<W::Raw>,
{
    infallible(atomic_decr_with(target, delta, Unbounded))
}

/// [atomic_incr] with a retry policy.
///
/// # Safety
/// As for [atomic_cas](crate::atomic_cas).
#[inline]
pub unsafe fn atomic_incr_with<W, P>(target: *mut W, delta: W, policy: P) -> Result<W, P::Error>
where
    W: Word,
    P: RetryPolicy,
    Selected: CasStrategy<W::Raw>,
{
    atomic_update_with(target, policy, |w: W| w.wrapping_add(delta))
}

/// [atomic_decr] with a retry policy.
///
/// # Safety
/// As for [atomic_cas](crate::atomic_cas).
#[inline]
pub unsafe fn atomic_decr_with<W, P>(target: *mut W, delta: W, policy: P) -> Result<W, P::Error>
where
    W: Word,
    P: RetryPolicy,
    Selected: CasStrategy<W::Raw>,
{
    atomic_update_with(target, policy, |w: W| w.wrapping_sub(delta))
}
