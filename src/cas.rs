//! Compare-and-set
//!
//! The one atomic operation everything else is built from. It compares the
//! contents of a cell with an expected value and, only if they are equal,
//! replaces them with a desired value, as a single atomic step.
//!
//! ### Contract
//! - `true`: the cell held `*expected` and now holds `desired`. `*expected` is
//!   left as it was.
//! - `false`: the cell was not written by this call. `*expected` now holds the
//!   value the cell was observed to hold on the failure path, so the caller
//!   can recompute and retry without reading again. This holds on every
//!   failure path, including an exclusive store that fails with no competing
//!   writer.
//!
//! ### Strategies
//! - [Exclusive]: exclusive load, compare, exclusive store. Lock-free.
//! - [Masking]: load, compare, store inside a [critical section](crate::critical).
//!
//! Which one [atomic_cas] uses is fixed by the [policy](crate::policy).
use core::marker::PhantomData;

use crate::{
    arch::{CellAccess, ExclusiveAccess, InterruptControl},
    critical,
    policy::Selected,
    width::{RawWord, Word},
};

/// A way of making compare-and-set atomic for cells of one raw width.
pub trait CasStrategy<R: RawWord> {
    /// Compare-and-set on a raw cell.
    ///
    /// # Safety
    /// `target` must be valid and aligned for `R`, and every concurrent write
    /// to it must go through this strategy.
    unsafe fn compare_and_set(target: *mut R, expected: &mut R, desired: R) -> bool;

    /// A single-copy-atomic read, suitable as a first guess.
    ///
    /// # Safety
    /// As for [compare_and_set](Self::compare_and_set).
    unsafe fn load(target: *const R) -> R;
}

/// Exclusive load/store through `A`
pub struct Exclusive<A>(PhantomData<A>);

impl<R: RawWord, A: ExclusiveAccess<R>> CasStrategy<R> for Exclusive<A> {
    #[inline]
    unsafe fn compare_and_set(target: *mut R, expected: &mut R, desired: R) -> bool {
        let current = A::load_exclusive(target);
        if current != *expected {
            A::clear_exclusive();
            *expected = current;
            return false;
        }
        if A::store_exclusive(target, desired) {
            return true;
        }
        // Lost the reservation, to a writer or spuriously. Report what the
        // cell holds now rather than the stale guess.
        *expected = A::load(target);
        false
    }

    #[inline(always)]
    unsafe fn load(target: *const R) -> R { A::load(target) }
}

/// Interrupt masking through `A`
pub struct Masking<A>(PhantomData<A>);

impl<R: RawWord, A: InterruptControl + CellAccess<R>> CasStrategy<R> for Masking<A> {
    #[inline]
    unsafe fn compare_and_set(target: *mut R, expected: &mut R, desired: R) -> bool {
        critical::free::<A, _>(|_cs| {
            let current = A::load(target);
            if current != *expected {
                *expected = current;
                return false;
            }
            A::store(target, desired);
            true
        })
    }

    #[inline(always)]
    unsafe fn load(target: *const R) -> R { A::load(target) }
}

/// Compare-and-set with an explicit strategy
///
/// # Safety
/// `target` must be valid and aligned for `W`, and every concurrent write to it
/// must go through strategy `S`.
#[inline(always)]
pub unsafe fn compare_and_set<S, W>(target: *mut W, expected: &mut W, desired: W) -> bool
where
    S: CasStrategy<W::Raw>,
    W: Word,
{
    let mut raw = expected.into_raw();
    let stored = S::compare_and_set(target.cast::<W::Raw>(), &mut raw, desired.into_raw());
    *expected = W::from_raw(raw);
    stored
}

/// Read a cell with an explicit strategy
///
/// # Safety
/// As for [compare_and_set].
#[inline(always)]
pub unsafe fn load<S, W>(target: *const W) -> W
where
    S: CasStrategy<W::Raw>,
    W: Word,
{
    W::from_raw(S::load(target.cast::<W::Raw>()))
}

/// Atomic compare-and-set with the strategy selected for this target.
///
/// ```
/// use sync_cells::atomic_cas;
/// let mut cell = 10u16;
/// let p: *mut u16 = &mut cell;
///
/// let mut expected = 10;
/// assert!(unsafe { atomic_cas(p, &mut expected, 15) });
/// assert_eq!(expected, 10, "success leaves the expected value alone");
///
/// let mut stale = 10;
/// assert!(!unsafe { atomic_cas(p, &mut stale, 20) });
/// assert_eq!(stale, 15, "failure reports the current value");
/// assert_eq!(cell, 15);
/// ```
///
/// # Safety
/// `target` must be valid and aligned for `W`, and while it is shared every
/// write to it must go through this crate.
#[inline(always)]
pub unsafe fn atomic_cas<W>(target: *mut W, expected: &mut W, desired: W) -> bool
where
    W: Word,
    Selected: CasStrategy<W::Raw>,
{
    compare_and_set::<Selected, W>(target, expected, desired)
}

/// Read a cell with the strategy selected for this target.
///
/// # Safety
/// As for [atomic_cas].
#[inline(always)]
pub unsafe fn atomic_load<W>(target: *const W) -> W
where
    W: Word,
    Selected: CasStrategy<W::Raw>,
{
    load::<Selected, W>(target)
}
