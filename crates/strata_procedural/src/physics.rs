//! Gravity suppression for the decoration phase.
//!
//! Populators place sand and gravel freely; while a [`GravitySuppression`]
//! guard is alive on the current thread, chunks do not schedule falling-block
//! updates for those placements. Decoration always runs to completion on the
//! calling thread, so the toggle is tracked per thread as a nesting depth.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static SUPPRESSION_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Returns true while gravity updates are suppressed on this thread.
#[inline]
#[must_use]
pub fn gravity_suppressed() -> bool {
    SUPPRESSION_DEPTH.with(|depth| depth.get() > 0)
}

/// RAII guard that suppresses gravity updates until dropped.
///
/// Guards nest; gravity comes back when the outermost one is dropped, on
/// every exit path including `?` returns and panics.
#[derive(Debug)]
pub struct GravitySuppression {
    // Tied to the thread whose counter it bumped.
    _not_send: PhantomData<*const ()>,
}

impl GravitySuppression {
    /// Starts suppressing gravity on the current thread.
    #[must_use = "gravity is restored as soon as the guard is dropped"]
    pub fn new() -> Self {
        SUPPRESSION_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Default for GravitySuppression {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GravitySuppression {
    fn drop(&mut self) {
        SUPPRESSION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
