//! Stack growth for deep tree walks.
//!
//! Trees produced from degenerate input (thousands of nested parentheses,
//! long binary chains) make the recursive visitor in [`crate::visitor`] go
//! as deep as the tree. Every `walk_node` call goes through
//! [`ensure_sufficient_stack`], which switches to a freshly allocated stack
//! segment when the current one is nearly exhausted.
//!
//! - **Native targets**: `stacker::maybe_grow`
//! - **WASM targets**: plain call
//!
//! Tested depth: 100 000 nested composite nodes (see `visitor` tests).

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than [`RED_ZONE`] remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
