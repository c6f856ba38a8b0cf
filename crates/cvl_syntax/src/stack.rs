//! Stack growth for recursive passes over the syntax tree.
//!
//! Tree depth is bounded by [`MAX_NESTING`](crate::lexer::MAX_NESTING), but each level of analysis can
//! hold several large frames. Recursive walks wrap themselves in [`ensure_sufficient_stack`] so that a
//! deeply nested file grows the stack instead of overflowing it.

/// Remaining space below which the stack is grown.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone is left.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
