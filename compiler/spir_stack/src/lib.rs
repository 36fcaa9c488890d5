//! Stack growth for walks over arbitrarily deep type chains.
//!
//! Pointer types nest without limit, and a mangled name can describe a chain
//! tens of thousands of levels deep. Visitors that recurse once per level
//! wrap the recursive call in [`ensure_sufficient_stack`], which moves onto a
//! freshly allocated segment when the current one runs low.
//!
//! On `wasm32` the call is a passthrough.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
