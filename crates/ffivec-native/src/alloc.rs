//! Fallible storage allocation for container constructors.

use crate::{config, stats};

/// Reserve storage for exactly `len` elements.
///
/// Returns `None` when `len` exceeds the thread's
/// [`RuntimeConfig`](crate::RuntimeConfig) cap or the allocator refuses the
/// reservation.
pub(crate) fn try_alloc<T>(len: usize, what: &str) -> Option<Vec<T>> {
    let cfg = config::current();
    if !cfg.admits(len) {
        log::warn!(
            "{what}: refusing {len} elements (cap {})",
            cfg.max_elements
        );
        stats::record_rejection();
        return None;
    }
    let mut v = Vec::new();
    if let Err(e) = v.try_reserve_exact(len) {
        log::warn!("{what}: cannot reserve {len} elements: {e}");
        stats::record_rejection();
        return None;
    }
    Some(v)
}
