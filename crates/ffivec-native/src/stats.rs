//! Per-thread counters for foreign-side activity.
//!
//! Counters are thread-local so concurrently running tests never observe
//! each other's calls. Read them with [`snapshot`] and compare two
//! snapshots to assert on what a piece of bridge code did.

use std::cell::Cell;

/// Counters recorded by the reference runtime on the current thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NativeStats {
    /// Exported functions entered.
    pub calls: u64,
    /// Containers allocated (any `new1`/`new2`/`new3`).
    pub containers_created: u64,
    /// Containers whose storage was freed.
    pub containers_freed: u64,
    /// Standalone objects allocated (points, strings, detections, matrices).
    pub objects_created: u64,
    /// Standalone objects whose storage was freed.
    pub objects_freed: u64,
    /// Fixed-layout struct elements freed when their container was destroyed.
    pub struct_elements_freed: u64,
    /// `getPointer` calls.
    pub pointer_queries: u64,
    /// `copy` calls.
    pub bulk_copies: u64,
    /// Allocation requests refused by the runtime configuration.
    pub rejected_allocations: u64,
}

impl NativeStats {
    /// All counters zero.
    pub const ZERO: NativeStats = NativeStats {
        calls: 0,
        containers_created: 0,
        containers_freed: 0,
        objects_created: 0,
        objects_freed: 0,
        struct_elements_freed: 0,
        pointer_queries: 0,
        bulk_copies: 0,
        rejected_allocations: 0,
    };

    /// Containers created but not yet freed.
    pub fn live_containers(&self) -> i64 {
        self.containers_created as i64 - self.containers_freed as i64
    }

    /// Objects created but not yet freed.
    pub fn live_objects(&self) -> i64 {
        self.objects_created as i64 - self.objects_freed as i64
    }
}

thread_local! {
    static STATS: Cell<NativeStats> = const { Cell::new(NativeStats::ZERO) };
}

/// The current thread's counters.
pub fn snapshot() -> NativeStats {
    STATS.with(Cell::get)
}

/// Zero the current thread's counters.
pub fn reset() {
    STATS.with(|s| s.set(NativeStats::ZERO));
}

fn update(f: impl FnOnce(&mut NativeStats)) {
    // Destructors can run during thread teardown, after the slot is gone.
    let _ = STATS.try_with(|s| {
        let mut stats = s.get();
        f(&mut stats);
        s.set(stats);
    });
}

pub(crate) fn record_call() {
    update(|s| s.calls += 1);
}

pub(crate) fn record_container_created() {
    update(|s| s.containers_created += 1);
}

pub(crate) fn record_container_freed() {
    update(|s| s.containers_freed += 1);
}

pub(crate) fn record_object_created() {
    update(|s| s.objects_created += 1);
}

pub(crate) fn record_object_freed() {
    update(|s| s.objects_freed += 1);
}

pub(crate) fn record_struct_elements_freed(n: usize) {
    update(|s| s.struct_elements_freed += n as u64);
}

pub(crate) fn record_pointer_query() {
    update(|s| s.pointer_queries += 1);
}

pub(crate) fn record_bulk_copy() {
    update(|s| s.bulk_copies += 1);
}

pub(crate) fn record_rejection() {
    update(|s| s.rejected_allocations += 1);
}
