//! Test utilities for ffivec development.
//!
//! Provides [`StatsWindow`] for asserting on what the reference runtime did
//! during a block of code, [`ConfigGuard`] for temporarily tightening the
//! runtime configuration, and reusable element [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use ffivec_native::config::{self, RuntimeConfig};
use ffivec_native::stats::{self, NativeStats};

/// Route `log` output through the test harness.
///
/// Safe to call from every test; only the first call installs a logger.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records the runtime counters at creation and reports what changed since.
///
/// Counters are per-thread, so a window only sees the calls made by the
/// test that created it.
#[derive(Debug)]
pub struct StatsWindow {
    start: NativeStats,
}

impl StatsWindow {
    pub fn start() -> Self {
        Self {
            start: stats::snapshot(),
        }
    }

    /// Counter increments since [`start`](Self::start).
    pub fn delta(&self) -> NativeStats {
        let now = stats::snapshot();
        let s = &self.start;
        NativeStats {
            calls: now.calls - s.calls,
            containers_created: now.containers_created - s.containers_created,
            containers_freed: now.containers_freed - s.containers_freed,
            objects_created: now.objects_created - s.objects_created,
            objects_freed: now.objects_freed - s.objects_freed,
            struct_elements_freed: now.struct_elements_freed - s.struct_elements_freed,
            pointer_queries: now.pointer_queries - s.pointer_queries,
            bulk_copies: now.bulk_copies - s.bulk_copies,
            rejected_allocations: now.rejected_allocations - s.rejected_allocations,
        }
    }

    /// Whether every container and object created since the window opened
    /// has been freed again.
    pub fn balanced(&self) -> bool {
        let d = self.delta();
        d.live_containers() == 0 && d.live_objects() == 0
    }
}

/// Installs a [`RuntimeConfig`] on the current thread and restores the
/// previous one on drop.
#[derive(Debug)]
pub struct ConfigGuard {
    previous: RuntimeConfig,
}

impl ConfigGuard {
    pub fn install(config: RuntimeConfig) -> Self {
        Self {
            previous: config::install(config),
        }
    }

    /// Refuse allocations of more than `max_elements` elements.
    pub fn max_elements(max_elements: usize) -> Self {
        Self::install(RuntimeConfig::new(max_elements))
    }
}

impl Drop for ConfigGuard {
    fn drop(&mut self) {
        config::install(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffivec_stdvector::StdVector;

    #[test]
    fn window_sees_container_lifecycle() {
        let window = StatsWindow::start();
        let v = StdVector::from_elements(&[1_i32, 2, 3]).unwrap();
        assert_eq!(window.delta().containers_created, 1);
        assert!(!window.balanced());
        drop(v);
        assert_eq!(window.delta().containers_freed, 1);
        assert!(window.balanced());
    }

    #[test]
    fn guard_restores_previous_config() {
        let before = config::current();
        {
            let _guard = ConfigGuard::max_elements(4);
            assert_eq!(config::current(), RuntimeConfig::new(4));
        }
        assert_eq!(config::current(), before);
    }
}
