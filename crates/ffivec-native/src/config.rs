//! Allocation policy for the reference runtime.

use std::cell::Cell;

/// Allocation limits applied by container constructors on this thread.
///
/// A request above [`max_elements`](Self::max_elements) makes the
/// constructor return null, which is how the runtime reports allocation
/// failure across the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Largest element count a single container may hold.
    ///
    /// Default: 268_435_456.
    pub max_elements: usize,
}

impl RuntimeConfig {
    /// Default element cap per container.
    pub const DEFAULT_MAX_ELEMENTS: usize = 1 << 28;

    /// Create a config with the given element cap.
    pub fn new(max_elements: usize) -> Self {
        Self { max_elements }
    }

    /// Whether a container of `len` elements is allowed.
    pub fn admits(&self, len: usize) -> bool {
        len <= self.max_elements
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ELEMENTS)
    }
}

thread_local! {
    static CONFIG: Cell<RuntimeConfig> = const {
        Cell::new(RuntimeConfig {
            max_elements: RuntimeConfig::DEFAULT_MAX_ELEMENTS,
        })
    };
}

/// Install `config` for the current thread, returning the previous one.
pub fn install(config: RuntimeConfig) -> RuntimeConfig {
    CONFIG.with(|c| c.replace(config))
}

/// The config in effect on the current thread.
pub fn current() -> RuntimeConfig {
    CONFIG.with(Cell::get)
}

/// Set the per-container element cap for the calling thread.
///
/// Returns the previous cap.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ffivec_runtime_set_max_elements(max_elements: usize) -> usize {
    ffi_guard_or!(0, { install(RuntimeConfig::new(max_elements)).max_elements })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap() {
        assert_eq!(
            RuntimeConfig::default().max_elements,
            RuntimeConfig::DEFAULT_MAX_ELEMENTS
        );
        assert_eq!(current(), RuntimeConfig::default());
    }

    #[test]
    fn install_returns_previous() {
        let prev = install(RuntimeConfig::new(4));
        assert_eq!(current().max_elements, 4);
        assert!(current().admits(4));
        assert!(!current().admits(5));
        assert_eq!(install(prev), RuntimeConfig::new(4));
    }

    #[test]
    fn export_round_trip() {
        let prev = ffivec_runtime_set_max_elements(10);
        assert_eq!(ffivec_runtime_set_max_elements(prev), 10);
    }
}
