//! Logging initialization for callers across the boundary.
//!
//! The runtime only emits through the `log` facade. Hosts that want the
//! output call one of these once at startup.

use std::ffi::{c_char, CStr};

/// Minimum level for [`ffivec_logging_init`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfivecLogLevel {
    /// Logging disabled.
    Off = 0,
    /// Errors only.
    Error = 1,
    /// Warnings and above.
    Warn = 2,
    /// Informational and above.
    Info = 3,
    /// Debug and above.
    Debug = 4,
    /// Everything.
    Trace = 5,
}

impl From<FfivecLogLevel> for log::LevelFilter {
    fn from(level: FfivecLogLevel) -> Self {
        match level {
            FfivecLogLevel::Off => log::LevelFilter::Off,
            FfivecLogLevel::Error => log::LevelFilter::Error,
            FfivecLogLevel::Warn => log::LevelFilter::Warn,
            FfivecLogLevel::Info => log::LevelFilter::Info,
            FfivecLogLevel::Debug => log::LevelFilter::Debug,
            FfivecLogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Install a console logger at `level`.
///
/// `RUST_LOG`, when set, overrides `level`. Returns `false` if a logger was
/// already installed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ffivec_logging_init(level: FfivecLogLevel) -> bool {
    ffi_guard_or!(false, {
        let filter: log::LevelFilter = level.into();
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(filter.to_string()),
        )
        .format_timestamp_millis()
        .try_init()
        .is_ok()
    })
}

/// Install a console logger with an `env_logger` filter string such as
/// `"ffivec_native=debug,warn"`.
///
/// Returns `false` for a null or non-UTF-8 filter, or if a logger was
/// already installed.
///
/// # Safety
///
/// `filter` must be null or a valid NUL-terminated string.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn ffivec_logging_init_with_filter(filter: *const c_char) -> bool {
    ffi_guard_or!(false, {
        if filter.is_null() {
            return false;
        }
        let Ok(filter) = CStr::from_ptr(filter).to_str() else {
            return false;
        };
        env_logger::Builder::new()
            .parse_filters(filter)
            .format_timestamp_millis()
            .try_init()
            .is_ok()
    })
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_filters() {
        assert_eq!(
            log::LevelFilter::from(FfivecLogLevel::Off),
            log::LevelFilter::Off
        );
        assert_eq!(
            log::LevelFilter::from(FfivecLogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(FfivecLogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn null_filter_is_rejected() {
        assert!(!unsafe { ffivec_logging_init_with_filter(std::ptr::null()) });
    }

    #[test]
    fn second_init_reports_false() {
        let _ = ffivec_logging_init(FfivecLogLevel::Warn);
        assert!(!ffivec_logging_init(FfivecLogLevel::Warn));
    }
}
