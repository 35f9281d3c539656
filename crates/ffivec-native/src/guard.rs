//! Panic guards for exported functions.
//!
//! Unwinding across an `extern "C"` boundary aborts the process. Every
//! export runs its body through [`ffi_guard_or!`] (or [`ffi_guard!`] for
//! exports that return nothing), which turns a panic into the export's
//! failure value and logs it.

/// Describe a caught panic payload for the log.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run an export body, counting the call and returning `$fallback` if the
/// body panics.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {{
        $crate::stats::record_call();
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                ::log::error!(
                    "panic caught at the foreign boundary: {}",
                    $crate::guard::panic_message(payload.as_ref())
                );
                $fallback
            }
        }
    }};
}

/// [`ffi_guard_or!`] for exports that return `()`.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!((), $body)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_returns_body_value() {
        let v: i32 = ffi_guard_or!(-1, { 41 + 1 });
        assert_eq!(v, 42);
    }

    #[test]
    fn guard_swallows_panic() {
        let v: i32 = ffi_guard_or!(-1, {
            if always() {
                panic!("boom");
            }
            0
        });
        assert_eq!(v, -1);
    }

    #[test]
    fn guard_counts_calls() {
        let before = crate::stats::snapshot().calls;
        ffi_guard!({});
        assert_eq!(crate::stats::snapshot().calls, before + 1);
    }

    #[test]
    fn panic_message_reads_both_string_kinds() {
        let a: Box<dyn std::any::Any + Send> = Box::new("static");
        let b: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(a.as_ref()), "static");
        assert_eq!(panic_message(b.as_ref()), "owned");
        assert_eq!(panic_message(c.as_ref()), "non-string panic payload");
    }

    fn always() -> bool {
        true
    }
}
