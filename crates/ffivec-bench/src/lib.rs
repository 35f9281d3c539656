//! Benchmark workloads for the ffivec bridge.
//!
//! Provides deterministic inputs shared by the criterion benches:
//!
//! - [`int_workload`]: `n` pseudo-random `i32` values
//! - [`rect_workload`]: `n` non-degenerate rectangles
//! - [`string_workload`]: `n` short foreign strings

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ffivec_core::StdVectorError;
use ffivec_stdvector::{Rectangle, StdString};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Element counts the benches sweep over.
pub const SIZES: [usize; 3] = [16, 1_024, 65_536];

/// `n` pseudo-random `i32` values derived from `seed`.
pub fn int_workload(n: usize, seed: u64) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.next_u32() as i32).collect()
}

/// `n` rectangles of varying size.
pub fn rect_workload(n: usize) -> Vec<Rectangle> {
    (0..n as i64)
        .map(|i| Rectangle::new(i, i / 2, i + 16 + i % 7, i / 2 + 9))
        .collect()
}

/// `n` foreign strings of the form `"label-<i>"`.
pub fn string_workload(n: usize) -> Result<Vec<StdString>, StdVectorError> {
    (0..n).map(|i| StdString::new(format!("label-{i}"))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workloads_are_deterministic() {
        assert_eq!(int_workload(32, 7), int_workload(32, 7));
        assert_ne!(int_workload(32, 7), int_workload(32, 8));
        assert_eq!(rect_workload(10).len(), 10);
        assert!(rect_workload(10).iter().all(|r| !r.is_empty()));
    }

    #[test]
    fn strings_are_labelled() {
        let s = string_workload(3).unwrap();
        assert_eq!(s[2].to_string(), "label-2");
    }
}
