//! Test helpers shared across the goes-composite crates: locating optional
//! ABI sample files, synthetic band grids, and float assertions.

pub mod generators;
pub mod paths;

pub use generators::*;
pub use paths::*;

/// Resolve a sample file via [`find_test_file`], or return early from the
/// calling test with a skip notice when it is absent.
///
/// ```ignore
/// let path = require_test_file!("mcmip_conus_sample.nc");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: sample '{}' not found (set TEST_DATA_DIR to point at ABI samples)",
                    $name
                );
                return;
            }
        }
    }};
}

/// Assert `|left - right| <= epsilon`, printing both values and the
/// difference on failure.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
