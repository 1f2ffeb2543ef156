//! Subgroup checks over slices of points.
//!
//! [check_subgroup] works for any [Point] and reports every index that fails instead of
//! stopping at the first one. Points decoded with [Point::from_bytes] are only known to be on
//! the curve; run them through here before handing them to functions that assume a group check.

use super::super::{group::Point, install};
use rayon::prelude::*;

/// Result of a batch subgroup check operation.
///
/// Contains the indices of points that failed the subgroup check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckResult {
    /// Indices of points that are NOT in the correct subgroup.
    pub failed_indices: Vec<usize>,
}

impl CheckResult {
    /// Returns true if all points passed the subgroup check.
    pub fn all_valid(&self) -> bool {
        self.failed_indices.is_empty()
    }
}

/// Batch check points for subgroup membership (parallelized when `concurrency > 1`).
///
/// Returns the indices of points that failed the subgroup check, in ascending order.
pub fn check_subgroup<P: Point>(points: &[P], concurrency: usize) -> CheckResult {
    let failed = |(i, p): (usize, &P)| (!p.in_subgroup()).then_some(i);
    let failed_indices: Vec<usize> = if concurrency <= 1 {
        points.iter().enumerate().filter_map(failed).collect()
    } else {
        install(concurrency, || {
            points.par_iter().enumerate().filter_map(failed).collect()
        })
    };
    CheckResult { failed_indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{g1::G1, g2::G2, scalar::Scalar};
    use rand::{rngs::StdRng, SeedableRng};

    fn valid<P: Point>() {
        let mut rng = StdRng::seed_from_u64(0);
        let points: Vec<P> = (0..10)
            .map(|_| P::generator() * Scalar::random(&mut rng))
            .collect();
        assert!(check_subgroup(&points, 1).all_valid());
        assert!(check_subgroup(&points, 4).all_valid());
        assert!(check_subgroup::<P>(&[], 4).all_valid());

        // The identity is in every subgroup
        assert!(check_subgroup(&[P::infinity()], 1).all_valid());
    }

    #[test]
    fn test_valid() {
        valid::<G1>();
        valid::<G2>();
    }

    #[test]
    fn test_invalid_g1() {
        // Find a point on the curve that is outside the subgroup
        let bad = (1..=u8::MAX)
            .find_map(|x| {
                let mut compressed = [0u8; 48];
                compressed[0] = 0x80;
                compressed[47] = x;
                G1::from_compressed(&compressed).ok()
            })
            .unwrap();
        assert!(bad.is_on_curve());
        assert!(!bad.in_subgroup());

        let mut points = vec![G1::generator(); 8];
        points[2] = bad;
        points[7] = bad;
        for concurrency in [1, 3] {
            let result = check_subgroup(&points, concurrency);
            assert!(!result.all_valid());
            assert_eq!(result.failed_indices, vec![2, 7]);
        }
    }

    #[test]
    fn test_invalid_g2() {
        // Find a point on the curve that is outside the subgroup
        let mut compressed = [0u8; 96];
        compressed[0] = 0x80;
        let bad = (1..=u8::MAX)
            .find_map(|x| {
                compressed[95] = x;
                G2::from_compressed(&compressed).ok()
            })
            .unwrap();
        assert!(!bad.in_subgroup());

        let points = vec![bad, G2::generator(), G2::generator(), bad];
        let result = check_subgroup(&points, 2);
        assert_eq!(result.failed_indices, vec![0, 3]);
    }
}
