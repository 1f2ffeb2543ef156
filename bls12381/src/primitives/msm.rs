//! Multi-scalar multiplication with Pippenger's bucket method.
//!
//! Each scalar is split into `c`-bit windows. Within a window, every point is added to the
//! bucket indexed by its digit, and the buckets are combined with a running sum so that bucket
//! `k` is counted `k` times. Window results are then combined by doubling `c` times between
//! consecutive windows.
//!
//! Points at infinity and zero scalars contribute nothing and are dropped before bucketing. The
//! surviving points are converted to affine form in one batch so that every bucket addition is a
//! (cheaper) mixed addition.

use super::{
    group::Point,
    install,
    scalar::{Scalar, SCALAR_BITS, SCALAR_LENGTH},
    Error,
};
use rayon::prelude::*;
use tracing::trace;

/// Window size used below [SMALL_INPUT].
const SMALL_WINDOW: usize = 3;

/// Inputs smaller than this use [SMALL_WINDOW].
const SMALL_INPUT: usize = 32;

/// Largest window size considered.
const MAX_WINDOW: usize = 16;

/// A projective point that can absorb an affine point.
pub(crate) trait Accumulate: Point {
    /// Adds an affine point in-place (handling the doubling case).
    fn add_affine(&mut self, rhs: &Self::Affine);
}

/// Picks the window size for `n` terms (roughly `ln(n) + 2`).
fn window_size(n: usize) -> usize {
    if n < SMALL_INPUT {
        return SMALL_WINDOW;
    }
    let log2 = (usize::BITS - n.leading_zeros()) as usize;
    (log2 * 69 / 100 + 2).min(MAX_WINDOW)
}

/// Extracts `width` bits of a little-endian scalar starting at bit `offset`.
fn digit(scalar: &[u8; SCALAR_LENGTH], offset: usize, width: usize) -> usize {
    let mut digit = 0;
    for i in 0..width {
        let bit = offset + i;
        if bit >= SCALAR_BITS {
            break;
        }
        digit |= (((scalar[bit / 8] >> (bit % 8)) & 1) as usize) << i;
    }
    digit
}

/// Computes the contribution of a single window.
///
/// `buckets` must hold `(1 << c) - 1` entries (digit zero has no bucket) and is reset before use.
fn window<P: Accumulate>(
    points: &[P::Affine],
    scalars: &[[u8; SCALAR_LENGTH]],
    offset: usize,
    c: usize,
    buckets: &mut [P],
) -> P {
    buckets.fill(P::infinity());
    for (point, scalar) in points.iter().zip(scalars) {
        let k = digit(scalar, offset, c);
        if k > 0 {
            buckets[k - 1].add_affine(point);
        }
    }

    // sum_{k} k * bucket[k-1]
    let mut running = P::infinity();
    let mut sum = P::infinity();
    for bucket in buckets.iter().rev() {
        running += *bucket;
        sum += running;
    }
    sum
}

/// Computes `sum(scalars[i] * points[i])`.
///
/// With `concurrency > 1`, windows are processed in parallel on a dedicated pool.
pub(crate) fn pippenger<P: Accumulate>(
    points: &[P],
    scalars: &[Scalar],
    concurrency: usize,
) -> Result<P, Error> {
    if points.len() != scalars.len() {
        return Err(Error::LengthMismatch(points.len(), scalars.len()));
    }

    // Drop terms that cannot contribute
    let (points, scalars): (Vec<P>, Vec<Scalar>) = points
        .iter()
        .zip(scalars)
        .filter(|(p, s)| !p.is_infinity() && !s.is_zero())
        .map(|(p, s)| (*p, *s))
        .unzip();
    match points.len() {
        0 => return Ok(P::infinity()),
        1 => return Ok(points[0] * scalars[0]),
        _ => {}
    }

    let affine = P::batch_to_affine(&points);
    let scalars: Vec<[u8; SCALAR_LENGTH]> = scalars.iter().map(Scalar::to_lendian).collect();
    let c = window_size(affine.len());
    let windows = SCALAR_BITS.div_ceil(c);
    let size = (1 << c) - 1;
    trace!(
        points = affine.len(),
        window = c,
        windows,
        concurrency,
        "computing msm"
    );

    let sums: Vec<P> = if concurrency <= 1 {
        // One arena for every window
        let mut buckets = vec![P::infinity(); size];
        (0..windows)
            .map(|w| window(&affine, &scalars, w * c, c, &mut buckets))
            .collect()
    } else {
        install(concurrency, || {
            (0..windows)
                .into_par_iter()
                .map(|w| {
                    let mut buckets = vec![P::infinity(); size];
                    window(&affine, &scalars, w * c, c, &mut buckets)
                })
                .collect()
        })
    };

    // Combine from the most significant window down
    let mut result = P::infinity();
    for sum in sums.into_iter().rev() {
        for _ in 0..c {
            result = result.double();
        }
        result += sum;
    }
    Ok(result)
}
