//! Integer term frequencies from mean weight vectors.
//!
//! A row is scaled by [`SCALE`], truncated toward zero, then divided by the
//! GCD of the whole row. Terms whose scaled weight truncates to zero drop
//! out. Rows are reduced independently, so magnitudes are only comparable
//! within a row.

use ndarray::ArrayView1;

/// Reference multiplier applied before truncation.
pub const SCALE: f64 = 100_000.0;

/// Greatest common divisor; `gcd(0, n) == n`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// GCD of every count in the row (0 for an empty or all-zero row).
pub fn row_gcd(counts: &[u64]) -> u64 {
    counts.iter().fold(0, |acc, &c| gcd(acc, c))
}

/// Multiply by `scale` and truncate.
///
/// Negative and NaN products saturate to 0.
pub fn scaled_counts(row: ArrayView1<'_, f64>, scale: f64) -> Vec<u64> {
    row.iter().map(|&w| (w * scale) as u64).collect()
}

/// Divide every count by the row GCD in place. A zero GCD leaves the row as is.
pub fn reduce(counts: &mut [u64]) {
    let g = row_gcd(counts);
    if g > 1 {
        counts.iter_mut().for_each(|c| *c /= g);
    }
}

/// Scale, truncate and reduce one mean row.
pub fn quantize(row: ArrayView1<'_, f64>, scale: f64) -> Vec<u64> {
    let mut counts = scaled_counts(row, scale);
    reduce(&mut counts);
    counts
}
