//! Utility functions for the MACID crate

/// Tolerance used when checking that CPD rows sum to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Tolerance used when deciding that two expected utilities tie.
pub const DEFAULT_TIE_TOLERANCE: f64 = 1e-9;

/// Compare two floats within an absolute tolerance.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Normalize weights to probabilities that sum to 1.0.
///
/// # Returns
///
/// - `Some(Vec<f64>)` containing normalized probabilities if total weight is positive
/// - `None` if total weight is zero, negative or not finite
///
/// # Examples
///
/// ```
/// use macid::utils::normalize_weights;
///
/// let normalized = normalize_weights(vec![1.0, 2.0, 1.0]).unwrap();
/// assert_eq!(normalized, vec![0.25, 0.5, 0.25]);
///
/// assert_eq!(normalize_weights(vec![0.0, 0.0]), None);
/// ```
pub fn normalize_weights<I>(weights: I) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = f64>,
{
    let weights_vec: Vec<f64> = weights.into_iter().collect();
    if weights_vec.is_empty() {
        return None;
    }

    let sum: f64 = weights_vec.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return None;
    }

    Some(weights_vec.iter().map(|&w| w / sum).collect())
}

/// Uniform distribution over `len` outcomes.
pub fn uniform(len: usize) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    vec![1.0 / len as f64; len]
}

/// Product of cardinalities, i.e. the number of joint assignments.
///
/// Returns `None` on overflow. An empty slice has exactly one (empty) assignment.
pub fn assignment_count(cardinalities: &[usize]) -> Option<usize> {
    cardinalities
        .iter()
        .try_fold(1usize, |acc, &card| acc.checked_mul(card))
}

/// Row-major strides for a mixed-radix layout (last position varies fastest).
///
/// # Examples
///
/// ```
/// use macid::utils::strides;
///
/// assert_eq!(strides(&[2, 3, 4]), vec![12, 4, 1]);
/// ```
pub fn strides(cardinalities: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; cardinalities.len()];
    for i in (0..cardinalities.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * cardinalities[i + 1];
    }
    strides
}

/// Decode a flat index into per-position digits (last position fastest).
pub fn decode_index(mut index: usize, cardinalities: &[usize]) -> Vec<usize> {
    let mut digits = vec![0; cardinalities.len()];
    for (slot, &card) in cardinalities.iter().enumerate().rev() {
        digits[slot] = index % card;
        index /= card;
    }
    digits
}

/// Encode per-position digits into a flat index (inverse of [`decode_index`]).
pub fn encode_index(digits: &[usize], cardinalities: &[usize]) -> usize {
    digits
        .iter()
        .zip(cardinalities)
        .fold(0, |acc, (&digit, &card)| acc * card + digit)
}

/// Advance `digits` to the next mixed-radix assignment in place.
///
/// Returns `false` once the counter wraps back to all zeros.
pub fn increment_digits(digits: &mut [usize], cardinalities: &[usize]) -> bool {
    for slot in (0..digits.len()).rev() {
        digits[slot] += 1;
        if digits[slot] < cardinalities[slot] {
            return true;
        }
        digits[slot] = 0;
    }
    false
}
