use ahash::AHashMap;
use nalgebra::{DMatrix, DVector};

use crate::error::{FiniteDifferenceError, Result};
use crate::scheme::StencilSpec;

/// Raises a stencil offset to a non-negative integer power.
///
/// The zeroth power is always 1, including `0^0`, so the constant Taylor term
/// of a stencil point sitting on the evaluation point is kept.
pub fn taylor_power(offset: i64, exponent: usize) -> f64 {
    if exponent == 0 {
        return 1.0;
    }
    (offset as f64).powi(exponent as i32)
}

/// `n!` as a float.
pub fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, x| acc * x as f64)
}

/// Builds the Taylor-expansion coefficient matrix for a stencil.
///
/// Row `i` holds the coefficient of the `i`-th derivative term and column `j`
/// the contribution of stencil point `j`, so entry `(i, j)` is
/// `offsets[j]^i / i!`. The matrix is square with one row per offset.
pub fn build_coefficient_matrix(offsets: &[i64]) -> DMatrix<f64> {
    let size = offsets.len();
    DMatrix::from_fn(size, size, |i, j| taylor_power(offsets[j], i) / factorial(i))
}

/// Inverts a coefficient matrix and extracts the weights isolating `derivative`.
///
/// Returns the inverse together with the weights `A^-1 · e_derivative`, which is
/// simply column `derivative` of the inverse.
pub fn solve_coefficients(
    matrix: &DMatrix<f64>,
    derivative: usize,
) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let size = matrix.nrows();
    if size == 0 || derivative >= size || !matrix.is_square() {
        return Err(FiniteDifferenceError::SingularMatrix { size });
    }

    if matrix.iter().any(|v| !v.is_finite()) {
        log::warn!(
            "Coefficient matrix ({}x{}) overflows, offsets too large for this size",
            size,
            size
        );
        return Err(FiniteDifferenceError::SingularMatrix { size });
    }

    let inverse = match matrix.clone().try_inverse() {
        Some(inverse) => inverse,
        None => {
            log::warn!("Coefficient matrix ({}x{}) is singular", size, size);
            return Err(FiniteDifferenceError::SingularMatrix { size });
        }
    };

    let garbage = inverse.iter().any(|v| !v.is_finite())
        || inverse_residual(matrix, &inverse) > residual_bound(matrix, &inverse);
    if garbage {
        log::warn!(
            "Coefficient matrix ({}x{}) is numerically singular, inverse rejected",
            size,
            size
        );
        return Err(FiniteDifferenceError::SingularMatrix { size });
    }

    let mut target = DVector::<f64>::zeros(size);
    target[derivative] = 1.0;
    let weights = &inverse * target;

    Ok((inverse, weights))
}

/// Largest `max|A·A⁻¹ - I|` a backward-stable inverse can produce:
/// `n² ‖A‖ ‖A⁻¹‖ ε`.
fn residual_bound(matrix: &DMatrix<f64>, inverse: &DMatrix<f64>) -> f64 {
    let size = matrix.nrows() as f64;
    size * size * matrix.norm() * inverse.norm() * f64::EPSILON
}

fn inverse_residual(matrix: &DMatrix<f64>, inverse: &DMatrix<f64>) -> f64 {
    let product = matrix * inverse;
    let identity = DMatrix::<f64>::identity(matrix.nrows(), matrix.ncols());
    (product - identity).amax()
}

/// Computes finite-difference weights in one call.
///
/// # Arguments
///
/// * `derivative` - Degree of the derivative to approximate
/// * `order` - Order of accuracy of the scheme (must be >= `derivative`)
/// * `offsets` - Stencil offsets, exactly `order + derivative` of them
///
/// # Returns
///
/// The weights aligned with `offsets`, to be scaled by `1/Δx^derivative`
pub fn compute_coefficients(derivative: usize, order: usize, offsets: &[i64]) -> Result<Vec<f64>> {
    let spec = StencilSpec::new(derivative, order, offsets.to_vec())?;
    if spec.has_duplicate_offsets() {
        return Err(FiniteDifferenceError::SingularMatrix { size: spec.size() });
    }
    let matrix = build_coefficient_matrix(spec.offsets());
    let (_, weights) = solve_coefficients(&matrix, derivative)?;
    Ok(weights.iter().copied().collect())
}

/// Memoised weights for schemes that are requested repeatedly.
pub struct SchemeCache {
    coefficients: AHashMap<(usize, usize, Vec<i64>), Vec<f64>>,
}

impl SchemeCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self {
            coefficients: AHashMap::new(),
        }
    }

    /// Gets weights from the cache or computes them if not cached
    pub fn get_coefficients(
        &mut self,
        derivative: usize,
        order: usize,
        offsets: &[i64],
    ) -> Result<&Vec<f64>> {
        let key = (derivative, order, offsets.to_vec());

        if !self.coefficients.contains_key(&key) {
            let coeffs = compute_coefficients(derivative, order, offsets)?;
            self.coefficients.insert(key.clone(), coeffs);
        }

        Ok(&self.coefficients[&key])
    }

    /// Precomputes the textbook stencils
    pub fn precompute_common(&mut self) -> Result<()> {
        let common_configs: [(usize, usize, &[i64]); 6] = [
            (1, 1, &[0, 1]),                    // forward first derivative
            (1, 1, &[0, -1]),                   // backward first derivative
            (1, 2, &[-1, 0, 1]),                // central first derivative
            (1, 2, &[0, 1, 2]),                 // one-sided first derivative
            (2, 2, &[-1, 0, 1, 2]),             // second derivative
            (2, 4, &[3, 2, 1, 0, -1, -2]),      // fourth-order second derivative
        ];

        for (derivative, order, offsets) in &common_configs {
            self.get_coefficients(*derivative, *order, offsets)?;
        }

        Ok(())
    }

    /// Number of cached schemes
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

impl Default for SchemeCache {
    fn default() -> Self {
        let mut cache = Self::new();
        let _ = cache.precompute_common(); // Textbook stencils always solve
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_zero_to_the_zero_is_one() {
        assert_eq!(taylor_power(0, 0), 1.0);
        assert_eq!(taylor_power(0, 1), 0.0);
        assert_eq!(taylor_power(0, 3), 0.0);
        assert_eq!(taylor_power(-5, 0), 1.0);
    }

    #[test]
    fn test_negative_offsets_follow_integer_powers() {
        assert_eq!(taylor_power(-2, 1), -2.0);
        assert_eq!(taylor_power(-2, 2), 4.0);
        assert_eq!(taylor_power(-2, 3), -8.0);
        assert_eq!(taylor_power(3, 4), 81.0);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(1), 1.0);
        assert_eq!(factorial(5), 120.0);
    }

    #[test]
    fn test_matrix_entries() {
        let matrix = build_coefficient_matrix(&[-1, 0, 2]);
        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix.ncols(), 3);

        // First row is all ones, including the zero offset
        for j in 0..3 {
            assert_eq!(matrix[(0, j)], 1.0);
        }
        assert_eq!(matrix[(1, 0)], -1.0);
        assert_eq!(matrix[(1, 1)], 0.0);
        assert_eq!(matrix[(1, 2)], 2.0);
        assert_abs_diff_eq!(matrix[(2, 0)], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(matrix[(2, 2)], 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_central_first_derivative() {
        let coeffs = compute_coefficients(1, 2, &[-1, 0, 1]).unwrap();
        let expected = [-0.5, 0.0, 0.5];

        for (actual, expected) in coeffs.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_weights_are_column_of_inverse() {
        let matrix = build_coefficient_matrix(&[0, 1, 2, 3]);
        let (inverse, weights) = solve_coefficients(&matrix, 2).unwrap();
        for i in 0..4 {
            assert_abs_diff_eq!(weights[i], inverse[(i, 2)], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_singular_matrix() {
        let matrix = build_coefficient_matrix(&[0, 0, 1]);
        assert_eq!(
            solve_coefficients(&matrix, 1).unwrap_err(),
            FiniteDifferenceError::SingularMatrix { size: 3 }
        );
        assert_eq!(
            compute_coefficients(1, 2, &[1, 0, 1]).unwrap_err(),
            FiniteDifferenceError::SingularMatrix { size: 3 }
        );
    }

    #[test]
    fn test_widely_spaced_offsets_solve() {
        // Scaling every offset by h scales the weights by 1/h^derivative
        let unit = compute_coefficients(2, 4, &[0, 1, 2, 3, 4, 5]).unwrap();
        let wide = compute_coefficients(2, 4, &[0, 1000, 2000, 3000, 4000, 5000]).unwrap();

        for (u, w) in unit.iter().zip(wide.iter()) {
            assert_relative_eq!(w * 1e6, *u, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_long_one_sided_stencil_solves() {
        let offsets: Vec<i64> = (0..18).collect();
        let coeffs = compute_coefficients(1, 17, &offsets).unwrap();

        assert!(coeffs.iter().all(|c| c.is_finite()));
        let sum: f64 = coeffs.iter().sum();
        let first_moment: f64 = coeffs.iter().zip(&offsets).map(|(c, &o)| c * o as f64).sum();
        assert_abs_diff_eq!(sum, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(first_moment, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_overflowing_matrix_is_singular() {
        // 4e18^17 overflows f64, leaving infinities in the last row
        let mut offsets: Vec<i64> = (0..17).collect();
        offsets.push(4_000_000_000_000_000_000);
        let matrix = build_coefficient_matrix(&offsets);
        assert!(matrix.iter().any(|v| v.is_infinite()));

        assert_eq!(
            solve_coefficients(&matrix, 1).unwrap_err(),
            FiniteDifferenceError::SingularMatrix { size: 18 }
        );
        assert_eq!(
            compute_coefficients(1, 17, &offsets).unwrap_err(),
            FiniteDifferenceError::SingularMatrix { size: 18 }
        );
    }

    #[test]
    fn test_empty_matrix_is_singular() {
        let matrix = build_coefficient_matrix(&[]);
        assert!(matches!(
            solve_coefficients(&matrix, 0),
            Err(FiniteDifferenceError::SingularMatrix { size: 0 })
        ));
    }

    #[test]
    fn test_scheme_cache() {
        let mut cache = SchemeCache::new();
        assert!(cache.is_empty());

        let first = cache.get_coefficients(1, 2, &[-1, 0, 1]).unwrap().clone();
        let second = cache.get_coefficients(1, 2, &[-1, 0, 1]).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        // Same offsets in a different order are a different scheme
        cache.get_coefficients(1, 2, &[1, 0, -1]).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_scheme_cache_does_not_store_failures() {
        let mut cache = SchemeCache::new();
        assert!(cache.get_coefficients(1, 2, &[0, 0, 1]).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_default_cache_is_precomputed() {
        let cache = SchemeCache::default();
        assert_eq!(cache.len(), 6);
    }
}
