//! # Finite Difference
//!
//! Finite-difference coefficients for any derivative, at any order of accuracy,
//! on any stencil of integer grid offsets.
//!
//! For a derivative of degree `k`, an order of accuracy `p` and `p + k` offsets,
//! the weights `c_j` satisfy
//!
//! ```text
//! d^k u / dx^k ≈ (1/Δx^k) * Σ c_j u_{i+offset_j} + O(Δx^p)
//! ```
//!
//! They are found by inverting the Taylor-expansion matrix whose entry `(i, j)`
//! is `offset_j^i / i!` and picking out the row of the wanted derivative.
//!
//! ## Example
//!
//! ```rust
//! use finite_difference::FiniteDifferenceScheme;
//!
//! let mut scheme = FiniteDifferenceScheme::new(2, 4, vec![3, 2, 1, 0, -1, -2])
//!     .expect("Invalid parameters");
//! let solution = scheme.solve().expect("Singular stencil");
//! println!("{}", solution);
//! ```

mod coefficients;
mod csv_utils;
mod error;
mod render;
mod scheme;

pub use coefficients::{
    build_coefficient_matrix, compute_coefficients, factorial, solve_coefficients, taylor_power,
    SchemeCache,
};
pub use csv_utils::{read_csv_column, write_derivative_csv};
pub use error::{FiniteDifferenceError, Result};
pub use render::{ordinal, SchemeFormatter, NOT_COMPUTED_MESSAGE};
pub use scheme::{FiniteDifferenceScheme, Solution, StencilSpec};

/// Computes finite-difference weights for the given derivative, order and offsets.
///
/// This is a convenience wrapper over [`FiniteDifferenceScheme`] for callers that
/// only need the weights.
///
/// # Example
///
/// ```rust
/// use finite_difference::coefficients;
///
/// let weights = coefficients(1, 2, &[-1, 0, 1]).unwrap();
/// assert!((weights[0] + 0.5).abs() < 1e-12);
/// ```
pub fn coefficients(derivative: usize, order: usize, offsets: &[i64]) -> Result<Vec<f64>> {
    compute_coefficients(derivative, order, offsets)
}

/// Differentiates uniformly spaced samples with the given scheme.
///
/// Entries whose stencil would reach past either end of `samples` are `None`.
pub fn differentiate(
    samples: &[f64],
    dx: f64,
    derivative: usize,
    order: usize,
    offsets: &[i64],
) -> Result<Vec<Option<f64>>> {
    let mut scheme = FiniteDifferenceScheme::new(derivative, order, offsets.to_vec())?;
    Ok(scheme.solve()?.apply(samples, dx))
}
