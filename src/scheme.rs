use nalgebra::DMatrix;

use crate::coefficients::{build_coefficient_matrix, solve_coefficients};
use crate::error::{FiniteDifferenceError, Result};

/// A validated request for a finite-difference scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StencilSpec {
    derivative: usize,
    order: usize,
    offsets: Vec<i64>,
}

impl StencilSpec {
    /// Creates a stencil specification with validation
    ///
    /// # Arguments
    ///
    /// * `derivative` - Degree of the derivative to approximate
    /// * `order` - Order of accuracy (must be >= `derivative`)
    /// * `offsets` - Grid offsets of the stencil points, exactly `order + derivative` of them
    pub fn new(derivative: usize, order: usize, offsets: Vec<i64>) -> Result<Self> {
        if order < derivative {
            return Err(FiniteDifferenceError::InvalidOrder { order, derivative });
        }

        let expected = order + derivative;
        if offsets.len() != expected {
            return Err(FiniteDifferenceError::StencilSizeMismatch {
                expected,
                actual: offsets.len(),
            });
        }

        Ok(Self {
            derivative,
            order,
            offsets,
        })
    }

    pub fn derivative(&self) -> usize {
        self.derivative
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn offsets(&self) -> &[i64] {
        &self.offsets
    }

    /// Number of stencil points, which is also the coefficient matrix size
    pub fn size(&self) -> usize {
        self.order + self.derivative
    }

    /// Whether two stencil points coincide, which makes the matrix singular
    pub fn has_duplicate_offsets(&self) -> bool {
        let mut sorted = self.offsets.clone();
        sorted.sort_unstable();
        sorted.windows(2).any(|w| w[0] == w[1])
    }
}

/// Output of a successful solve.
#[derive(Debug, Clone)]
pub struct Solution {
    derivative: usize,
    order: usize,
    offsets: Vec<i64>,
    matrix: DMatrix<f64>,
    inverse: DMatrix<f64>,
    coefficients: Vec<f64>,
}

impl Solution {
    /// Weights aligned with the stencil offsets
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn offsets(&self) -> &[i64] {
        &self.offsets
    }

    pub fn derivative(&self) -> usize {
        self.derivative
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Taylor-expansion coefficient matrix the weights were solved from
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Inverse of the coefficient matrix
    pub fn inverse(&self) -> &DMatrix<f64> {
        &self.inverse
    }

    /// `(offset, weight)` pairs in stencil order
    pub fn stencil(&self) -> Vec<(i64, f64)> {
        self.offsets
            .iter()
            .copied()
            .zip(self.coefficients.iter().copied())
            .collect()
    }

    /// Approximates the derivative at sample `i` for samples spaced `dx` apart.
    ///
    /// Returns `None` when a stencil point falls outside `samples`.
    pub fn apply_at(&self, samples: &[f64], i: usize, dx: f64) -> Option<f64> {
        let n = samples.len() as i64;
        let mut sum = 0.0;
        for (&offset, &weight) in self.offsets.iter().zip(self.coefficients.iter()) {
            let idx = (i as i64).checked_add(offset)?;
            if idx < 0 || idx >= n {
                return None;
            }
            sum += weight * samples[idx as usize];
        }
        Some(sum / dx.powi(self.derivative as i32))
    }

    /// Approximates the derivative at every sample, `None` near the edges the stencil cannot reach
    pub fn apply(&self, samples: &[f64], dx: f64) -> Vec<Option<f64>> {
        (0..samples.len())
            .map(|i| self.apply_at(samples, i, dx))
            .collect()
    }
}

#[derive(Debug, Clone)]
enum Stage {
    Validated,
    MatrixBuilt(DMatrix<f64>),
    Solved(Solution),
}

/// A finite-difference scheme moving through validation, matrix construction and solve.
///
/// Each stage is computed once and kept; asking for a later stage computes any
/// missing earlier one first.
///
/// # Example
///
/// ```rust
/// use finite_difference::FiniteDifferenceScheme;
///
/// let mut scheme = FiniteDifferenceScheme::new(1, 2, vec![-1, 0, 1]).expect("Valid stencil");
/// let solution = scheme.solve().expect("Invertible stencil");
/// assert!((solution.coefficients()[2] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct FiniteDifferenceScheme {
    spec: StencilSpec,
    stage: Stage,
}

impl FiniteDifferenceScheme {
    /// Creates a scheme, failing fast on an invalid order or stencil size
    pub fn new(derivative: usize, order: usize, offsets: Vec<i64>) -> Result<Self> {
        let spec = StencilSpec::new(derivative, order, offsets)?;
        Ok(Self::from_spec(spec))
    }

    /// Creates a scheme from an already validated specification
    pub fn from_spec(spec: StencilSpec) -> Self {
        Self {
            spec,
            stage: Stage::Validated,
        }
    }

    pub fn spec(&self) -> &StencilSpec {
        &self.spec
    }

    pub fn derivative(&self) -> usize {
        self.spec.derivative()
    }

    pub fn order(&self) -> usize {
        self.spec.order()
    }

    pub fn offsets(&self) -> &[i64] {
        self.spec.offsets()
    }

    /// Builds the coefficient matrix if it is not there yet
    pub fn build_matrix(&mut self) -> &DMatrix<f64> {
        if let Stage::Validated = self.stage {
            let matrix = build_coefficient_matrix(self.spec.offsets());
            log::debug!(
                "Built {}x{} coefficient matrix for offsets {:?}",
                matrix.nrows(),
                matrix.ncols(),
                self.spec.offsets()
            );
            self.stage = Stage::MatrixBuilt(matrix);
        }

        match &self.stage {
            Stage::MatrixBuilt(matrix) => matrix,
            Stage::Solved(solution) => &solution.matrix,
            Stage::Validated => unreachable!("matrix stage was just built"),
        }
    }

    /// Solves the scheme, reusing the cached solution on repeated calls.
    ///
    /// Fails with `SingularMatrix` when the offsets cannot support the scheme,
    /// in which case the scheme stays unsolved.
    pub fn solve(&mut self) -> Result<&Solution> {
        if !matches!(self.stage, Stage::Solved(_)) {
            let solution = self.compute_solution()?;
            self.stage = Stage::Solved(solution);
        }

        self.solution()
    }

    fn compute_solution(&mut self) -> Result<Solution> {
        if self.spec.has_duplicate_offsets() {
            log::warn!("Duplicate offsets in stencil {:?}", self.spec.offsets());
            return Err(FiniteDifferenceError::SingularMatrix {
                size: self.spec.size(),
            });
        }

        let derivative = self.spec.derivative();
        let matrix = self.build_matrix().clone();
        let (inverse, weights) = solve_coefficients(&matrix, derivative)?;

        log::debug!(
            "Solved derivative {} order {} scheme: {:?}",
            derivative,
            self.spec.order(),
            weights.as_slice()
        );

        Ok(Solution {
            derivative,
            order: self.spec.order(),
            offsets: self.spec.offsets().to_vec(),
            matrix,
            inverse,
            coefficients: weights.iter().copied().collect(),
        })
    }

    /// Whether `solve` has succeeded
    pub fn is_solved(&self) -> bool {
        matches!(self.stage, Stage::Solved(_))
    }

    /// The solved scheme, or `NotComputed` before a successful `solve`
    pub fn solution(&self) -> Result<&Solution> {
        match &self.stage {
            Stage::Solved(solution) => Ok(solution),
            _ => Err(FiniteDifferenceError::NotComputed),
        }
    }

    /// Solved weights aligned with the offsets
    pub fn coefficients(&self) -> Result<&[f64]> {
        self.solution().map(Solution::coefficients)
    }

    /// Coefficient matrix, available once built
    pub fn matrix(&self) -> Option<&DMatrix<f64>> {
        match &self.stage {
            Stage::Validated => None,
            Stage::MatrixBuilt(matrix) => Some(matrix),
            Stage::Solved(solution) => Some(&solution.matrix),
        }
    }

    /// Inverse coefficient matrix, or `NotComputed` before a successful `solve`
    pub fn inverse(&self) -> Result<&DMatrix<f64>> {
        self.solution().map(Solution::inverse)
    }
}
