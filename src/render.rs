use std::fmt::{self, Write};

use crate::scheme::{FiniteDifferenceScheme, Solution};

/// Message rendered for a scheme that has not been solved.
pub const NOT_COMPUTED_MESSAGE: &str = "Scheme not yet computed!";

/// `1st`, `2nd`, `3rd`, everything else `th`.
pub fn ordinal(number: usize) -> String {
    let suffix = match number {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{}{}", number, suffix)
}

/// Renders solved schemes as human-readable formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemeFormatter {
    /// Also print the coefficient matrix and its inverse
    pub extended: bool,
}

impl SchemeFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the matrices are appended
    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Renders a scheme, or a notice if it has not been solved yet
    pub fn format(&self, scheme: &FiniteDifferenceScheme) -> String {
        match scheme.solution() {
            Ok(solution) => self.format_solution(solution),
            Err(_) => NOT_COMPUTED_MESSAGE.to_string(),
        }
    }

    pub fn format_solution(&self, solution: &Solution) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_solution(&mut out, solution);
        out
    }

    fn write_solution<W: Write>(&self, out: &mut W, solution: &Solution) -> fmt::Result {
        let derivative = solution.derivative();
        writeln!(
            out,
            "{}-order finite difference approximation for {} derivative",
            ordinal(solution.order()),
            ordinal(derivative)
        )?;
        writeln!(
            out,
            "d{d}udx{d}_i = 1/DeltaX^{d} * ({}) + O(DeltaX^{})",
            scheme_terms(solution),
            solution.order(),
            d = derivative
        )?;

        if self.extended {
            writeln!(out)?;
            writeln!(out, "Coefficient matrix:")?;
            writeln!(out, "{}", solution.matrix())?;
            writeln!(out, "Inverse coefficient matrix:")?;
            writeln!(out, "{}", solution.inverse())?;
        }

        Ok(())
    }
}

/// `c0u_i+o0 + c1u_i+o1 + ...` in stencil order
fn scheme_terms(solution: &Solution) -> String {
    solution
        .stencil()
        .iter()
        .map(|(offset, weight)| format!("{}u_i{:+}", weight, offset))
        .collect::<Vec<_>>()
        .join(" + ")
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SchemeFormatter::new().write_solution(f, self)
    }
}
