//! Example usage of the finite-difference crate

use finite_difference::{coefficients, differentiate, FiniteDifferenceScheme, SchemeFormatter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Finite Difference Examples ===\n");

    // Example 1: Weights only
    println!("1. Central first derivative, 2nd order:");
    println!("{:?}\n", coefficients(1, 2, &[-1, 0, 1])?);

    // Example 2: Full scheme with the matrices
    println!("2. One-sided second derivative, 4th order:");
    let mut scheme = FiniteDifferenceScheme::new(2, 4, vec![3, 2, 1, 0, -1, -2])?;
    scheme.solve()?;
    println!("{}", SchemeFormatter::new().with_extended(true).format(&scheme));

    // Example 3: Differentiate sin(x)
    println!("3. d/dx sin(x) with a 4th-order central stencil:");
    let dx = 0.1;
    let samples: Vec<f64> = (0..20).map(|i| (i as f64 * dx).sin()).collect();
    let derivative = differentiate(&samples, dx, 1, 4, &[-2, -1, 0, 1, 2])?;
    for (i, d) in derivative.iter().enumerate() {
        if let Some(d) = d {
            let x = i as f64 * dx;
            println!("  x={:.1}: {:.8} (exact {:.8})", x, d, x.cos());
        }
    }

    Ok(())
}
