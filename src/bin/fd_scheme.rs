//! Prints the finite-difference scheme for a derivative, order and stencil,
//! and optionally applies it to a column of sampled data.

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use finite_difference::{
    read_csv_column, write_derivative_csv, FiniteDifferenceScheme, SchemeFormatter,
};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "fd-scheme")]
#[command(about = "Finite-difference coefficients for any derivative and order", long_about = None)]
struct Cli {
    /// Degree of the derivative
    #[arg(short, long, default_value_t = 2)]
    derivative: usize,

    /// Order of accuracy
    #[arg(short, long, default_value_t = 4)]
    order: usize,

    /// Stencil offsets, `order + derivative` of them
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_values_t = [3, 2, 1, 0, -1, -2]
    )]
    offsets: Vec<i64>,

    /// Also print the coefficient matrix and its inverse
    #[arg(short, long)]
    extended: bool,

    /// CSV file with samples to differentiate
    #[arg(long, requires = "column")]
    input: Option<PathBuf>,

    /// Column of the CSV file holding the samples
    #[arg(long)]
    column: Option<String>,

    /// Sample spacing
    #[arg(long, default_value_t = 1.0)]
    dx: f64,

    /// Log level (error, warn, info, debug, trace); falls back to RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(level: Option<&str>) {
    let log_level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Warn);
    env_logger::Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let mut scheme = FiniteDifferenceScheme::new(cli.derivative, cli.order, cli.offsets)?;
    let solution = scheme.solve()?;

    match (cli.input, cli.column) {
        (Some(input), Some(column)) => {
            let samples = read_csv_column(&input, &column)?;
            log::info!("Read {} samples from {}", samples.len(), input.display());
            let derivatives = solution.apply(&samples, cli.dx);
            write_derivative_csv(std::io::stdout().lock(), &samples, &derivatives)?;
        }
        _ => {
            let formatter = SchemeFormatter::new().with_extended(cli.extended);
            print!("{}", formatter.format_solution(solution));
        }
    }

    Ok(())
}
