use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{FiniteDifferenceError, Result};

/// Reads a column of f64 values from a CSV file by column name.
///
/// Every row must hold a number in that column: samples are assumed to be
/// evenly spaced, so a skipped row would shift the grid.
pub fn read_csv_column<P: AsRef<Path>>(path: P, column: &str) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr.headers()?.clone();
    let col_index = headers.iter().position(|h| h == column).ok_or_else(|| {
        FiniteDifferenceError::InvalidInput(format!("column `{}` not found", column))
    })?;

    let mut values = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let field = record.get(col_index).unwrap_or("").trim();
        let val = field.parse::<f64>().map_err(|_| {
            FiniteDifferenceError::InvalidInput(format!(
                "row {}: `{}` in column `{}` is not a number",
                row + 1,
                field,
                column
            ))
        })?;
        values.push(val);
    }
    Ok(values)
}

/// Writes `index,value,derivative` rows.
///
/// The derivative is left empty where the stencil does not fit.
pub fn write_derivative_csv<W: Write>(
    writer: W,
    samples: &[f64],
    derivatives: &[Option<f64>],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["index", "value", "derivative"])?;

    for (i, (value, derivative)) in samples.iter().zip(derivatives.iter()).enumerate() {
        let derivative = derivative.map(|d| d.to_string()).unwrap_or_default();
        wtr.write_record([i.to_string(), value.to_string(), derivative])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_derivative_csv() {
        let mut buf = Vec::new();
        write_derivative_csv(&mut buf, &[1.0, 4.0, 9.0], &[None, Some(4.0), None]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "index,value,derivative\n0,1,\n1,4,4\n2,9,\n");
    }

    fn temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("fd_{}_{}.csv", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_csv_column() {
        let path = temp_csv("read_column", "t,u\n0,1.5\n1, 2.5\n2,3.5\n");

        let values = read_csv_column(&path, "u").unwrap();
        assert_eq!(values, vec![1.5, 2.5, 3.5]);

        assert_eq!(
            read_csv_column(&path, "missing").unwrap_err(),
            FiniteDifferenceError::InvalidInput("column `missing` not found".to_string())
        );

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unparsable_row_is_rejected() {
        // Dropping the row would make u(0) and u(2) look like neighbours
        let path = temp_csv("bad_row", "t,u\n0,1.5\n1,oops\n2,3.5\n");

        assert_eq!(
            read_csv_column(&path, "u").unwrap_err(),
            FiniteDifferenceError::InvalidInput(
                "row 2: `oops` in column `u` is not a number".to_string()
            )
        );

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let path = temp_csv("empty_field", "t,u\n0,1.5\n1,\n");

        assert!(matches!(
            read_csv_column(&path, "u"),
            Err(FiniteDifferenceError::InvalidInput(_))
        ));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_csv_column("/nonexistent/samples.csv", "u"),
            Err(FiniteDifferenceError::Io(_))
        ));
    }
}
