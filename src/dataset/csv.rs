//! CSV dataset loading and saving.
//!
//! A dataset file is a plain comma-separated table with a header row. The
//! header is resolved against the schema by name, so column order in the
//! file does not matter; the in-memory dataset is always schema-ordered.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::dataset::Dataset;
use super::schema::FeatureSchema;
use super::DatasetError;

/// Load a dataset from a CSV file, resolved against `schema`.
///
/// Every schema field and the target column must appear in the header. A
/// missing target column is fatal before any row is parsed.
pub fn load_csv(path: impl AsRef<Path>, schema: &FeatureSchema) -> Result<Dataset, DatasetError> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();

    let header_line = match lines.next() {
        Some(line) => line?,
        None => return Err(DatasetError::Empty),
    };
    let header: Vec<&str> = header_line.split(',').map(str::trim).collect();

    // Resolve schema fields and the target against the header by name.
    let target_col = header
        .iter()
        .position(|&h| h == schema.target())
        .ok_or_else(|| DatasetError::MissingTarget(schema.target().to_string()))?;

    let mut field_cols = Vec::with_capacity(schema.n_features());
    for spec in schema.fields() {
        let col = header
            .iter()
            .position(|&h| h == spec.name)
            .ok_or_else(|| DatasetError::MissingFeature(spec.name.clone()))?;
        field_cols.push(col);
    }

    let mut columns: Vec<Vec<f32>> = vec![Vec::new(); schema.n_features()];
    let mut targets = Vec::new();

    for (line_no, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // Header is line 1.
        let line_no = line_no + 2;

        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != header.len() {
            return Err(DatasetError::RaggedRow {
                line: line_no,
                expected: header.len(),
                got: cells.len(),
            });
        }

        for (j, &col) in field_cols.iter().enumerate() {
            columns[j].push(parse_cell(cells[col], header[col], line_no)?);
        }
        targets.push(parse_cell(cells[target_col], header[target_col], line_no)?);
    }

    if targets.is_empty() {
        return Err(DatasetError::Empty);
    }

    Dataset::new(schema.clone(), columns, targets)
}

/// Save a dataset as CSV, schema fields first and the target column last.
pub fn save_csv(path: impl AsRef<Path>, dataset: &Dataset) -> Result<(), DatasetError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let schema = dataset.schema();
    let header: Vec<&str> = schema.names().chain([schema.target()]).collect();
    writeln!(writer, "{}", header.join(","))?;

    for i in 0..dataset.n_samples() {
        let mut cells: Vec<String> = dataset.row(i).iter().map(|v| v.to_string()).collect();
        cells.push(dataset.targets()[i].to_string());
        writeln!(writer, "{}", cells.join(","))?;
    }

    writer.flush()?;
    Ok(())
}

fn parse_cell(cell: &str, column: &str, line: usize) -> Result<f32, DatasetError> {
    cell.parse::<f32>().map_err(|_| DatasetError::MalformedCell {
        column: column.to_string(),
        value: cell.to_string(),
        line,
    })
}
