//! CSV format dataset loading
//!
//! The last column is the label (rounded to the nearest integer, so both
//! binary and multiclass files work), all other columns are dense features.
//! A header row is detected automatically.

use crate::core::{KernelMachineError, Result, Sample};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset loaded from a CSV file
#[derive(Debug, Clone)]
pub struct CsvDataset {
    samples: Vec<Sample<Vec<f64>>>,
    dimensions: usize,
}

impl CsvDataset {
    /// Load a dataset from a CSV file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut samples = Vec::new();
        let mut first_data_line = true;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if first_data_line {
                first_data_line = false;
                if Self::is_header_line(line) {
                    continue;
                }
            }
            samples.push(Self::parse_data_line(line)?);
        }

        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }

        let dimensions = samples[0].input.len();
        for sample in &samples {
            if sample.input.len() != dimensions {
                return Err(KernelMachineError::DimensionMismatch {
                    expected: dimensions,
                    actual: sample.input.len(),
                });
            }
        }

        Ok(Self {
            samples,
            dimensions,
        })
    }

    /// Heuristic header check: most non-label fields fail to parse as
    /// numbers
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 2 {
            return false;
        }
        let non_numeric = fields
            .iter()
            .take(fields.len() - 1)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();
        non_numeric > fields.len() / 2
    }

    fn parse_data_line(line: &str) -> Result<Sample<Vec<f64>>> {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();
        if fields.len() < 2 {
            return Err(KernelMachineError::ParseError(format!(
                "Line has too few fields: {}",
                line
            )));
        }

        let label_str = fields[fields.len() - 1];
        let label = label_str
            .parse::<f64>()
            .map_err(|_| KernelMachineError::ParseError(format!("Invalid label: {}", label_str)))?
            .round() as i32;

        let mut features = Vec::with_capacity(fields.len() - 1);
        for field in &fields[..fields.len() - 1] {
            let value = field.parse::<f64>().map_err(|_| {
                KernelMachineError::ParseError(format!("Invalid feature value: {}", field))
            })?;
            features.push(value);
        }

        Ok(Sample::new(features, label))
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Feature dimensionality
    pub fn dim(&self) -> usize {
        self.dimensions
    }

    /// Borrow the samples
    pub fn samples(&self) -> &[Sample<Vec<f64>>] {
        &self.samples
    }

    /// Consume the dataset into its samples
    pub fn into_samples(self) -> Vec<Sample<Vec<f64>>> {
        self.samples
    }
}
