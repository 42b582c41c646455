//! LibSVM format dataset loading
//!
//! Parses the sparse `label index:value index:value ...` text format and
//! densifies each sample to the maximum feature index seen in the file.
//! Indices are 1-based in the format and converted to 0-based columns.

use crate::core::{KernelMachineError, Result, Sample};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset loaded from a LibSVM format file
#[derive(Debug, Clone)]
pub struct LibSvmDataset {
    samples: Vec<Sample<Vec<f64>>>,
    dimensions: usize,
}

impl LibSvmDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut rows: Vec<(i32, Vec<(usize, f64)>)> = Vec::new();
        let mut dimensions = 0;

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (label, pairs, max_index) = Self::parse_line(line).map_err(|e| {
                KernelMachineError::ParseError(format!(
                    "Error parsing line {}: {}",
                    line_number + 1,
                    e
                ))
            })?;
            dimensions = dimensions.max(max_index + 1);
            rows.push((label, pairs));
        }

        if rows.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }

        let samples = rows
            .into_iter()
            .map(|(label, pairs)| {
                let mut features = vec![0.0; dimensions];
                for (index, value) in pairs {
                    features[index] = value;
                }
                Sample::new(features, label)
            })
            .collect();

        Ok(Self {
            samples,
            dimensions,
        })
    }

    /// Parse one `label index:value ...` line
    fn parse_line(line: &str) -> std::result::Result<(i32, Vec<(usize, f64)>, usize), String> {
        let mut parts = line.split_whitespace();
        let label_str = parts.next().ok_or_else(|| "empty line".to_string())?;
        let label = label_str
            .trim_start_matches('+')
            .parse::<f64>()
            .map_err(|_| format!("invalid label: {}", label_str))?
            .round() as i32;

        let mut pairs = Vec::new();
        let mut max_index = 0;
        for feature in parts {
            let (index_str, value_str) = feature
                .split_once(':')
                .ok_or_else(|| format!("invalid feature format: {}", feature))?;
            let index = index_str
                .parse::<usize>()
                .map_err(|_| format!("invalid feature index: {}", index_str))?;
            if index == 0 {
                return Err(format!("feature index must be positive: {}", index));
            }
            let value = value_str
                .parse::<f64>()
                .map_err(|_| format!("invalid feature value: {}", value_str))?;

            let zero_based = index - 1;
            max_index = max_index.max(zero_based);
            pairs.push((zero_based, value));
        }

        Ok((label, pairs, max_index))
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
