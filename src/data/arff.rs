//! Minimal ARFF dataset loading
//!
//! Supports the numeric-attributes-plus-nominal-class subset of the format:
//! every `@attribute` must be numeric except the last one, which must be
//! nominal and provides the class labels (mapped to their 0-based position
//! in the declaration). Comment lines start with `%`; missing values (`?`)
//! are rejected.

use crate::core::{KernelMachineError, Result, Sample};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset loaded from an ARFF file
#[derive(Debug, Clone)]
pub struct ArffDataset {
    samples: Vec<Sample<Vec<f64>>>,
    dimensions: usize,
    class_names: Vec<String>,
}

impl ArffDataset {
    /// Load a dataset from an ARFF file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut numeric_attributes = 0usize;
        let mut class_names: Option<Vec<String>> = None;
        let mut in_data = false;
        let mut samples = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }

            if !in_data {
                let lower = line.to_lowercase();
                if lower.starts_with("@relation") {
                    continue;
                }
                if lower.starts_with("@attribute") {
                    if class_names.is_some() {
                        return Err(KernelMachineError::InvalidFormat(
                            "only the final attribute may be nominal".to_string(),
                        ));
                    }
                    if let Some(values) = Self::parse_nominal_values(line) {
                        class_names = Some(values);
                    } else if Self::is_numeric_attribute(&lower) {
                        numeric_attributes += 1;
                    } else {
                        return Err(KernelMachineError::InvalidFormat(format!(
                            "unsupported attribute declaration: {}",
                            line
                        )));
                    }
                    continue;
                }
                if lower.starts_with("@data") {
                    in_data = true;
                    continue;
                }
                return Err(KernelMachineError::InvalidFormat(format!(
                    "unexpected header line: {}",
                    line
                )));
            }

            let classes = class_names.as_ref().ok_or_else(|| {
                KernelMachineError::InvalidFormat(
                    "no nominal class attribute declared".to_string(),
                )
            })?;
            samples.push(Self::parse_data_line(line, numeric_attributes, classes)?);
        }

        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }

        Ok(Self {
            samples,
            dimensions: numeric_attributes,
            class_names: class_names.unwrap_or_default(),
        })
    }

    fn is_numeric_attribute(lower_line: &str) -> bool {
        lower_line.ends_with("numeric")
            || lower_line.ends_with("real")
            || lower_line.ends_with("integer")
    }

    /// Extract `{a, b, c}` nominal values from an attribute declaration
    fn parse_nominal_values(line: &str) -> Option<Vec<String>> {
        let open = line.find('{')?;
        let close = line.rfind('}')?;
        Some(
            line[open + 1..close]
                .split(',')
                .map(|v| v.trim().to_string())
                .collect(),
        )
    }

    fn parse_data_line(
        line: &str,
        numeric_attributes: usize,
        classes: &[String],
    ) -> Result<Sample<Vec<f64>>> {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();
        if fields.len() != numeric_attributes + 1 {
            return Err(KernelMachineError::DimensionMismatch {
                expected: numeric_attributes + 1,
                actual: fields.len(),
            });
        }

        let mut features = Vec::with_capacity(numeric_attributes);
        for field in &fields[..numeric_attributes] {
            if *field == "?" {
                return Err(KernelMachineError::ParseError(
                    "missing values are not supported".to_string(),
                ));
            }
            features.push(field.parse::<f64>().map_err(|_| {
                KernelMachineError::ParseError(format!("invalid numeric value: {}", field))
            })?);
        }

        let class_field = fields[numeric_attributes];
        let label = classes
            .iter()
            .position(|c| c == class_field)
            .ok_or_else(|| {
                KernelMachineError::ParseError(format!("unknown class value: {}", class_field))
            })? as i32;

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

    /// Declared class names; sample labels index into this list
    pub fn class_names(&self) -> &[String] {
        &self.class_names
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const IRIS_LIKE: &str = "% tiny fixture\n\
@relation flowers\n\
@attribute sepal_length numeric\n\
@attribute sepal_width real\n\
@attribute species {setosa, versicolor}\n\
@data\n\
5.1,3.5,setosa\n\
6.4,2.9,versicolor\n";

    #[test]
    fn test_arff_basic_parsing() {
        let dataset = ArffDataset::from_reader(Cursor::new(IRIS_LIKE)).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 2);
        assert_eq!(dataset.class_names(), &["setosa", "versicolor"]);
        assert_eq!(dataset.samples()[0].input, vec![5.1, 3.5]);
        assert_eq!(dataset.samples()[0].label, 0);
        assert_eq!(dataset.samples()[1].label, 1);
    }

    #[test]
    fn test_arff_unknown_class_value() {
        let data = "@relation r\n@attribute x numeric\n@attribute c {a,b}\n@data\n1.0,z\n";
        assert!(matches!(
            ArffDataset::from_reader(Cursor::new(data)),
            Err(KernelMachineError::ParseError(_))
        ));
    }

    #[test]
    fn test_arff_missing_value_rejected() {
        let data = "@relation r\n@attribute x numeric\n@attribute c {a,b}\n@data\n?,a\n";
        assert!(matches!(
            ArffDataset::from_reader(Cursor::new(data)),
            Err(KernelMachineError::ParseError(_))
        ));
    }

    #[test]
    fn test_arff_requires_nominal_class() {
        let data = "@relation r\n@attribute x numeric\n@data\n1.0\n";
        assert!(matches!(
            ArffDataset::from_reader(Cursor::new(data)),
            Err(KernelMachineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_arff_field_count_mismatch() {
        let data = "@relation r\n@attribute x numeric\n@attribute c {a,b}\n@data\n1.0,2.0,a\n";
        assert!(matches!(
            ArffDataset::from_reader(Cursor::new(data)),
            Err(KernelMachineError::DimensionMismatch { .. })
        ));
    }
}
