//! Binary fvec vector file format
//!
//! A headerless sequence of fixed-size records, each
//! `{ int32 little-endian dim; dim * float32 little-endian values }`.
//! The dimension is constant across the file, so the file length must be an
//! exact multiple of `4 + 4 * dim`; anything else is rejected as corrupt.
//! Writing reproduces the layout bit-exactly.

use crate::core::{KernelMachineError, Result, Sample};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Read dense vectors from an fvec file
pub fn read_fvec<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<f64>>> {
    let bytes = fs::read(path)?;
    parse_fvec(&bytes)
}

/// Parse fvec records from raw bytes
pub fn parse_fvec(bytes: &[u8]) -> Result<Vec<Vec<f64>>> {
    if bytes.is_empty() {
        return Err(KernelMachineError::EmptyDataset);
    }
    if bytes.len() < 4 {
        return Err(KernelMachineError::InvalidFormat(
            "fvec file shorter than one dimension header".to_string(),
        ));
    }

    let dim = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if dim <= 0 {
        return Err(KernelMachineError::InvalidFormat(format!(
            "fvec dimension must be positive, got {}",
            dim
        )));
    }
    let dim = dim as usize;
    let record_size = 4 + 4 * dim;
    if bytes.len() % record_size != 0 {
        return Err(KernelMachineError::InvalidFormat(format!(
            "fvec file length {} is not a multiple of the record size {}",
            bytes.len(),
            record_size
        )));
    }

    let mut vectors = Vec::with_capacity(bytes.len() / record_size);
    for record in bytes.chunks_exact(record_size) {
        let record_dim = i32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        if record_dim != dim as i32 {
            return Err(KernelMachineError::InvalidFormat(format!(
                "fvec record dimension {} differs from the file dimension {}",
                record_dim, dim
            )));
        }
        let values = record[4..]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect();
        vectors.push(values);
    }

    Ok(vectors)
}

/// Write dense vectors to an fvec file
///
/// Values are narrowed to `f32`; vectors must all share one dimension.
pub fn write_fvec<P: AsRef<Path>>(path: P, vectors: &[Vec<f64>]) -> Result<()> {
    if vectors.is_empty() {
        return Err(KernelMachineError::EmptyDataset);
    }
    let dim = vectors[0].len();
    if dim == 0 {
        return Err(KernelMachineError::InvalidFormat(
            "fvec vectors must not be empty".to_string(),
        ));
    }

    let mut bytes = Vec::with_capacity(vectors.len() * (4 + 4 * dim));
    for vector in vectors {
        if vector.len() != dim {
            return Err(KernelMachineError::DimensionMismatch {
                expected: dim,
                actual: vector.len(),
            });
        }
        bytes.extend_from_slice(&(dim as i32).to_le_bytes());
        for &value in vector {
            bytes.extend_from_slice(&(value as f32).to_le_bytes());
        }
    }

    let mut file = fs::File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

/// Attach one label to every vector, turning raw fvec data into samples
pub fn label_vectors(vectors: Vec<Vec<f64>>, label: i32) -> Vec<Sample<Vec<f64>>> {
    vectors
        .into_iter()
        .map(|v| Sample::new(v, label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_fvec_round_trip_is_bit_exact() {
        let vectors = vec![
            vec![1.5f64, -2.25, 0.0],
            vec![3.75, 0.5, -128.0],
            vec![0.125, 7.0, 42.0],
        ];
        let file = NamedTempFile::new().expect("temp file");
        write_fvec(file.path(), &vectors).unwrap();

        let restored = read_fvec(file.path()).unwrap();
        // every value is f32-representable, so the round trip is exact
        assert_eq!(restored, vectors);
    }

    #[test]
    fn test_fvec_rejects_truncated_file() {
        let vectors = vec![vec![1.0f64, 2.0]];
        let file = NamedTempFile::new().expect("temp file");
        write_fvec(file.path(), &vectors).unwrap();

        let mut bytes = std::fs::read(file.path()).unwrap();
        bytes.pop();
        assert!(matches!(
            parse_fvec(&bytes),
            Err(KernelMachineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_fvec_rejects_mixed_dimensions() {
        // two records claiming different dimensions but padding to the same
        // record size is impossible; fake a second header instead
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&2.0f32.to_le_bytes());
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&2.0f32.to_le_bytes());
        assert!(matches!(
            parse_fvec(&bytes),
            Err(KernelMachineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_fvec_rejects_non_positive_dimension() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i32.to_le_bytes());
        assert!(matches!(
            parse_fvec(&bytes),
            Err(KernelMachineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_fvec_empty_file() {
        assert!(matches!(
            parse_fvec(&[]),
            Err(KernelMachineError::EmptyDataset)
        ));
    }

    #[test]
    fn test_fvec_write_rejects_ragged_vectors() {
        let vectors = vec![vec![1.0, 2.0], vec![1.0]];
        let file = NamedTempFile::new().expect("temp file");
        assert!(matches!(
            write_fvec(file.path(), &vectors),
            Err(KernelMachineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_label_vectors() {
        let samples = label_vectors(vec![vec![1.0], vec![2.0]], -1);
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.label == -1));
    }
}
