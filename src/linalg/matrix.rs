//! Dense matrix operations and symmetric eigendecomposition
//!
//! This is the numerical core behind every projection and approximation
//! method in the crate. Two strategy families are implemented, switched on a
//! single size threshold:
//!
//! - QR decomposition: classical Gram-Schmidt for small matrices, Givens
//!   rotations for large ones.
//! - Symmetric eigendecomposition: QR-iteration (repeated `A = QR`,
//!   `A <- RQ`) for small matrices, cyclic Jacobi rotations with per-row
//!   partial pivoting and a QR preconditioning pass for large ones.
//!
//! The matrix inverse is derived from the eigendecomposition and degrades to
//! a pseudo-inverse on singular input instead of failing.

use crate::core::{KernelMachineError, Result};
use crate::linalg::vector;
use log::{debug, warn};
use std::ops::{Index, IndexMut};

/// Matrix size at which the Givens QR and Jacobi eigendecomposition
/// strategies take over from Gram-Schmidt and QR-iteration.
const LARGE_MATRIX_THRESHOLD: usize = 64;

/// Convergence target for the off-diagonal row-sum bound of the QR-iteration
/// eigen loop; also the stagnation acceptance threshold.
const QR_EIG_TOLERANCE: f64 = 1e-12;

/// Iteration cap for the QR-iteration eigen loop. The stagnation test
/// normally stops the loop long before this; the cap guards against inputs
/// whose bound oscillates without settling.
const QR_EIG_MAX_ITERATIONS: usize = 5_000;

/// Convergence target for the largest off-diagonal magnitude in the Jacobi
/// sweep loop.
const JACOBI_TOLERANCE: f64 = 1e-15;

/// Sweep cap for the Jacobi loop. Large-norm matrices bottom out at a
/// roundoff floor above the absolute tolerance, so the loop also exits as
/// soon as the largest off-diagonal stops decreasing.
const JACOBI_MAX_SWEEPS: usize = 1_000;

/// Eigenvalues at or below this magnitude are zeroed (not inverted) when
/// building the matrix inverse, turning it into a pseudo-inverse for
/// singular input.
const PSEUDO_INVERSE_THRESHOLD: f64 = 1e-15;

/// Absolute-plus-relative tolerance for the symmetry precondition check.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Dense row-major matrix of `f64` values
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a zero-filled matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create an identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Create a matrix from a flat row-major vector
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(KernelMachineError::DimensionMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a matrix from a list of equal-length rows
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(KernelMachineError::DimensionMismatch {
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(&row);
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the matrix is square
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Borrow row `i` as a slice
    ///
    /// # Panics
    /// Panics if `i >= rows`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Main diagonal as a vector
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols)).map(|i| self[(i, i)]).collect()
    }

    /// Transposed copy
    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t[(j, i)] = self[(i, j)];
            }
        }
        t
    }

    /// Matrix product `self * other`
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(KernelMachineError::DimensionMismatch {
                expected: self.cols,
                actual: other.rows,
            });
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let aik = self[(i, k)];
                if aik == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    out[(i, j)] += aik * other[(k, j)];
                }
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `self * v`
    pub fn multiply_vec(&self, v: &[f64]) -> Result<Vec<f64>> {
        if self.cols != v.len() {
            return Err(KernelMachineError::DimensionMismatch {
                expected: self.cols,
                actual: v.len(),
            });
        }
        Ok((0..self.rows).map(|i| vector::dot(self.row(i), v)).collect())
    }

    /// Check symmetry within a small tolerance
    pub fn is_symmetric(&self) -> bool {
        self.find_asymmetry().is_none()
    }

    fn find_asymmetry(&self) -> Option<(usize, usize)> {
        if !self.is_square() {
            return Some((0, 0));
        }
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                let a = self[(i, j)];
                let b = self[(j, i)];
                if (a - b).abs() > SYMMETRY_TOLERANCE * (1.0 + a.abs().max(b.abs())) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// QR decomposition `self = Q * R` with `Q` orthonormal and `R` upper
    /// triangular
    ///
    /// Small matrices use classical Gram-Schmidt orthogonalization; large
    /// ones use Givens rotations. Only square input is supported.
    pub fn qr(&self) -> Result<(Matrix, Matrix)> {
        if !self.is_square() {
            return Err(KernelMachineError::NonSquareMatrix {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.rows < LARGE_MATRIX_THRESHOLD {
            Ok(self.qr_gram_schmidt())
        } else {
            Ok(self.qr_givens())
        }
    }

    /// Classical Gram-Schmidt QR: orthogonalize each column against the
    /// already-built basis.
    fn qr_gram_schmidt(&self) -> (Matrix, Matrix) {
        let n = self.rows;
        let mut q = Matrix::zeros(n, n);
        let mut r = Matrix::zeros(n, n);

        for k in 0..n {
            let a_k: Vec<f64> = (0..n).map(|i| self[(i, k)]).collect();
            let mut v = a_k.clone();
            for i in 0..k {
                let q_i: Vec<f64> = (0..n).map(|row| q[(row, i)]).collect();
                let r_ik = vector::dot(&q_i, &a_k);
                r[(i, k)] = r_ik;
                vector::axpy(&mut v, -r_ik, &q_i);
            }
            let nrm = vector::norm(&v);
            r[(k, k)] = nrm;
            // a rank-deficient column contributes a zero basis vector
            if nrm > f64::MIN_POSITIVE {
                for i in 0..n {
                    q[(i, k)] = v[i] / nrm;
                }
            }
        }
        (q, r)
    }

    /// Givens QR: zero each sub-diagonal entry with a plane rotation,
    /// accumulating the transposed rotations as `Q`.
    fn qr_givens(&self) -> (Matrix, Matrix) {
        let n = self.rows;
        let mut r = self.clone();
        let mut q = Matrix::identity(n);

        for col in 0..n {
            for row in (col + 1)..n {
                let b = r[(row, col)];
                if b == 0.0 {
                    continue;
                }
                let a = r[(col, col)];
                let t = a.hypot(b);
                let c = a / t;
                let s = b / t;

                for k in 0..n {
                    let rck = r[(col, k)];
                    let rrk = r[(row, k)];
                    r[(col, k)] = c * rck + s * rrk;
                    r[(row, k)] = -s * rck + c * rrk;
                }
                r[(row, col)] = 0.0;

                for k in 0..n {
                    let qkc = q[(k, col)];
                    let qkr = q[(k, row)];
                    q[(k, col)] = c * qkc + s * qkr;
                    q[(k, row)] = -s * qkc + c * qkr;
                }
            }
        }
        (q, r)
    }

    /// Symmetric eigendecomposition `self = Q * Lambda * Q^t`
    ///
    /// The input must be square and symmetric; both preconditions are checked
    /// here, at the public boundary. Small matrices run the QR-iteration
    /// loop, large ones the preconditioned Jacobi sweeps. On cap exhaustion
    /// the best factorization reached so far is returned and a warning is
    /// logged.
    pub fn eigen_symmetric(&self) -> Result<EigenDecomposition> {
        if !self.is_square() {
            return Err(KernelMachineError::NonSquareMatrix {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if let Some((row, col)) = self.find_asymmetry() {
            return Err(KernelMachineError::NonSymmetricMatrix { row, col });
        }
        if self.rows < LARGE_MATRIX_THRESHOLD {
            self.eigen_qr_iteration()
        } else {
            self.eigen_jacobi()
        }
    }

    /// QR-iteration: `A_k = Q_k R_k`, `A_{k+1} = R_k Q_k`, eigenvectors
    /// accumulated as the running product of the `Q_k`.
    fn eigen_qr_iteration(&self) -> Result<EigenDecomposition> {
        let n = self.rows;
        let mut s = self.clone();
        let mut vectors = Matrix::identity(n);
        let mut prev_bound = f64::INFINITY;
        let mut converged = false;

        for _ in 0..QR_EIG_MAX_ITERATIONS {
            let bound = s.off_diagonal_row_bound();
            if bound < QR_EIG_TOLERANCE {
                converged = true;
                break;
            }
            // a stagnating bound (close eigenvalues) is accepted as-is
            if (prev_bound - bound).abs() < QR_EIG_TOLERANCE {
                converged = true;
                break;
            }
            prev_bound = bound;

            let (q, r) = s.qr()?;
            s = r.multiply(&q)?;
            vectors = vectors.multiply(&q)?;
        }

        if !converged {
            warn!(
                "QR eigendecomposition hit the {} iteration cap (bound {:e}); returning best effort",
                QR_EIG_MAX_ITERATIONS, prev_bound
            );
        }

        Ok(EigenDecomposition {
            eigenvalues: s.diagonal(),
            eigenvectors: vectors,
        })
    }

    /// Cyclic Jacobi rotations with per-row partial pivoting, preceded by a
    /// single QR preconditioning pass (`R * Q` as the starting matrix).
    fn eigen_jacobi(&self) -> Result<EigenDecomposition> {
        let n = self.rows;

        let (q0, r0) = self.qr()?;
        let mut s = r0.multiply(&q0)?;
        // R*Q = Q^t A Q drifts off symmetric by roundoff; restore it exactly
        for i in 0..n {
            for j in (i + 1)..n {
                let v = 0.5 * (s[(i, j)] + s[(j, i)]);
                s[(i, j)] = v;
                s[(j, i)] = v;
            }
        }
        let mut vectors = q0;
        let mut prev_max = f64::INFINITY;
        let mut stalled = 0;
        let mut converged = false;

        for sweep in 0..JACOBI_MAX_SWEEPS {
            let max_off = s.max_off_diagonal();
            if max_off < JACOBI_TOLERANCE {
                converged = true;
                break;
            }
            // the largest off-diagonal may bump transiently within a sweep;
            // only a run of non-improving sweeps marks the roundoff floor
            if max_off >= prev_max {
                stalled += 1;
                if stalled >= 3 {
                    debug!(
                        "Jacobi sweeps settled at off-diagonal {:e} after {} sweeps",
                        max_off, sweep
                    );
                    converged = true;
                    break;
                }
            } else {
                stalled = 0;
                prev_max = max_off;
            }

            for i in 0..n - 1 {
                // partial pivot: largest entry right of the diagonal in row i
                let mut j = i + 1;
                let mut best = s[(i, j)].abs();
                for col in (i + 2)..n {
                    let m = s[(i, col)].abs();
                    if m > best {
                        best = m;
                        j = col;
                    }
                }
                if best < JACOBI_TOLERANCE {
                    continue;
                }

                let theta = if s[(i, i)] == s[(j, j)] {
                    std::f64::consts::FRAC_PI_4
                } else {
                    0.5 * (2.0 * s[(i, j)]).atan2(s[(j, j)] - s[(i, i)])
                };
                let c = theta.cos();
                let sn = theta.sin();

                // S <- J^t S J, applied as a column then a row rotation
                for k in 0..n {
                    let ski = s[(k, i)];
                    let skj = s[(k, j)];
                    s[(k, i)] = c * ski - sn * skj;
                    s[(k, j)] = sn * ski + c * skj;
                }
                for k in 0..n {
                    let sik = s[(i, k)];
                    let sjk = s[(j, k)];
                    s[(i, k)] = c * sik - sn * sjk;
                    s[(j, k)] = sn * sik + c * sjk;
                }
                s[(i, j)] = 0.0;
                s[(j, i)] = 0.0;

                // V <- V J keeps the eigenvector accumulation in step
                for k in 0..n {
                    let vki = vectors[(k, i)];
                    let vkj = vectors[(k, j)];
                    vectors[(k, i)] = c * vki - sn * vkj;
                    vectors[(k, j)] = sn * vki + c * vkj;
                }
            }
        }

        if !converged {
            warn!(
                "Jacobi eigendecomposition hit the {} sweep cap (off-diagonal {:e}); returning best effort",
                JACOBI_MAX_SWEEPS, prev_max
            );
        }

        Ok(EigenDecomposition {
            eigenvalues: s.diagonal(),
            eigenvectors: vectors,
        })
    }

    /// Matrix inverse via eigendecomposition: `Q * Lambda^-1 * Q^t`
    ///
    /// Eigenvalues at or below the negligibility threshold are zeroed rather
    /// than inverted, so singular and near-singular input yields the
    /// pseudo-inverse instead of an error.
    pub fn inverse(&self) -> Result<Matrix> {
        let eig = self.eigen_symmetric()?;
        let n = self.rows;
        let mut inv = Matrix::zeros(n, n);
        for l in 0..n {
            let lambda = eig.eigenvalues[l];
            if lambda.abs() <= PSEUDO_INVERSE_THRESHOLD {
                continue;
            }
            let w = 1.0 / lambda;
            for i in 0..n {
                let qi = eig.eigenvectors[(i, l)];
                if qi == 0.0 {
                    continue;
                }
                for j in 0..n {
                    inv[(i, j)] += w * qi * eig.eigenvectors[(j, l)];
                }
            }
        }
        Ok(inv)
    }

    /// Gershgorin-style bound: the largest off-diagonal absolute row sum
    fn off_diagonal_row_bound(&self) -> f64 {
        let mut bound: f64 = 0.0;
        for i in 0..self.rows {
            let mut sum = 0.0;
            for j in 0..self.cols {
                if i != j {
                    sum += self[(i, j)].abs();
                }
            }
            bound = bound.max(sum);
        }
        bound
    }

    /// Largest off-diagonal magnitude anywhere in the matrix
    fn max_off_diagonal(&self) -> f64 {
        let mut max: f64 = 0.0;
        for i in 0..self.rows {
            for j in 0..self.cols {
                if i != j {
                    max = max.max(self[(i, j)].abs());
                }
            }
        }
        max
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

/// Result of a symmetric eigendecomposition
///
/// Columns of `eigenvectors` pair with the entries of `eigenvalues`; the
/// ordering is whatever the iteration produced, use [`sorted_indices`] for a
/// descending view.
///
/// [`sorted_indices`]: EigenDecomposition::sorted_indices
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Orthonormal eigenvector matrix (one eigenvector per column)
    pub eigenvectors: Matrix,
    /// Eigenvalues, one per eigenvector column
    pub eigenvalues: Vec<f64>,
}

impl EigenDecomposition {
    /// The diagonal eigenvalue matrix `Lambda` (off-diagonals exactly zero)
    pub fn eigenvalue_matrix(&self) -> Matrix {
        let n = self.eigenvalues.len();
        let mut lambda = Matrix::zeros(n, n);
        for (i, &v) in self.eigenvalues.iter().enumerate() {
            lambda[(i, i)] = v;
        }
        lambda
    }

    /// Column indices ordered by descending eigenvalue
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.eigenvalues.len()).collect();
        idx.sort_by(|&a, &b| {
            self.eigenvalues[b]
                .partial_cmp(&self.eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        idx
    }

    /// Rebuild `Q * Lambda * Q^t`
    pub fn reconstruct(&self) -> Matrix {
        let n = self.eigenvalues.len();
        let mut out = Matrix::zeros(n, n);
        for l in 0..n {
            let lambda = self.eigenvalues[l];
            if lambda == 0.0 {
                continue;
            }
            for i in 0..n {
                let qi = lambda * self.eigenvectors[(i, l)];
                if qi == 0.0 {
                    continue;
                }
                for j in 0..n {
                    out[(i, j)] += qi * self.eigenvectors[(j, l)];
                }
            }
        }
        out
    }
}
