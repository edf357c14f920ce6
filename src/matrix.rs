//! Flat row-major byte matrices and the GF(2^8) algebra needed to build and
//! invert a systematic Reed-Solomon encode matrix.
//!
//! Kept as a single `Vec<u8>` rather than a slice-of-slices: sub-matrix
//! extraction becomes a contiguous row copy and there is no per-row
//! allocation.

use crate::errors::RSError;
use crate::gf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<u8>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix { rows, cols, data: vec![0u8; rows * cols] }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1);
        }
        m
    }

    #[inline(always)]
    pub fn get(&self, r: usize, c: usize) -> u8 {
        self.data[r * self.cols + c]
    }

    #[inline(always)]
    pub fn set(&mut self, r: usize, c: usize, v: u8) {
        self.data[r * self.cols + c] = v;
    }

    pub fn row(&self, r: usize) -> &[u8] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [u8] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Builds the `(k+m) x k` systematic encode matrix using a Cauchy lower block:
    /// identity on rows `[0,k)`, `C[i,j] = INV[(k+i) xor j]` on rows `[k, k+m)`.
    pub fn encode_cauchy(k: usize, m: usize) -> Matrix {
        let mut e = Matrix::zeros(k + m, k);
        for i in 0..k {
            e.set(i, i, 1);
        }
        for i in 0..m {
            for j in 0..k {
                let d = ((k + i) ^ j) as u8;
                e.set(k + i, j, gf::INV[d as usize]);
            }
        }
        e
    }

    /// Builds the `(k+m) x k` systematic encode matrix from a Vandermonde matrix:
    /// `E = V . V_top^-1`, where `V_top` is the first `k` rows of `V[i,j] = alpha^(i*j)`.
    pub fn encode_vandermonde(k: usize, m: usize) -> Result<Matrix, RSError> {
        let rows = k + m;
        let mut v = Matrix::zeros(rows, k);
        for r in 0..rows {
            for c in 0..k {
                v.set(r, c, gf_exp(r as u8, c));
            }
        }

        let mut top = Matrix::zeros(k, k);
        for r in 0..k {
            top.row_mut(r).copy_from_slice(v.row(r));
        }

        let top_inv = top.invert().map_err(|_| RSError::SingularMatrix)?;
        Ok(v.mul(&top_inv))
    }

    /// Multiplies this matrix (left) by `rhs` (right), over GF(2^8).
    pub fn mul(&self, rhs: &Matrix) -> Matrix {
        debug_assert_eq!(self.cols, rhs.rows);
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for r in 0..self.rows {
            for c in 0..rhs.cols {
                let mut v = 0u8;
                for t in 0..self.cols {
                    v ^= gf::mul(self.get(r, t), rhs.get(t, c));
                }
                out.set(r, c, v);
            }
        }
        out
    }

    fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let cols = self.cols;
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let (head, tail) = self.data.split_at_mut(hi * cols);
        let row_lo = &mut head[lo * cols..(lo + 1) * cols];
        let row_hi = &mut tail[..cols];
        row_lo.swap_with_slice(row_hi);
    }

    /// Inverts this `n x n` matrix via Gauss-Jordan elimination with partial pivoting.
    /// Returns `Err(SingularMatrix)` if a pivot column is entirely zero below the
    /// current row.
    pub fn invert(&self) -> Result<Matrix, RSError> {
        debug_assert_eq!(self.rows, self.cols);
        let n = self.rows;

        // [A | I] side-by-side workspace, n rows by 2n columns.
        let mut work = Matrix::zeros(n, 2 * n);
        for r in 0..n {
            work.row_mut(r)[..n].copy_from_slice(self.row(r));
            work.set(r, n + r, 1);
        }

        for r in 0..n {
            if work.get(r, r) == 0 {
                let mut found = None;
                for below in (r + 1)..n {
                    if work.get(below, r) != 0 {
                        found = Some(below);
                        break;
                    }
                }
                match found {
                    Some(below) => work.swap_rows(r, below),
                    None => return Err(RSError::SingularMatrix),
                }
            }

            let pivot = work.get(r, r);
            if pivot != 1 {
                let scale = gf::INV[pivot as usize];
                for c in 0..2 * n {
                    let v = work.get(r, c);
                    work.set(r, c, gf::mul(v, scale));
                }
            }

            for other in 0..n {
                if other == r {
                    continue;
                }
                let factor = work.get(other, r);
                if factor == 0 {
                    continue;
                }
                for c in 0..2 * n {
                    let pivot_val = work.get(r, c);
                    let v = work.get(other, c) ^ gf::mul(factor, pivot_val);
                    work.set(other, c, v);
                }
            }
        }

        let mut inv = Matrix::zeros(n, n);
        for r in 0..n {
            inv.row_mut(r).copy_from_slice(&work.row(r)[n..]);
        }
        Ok(inv)
    }

    /// Extracts the sub-matrix formed by the given row indexes, in order.
    pub fn select_rows(&self, rows: &[usize]) -> Matrix {
        let mut out = Matrix::zeros(rows.len(), self.cols);
        for (i, &r) in rows.iter().enumerate() {
            out.row_mut(i).copy_from_slice(self.row(r));
        }
        out
    }
}

/// `alpha^n` over GF(2^8), where `alpha` is the primitive element (2).
fn gf_exp(a: u8, n: usize) -> u8 {
    if n == 0 {
        return 1;
    }
    if a == 0 {
        return 0;
    }
    let log_a = gf::LOG[a as usize] as usize;
    let mut log_result = log_a * n;
    log_result %= 255;
    gf::EXP[log_result]
}
