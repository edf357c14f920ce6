//! # galois-rs: systematic Reed-Solomon erasure coding over GF(2^8)
//!
//! Given `k` data vectors and `m` parity vectors of identical length,
//! `ReedSolomon` computes parity from data ([`ReedSolomon::encode`]),
//! regenerates any lost vectors from a sufficient surviving subset
//! ([`ReedSolomon::reconst`]), incrementally maintains parity when a
//! single data vector changes ([`ReedSolomon::update`]), and bulk-swaps a
//! subset of data rows without touching the rest of the stripe
//! ([`ReedSolomon::replace`]).
//!
//! The code is systematic: `vects[0..k)` are the caller's own buffers and
//! are never rewritten by `encode`. All vectors are caller-owned; nothing
//! is copied or retained across calls.
//!
//! ## Example
//!
//! ```rust
//! use galois_rs::ReedSolomon;
//!
//! let k = 4;
//! let m = 2;
//! let rs = ReedSolomon::new(k, m).expect("valid (k, m)");
//!
//! let mut data: Vec<Vec<u8>> = (0..k).map(|i| vec![i as u8; 16]).collect();
//! let mut parity: Vec<Vec<u8>> = vec![vec![0u8; 16]; m];
//!
//! {
//!     let mut refs: Vec<&mut [u8]> = data.iter_mut().map(|v| v.as_mut_slice()).collect();
//!     refs.extend(parity.iter_mut().map(|v| v.as_mut_slice()));
//!     rs.encode(&mut refs).expect("encode");
//! }
//!
//! // lose two data vectors, reconstruct them from the survivors.
//! let lost = [0usize, 2];
//! for &i in &lost {
//!     data[i].iter_mut().for_each(|b| *b = 0);
//! }
//!
//! let mut all: Vec<Vec<u8>> = data.iter().cloned().chain(parity.iter().cloned()).collect();
//! {
//!     let mut refs: Vec<&mut [u8]> = all.iter_mut().map(|v| v.as_mut_slice()).collect();
//!     rs.reconst(&mut refs, &[1, 3, 4, 5], &lost).expect("reconst");
//! }
//! assert_eq!(all[0], vec![0u8; 16]);
//! ```

mod encoder;
mod errors;
mod gf;
mod matrix;
mod reconst;
mod simd;

pub use errors::RSError;
pub use simd::SimdTier;

use matrix::Matrix;
use reconst::InverseCache;
use simd::Kernels;

/// Which systematic-encode-matrix construction to use. Both guarantee
/// every `k x k` submatrix of the encode matrix is invertible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixKind {
    /// `V . V_top^-1`, where `V[i,j] = alpha^(i*j)`.
    Vandermonde,
    /// Identity stacked on `C[i,j] = INV[(k+i) xor j]`.
    Cauchy,
}

/// An immutable, constructed Reed-Solomon instance for a fixed `(k, m)`.
/// Safe to share across threads for concurrent calls that touch disjoint
/// vector arrays; the only internal mutable state is an insert-only
/// inverse-matrix cache.
#[derive(Debug)]
pub struct ReedSolomon {
    k: usize,
    m: usize,
    encode_matrix: Matrix,
    generator: Matrix,
    kernels: Kernels,
    cache: Option<InverseCache>,
}

impl ReedSolomon {
    /// `k` data vectors, `m` parity vectors, Vandermonde-systematic encode
    /// matrix, highest SIMD tier the host supports.
    pub fn new(data: usize, parity: usize) -> Result<Self, RSError> {
        Self::with_simd_tier(data, parity, MatrixKind::Vandermonde, SimdTier::Auto)
    }

    pub fn with_matrix_kind(data: usize, parity: usize, kind: MatrixKind) -> Result<Self, RSError> {
        Self::with_simd_tier(data, parity, kind, SimdTier::Auto)
    }

    pub fn with_simd_tier(data: usize, parity: usize, kind: MatrixKind, tier: SimdTier) -> Result<Self, RSError> {
        if data == 0 || parity == 0 || data + parity > 256 {
            return Err(RSError::IllegalVects);
        }

        let encode_matrix = match kind {
            MatrixKind::Cauchy => Matrix::encode_cauchy(data, parity),
            MatrixKind::Vandermonde => Matrix::encode_vandermonde(data, parity)?,
        };
        let parity_rows: Vec<usize> = (data..data + parity).collect();
        let generator = encode_matrix.select_rows(&parity_rows);

        let kernels = Kernels::select(tier);
        let cache = if data + parity <= 64 { Some(InverseCache::new(data)) } else { None };

        Ok(ReedSolomon { k: data, m: parity, encode_matrix, generator, kernels, cache })
    }

    pub fn data_shards(&self) -> usize {
        self.k
    }

    pub fn parity_shards(&self) -> usize {
        self.m
    }

    /// Which SIMD tier was resolved and frozen at construction time.
    pub fn simd_tier(&self) -> SimdTier {
        self.kernels.tier()
    }

    /// Computes `vects[k..k+m)` from `vects[0..k)`, leaving the first `k`
    /// slots bitwise unchanged. `vects.len()` must equal `k + m`; every
    /// vector must be non-empty and the same length.
    pub fn encode(&self, vects: &mut [&mut [u8]]) -> Result<(), RSError> {
        if vects.len() != self.k + self.m {
            return Err(RSError::MismatchVects);
        }
        let l = vects[0].len();
        if l == 0 {
            return Err(RSError::ZeroVectSize);
        }
        if vects.iter().any(|v| v.len() != l) {
            return Err(RSError::MismatchVectSize);
        }

        let (data, parity) = vects.split_at_mut(self.k);
        let inputs: Vec<&[u8]> = data.iter().map(|v| &**v).collect();
        let mut outputs: Vec<&mut [u8]> = parity.iter_mut().map(|v| &mut **v).collect();
        encoder::encode_core(&self.kernels, &self.generator, &inputs, &mut outputs, false);
        Ok(())
    }

    /// Reconstructs `vects[needed]` from the surviving subset `survived`
    /// (or, if `survived` is empty, from every slot not in `needed`). A
    /// needed index that overlaps a survived one is treated as needed.
    /// `|needed| = 0` is success with no work done.
    pub fn reconst(&self, vects: &mut [&mut [u8]], survived: &[usize], needed: &[usize]) -> Result<(), RSError> {
        match reconst::reconst(&self.encode_matrix, &self.kernels, self.cache.as_ref(), vects, survived, needed) {
            Err(RSError::NoNeedReconst) => Ok(()),
            other => other,
        }
    }

    /// Recomputes all `m` parity vectors in `O(m . L)` after exactly one
    /// data vector at `row` changes from `old_data` to `new_data`.
    pub fn update(&self, old_data: &[u8], new_data: &[u8], row: usize, parity: &mut [&mut [u8]]) -> Result<(), RSError> {
        if parity.len() != self.m {
            return Err(RSError::MismatchParityNum);
        }
        if old_data.is_empty() || new_data.is_empty() {
            return Err(RSError::ZeroVectSize);
        }
        if old_data.len() != new_data.len() {
            return Err(RSError::MismatchVectSize);
        }
        if parity.iter().any(|p| p.len() != old_data.len()) {
            return Err(RSError::MismatchVectSize);
        }
        if row >= self.k {
            return Err(RSError::IllegalVectIndex);
        }

        let delta: Vec<u8> = old_data.iter().zip(new_data.iter()).map(|(a, b)| a ^ b).collect();

        let mut column = Matrix::zeros(self.m, 1);
        for j in 0..self.m {
            column.set(j, 0, self.generator.get(j, row));
        }

        let inputs: [&[u8]; 1] = [&delta];
        encoder::encode_core(&self.kernels, &column, &inputs, parity, true);
        Ok(())
    }

    /// Recomputes all `m` parity vectors from a subset of `r <= k` data
    /// rows transitioning between zero-filled and real content, without
    /// reading the other `k - r` rows. `data[t]` is the delta (new value
    /// when filling in, old value when zeroing out) for `replace_rows[t]`.
    pub fn replace(&self, data: &[&[u8]], replace_rows: &[usize], parity: &mut [&mut [u8]]) -> Result<(), RSError> {
        if replace_rows.len() > self.k {
            return Err(RSError::TooManyReplace);
        }
        if data.len() != replace_rows.len() {
            return Err(RSError::MismatchReplace);
        }
        if parity.len() != self.m {
            return Err(RSError::MismatchParityNum);
        }
        if data.is_empty() {
            return Ok(());
        }

        let l = data[0].len();
        if l == 0 {
            return Err(RSError::ZeroVectSize);
        }
        if data.iter().any(|d| d.len() != l) || parity.iter().any(|p| p.len() != l) {
            return Err(RSError::MismatchVectSize);
        }
        for &r in replace_rows {
            if r >= self.k {
                return Err(RSError::IllegalVectIndex);
            }
        }

        let mut generator = Matrix::zeros(self.m, replace_rows.len());
        for (t, &r) in replace_rows.iter().enumerate() {
            for j in 0..self.m {
                generator.set(j, t, self.generator.get(j, r));
            }
        }

        encoder::encode_core(&self.kernels, &generator, data, parity, true);
        Ok(())
    }
}
