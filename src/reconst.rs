//! Reconstruction planner: reconciles a caller's survivor/needed index
//! sets into a donor set and a reduced generator, then drives the encoder
//! core once for lost data vectors and once for lost parity vectors.
//!
//! Grounded on `rs.go`'s `Reconst`/`checkReconst`/`reconstData`/
//! `reconstParity`/`getReconstMatrix`/`getReconstMatrixFromCache`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::encoder::encode_core;
use crate::errors::RSError;
use crate::matrix::Matrix;
use crate::simd::Kernels;

/// Soft-capped, insert-only cache of inverted donor sub-matrices, keyed by
/// the 64-bit survivor bitmap. Only participates when `k + m <= 64`.
#[derive(Debug)]
pub struct InverseCache {
    map: RwLock<HashMap<u64, Matrix>>,
    inserted: AtomicUsize,
    cap: usize,
}

impl InverseCache {
    const SOFT_CAP_BYTES: usize = 16 * 1024 * 1024;

    pub fn new(k: usize) -> Self {
        let cap = if k == 0 { 0 } else { Self::SOFT_CAP_BYTES / (k * k) };
        InverseCache { map: RwLock::new(HashMap::new()), inserted: AtomicUsize::new(0), cap }
    }

    fn get(&self, key: u64) -> Option<Matrix> {
        self.map.read().unwrap().get(&key).cloned()
    }

    /// Atomically claims an insertion slot, then inserts if under the cap.
    /// A race between two misses for the same key produces two inversions
    /// and a redundant insert; both are harmless since the value is a pure
    /// function of the key.
    fn insert(&self, key: u64, value: Matrix) {
        let count = self.inserted.fetch_add(1, Ordering::Relaxed) + 1;
        if count > self.cap {
            return;
        }
        self.map.write().unwrap().entry(key).or_insert(value);
    }
}

fn bitmap_key(indices: &[usize]) -> u64 {
    indices.iter().fold(0u64, |acc, &i| acc | (1u64 << i))
}

fn dedup_sorted(indices: &[usize]) -> Vec<usize> {
    let mut v = indices.to_vec();
    v.sort_unstable();
    v.dedup();
    v
}

/// `cache` must already be `None` unless the instance's `k + m <= 64`; the
/// constructor is responsible for that decision, not this function.
fn get_or_invert(cache: Option<&InverseCache>, _k: usize, donors: &[usize], r: &Matrix) -> Result<Matrix, RSError> {
    match cache {
        Some(cache) => {
            let key = bitmap_key(donors);
            if let Some(cached) = cache.get(key) {
                return Ok(cached);
            }
            let inv = r.invert()?;
            cache.insert(key, inv.clone());
            Ok(inv)
        }
        None => r.invert(),
    }
}

/// Safety: `input_idx` and `output_idx` together must be pairwise disjoint
/// indices into `vects`, each within bounds.
unsafe fn split_disjoint<'a>(vects: &mut [&'a mut [u8]], input_idx: &[usize], output_idx: &[usize]) -> (Vec<&'a [u8]>, Vec<&'a mut [u8]>) {
    let base = vects.as_mut_ptr();
    let inputs = input_idx
        .iter()
        .map(|&i| {
            let slot: &mut &mut [u8] = unsafe { &mut *base.add(i) };
            unsafe { std::slice::from_raw_parts(slot.as_ptr(), slot.len()) }
        })
        .collect();
    let outputs = output_idx
        .iter()
        .map(|&i| {
            let slot: &mut &mut [u8] = unsafe { &mut *base.add(i) };
            unsafe { std::slice::from_raw_parts_mut(slot.as_mut_ptr(), slot.len()) }
        })
        .collect();
    (inputs, outputs)
}

/// Reconstructs `vects[needed]` from `vects[survived]` (or, if `survived`
/// is empty, from every slot not in `needed`), using `encode_matrix` (the
/// full `(k+m) x k` systematic encode matrix) for both the data and parity
/// recovery stages.
pub fn reconst(encode_matrix: &Matrix, kernels: &Kernels, cache: Option<&InverseCache>, vects: &mut [&mut [u8]], survived: &[usize], needed: &[usize]) -> Result<(), RSError> {
    let k = encode_matrix.cols;
    let total = encode_matrix.rows;
    let m = total - k;

    if vects.len() != total {
        return Err(RSError::MismatchVects);
    }
    let l = vects[0].len();
    if l == 0 {
        return Err(RSError::ZeroVectSize);
    }
    if vects.iter().any(|v| v.len() != l) {
        return Err(RSError::MismatchVectSize);
    }

    let survived = dedup_sorted(survived);
    let needed = dedup_sorted(needed);

    for &i in survived.iter().chain(needed.iter()) {
        if i >= total {
            return Err(RSError::IllegalVectIndex);
        }
    }

    if needed.is_empty() {
        return Err(RSError::NoNeedReconst);
    }

    let needed_set: HashSet<usize> = needed.iter().copied().collect();
    let mut survivors: Vec<usize> = if survived.is_empty() {
        (0..total).filter(|i| !needed_set.contains(i)).collect()
    } else {
        survived.iter().copied().filter(|i| !needed_set.contains(i)).collect()
    };
    survivors.sort_unstable();
    survivors.dedup();

    let mut needed_vec = needed;
    let has_parity_needed = needed_vec.iter().any(|&i| i >= k);
    if has_parity_needed {
        for i in 0..k {
            if survivors.binary_search(&i).is_err() && !needed_vec.contains(&i) {
                needed_vec.push(i);
            }
        }
        needed_vec.sort_unstable();
    }

    if survivors.len() < k || needed_vec.len() > m {
        return Err(RSError::TooManyLost);
    }

    let n_data: Vec<usize> = needed_vec.iter().copied().filter(|&i| i < k).collect();
    let n_parity: Vec<usize> = needed_vec.iter().copied().filter(|&i| i >= k).collect();
    let donors: Vec<usize> = survivors[..k].to_vec();

    if !n_data.is_empty() {
        let r = encode_matrix.select_rows(&donors);
        let r_inv = get_or_invert(cache, k, &donors, &r)?;
        let reduced = r_inv.select_rows(&n_data);

        let (inputs, mut outputs) = unsafe { split_disjoint(vects, &donors, &n_data) };
        encode_core(kernels, &reduced, &inputs, &mut outputs, false);
    }

    if !n_parity.is_empty() {
        let generator = encode_matrix.select_rows(&n_parity);
        let data_idx: Vec<usize> = (0..k).collect();
        let (inputs, mut outputs) = unsafe { split_disjoint(vects, &data_idx, &n_parity) };
        encode_core(kernels, &generator, &inputs, &mut outputs, false);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::SimdTier;

    fn encode_all(encode_matrix: &Matrix, kernels: &Kernels, vects: &mut [&mut [u8]]) {
        let k = encode_matrix.cols;
        let total = encode_matrix.rows;
        let m = total - k;
        let generator = encode_matrix.select_rows(&(k..total).collect::<Vec<_>>());

        let base = vects.as_mut_ptr();
        let inputs: Vec<&[u8]> = (0..k).map(|i| unsafe { let s: &mut &mut [u8] = &mut *base.add(i); std::slice::from_raw_parts(s.as_ptr(), s.len()) }).collect();
        let mut outputs: Vec<&mut [u8]> = (k..total).map(|i| unsafe { let s: &mut &mut [u8] = &mut *base.add(i); std::slice::from_raw_parts_mut(s.as_mut_ptr(), s.len()) }).collect();
        encode_core(kernels, &generator, &inputs, &mut outputs, false);
        let _ = m;
    }

    #[test]
    fn reconst_recovers_data_and_parity_matching_fresh_encode() {
        let k = 5;
        let m = 5;
        let encode_matrix = Matrix::encode_cauchy(k, m);
        let kernels = Kernels::select(SimdTier::Scalar);

        let original: Vec<Vec<u8>> = vec![vec![0, 1], vec![4, 5], vec![2, 3], vec![6, 7], vec![8, 9]];
        let mut buffers: Vec<Vec<u8>> = original.clone();
        buffers.extend(vec![vec![0u8; 2]; m]);

        {
            let mut refs: Vec<&mut [u8]> = buffers.iter_mut().map(|v| v.as_mut_slice()).collect();
            encode_all(&encode_matrix, &kernels, &mut refs);
        }
        let full_encode_snapshot = buffers.clone();

        // lose indexes 0, 2, 4 (data) and 5, 6 (parity); survivors = 1,3,7,8,9
        for lost in [0usize, 2, 4, 5, 6] {
            buffers[lost] = vec![0u8; 2];
        }

        {
            let mut refs: Vec<&mut [u8]> = buffers.iter_mut().map(|v| v.as_mut_slice()).collect();
            let survived = [9usize, 8, 7, 1, 3];
            let needed = [5usize, 6, 4, 2, 0];
            reconst(&encode_matrix, &kernels, None, &mut refs, &survived, &needed).unwrap();
        }

        assert_eq!(buffers, full_encode_snapshot);
    }

    #[test]
    fn empty_needed_reports_no_need_reconst() {
        let encode_matrix = Matrix::encode_cauchy(3, 2);
        let kernels = Kernels::select(SimdTier::Scalar);
        let mut data = vec![vec![1u8; 4]; 5];
        let mut refs: Vec<&mut [u8]> = data.iter_mut().map(|v| v.as_mut_slice()).collect();
        let err = reconst(&encode_matrix, &kernels, None, &mut refs, &[0, 1, 2], &[]).unwrap_err();
        assert_eq!(err, RSError::NoNeedReconst);
    }

    #[test]
    fn fewer_than_k_survivors_is_too_many_lost() {
        let encode_matrix = Matrix::encode_cauchy(4, 3);
        let kernels = Kernels::select(SimdTier::Scalar);
        let mut data = vec![vec![1u8; 4]; 7];
        let mut refs: Vec<&mut [u8]> = data.iter_mut().map(|v| v.as_mut_slice()).collect();
        // only 2 survivors for k=4
        let err = reconst(&encode_matrix, &kernels, None, &mut refs, &[5, 6], &[0, 1, 2, 3]).unwrap_err();
        assert_eq!(err, RSError::TooManyLost);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let encode_matrix = Matrix::encode_cauchy(3, 2);
        let kernels = Kernels::select(SimdTier::Scalar);
        let mut data = vec![vec![1u8; 4]; 5];
        let mut refs: Vec<&mut [u8]> = data.iter_mut().map(|v| v.as_mut_slice()).collect();
        let err = reconst(&encode_matrix, &kernels, None, &mut refs, &[0, 1, 2], &[9]).unwrap_err();
        assert_eq!(err, RSError::IllegalVectIndex);
    }

    #[test]
    fn inverse_cache_returns_consistent_value_across_calls() {
        let k = 4;
        let m = 3;
        let encode_matrix = Matrix::encode_cauchy(k, m);
        let cache = InverseCache::new(k);
        let donors = [0usize, 1, 2, 3];
        let r = encode_matrix.select_rows(&donors);
        let first = get_or_invert(Some(&cache), k, &donors, &r).unwrap();
        let second = get_or_invert(Some(&cache), k, &donors, &r).unwrap();
        assert_eq!(first, second);
    }
}
