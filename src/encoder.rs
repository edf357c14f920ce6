//! Cache-blocked tiled encoder core. Shared by `Encode`, `Reconst`,
//! `Update` and `Replace` — each calls `encode_core` with a different
//! generator matrix, input set and `update_only` flag.
//!
//! Grounded on `rs.go`'s `encode`/`encodePart` tiling, adapted to the
//! `Kernels`-dispatched `(mul, mulxor)` pair frozen per instance.

use crate::matrix::Matrix;
use crate::simd::{scalar, Kernels};

/// No cache-size probing crate is available; 16 KiB is the documented
/// fallback tile size for an unknown L1 data cache.
const DEFAULT_TILE: usize = 16 * 1024;

fn tile_size(total_len: usize) -> usize {
    DEFAULT_TILE.min(total_len)
}

/// Runs `outputs[j][t] = XOR over i of (generator[j,i] . inputs[i][t])`
/// for every output row `j` and byte offset `t`, in `update_only` mode
/// XOR-accumulating into existing output content instead of overwriting
/// on `i = 0`.
///
/// `generator` must be `outputs.len() x inputs.len()`. All input/output
/// vectors must share the same length `L`.
pub fn encode_core(kernels: &Kernels, generator: &Matrix, inputs: &[&[u8]], outputs: &mut [&mut [u8]], update_only: bool) {
    let k = inputs.len();
    let m = outputs.len();
    debug_assert_eq!(generator.rows, m);
    debug_assert_eq!(generator.cols, k);
    if k == 0 || m == 0 {
        return;
    }
    let l = inputs[0].len();
    if l == 0 {
        return;
    }

    let width = kernels.width();
    let tile = tile_size(l);

    let mut start = 0usize;
    while start < l {
        let tile_len = tile.min(l - start);
        let simd_len = if width > 0 { (tile_len / width) * width } else { 0 };

        for i in 0..k {
            let d = &inputs[i][start..start + tile_len];
            for j in 0..m {
                let c = generator.get(j, i);
                let p = &mut outputs[j][start..start + tile_len];
                let overwrite = i == 0 && !update_only;

                if simd_len > 0 {
                    let (d_simd, d_tail) = d.split_at(simd_len);
                    let (p_simd, p_tail) = p.split_at_mut(simd_len);
                    if overwrite {
                        kernels.mul(c, d_simd, p_simd);
                        if !d_tail.is_empty() {
                            scalar::mul(c, d_tail, p_tail);
                        }
                    } else {
                        kernels.mulxor(c, d_simd, p_simd);
                        if !d_tail.is_empty() {
                            scalar::mulxor(c, d_tail, p_tail);
                        }
                    }
                } else if overwrite {
                    scalar::mul(c, d, p);
                } else {
                    scalar::mulxor(c, d, p);
                }
            }
        }

        start += tile_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::SimdTier;

    #[test]
    fn single_tile_matches_naive_matrix_multiply() {
        let kernels = Kernels::select(SimdTier::Scalar);
        let k = 3;
        let m = 2;
        let l = 10;

        let mut generator = Matrix::zeros(m, k);
        let coeffs = [[1u8, 2, 3], [4, 5, 6]];
        for j in 0..m {
            for i in 0..k {
                generator.set(j, i, coeffs[j][i]);
            }
        }

        let data: Vec<Vec<u8>> = (0..k).map(|i| (0..l as u8).map(|t| t.wrapping_add(i as u8 * 17)).collect()).collect();
        let inputs: Vec<&[u8]> = data.iter().map(|v| v.as_slice()).collect();

        let mut parity = vec![vec![0u8; l]; m];
        {
            let mut outputs: Vec<&mut [u8]> = parity.iter_mut().map(|v| v.as_mut_slice()).collect();
            encode_core(&kernels, &generator, &inputs, &mut outputs, false);
        }

        for j in 0..m {
            for t in 0..l {
                let mut expected = 0u8;
                for i in 0..k {
                    expected ^= crate::gf::mul(coeffs[j][i], data[i][t]);
                }
                assert_eq!(parity[j][t], expected);
            }
        }
    }

    #[test]
    fn tile_boundary_does_not_corrupt_output() {
        let kernels = Kernels::select(SimdTier::Scalar);
        let k = 2;
        let m = 1;
        let l = DEFAULT_TILE * 2 + 37;

        let mut generator = Matrix::zeros(m, k);
        generator.set(0, 0, 3);
        generator.set(0, 1, 5);

        let data: Vec<Vec<u8>> = (0..k).map(|i| (0..l).map(|t| (t as u8).wrapping_add(i as u8)).collect()).collect();
        let inputs: Vec<&[u8]> = data.iter().map(|v| v.as_slice()).collect();

        let mut parity = vec![0u8; l];
        {
            let mut outputs: Vec<&mut [u8]> = vec![parity.as_mut_slice()];
            encode_core(&kernels, &generator, &inputs, &mut outputs, false);
        }

        for t in 0..l {
            let expected = crate::gf::mul(3, data[0][t]) ^ crate::gf::mul(5, data[1][t]);
            assert_eq!(parity[t], expected);
        }
    }

    #[test]
    fn update_only_mode_accumulates_without_overwrite() {
        let kernels = Kernels::select(SimdTier::Scalar);
        let mut generator = Matrix::zeros(1, 1);
        generator.set(0, 0, 7);

        let delta = vec![9u8, 1, 255];
        let inputs: Vec<&[u8]> = vec![&delta];

        let mut parity = vec![200u8, 201, 202];
        let prior = parity.clone();
        {
            let mut outputs: Vec<&mut [u8]> = vec![parity.as_mut_slice()];
            encode_core(&kernels, &generator, &inputs, &mut outputs, true);
        }

        for t in 0..3 {
            let expected = prior[t] ^ crate::gf::mul(7, delta[t]);
            assert_eq!(parity[t], expected);
        }
    }
}
