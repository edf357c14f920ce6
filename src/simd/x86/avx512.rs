//! AVX-512 kernel: 64-byte SIMD width, low/high nibble shuffle multiply.
//!
//! Grounded on the teacher's `avx512::mul_vec_by_scalar`, adapted to the
//! `(c, d, p)` overwrite/accumulate kernel contract.

use crate::gf::LOWHIGH;

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

pub const WIDTH: usize = 64;

#[target_feature(enable = "avx512bw", enable = "avx512f")]
unsafe fn mul_impl(c: u8, d: &[u8], p: &mut [u8]) {
    debug_assert_eq!(d.len() % WIDTH, 0);
    debug_assert_eq!(d.len(), p.len());

    let tbl = &LOWHIGH[c as usize];
    unsafe {
        let l_tbl = _mm512_broadcast_i32x4(_mm_lddqu_si128(tbl[..16].as_ptr().cast()));
        let h_tbl = _mm512_broadcast_i32x4(_mm_lddqu_si128(tbl[16..].as_ptr().cast()));
        let l_mask = _mm512_set1_epi8(0x0f);

        for (src, dst) in d.chunks_exact(WIDTH).zip(p.chunks_exact_mut(WIDTH)) {
            let chunk = _mm512_loadu_si512(src.as_ptr().cast());

            let lo = _mm512_and_si512(chunk, l_mask);
            let lo = _mm512_shuffle_epi8(l_tbl, lo);

            let hi = _mm512_srli_epi64(chunk, 4);
            let hi = _mm512_and_si512(hi, l_mask);
            let hi = _mm512_shuffle_epi8(h_tbl, hi);

            let res = _mm512_xor_si512(lo, hi);
            _mm512_storeu_si512(dst.as_mut_ptr().cast(), res);
        }
    }
}

#[target_feature(enable = "avx512bw", enable = "avx512f")]
unsafe fn mulxor_impl(c: u8, d: &[u8], p: &mut [u8]) {
    debug_assert_eq!(d.len() % WIDTH, 0);
    debug_assert_eq!(d.len(), p.len());

    let tbl = &LOWHIGH[c as usize];
    unsafe {
        let l_tbl = _mm512_broadcast_i32x4(_mm_lddqu_si128(tbl[..16].as_ptr().cast()));
        let h_tbl = _mm512_broadcast_i32x4(_mm_lddqu_si128(tbl[16..].as_ptr().cast()));
        let l_mask = _mm512_set1_epi8(0x0f);

        for (src, dst) in d.chunks_exact(WIDTH).zip(p.chunks_exact_mut(WIDTH)) {
            let chunk = _mm512_loadu_si512(src.as_ptr().cast());

            let lo = _mm512_and_si512(chunk, l_mask);
            let lo = _mm512_shuffle_epi8(l_tbl, lo);

            let hi = _mm512_srli_epi64(chunk, 4);
            let hi = _mm512_and_si512(hi, l_mask);
            let hi = _mm512_shuffle_epi8(h_tbl, hi);

            let scaled = _mm512_xor_si512(lo, hi);

            let prev = _mm512_loadu_si512(dst.as_ptr().cast());
            let res = _mm512_xor_si512(prev, scaled);
            _mm512_storeu_si512(dst.as_mut_ptr().cast(), res);
        }
    }
}

pub fn mul(c: u8, d: &[u8], p: &mut [u8]) {
    unsafe { mul_impl(c, d, p) }
}

pub fn mulxor(c: u8, d: &[u8], p: &mut [u8]) {
    unsafe { mulxor_impl(c, d, p) }
}
