//! AVX2 kernel: 32-byte SIMD width, low/high nibble shuffle multiply.
//!
//! Grounded on the teacher's `avx2::mul_vec_by_scalar`/`add_vec_into`, adapted
//! to the `(c, d, p)` overwrite/accumulate kernel contract: callers guarantee
//! `d.len() == p.len()` is a multiple of 32.

use crate::gf::LOWHIGH;

#[cfg(target_arch = "x86")]
use std::arch::x86::{
    _mm256_and_si256, _mm256_broadcastsi128_si256, _mm256_lddqu_si256, _mm256_set1_epi8, _mm256_shuffle_epi8, _mm256_srli_epi64, _mm256_storeu_si256,
    _mm256_xor_si256, _mm_lddqu_si128,
};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    _mm256_and_si256, _mm256_broadcastsi128_si256, _mm256_lddqu_si256, _mm256_set1_epi8, _mm256_shuffle_epi8, _mm256_srli_epi64, _mm256_storeu_si256,
    _mm256_xor_si256, _mm_lddqu_si128,
};

pub const WIDTH: usize = 32;

#[target_feature(enable = "avx2")]
unsafe fn mul_impl(c: u8, d: &[u8], p: &mut [u8]) {
    debug_assert_eq!(d.len() % WIDTH, 0);
    debug_assert_eq!(d.len(), p.len());

    let tbl = &LOWHIGH[c as usize];
    let l_tbl = unsafe { _mm256_broadcastsi128_si256(_mm_lddqu_si128(tbl[..16].as_ptr().cast())) };
    let h_tbl = unsafe { _mm256_broadcastsi128_si256(_mm_lddqu_si128(tbl[16..].as_ptr().cast())) };
    let l_mask = _mm256_set1_epi8(0x0f);

    for (src, dst) in d.chunks_exact(WIDTH).zip(p.chunks_exact_mut(WIDTH)) {
        let chunk = unsafe { _mm256_lddqu_si256(src.as_ptr().cast()) };

        let lo = _mm256_and_si256(chunk, l_mask);
        let lo = _mm256_shuffle_epi8(l_tbl, lo);

        let hi = _mm256_srli_epi64(chunk, 4);
        let hi = _mm256_and_si256(hi, l_mask);
        let hi = _mm256_shuffle_epi8(h_tbl, hi);

        let res = _mm256_xor_si256(lo, hi);
        unsafe { _mm256_storeu_si256(dst.as_mut_ptr().cast(), res) };
    }
}

#[target_feature(enable = "avx2")]
unsafe fn mulxor_impl(c: u8, d: &[u8], p: &mut [u8]) {
    debug_assert_eq!(d.len() % WIDTH, 0);
    debug_assert_eq!(d.len(), p.len());

    let tbl = &LOWHIGH[c as usize];
    let l_tbl = unsafe { _mm256_broadcastsi128_si256(_mm_lddqu_si128(tbl[..16].as_ptr().cast())) };
    let h_tbl = unsafe { _mm256_broadcastsi128_si256(_mm_lddqu_si128(tbl[16..].as_ptr().cast())) };
    let l_mask = _mm256_set1_epi8(0x0f);

    for (src, dst) in d.chunks_exact(WIDTH).zip(p.chunks_exact_mut(WIDTH)) {
        let chunk = unsafe { _mm256_lddqu_si256(src.as_ptr().cast()) };

        let lo = _mm256_and_si256(chunk, l_mask);
        let lo = _mm256_shuffle_epi8(l_tbl, lo);

        let hi = _mm256_srli_epi64(chunk, 4);
        let hi = _mm256_and_si256(hi, l_mask);
        let hi = _mm256_shuffle_epi8(h_tbl, hi);

        let scaled = _mm256_xor_si256(lo, hi);

        let prev = unsafe { _mm256_lddqu_si256(dst.as_ptr().cast()) };
        let res = _mm256_xor_si256(prev, scaled);
        unsafe { _mm256_storeu_si256(dst.as_mut_ptr().cast(), res) };
    }
}

pub fn mul(c: u8, d: &[u8], p: &mut [u8]) {
    unsafe { mul_impl(c, d, p) }
}

pub fn mulxor(c: u8, d: &[u8], p: &mut [u8]) {
    unsafe { mulxor_impl(c, d, p) }
}
