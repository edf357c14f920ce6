//! NEON kernel: 16-byte SIMD width, low/high nibble shuffle multiply.
//!
//! Grounded on the teacher's `aarch64::neon::mul_vec_by_scalar`, adapted to
//! the `(c, d, p)` overwrite/accumulate kernel contract.

use crate::gf::LOWHIGH;
use std::arch::aarch64::{vandq_u8, vdupq_n_u8, veorq_u8, vld1q_u8, vqtbl1q_u8, vshrq_n_u8, vst1q_u8};

pub const WIDTH: usize = 16;

#[target_feature(enable = "neon")]
unsafe fn mul_impl(c: u8, d: &[u8], p: &mut [u8]) {
    debug_assert_eq!(d.len() % WIDTH, 0);
    debug_assert_eq!(d.len(), p.len());

    let tbl = &LOWHIGH[c as usize];
    unsafe {
        let l_tbl = vld1q_u8(tbl[..16].as_ptr());
        let h_tbl = vld1q_u8(tbl[16..].as_ptr());
        let l_mask = vdupq_n_u8(0x0f);

        for (src, dst) in d.chunks_exact(WIDTH).zip(p.chunks_exact_mut(WIDTH)) {
            let chunk = vld1q_u8(src.as_ptr());

            let lo = vandq_u8(chunk, l_mask);
            let lo = vqtbl1q_u8(l_tbl, lo);

            let hi = vshrq_n_u8(chunk, 4);
            let hi = vandq_u8(hi, l_mask);
            let hi = vqtbl1q_u8(h_tbl, hi);

            let res = veorq_u8(lo, hi);
            vst1q_u8(dst.as_mut_ptr(), res);
        }
    }
}

#[target_feature(enable = "neon")]
unsafe fn mulxor_impl(c: u8, d: &[u8], p: &mut [u8]) {
    debug_assert_eq!(d.len() % WIDTH, 0);
    debug_assert_eq!(d.len(), p.len());

    let tbl = &LOWHIGH[c as usize];
    unsafe {
        let l_tbl = vld1q_u8(tbl[..16].as_ptr());
        let h_tbl = vld1q_u8(tbl[16..].as_ptr());
        let l_mask = vdupq_n_u8(0x0f);

        for (src, dst) in d.chunks_exact(WIDTH).zip(p.chunks_exact_mut(WIDTH)) {
            let chunk = vld1q_u8(src.as_ptr());

            let lo = vandq_u8(chunk, l_mask);
            let lo = vqtbl1q_u8(l_tbl, lo);

            let hi = vshrq_n_u8(chunk, 4);
            let hi = vandq_u8(hi, l_mask);
            let hi = vqtbl1q_u8(h_tbl, hi);

            let scaled = veorq_u8(lo, hi);

            let prev = vld1q_u8(dst.as_ptr());
            let res = veorq_u8(prev, scaled);
            vst1q_u8(dst.as_mut_ptr(), res);
        }
    }
}

pub fn mul(c: u8, d: &[u8], p: &mut [u8]) {
    unsafe { mul_impl(c, d, p) }
}

pub fn mulxor(c: u8, d: &[u8], p: &mut [u8]) {
    unsafe { mulxor_impl(c, d, p) }
}
