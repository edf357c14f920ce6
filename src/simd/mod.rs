//! Kernel dispatcher: picks exactly one `(mul, mulxor)` pair at instance
//! creation time and freezes it for the instance's lifetime. No per-call
//! feature re-detection and no `switch` inside the inner encode loop.

pub(crate) mod scalar;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;

#[cfg(target_arch = "aarch64")]
mod aarch64;

/// SIMD tier preference passed at construction time. `Auto` (the default)
/// picks the highest tier the host CPU reports; the others pin a specific
/// tier (or disable SIMD) regardless of what the host supports, falling back
/// to `Scalar` if the pinned tier isn't actually available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimdTier {
    Auto,
    Avx512,
    Avx2,
    Neon,
    Scalar,
}

/// The resolved, frozen kernel pair for a `ReedSolomon` instance.
#[derive(Clone, Copy, Debug)]
pub struct Kernels {
    tier: SimdTier,
    width: usize,
    mul_fn: fn(u8, &[u8], &mut [u8]),
    mulxor_fn: fn(u8, &[u8], &mut [u8]),
}

impl Kernels {
    /// Resolves `preferred` against the host's reported CPU features.
    pub fn select(preferred: SimdTier) -> Kernels {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            let avx512_available = is_x86_feature_detected!("avx512bw") && is_x86_feature_detected!("avx512f");
            let avx2_available = is_x86_feature_detected!("avx2");

            let chosen = match preferred {
                SimdTier::Scalar | SimdTier::Neon => SimdTier::Scalar,
                SimdTier::Avx512 => {
                    if avx512_available {
                        SimdTier::Avx512
                    } else {
                        SimdTier::Scalar
                    }
                }
                SimdTier::Avx2 => {
                    if avx2_available {
                        SimdTier::Avx2
                    } else {
                        SimdTier::Scalar
                    }
                }
                SimdTier::Auto => {
                    if avx512_available {
                        SimdTier::Avx512
                    } else if avx2_available {
                        SimdTier::Avx2
                    } else {
                        SimdTier::Scalar
                    }
                }
            };

            match chosen {
                SimdTier::Avx512 => Kernels { tier: SimdTier::Avx512, width: x86::avx512::WIDTH, mul_fn: x86::avx512::mul, mulxor_fn: x86::avx512::mulxor },
                SimdTier::Avx2 => Kernels { tier: SimdTier::Avx2, width: x86::avx2::WIDTH, mul_fn: x86::avx2::mul, mulxor_fn: x86::avx2::mulxor },
                _ => Kernels { tier: SimdTier::Scalar, width: 0, mul_fn: scalar::mul, mulxor_fn: scalar::mulxor },
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            let neon_available = std::arch::is_aarch64_feature_detected!("neon");
            let chosen = match preferred {
                SimdTier::Neon | SimdTier::Auto => neon_available,
                SimdTier::Scalar | SimdTier::Avx512 | SimdTier::Avx2 => false,
            };
            if chosen {
                Kernels { tier: SimdTier::Neon, width: aarch64::neon::WIDTH, mul_fn: aarch64::neon::mul, mulxor_fn: aarch64::neon::mulxor }
            } else {
                Kernels { tier: SimdTier::Scalar, width: 0, mul_fn: scalar::mul, mulxor_fn: scalar::mulxor }
            }
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            let _ = preferred;
            Kernels { tier: SimdTier::Scalar, width: 0, mul_fn: scalar::mul, mulxor_fn: scalar::mulxor }
        }
    }

    pub fn tier(&self) -> SimdTier {
        self.tier
    }

    /// SIMD width in bytes (0 for the scalar tier).
    pub fn width(&self) -> usize {
        self.width
    }

    /// `p <- c . d` (overwrite). `d.len()` must be a multiple of `self.width()`
    /// when `self.width() > 0`.
    #[inline]
    pub fn mul(&self, c: u8, d: &[u8], p: &mut [u8]) {
        (self.mul_fn)(c, d, p)
    }

    /// `p <- p XOR (c . d)` (accumulate).
    #[inline]
    pub fn mulxor(&self, c: u8, d: &[u8], p: &mut [u8]) {
        (self.mulxor_fn)(c, d, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn check_equivalence(kernels: &Kernels) {
        if kernels.width() == 0 {
            return;
        }
        let mut rng = rand::rng();
        for len_blocks in 1..=32usize {
            let len = len_blocks * kernels.width();
            for c in [0u8, 1, 2, 7, 254, 255] {
                let d: Vec<u8> = (0..len).map(|_| rng.random()).collect();

                let mut p_scalar = vec![0u8; len];
                scalar::mul(c, &d, &mut p_scalar);
                let mut p_simd = vec![0u8; len];
                kernels.mul(c, &d, &mut p_simd);
                assert_eq!(p_scalar, p_simd, "mul mismatch at len={len} c={c} tier={:?}", kernels.tier());

                let prior: Vec<u8> = (0..len).map(|_| rng.random()).collect();
                let mut p_scalar = prior.clone();
                scalar::mulxor(c, &d, &mut p_scalar);
                let mut p_simd = prior.clone();
                kernels.mulxor(c, &d, &mut p_simd);
                assert_eq!(p_scalar, p_simd, "mulxor mismatch at len={len} c={c} tier={:?}", kernels.tier());
            }
        }
    }

    #[test]
    fn auto_tier_matches_scalar_kernel() {
        check_equivalence(&Kernels::select(SimdTier::Auto));
    }

    #[test]
    fn scalar_tier_is_exact_by_construction() {
        check_equivalence(&Kernels::select(SimdTier::Scalar));
    }

    #[test]
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn avx2_tier_matches_scalar_kernel() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }
        let kernels = Kernels::select(SimdTier::Avx2);
        assert_eq!(kernels.tier(), SimdTier::Avx2);
        check_equivalence(&kernels);
    }

    #[test]
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn avx512_tier_matches_scalar_kernel() {
        if !(is_x86_feature_detected!("avx512bw") && is_x86_feature_detected!("avx512f")) {
            return;
        }
        let kernels = Kernels::select(SimdTier::Avx512);
        assert_eq!(kernels.tier(), SimdTier::Avx512);
        check_equivalence(&kernels);
    }

    #[test]
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn pinned_tier_falls_back_to_scalar_when_unavailable() {
        if is_x86_feature_detected!("avx512bw") && is_x86_feature_detected!("avx512f") {
            return;
        }
        let kernels = Kernels::select(SimdTier::Avx512);
        assert_eq!(kernels.tier(), SimdTier::Scalar);
    }
}
