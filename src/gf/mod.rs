//! GF(2^8) arithmetic: addition is XOR, multiplication is table lookup.

mod tables;

pub use tables::{EXP, INV, LOG, LOWHIGH, MUL};

/// `a . b` over GF(2^8).
#[inline(always)]
pub const fn mul(a: u8, b: u8) -> u8 {
    MUL[a as usize][b as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn prop_mul_commutative_and_distributive() {
        let mut rng = rand::rng();
        for _ in 0..10_000 {
            let a: u8 = rng.random();
            let b: u8 = rng.random();
            let c: u8 = rng.random();

            assert_eq!(mul(a, b), mul(b, a));
            assert_eq!(mul(a, b ^ c), mul(a, b) ^ mul(a, c));
        }
    }
}
