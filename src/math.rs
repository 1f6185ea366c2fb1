//! Word-sized integer helpers used when validating modulus chains.

// Deterministic witness set for every n < 2^64.
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

#[inline]
fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    ((a as u128 * b as u128) % modulus as u128) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    let mut acc = 1u64;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exp >>= 1;
    }
    acc
}

/// Miller-Rabin over `u64` with a fixed witness set, exact on the full range.
pub fn is_prime(n: u64) -> bool {
    match n {
        0 | 1 => return false,
        2 | 3 => return true,
        _ if n & 1 == 0 => return false,
        _ => {}
    }

    let r = (n - 1).trailing_zeros();
    let d = (n - 1) >> r;
    'witness: for &a in &WITNESSES {
        if a % n == 0 {
            continue;
        }
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Smallest number of bits able to hold every value in `[0, modulus)`.
///
/// This is the per-limb width written into every wire header:
/// `bit_length(17) == 5`, `bit_length(1 << 63) == 64`.
#[inline]
pub fn bit_length(modulus: u64) -> u8 {
    (u64::BITS - modulus.leading_zeros()) as u8
}

/// Bytes occupied by `count` values packed at `bit_length` bits each.
#[inline]
pub fn packed_len(count: usize, bit_length: u8) -> usize {
    (count * bit_length as usize).div_ceil(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_primes_and_composites() {
        let primes = [2u64, 3, 5, 7, 17, 97, 193, 257, 12289, 65537];
        let composites = [0u64, 1, 4, 9, 15, 91, 561, 1105, 65535];
        for p in primes {
            assert!(is_prime(p), "{p} should be prime");
        }
        for c in composites {
            assert!(!is_prime(c), "{c} should be composite");
        }
    }

    #[test]
    fn primes_just_below_powers_of_two() {
        assert!(is_prime((1u64 << 61) - 1));
        assert!(is_prime((1u64 << 60) - 93));
        assert!(is_prime(u64::MAX - 58));
        assert!(!is_prime(u64::MAX));
        // strong pseudoprime to bases 2, 3, 5, 7
        assert!(!is_prime(3_215_031_751));
    }

    #[test]
    fn bit_length_matches_highest_set_bit() {
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(17), 5);
        assert_eq!(bit_length(31), 5);
        assert_eq!(bit_length(32), 6);
        assert_eq!(bit_length((1u64 << 60) - 93), 60);
        assert_eq!(bit_length(u64::MAX - 58), 64);
    }

    #[test]
    fn packed_len_rounds_up_to_whole_bytes() {
        assert_eq!(packed_len(0, 64), 0);
        assert_eq!(packed_len(1, 1), 1);
        assert_eq!(packed_len(8, 1), 1);
        assert_eq!(packed_len(9, 1), 2);
        assert_eq!(packed_len(8, 5), 5);
        assert_eq!(packed_len(3, 64), 24);
    }
}
