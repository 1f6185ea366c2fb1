//! Seed expansion for the pseudorandom component of compressed objects.
//!
//! Every expansion takes its seed explicitly, so expanding different seeds
//! from several threads needs no coordination.

use blake2::Blake2b;
use blake2::digest::Digest;
use blake2::digest::consts::U32;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Uniform};

pub const SEED_LEN: usize = 64;

pub type Seed = [u8; SEED_LEN];

type Blake2b256 = Blake2b<U32>;

/// Deterministic `seed -> residue limbs` capability.
///
/// Implementations must return one limb of `degree` values per modulus, in
/// the order the moduli are given, with every value below its modulus, and
/// must return identical output for identical input.
pub trait SeedExpander: Send + Sync {
    fn expand(&self, seed: &Seed, moduli: &[u64], degree: usize) -> Vec<Vec<u64>>;
}

/// ChaCha20 expander keyed by the BLAKE2b-256 digest of the whole seed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChaChaExpander;

impl ChaChaExpander {
    fn rng(seed: &Seed) -> ChaCha20Rng {
        let mut key = [0u8; 32];
        key.copy_from_slice(&Blake2b256::digest(seed));
        ChaCha20Rng::from_seed(key)
    }
}

impl SeedExpander for ChaChaExpander {
    fn expand(&self, seed: &Seed, moduli: &[u64], degree: usize) -> Vec<Vec<u64>> {
        let mut rng = Self::rng(seed);
        moduli
            .iter()
            .map(|&q| uniform_residues(q, degree, &mut rng))
            .collect()
    }
}

/// Samples `degree` uniform residues in `[0, modulus)`.
///
/// # Panics
///
/// Panics if `modulus == 0`.
pub fn uniform_residues<R: Rng + ?Sized>(modulus: u64, degree: usize, rng: &mut R) -> Vec<u64> {
    let distribution = Uniform::new(0, modulus).unwrap_or_else(|_| {
        panic!("uniform_residues: invalid range [0, {modulus}), modulus must be positive")
    });
    (0..degree).map(|_| distribution.sample(rng)).collect()
}

/// Draws a fresh 64-byte seed.
pub fn random_seed<R: RngCore + ?Sized>(rng: &mut R) -> Seed {
    let mut seed = [0u8; SEED_LEN];
    rng.fill_bytes(&mut seed);
    seed
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULI: [u64; 3] = [17, 97, (1u64 << 61) - 1];

    fn seed_with(byte: u8) -> Seed {
        let mut seed = [0u8; SEED_LEN];
        seed[0] = byte;
        seed[63] = byte.wrapping_mul(3);
        seed
    }

    #[test]
    fn expansion_is_deterministic() {
        let seed = seed_with(9);
        let first = ChaChaExpander.expand(&seed, &MODULI, 64);
        let second = ChaChaExpander.expand(&seed, &MODULI, 64);
        assert_eq!(first, second);
    }

    #[test]
    fn expansion_depends_on_both_seed_halves() {
        let mut low = [0u8; SEED_LEN];
        low[0] = 1;
        let mut high = [0u8; SEED_LEN];
        high[40] = 1;
        let a = ChaChaExpander.expand(&low, &MODULI, 32);
        let b = ChaChaExpander.expand(&high, &MODULI, 32);
        let zero = ChaChaExpander.expand(&[0u8; SEED_LEN], &MODULI, 32);
        assert_ne!(a, zero);
        assert_ne!(b, zero);
        assert_ne!(a, b);
    }

    #[test]
    fn seeds_with_equal_halves_stay_distinct() {
        let repeated: Vec<_> = [0u8, 1, 7]
            .iter()
            .map(|&byte| ChaChaExpander.expand(&[byte; SEED_LEN], &MODULI, 32))
            .collect();
        assert_ne!(repeated[0], repeated[1]);
        assert_ne!(repeated[1], repeated[2]);
        assert_ne!(repeated[0], repeated[2]);
    }

    #[test]
    fn swapping_seed_halves_changes_expansion() {
        let mut seed = [0u8; SEED_LEN];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }
        let mut swapped = [0u8; SEED_LEN];
        swapped[..32].copy_from_slice(&seed[32..]);
        swapped[32..].copy_from_slice(&seed[..32]);
        assert_ne!(
            ChaChaExpander.expand(&seed, &MODULI, 32),
            ChaChaExpander.expand(&swapped, &MODULI, 32)
        );
    }

    #[test]
    fn residues_stay_below_their_modulus() {
        let limbs = ChaChaExpander.expand(&seed_with(3), &MODULI, 256);
        assert_eq!(limbs.len(), MODULI.len());
        for (limb, &q) in limbs.iter().zip(&MODULI) {
            assert_eq!(limb.len(), 256);
            assert!(limb.iter().all(|&x| x < q));
        }
    }

    #[test]
    fn prefix_of_moduli_gives_prefix_of_limbs() {
        let seed = seed_with(5);
        let all = ChaChaExpander.expand(&seed, &MODULI, 16);
        let first_two = ChaChaExpander.expand(&seed, &MODULI[..2], 16);
        assert_eq!(&all[..2], &first_two[..]);
    }

    #[test]
    #[should_panic(expected = "uniform_residues: invalid range [0, 0)")]
    fn zero_modulus_panics() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let _ = uniform_residues(0, 4, &mut rng);
    }

    #[test]
    fn random_seed_fills_all_bytes() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let a = random_seed(&mut rng);
        let b = random_seed(&mut rng);
        assert_ne!(a, b);
        assert!(a[32..].iter().any(|&x| x != 0));
    }
}
