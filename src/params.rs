//! Ring parameters: the ring degree plus the Q and P modulus chains.
//!
//! The codec only consults parameters at encode time, to compute the
//! per-limb bit-length tables it writes into every header. Decoding is
//! self-describing and never needs a `Parameters` value.

use crate::errors::{CodecError, CodecResult};
use crate::math::{bit_length, is_prime};

/// Limb counts and levels travel as single bytes.
pub const MAX_CHAIN_LEN: usize = u8::MAX as usize + 1;

/// Ordered list of word-sized odd primes.
///
/// Invariant: non-empty, every entry an odd prime, at most
/// [`MAX_CHAIN_LEN`] entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulusChain {
    moduli: Vec<u64>,
}

impl ModulusChain {
    pub fn new(moduli: Vec<u64>) -> CodecResult<Self> {
        if moduli.is_empty() {
            return Err(CodecError::InvalidParameters {
                message: "modulus chain must contain at least one modulus".into(),
            });
        }
        if moduli.len() > MAX_CHAIN_LEN {
            return Err(CodecError::InvalidParameters {
                message: format!(
                    "modulus chain has {} entries, at most {MAX_CHAIN_LEN} allowed",
                    moduli.len()
                ),
            });
        }
        if let Some(&modulus) = moduli.iter().find(|&&q| q == 2 || !is_prime(q)) {
            return Err(CodecError::InvalidModulus { modulus });
        }
        Ok(Self { moduli })
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub fn len(&self) -> usize {
        self.moduli.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moduli.is_empty()
    }

    pub fn max_level(&self) -> usize {
        self.moduli.len() - 1
    }

    pub fn bit_length(&self, index: usize) -> Option<u8> {
        self.moduli.get(index).map(|&q| bit_length(q))
    }

    /// Bit-length table for limbs `0..=level`.
    pub fn bit_lengths(&self, level: usize) -> CodecResult<Vec<u8>> {
        if level >= self.moduli.len() {
            return Err(CodecError::LevelOutOfChain {
                level,
                chain_len: self.moduli.len(),
            });
        }
        Ok(self.moduli[..=level].iter().map(|&q| bit_length(q)).collect())
    }
}

/// Ring degree and modulus chains.
///
/// `p` is optional: ciphertext-only deployments have no auxiliary chain,
/// and objects that need one fail to encode with
/// [`CodecError::MissingAuxiliaryChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    ring_degree: usize,
    q: ModulusChain,
    p: Option<ModulusChain>,
}

impl Parameters {
    pub fn builder() -> ParametersBuilder {
        ParametersBuilder::new()
    }

    pub fn ring_degree(&self) -> usize {
        self.ring_degree
    }

    pub fn q(&self) -> &ModulusChain {
        &self.q
    }

    pub fn p(&self) -> Option<&ModulusChain> {
        self.p.as_ref()
    }

    pub fn q_bit_lengths(&self, level: usize) -> CodecResult<Vec<u8>> {
        self.q.bit_lengths(level)
    }

    pub fn p_bit_lengths(&self, level: usize) -> CodecResult<Vec<u8>> {
        match &self.p {
            Some(p) => p.bit_lengths(level),
            None => Err(CodecError::MissingAuxiliaryChain),
        }
    }

    /// Same ring and chains truncated to the first `q_len` / `p_len` moduli.
    ///
    /// Used for sparse key-switching keys that live on a prefix of the
    /// chains.
    pub fn truncated(&self, q_len: usize, p_len: usize) -> CodecResult<Self> {
        let q = self.q.moduli().get(..q_len).filter(|m| !m.is_empty());
        let Some(q) = q else {
            return Err(CodecError::InvalidParameters {
                message: format!("cannot keep {q_len} of {} Q moduli", self.q.len()),
            });
        };
        let p = match (&self.p, p_len) {
            (_, 0) => None,
            (Some(p), len) if len <= p.len() => Some(p.moduli()[..len].to_vec()),
            (p, len) => {
                return Err(CodecError::InvalidParameters {
                    message: format!(
                        "cannot keep {len} of {} P moduli",
                        p.as_ref().map_or(0, ModulusChain::len)
                    ),
                });
            }
        };
        Ok(Self {
            ring_degree: self.ring_degree,
            q: ModulusChain { moduli: q.to_vec() },
            p: p.map(|moduli| ModulusChain { moduli }),
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct ParametersBuilder {
    ring_degree: Option<usize>,
    q_moduli: Vec<u64>,
    p_moduli: Vec<u64>,
}

impl ParametersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ring_degree(mut self, degree: usize) -> Self {
        self.ring_degree = Some(degree);
        self
    }

    pub fn log_ring_degree(mut self, log_degree: u32) -> Self {
        self.ring_degree = 1usize.checked_shl(log_degree);
        self
    }

    pub fn q_moduli(mut self, moduli: &[u64]) -> Self {
        self.q_moduli = moduli.to_vec();
        self
    }

    pub fn p_moduli(mut self, moduli: &[u64]) -> Self {
        self.p_moduli = moduli.to_vec();
        self
    }

    pub fn build(self) -> CodecResult<Parameters> {
        let ring_degree = self.ring_degree.ok_or_else(|| CodecError::InvalidParameters {
            message: "ring degree not set".into(),
        })?;
        if !ring_degree.is_power_of_two() || ring_degree > u32::MAX as usize {
            return Err(CodecError::InvalidParameters {
                message: format!(
                    "ring degree must be a power of two below 2^32, got {ring_degree}"
                ),
            });
        }
        let q = ModulusChain::new(self.q_moduli)?;
        let p = if self.p_moduli.is_empty() {
            None
        } else {
            Some(ModulusChain::new(self.p_moduli)?)
        };
        Ok(Parameters { ring_degree, q, p })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_lengths_follow_the_live_chain() {
        let chain = ModulusChain::new(vec![17, 97, 193, (1u64 << 61) - 1]).unwrap();
        assert_eq!(chain.bit_lengths(0).unwrap(), vec![5]);
        assert_eq!(chain.bit_lengths(3).unwrap(), vec![5, 7, 8, 61]);
        assert_eq!(chain.max_level(), 3);
        assert_eq!(chain.bit_length(2), Some(8));
        assert_eq!(chain.bit_length(4), None);
    }

    #[test]
    fn bit_lengths_reject_levels_past_the_chain() {
        let chain = ModulusChain::new(vec![17, 97]).unwrap();
        assert_eq!(
            chain.bit_lengths(2),
            Err(CodecError::LevelOutOfChain {
                level: 2,
                chain_len: 2
            })
        );
    }

    #[test]
    fn chain_rejects_composites_even_primes_and_empty() {
        assert_eq!(
            ModulusChain::new(vec![17, 91]),
            Err(CodecError::InvalidModulus { modulus: 91 })
        );
        assert_eq!(
            ModulusChain::new(vec![2]),
            Err(CodecError::InvalidModulus { modulus: 2 })
        );
        assert!(matches!(
            ModulusChain::new(vec![]),
            Err(CodecError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn builder_validates_ring_degree() {
        let err = Parameters::builder()
            .ring_degree(12)
            .q_moduli(&[17])
            .build()
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidParameters { .. }));

        let params = Parameters::builder()
            .log_ring_degree(3)
            .q_moduli(&[17, 97])
            .p_moduli(&[257])
            .build()
            .unwrap();
        assert_eq!(params.ring_degree(), 8);
        assert_eq!(params.p_bit_lengths(0).unwrap(), vec![9]);
    }

    #[test]
    fn missing_p_chain_fails_lookups() {
        let params = Parameters::builder()
            .ring_degree(8)
            .q_moduli(&[17])
            .build()
            .unwrap();
        assert!(params.p().is_none());
        assert_eq!(
            params.p_bit_lengths(0),
            Err(CodecError::MissingAuxiliaryChain)
        );
    }

    #[test]
    fn truncated_keeps_chain_prefixes() {
        let params = Parameters::builder()
            .ring_degree(8)
            .q_moduli(&[17, 97, 193])
            .p_moduli(&[257, 769])
            .build()
            .unwrap();
        let sparse = params.truncated(1, 1).unwrap();
        assert_eq!(sparse.q().moduli(), &[17]);
        assert_eq!(sparse.p().unwrap().moduli(), &[257]);
        assert!(params.truncated(0, 1).is_err());
        assert!(params.truncated(1, 3).is_err());
    }
}
