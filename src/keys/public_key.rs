//! QP ciphertext: a single RLWE sample over Q and P whose mask is seeded.
//!
//! Used directly as the public key and as each digit of a gadget
//! ciphertext. Layout: QP header, 64-byte seed, Q polynomial, P polynomial.

use crate::bitstream::{WireReader, WireWrite};
use crate::codec::{QpHeader, WireFormat};
use crate::errors::{CodecError, CodecResult};
use crate::params::Parameters;
use crate::poly::{Poly, PolyQP};
use crate::sampling::{SEED_LEN, Seed, SeedExpander};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiphertextQP {
    pub value: PolyQP,
    pub seed: Seed,
}

pub type PublicKey = CiphertextQP;

/// A QP ciphertext with its seeded component regenerated: `[value, mask]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressedQP {
    pub value: [PolyQP; 2],
}

impl CiphertextQP {
    pub fn new(value: PolyQP, seed: Seed) -> Self {
        Self { value, seed }
    }

    /// Regenerates the mask from the seed.
    ///
    /// One stream covers the active Q moduli followed by the active P
    /// moduli. Each half takes the domain flags of the stored half.
    #[instrument(skip_all, fields(level_q = self.value.level_q(), level_p = self.value.level_p()))]
    pub fn expand_mask(
        &self,
        params: &Parameters,
        expander: &impl SeedExpander,
    ) -> CodecResult<PolyQP> {
        let header = QpHeader::for_poly(params, &self.value)?;
        let p_chain = params.p().ok_or(CodecError::MissingAuxiliaryChain)?;
        let (level_q, level_p) = (header.level_q(), header.level_p());

        let moduli: Vec<u64> = params.q().moduli()[..=level_q]
            .iter()
            .chain(&p_chain.moduli()[..=level_p])
            .copied()
            .collect();
        let mut limbs = expander.expand(&self.seed, &moduli, header.degree);
        let p_limbs = limbs.split_off(level_q + 1);

        let (q, p) = (&self.value.q, &self.value.p);
        PolyQP::new(
            Poly::from_limbs(limbs)?.with_flags(q.is_ntt, q.is_mform),
            Poly::from_limbs(p_limbs)?.with_flags(p.is_ntt, p.is_mform),
        )
    }

    pub fn decompress(
        &self,
        params: &Parameters,
        expander: &impl SeedExpander,
    ) -> CodecResult<DecompressedQP> {
        let mask = self.expand_mask(params, expander)?;
        Ok(DecompressedQP {
            value: [self.value.clone(), mask],
        })
    }
}

impl WireFormat for CiphertextQP {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        let header = QpHeader::for_poly(params, &self.value)?;
        header.write(out)?;
        out.put_bytes(&self.seed);
        header.write_body(&self.value, out)
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let header = QpHeader::read(reader)?;
        let seed = reader.read_seed()?;
        let value = header.read_body(reader)?;
        Ok(Self { value, seed })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        let header = QpHeader::for_poly(params, &self.value)?;
        Ok(header.header_len() + SEED_LEN + header.body_len()?)
    }
}
