//! RLWE ciphertexts and their seed-compressed form.
//!
//! Ciphertext layout: `N: u32`, `components: u8`, `level: u8`, Q bit-length
//! table (`level + 1` bytes), then one polynomial per component.
//!
//! Compressed layout: `N: u32`, `level: u8`, Q table, 64-byte seed, then
//! the single stored polynomial. The second component is regenerated from
//! the seed and never stored.
//!
//! The scaled variants used by CKKS prefix either layout with the scale as
//! a little-endian `f64`.

use crate::bitstream::{WireReader, WireWrite};
use crate::codec::{
    WireFormat, check_ring_degree, decode_poly, encode_poly, narrow_u8, poly_wire_len,
    read_bit_lengths, read_ring_degree, rollback_on_error, write_ring_degree,
};
use crate::errors::{CodecError, CodecResult};
use crate::params::Parameters;
use crate::poly::Poly;
use crate::sampling::{SEED_LEN, Seed, SeedExpander};
use tracing::{debug, instrument, warn};

/// `degree + 1` polynomials sharing one ring degree and one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    value: Vec<Poly>,
}

impl Ciphertext {
    pub fn new(value: Vec<Poly>) -> CodecResult<Self> {
        let Some(first) = value.first() else {
            return Err(CodecError::EmptyObject);
        };
        let (degree, level) = (first.degree(), first.level());
        for poly in &value[1..] {
            if poly.degree() != degree {
                return Err(CodecError::RingDegreeMismatch {
                    expected: degree,
                    actual: poly.degree(),
                });
            }
            if poly.level() != level {
                return Err(CodecError::LevelMismatch {
                    expected: level,
                    actual: poly.level(),
                });
            }
        }
        Ok(Self { value })
    }

    pub fn value(&self) -> &[Poly] {
        &self.value
    }

    pub fn into_value(self) -> Vec<Poly> {
        self.value
    }

    /// Ciphertext degree: number of components minus one.
    pub fn degree(&self) -> usize {
        self.value.len() - 1
    }

    pub fn ring_degree(&self) -> usize {
        self.value[0].degree()
    }

    pub fn level(&self) -> usize {
        self.value[0].level()
    }

    fn check_drop_bits(&self, drop_bits: &[u8]) -> CodecResult<()> {
        if drop_bits.len() != self.value.len() {
            return Err(CodecError::DropBitsCountMismatch {
                expected: self.value.len(),
                actual: drop_bits.len(),
            });
        }
        Ok(())
    }

    /// Encodes with one lossy `drop_bits` value per component.
    ///
    /// Non-zero values are only accepted at level 0.
    #[instrument(skip_all, fields(components = self.value.len(), level = self.level()))]
    pub fn write_with_drop_bits(
        &self,
        params: &Parameters,
        drop_bits: &[u8],
        out: &mut Vec<u8>,
    ) -> CodecResult<()> {
        self.check_drop_bits(drop_bits)?;
        check_ring_degree(params, self.ring_degree())?;
        let bit_lengths = params.q_bit_lengths(self.level())?;

        rollback_on_error(out, |out| {
            write_ring_degree(out, self.ring_degree())?;
            out.put_u8(narrow_u8("component count", self.value.len())?);
            out.put_u8(narrow_u8("level", self.level())?);
            out.put_bytes(&bit_lengths);
            for (poly, &d) in self.value.iter().zip(drop_bits) {
                encode_poly(poly, &bit_lengths, d, out)?;
            }
            Ok(())
        })?;
        if drop_bits.iter().any(|&d| d > 0) {
            debug!(?drop_bits, "encoded ciphertext with precision dropping");
        }
        Ok(())
    }

    pub fn wire_len_with_drop_bits(
        &self,
        params: &Parameters,
        drop_bits: &[u8],
    ) -> CodecResult<usize> {
        self.check_drop_bits(drop_bits)?;
        check_ring_degree(params, self.ring_degree())?;
        let bit_lengths = params.q_bit_lengths(self.level())?;
        let mut len = 4 + 1 + 1 + bit_lengths.len();
        for &d in drop_bits {
            len += poly_wire_len(self.ring_degree(), &bit_lengths, d)?;
        }
        Ok(len)
    }

    pub fn to_bytes_with_drop_bits(
        &self,
        params: &Parameters,
        drop_bits: &[u8],
    ) -> CodecResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.wire_len_with_drop_bits(params, drop_bits)?);
        self.write_with_drop_bits(params, drop_bits, &mut out)?;
        Ok(out)
    }
}

impl WireFormat for Ciphertext {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        self.write_with_drop_bits(params, &vec![0; self.value.len()], out)
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let degree = read_ring_degree(reader)?;
        let components = reader.read_u8("component count")? as usize;
        if components == 0 {
            warn!("ciphertext header declares zero components");
            return Err(CodecError::malformed("ciphertext has zero components"));
        }
        let level = reader.read_u8("level")? as usize;
        let bit_lengths = read_bit_lengths(reader, level)?;

        let value = (0..components)
            .map(|_| decode_poly(reader, degree, level, &bit_lengths))
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Self { value })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        self.wire_len_with_drop_bits(params, &vec![0; self.value.len()])
    }
}

/// One stored polynomial plus the seed that regenerates the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedCiphertext {
    pub value: Poly,
    pub seed: Seed,
}

impl CompressedCiphertext {
    pub fn new(value: Poly, seed: Seed) -> Self {
        Self { value, seed }
    }

    pub fn level(&self) -> usize {
        self.value.level()
    }

    /// Regenerates the seeded component over the active Q moduli.
    ///
    /// The result carries the stored component's domain flags.
    pub fn expand_mask(
        &self,
        params: &Parameters,
        expander: &impl SeedExpander,
    ) -> CodecResult<Poly> {
        check_ring_degree(params, self.value.degree())?;
        let level = self.level();
        let moduli = params
            .q()
            .moduli()
            .get(..=level)
            .ok_or(CodecError::LevelOutOfChain {
                level,
                chain_len: params.q().len(),
            })?;
        let limbs = expander.expand(&self.seed, moduli, self.value.degree());
        Ok(Poly::from_limbs(limbs)?.with_flags(self.value.is_ntt, self.value.is_mform))
    }

    /// Expands the seed into a full degree-1 ciphertext `[value, mask]`.
    pub fn to_ciphertext(
        &self,
        params: &Parameters,
        expander: &impl SeedExpander,
    ) -> CodecResult<Ciphertext> {
        let mask = self.expand_mask(params, expander)?;
        Ciphertext::new(vec![self.value.clone(), mask])
    }
}

impl WireFormat for CompressedCiphertext {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        check_ring_degree(params, self.value.degree())?;
        let bit_lengths = params.q_bit_lengths(self.level())?;

        write_ring_degree(out, self.value.degree())?;
        out.put_u8(narrow_u8("level", self.level())?);
        out.put_bytes(&bit_lengths);
        out.put_bytes(&self.seed);
        encode_poly(&self.value, &bit_lengths, 0, out)
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let degree = read_ring_degree(reader)?;
        let level = reader.read_u8("level")? as usize;
        let bit_lengths = read_bit_lengths(reader, level)?;
        let seed = reader.read_seed()?;
        let value = decode_poly(reader, degree, level, &bit_lengths)?;
        Ok(Self { value, seed })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        check_ring_degree(params, self.value.degree())?;
        let bit_lengths = params.q_bit_lengths(self.level())?;
        Ok(4 + 1
            + bit_lengths.len()
            + SEED_LEN
            + poly_wire_len(self.value.degree(), &bit_lengths, 0)?)
    }
}

/// CKKS ciphertext: scale followed by the RLWE ciphertext.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledCiphertext {
    pub ciphertext: Ciphertext,
    pub scale: f64,
}

impl WireFormat for ScaledCiphertext {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        out.put_f64(self.scale);
        self.ciphertext.write_to(params, out)
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let scale = reader.read_f64("scale")?;
        let ciphertext = Ciphertext::read_from(reader)?;
        Ok(Self { ciphertext, scale })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        Ok(8 + self.ciphertext.wire_len(params)?)
    }
}

/// CKKS compressed ciphertext: scale followed by the compressed form.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledCompressedCiphertext {
    pub ciphertext: CompressedCiphertext,
    pub scale: f64,
}

impl ScaledCompressedCiphertext {
    pub fn to_ciphertext(
        &self,
        params: &Parameters,
        expander: &impl SeedExpander,
    ) -> CodecResult<ScaledCiphertext> {
        Ok(ScaledCiphertext {
            ciphertext: self.ciphertext.to_ciphertext(params, expander)?,
            scale: self.scale,
        })
    }
}

impl WireFormat for ScaledCompressedCiphertext {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        out.put_f64(self.scale);
        self.ciphertext.write_to(params, out)
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let scale = reader.read_f64("scale")?;
        let ciphertext = CompressedCiphertext::read_from(reader)?;
        Ok(Self { ciphertext, scale })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        Ok(8 + self.ciphertext.wire_len(params)?)
    }
}
