//! Gadget ciphertexts and switching keys.
//!
//! Layout: `digits: u8`, `splits: u8`, then `digits * splits` QP
//! ciphertexts in row-major order.

use super::public_key::{CiphertextQP, DecompressedQP};
use crate::bitstream::{WireReader, WireWrite};
use crate::codec::{WireFormat, narrow_u8};
use crate::errors::{CodecError, CodecResult};
use crate::params::Parameters;
use crate::sampling::SeedExpander;

/// `digits x splits` QP ciphertexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GadgetCiphertext {
    value: Vec<Vec<CiphertextQP>>,
}

/// Switching keys share the gadget layout with no extra header.
pub type SwitchingKey = GadgetCiphertext;

impl GadgetCiphertext {
    pub fn new(value: Vec<Vec<CiphertextQP>>) -> CodecResult<Self> {
        let splits = value.first().map_or(0, Vec::len);
        if splits == 0 {
            return Err(CodecError::EmptyObject);
        }
        if let Some((row, r)) = value.iter().enumerate().find(|(_, r)| r.len() != splits) {
            return Err(CodecError::RaggedGadget {
                row,
                expected: splits,
                actual: r.len(),
            });
        }
        Ok(Self { value })
    }

    pub fn value(&self) -> &[Vec<CiphertextQP>] {
        &self.value
    }

    pub fn digits(&self) -> usize {
        self.value.len()
    }

    pub fn splits(&self) -> usize {
        self.value[0].len()
    }

    pub fn get(&self, digit: usize, split: usize) -> Option<&CiphertextQP> {
        self.value.get(digit)?.get(split)
    }

    /// Expands every entry's seeded mask, keeping the row-major shape.
    pub fn decompress(
        &self,
        params: &Parameters,
        expander: &impl SeedExpander,
    ) -> CodecResult<Vec<Vec<DecompressedQP>>> {
        self.value
            .iter()
            .map(|row| {
                row.iter()
                    .map(|ct| ct.decompress(params, expander))
                    .collect::<CodecResult<Vec<_>>>()
            })
            .collect()
    }
}

impl WireFormat for GadgetCiphertext {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        out.put_u8(narrow_u8("gadget digits", self.digits())?);
        out.put_u8(narrow_u8("gadget splits", self.splits())?);
        for ct in self.value.iter().flatten() {
            ct.write_to(params, out)?;
        }
        Ok(())
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let digits = reader.read_u8("gadget digits")? as usize;
        let splits = reader.read_u8("gadget splits")? as usize;
        if digits == 0 || splits == 0 {
            return Err(CodecError::malformed(format!(
                "gadget ciphertext of shape {digits}x{splits}"
            )));
        }

        let value = (0..digits)
            .map(|_| {
                (0..splits)
                    .map(|_| CiphertextQP::read_from(reader))
                    .collect::<CodecResult<Vec<_>>>()
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Self { value })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        let mut len = 2;
        for ct in self.value.iter().flatten() {
            len += ct.wire_len(params)?;
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::{Poly, PolyQP};
    use crate::sampling::random_seed;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn params() -> Parameters {
        Parameters::builder()
            .ring_degree(2)
            .q_moduli(&[17, 97])
            .p_moduli(&[257])
            .build()
            .unwrap()
    }

    fn entry(tag: u64) -> CiphertextQP {
        let q = Poly::from_limbs(vec![vec![tag % 17, 1], vec![tag % 97, 2]]).unwrap();
        let p = Poly::from_limbs(vec![vec![tag, 3]]).unwrap();
        CiphertextQP::new(
            PolyQP::new(q, p).unwrap(),
            random_seed(&mut ChaCha20Rng::seed_from_u64(tag)),
        )
    }

    #[test]
    fn entries_are_written_row_major() {
        let params = params();
        let gadget = GadgetCiphertext::new(vec![
            vec![entry(1), entry(2), entry(3)],
            vec![entry(4), entry(5), entry(6)],
        ])
        .unwrap();
        let bytes = gadget.to_bytes(&params).unwrap();
        assert_eq!(&bytes[..2], &[2, 3]);
        assert_eq!(bytes.len(), gadget.wire_len(&params).unwrap());

        let decoded = GadgetCiphertext::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.get(1, 0), Some(&entry(4)));
        assert_eq!(decoded.get(0, 2), Some(&entry(3)));
        assert_eq!(decoded, gadget);
    }

    #[test]
    fn shape_must_be_rectangular_and_nonempty() {
        assert_eq!(
            GadgetCiphertext::new(vec![vec![entry(1), entry(2)], vec![entry(3)]]),
            Err(CodecError::RaggedGadget {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(GadgetCiphertext::new(vec![]), Err(CodecError::EmptyObject));
        assert_eq!(
            GadgetCiphertext::new(vec![vec![]]),
            Err(CodecError::EmptyObject)
        );
        assert!(matches!(
            GadgetCiphertext::from_bytes(&[0, 3]),
            Err(CodecError::MalformedHeader { .. })
        ));
    }
}
