//! Wire format shared by every serialized object.
//!
//! All integer header fields are little-endian. Every object carries its
//! own ring size, levels and bit-length tables, so decoding needs no
//! [`Parameters`]; encoding reads them only to build the bit-length tables.

mod poly;

pub use poly::{POLY_HEADER_LEN, decode_poly, encode_poly, poly_wire_len};

use crate::bitstream::{WireReader, WireWrite};
use crate::errors::{CodecError, CodecResult};
use crate::params::Parameters;
use crate::poly::PolyQP;
use tracing::debug;

/// Encode/decode for one object shape.
pub trait WireFormat: Sized {
    /// Appends the encoding to `out`. May leave a partial encoding behind on
    /// error; callers go through [`WireFormat::write_to`].
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()>;

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self>;

    /// Exact encoded size, computed from the header formulas without
    /// encoding.
    fn wire_len(&self, params: &Parameters) -> CodecResult<usize>;

    /// Appends the encoding to `out`. On error `out` is truncated back to
    /// its length at entry.
    fn write_to(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        rollback_on_error(out, |out| self.encode_into(params, out))
    }

    fn to_bytes(&self, params: &Parameters) -> CodecResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.wire_len(params)?);
        self.write_to(params, &mut out)?;
        debug!(
            object = std::any::type_name::<Self>(),
            bytes = out.len(),
            "encoded"
        );
        Ok(out)
    }

    /// Decodes a buffer holding exactly one object.
    fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        let mut reader = WireReader::new(bytes);
        let value = Self::read_from(&mut reader)?;
        reader.finish()?;
        debug!(
            object = std::any::type_name::<Self>(),
            bytes = bytes.len(),
            "decoded"
        );
        Ok(value)
    }
}

/// Runs `encode`, truncating `out` to its entry length if it fails.
pub(crate) fn rollback_on_error(
    out: &mut Vec<u8>,
    encode: impl FnOnce(&mut Vec<u8>) -> CodecResult<()>,
) -> CodecResult<()> {
    let start = out.len();
    let result = encode(out);
    if result.is_err() {
        out.truncate(start);
    }
    result
}

pub(crate) fn narrow_u8(field: &'static str, value: usize) -> CodecResult<u8> {
    u8::try_from(value).map_err(|_| CodecError::HeaderOverflow {
        field,
        value,
        max: u8::MAX as usize,
    })
}

pub(crate) fn narrow_u16(field: &'static str, value: usize) -> CodecResult<u16> {
    u16::try_from(value).map_err(|_| CodecError::HeaderOverflow {
        field,
        value,
        max: u16::MAX as usize,
    })
}

pub(crate) fn check_ring_degree(params: &Parameters, degree: usize) -> CodecResult<()> {
    if degree != params.ring_degree() {
        return Err(CodecError::RingDegreeMismatch {
            expected: params.ring_degree(),
            actual: degree,
        });
    }
    Ok(())
}

pub(crate) fn write_ring_degree(out: &mut Vec<u8>, degree: usize) -> CodecResult<()> {
    let degree = u32::try_from(degree).map_err(|_| CodecError::HeaderOverflow {
        field: "ring degree",
        value: degree,
        max: u32::MAX as usize,
    })?;
    out.put_u32(degree);
    Ok(())
}

pub(crate) fn read_ring_degree(reader: &mut WireReader<'_>) -> CodecResult<usize> {
    match reader.read_u32("ring degree")? {
        0 => Err(CodecError::malformed("ring degree is zero")),
        degree => Ok(degree as usize),
    }
}

/// Reads `level + 1` per-limb bit lengths, each in `1..=64`.
pub(crate) fn read_bit_lengths(reader: &mut WireReader<'_>, level: usize) -> CodecResult<Vec<u8>> {
    let table = reader.take(level + 1, "bit-length table")?;
    if let Some(&bad) = table.iter().find(|&&b| b == 0 || b > 64) {
        return Err(CodecError::malformed(format!(
            "bit length {bad} outside 1..=64"
        )));
    }
    Ok(table.to_vec())
}

/// Header shared by the secret key and QP ciphertexts:
/// `N: u32`, `level_q: u8`, `level_p: u8`, Q table, P table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QpHeader {
    pub degree: usize,
    pub q_bits: Vec<u8>,
    pub p_bits: Vec<u8>,
}

impl QpHeader {
    pub fn for_poly(params: &Parameters, poly: &PolyQP) -> CodecResult<Self> {
        check_ring_degree(params, poly.degree())?;
        Ok(Self {
            degree: poly.degree(),
            q_bits: params.q_bit_lengths(poly.level_q())?,
            p_bits: params.p_bit_lengths(poly.level_p())?,
        })
    }

    pub fn level_q(&self) -> usize {
        self.q_bits.len() - 1
    }

    pub fn level_p(&self) -> usize {
        self.p_bits.len() - 1
    }

    pub fn header_len(&self) -> usize {
        4 + 2 + self.q_bits.len() + self.p_bits.len()
    }

    pub fn write(&self, out: &mut Vec<u8>) -> CodecResult<()> {
        write_ring_degree(out, self.degree)?;
        out.put_u8(narrow_u8("Q level", self.level_q())?);
        out.put_u8(narrow_u8("P level", self.level_p())?);
        out.put_bytes(&self.q_bits);
        out.put_bytes(&self.p_bits);
        Ok(())
    }

    pub fn read(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let degree = read_ring_degree(reader)?;
        let level_q = reader.read_u8("Q level")? as usize;
        let level_p = reader.read_u8("P level")? as usize;
        let q_bits = read_bit_lengths(reader, level_q)?;
        let p_bits = read_bit_lengths(reader, level_p)?;
        Ok(Self {
            degree,
            q_bits,
            p_bits,
        })
    }

    /// Encoded size of the Q and P polynomials that follow this header.
    pub fn body_len(&self) -> CodecResult<usize> {
        Ok(poly_wire_len(self.degree, &self.q_bits, 0)?
            + poly_wire_len(self.degree, &self.p_bits, 0)?)
    }

    pub fn write_body(&self, poly: &PolyQP, out: &mut Vec<u8>) -> CodecResult<()> {
        encode_poly(&poly.q, &self.q_bits, 0, out)?;
        encode_poly(&poly.p, &self.p_bits, 0, out)
    }

    pub fn read_body(&self, reader: &mut WireReader<'_>) -> CodecResult<PolyQP> {
        let q = decode_poly(reader, self.degree, self.level_q(), &self.q_bits)?;
        let p = decode_poly(reader, self.degree, self.level_p(), &self.p_bits)?;
        PolyQP::new(q, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_reports_overflow() {
        assert_eq!(narrow_u8("count", 255).unwrap(), 255);
        assert_eq!(
            narrow_u8("count", 256),
            Err(CodecError::HeaderOverflow {
                field: "count",
                value: 256,
                max: 255
            })
        );
        assert!(narrow_u16("entries", 70_000).is_err());
    }

    #[test]
    fn zero_ring_degree_is_malformed() {
        let mut reader = WireReader::new(&[0, 0, 0, 0]);
        assert!(matches!(
            read_ring_degree(&mut reader),
            Err(CodecError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn bit_length_tables_are_range_checked() {
        let mut reader = WireReader::new(&[5, 64]);
        assert_eq!(read_bit_lengths(&mut reader, 1).unwrap(), vec![5, 64]);

        let mut reader = WireReader::new(&[5, 65]);
        assert!(matches!(
            read_bit_lengths(&mut reader, 1),
            Err(CodecError::MalformedHeader { .. })
        ));

        let mut reader = WireReader::new(&[5]);
        assert!(matches!(
            read_bit_lengths(&mut reader, 3),
            Err(CodecError::Truncated { .. })
        ));
    }
}
