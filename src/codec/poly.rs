//! Single-polynomial codec.
//!
//! Wire layout: `is_ntt: u8`, `is_mform: u8`, `drop_bits: u8`, then one
//! packed run per limb. At level 0 with `drop_bits = d > 0`, limb `j` is
//! packed at `bit_lengths[j] - d` bits after rounding away the low `d` bits;
//! at any other level `drop_bits` is ignored by the decoder.

use super::rollback_on_error;
use crate::bitstream::{WireReader, WireWrite, pack_component, unpack_component};
use crate::errors::{CodecError, CodecResult};
use crate::math::packed_len;
use crate::poly::Poly;
use tracing::warn;

pub const POLY_HEADER_LEN: usize = 3;

/// Rounds `x / 2^drop_bits` to nearest, saturating at the reduced width.
#[inline]
fn quantize(x: u64, drop_bits: u8, width: u8) -> u64 {
    let rounded = (x >> drop_bits) + ((x >> (drop_bits - 1)) & 1);
    rounded.min((1u64 << width) - 1)
}

fn reduced_width(bit_length: u8, drop_bits: u8) -> CodecResult<u8> {
    if drop_bits >= bit_length {
        return Err(CodecError::DropBitsTooLarge {
            drop_bits,
            bit_length,
        });
    }
    Ok(bit_length - drop_bits)
}

/// Appends `poly` using `bit_lengths[j]` bits for limb `j`.
///
/// `drop_bits > 0` is only accepted at level 0; the caller's polynomial is
/// never modified. On error `out` keeps its length at entry.
pub fn encode_poly(
    poly: &Poly,
    bit_lengths: &[u8],
    drop_bits: u8,
    out: &mut Vec<u8>,
) -> CodecResult<()> {
    if bit_lengths.len() != poly.limbs().len() {
        return Err(CodecError::LevelOutOfChain {
            level: poly.level(),
            chain_len: bit_lengths.len(),
        });
    }
    if drop_bits > 0 && poly.level() != 0 {
        warn!(drop_bits, level = poly.level(), "drop bits requested above level 0");
        return Err(CodecError::DropBitsAboveLevelZero {
            drop_bits,
            level: poly.level(),
        });
    }

    rollback_on_error(out, |out| {
        out.put_bool(poly.is_ntt);
        out.put_bool(poly.is_mform);
        out.put_u8(drop_bits);

        for (limb, &bit_length) in poly.limbs().iter().zip(bit_lengths) {
            if drop_bits == 0 {
                pack_component(limb, bit_length, out)?;
                continue;
            }
            let width = reduced_width(bit_length, drop_bits)?;
            let quantized: Vec<u64> = limb
                .iter()
                .map(|&x| quantize(x, drop_bits, width))
                .collect();
            pack_component(&quantized, width, out)?;
        }
        Ok(())
    })
}

/// Reads one polynomial of `level + 1` limbs of `degree` residues.
pub fn decode_poly(
    reader: &mut WireReader<'_>,
    degree: usize,
    level: usize,
    bit_lengths: &[u8],
) -> CodecResult<Poly> {
    debug_assert_eq!(bit_lengths.len(), level + 1);
    let is_ntt = reader.read_bool("ntt flag")?;
    let is_mform = reader.read_bool("montgomery flag")?;
    let header_drop_bits = reader.read_u8("drop bits")?;
    let drop_bits = if level == 0 { header_drop_bits } else { 0 };

    let widths = bit_lengths
        .iter()
        .map(|&b| reduced_width(b, drop_bits))
        .collect::<CodecResult<Vec<u8>>>()
        .map_err(|err| CodecError::malformed(err.to_string()))?;
    let body: usize = widths.iter().map(|&w| packed_len(degree, w)).sum();
    reader.ensure(body, "polynomial body")?;

    let mut limbs = Vec::with_capacity(level + 1);
    for &width in &widths {
        let mut limb = unpack_component(reader, width, degree)?;
        if drop_bits > 0 {
            for x in &mut limb {
                *x <<= drop_bits;
            }
        }
        limbs.push(limb);
    }

    Ok(Poly::from_limbs(limbs)?.with_flags(is_ntt, is_mform))
}

/// Encoded size of a polynomial, header included.
pub fn poly_wire_len(degree: usize, bit_lengths: &[u8], drop_bits: u8) -> CodecResult<usize> {
    if drop_bits > 0 && bit_lengths.len() != 1 {
        return Err(CodecError::DropBitsAboveLevelZero {
            drop_bits,
            level: bit_lengths.len().saturating_sub(1),
        });
    }
    let mut len = POLY_HEADER_LEN;
    for &bit_length in bit_lengths {
        len += packed_len(degree, reduced_width(bit_length, drop_bits)?);
    }
    Ok(len)
}
