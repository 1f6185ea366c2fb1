//! Bit-exact packing of residue arrays and little-endian header fields.
//!
//! Bit `k` of value `i` in a packed run lands at absolute bit position
//! `i * bit_length + k`, counting from bit 0 of the run's first byte. Runs
//! start on a byte boundary and end by flushing a partial byte whose unused
//! high bits are zero, so a run of `n` values occupies exactly
//! `ceil(n * bit_length / 8)` bytes.

use crate::errors::{CodecError, CodecResult};
use crate::math::packed_len;
use crate::sampling::{SEED_LEN, Seed};
use tracing::trace;

fn check_bit_length(bit_length: u8) -> CodecResult<()> {
    if bit_length == 0 || bit_length > 64 {
        return Err(CodecError::InvalidBitLength { bit_length });
    }
    Ok(())
}

/// Packs values of a fixed width into bytes, least significant bit first.
pub struct BitWriter<'a> {
    out: &'a mut Vec<u8>,
    carry: u8,
    // bits already placed in `carry`, 0..=7
    filled: u32,
}

impl<'a> BitWriter<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Self {
            out,
            carry: 0,
            filled: 0,
        }
    }

    pub fn write(&mut self, value: u64, bit_length: u8) -> CodecResult<()> {
        check_bit_length(bit_length)?;
        if bit_length < 64 && value >> bit_length != 0 {
            return Err(CodecError::ValueTooWide { value, bit_length });
        }

        let mut value = value;
        let mut remaining = bit_length as u32;
        let free = 8 - self.filled;

        if remaining < free {
            self.carry |= (value as u8) << self.filled;
            self.filled += remaining;
            return Ok(());
        }

        self.carry |= (value as u8) << self.filled;
        self.out.push(self.carry);
        value >>= free;
        remaining -= free;

        while remaining >= 8 {
            self.out.push(value as u8);
            value >>= 8;
            remaining -= 8;
        }

        self.carry = value as u8;
        self.filled = remaining;
        Ok(())
    }

    /// Flushes the partial byte, if any.
    pub fn finish(self) {
        if self.filled > 0 {
            self.out.push(self.carry);
        }
    }
}

/// Byte cursor over an encoded buffer. Never reads past the end.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Fails unless at least `needed` bytes remain.
    pub fn ensure(&self, needed: usize, field: &'static str) -> CodecResult<()> {
        if needed > self.remaining() {
            return Err(CodecError::Truncated {
                field,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn take(&mut self, len: usize, field: &'static str) -> CodecResult<&'a [u8]> {
        self.ensure(len, field)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const LEN: usize>(&mut self, field: &'static str) -> CodecResult<[u8; LEN]> {
        let mut buf = [0u8; LEN];
        buf.copy_from_slice(self.take(LEN, field)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self, field: &'static str) -> CodecResult<u8> {
        Ok(self.take(1, field)?[0])
    }

    pub fn read_u16(&mut self, field: &'static str) -> CodecResult<u16> {
        self.take_array(field).map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self, field: &'static str) -> CodecResult<u32> {
        self.take_array(field).map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self, field: &'static str) -> CodecResult<u64> {
        self.take_array(field).map(u64::from_le_bytes)
    }

    pub fn read_f64(&mut self, field: &'static str) -> CodecResult<f64> {
        self.take_array(field).map(f64::from_le_bytes)
    }

    pub fn read_bool(&mut self, field: &'static str) -> CodecResult<bool> {
        match self.read_u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::malformed(format!(
                "{field} must be 0 or 1, got {other}"
            ))),
        }
    }

    pub fn read_seed(&mut self) -> CodecResult<Seed> {
        self.take_array::<SEED_LEN>("seed")
    }

    /// Consumes the reader, failing if any bytes were left unread.
    pub fn finish(self) -> CodecResult<()> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(CodecError::TrailingBytes { count }),
        }
    }
}

/// Explicit `(byte_index, bit_offset)` cursor over a packed run.
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_index: usize,
    bit_offset: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_index: 0,
            bit_offset: 0,
        }
    }

    pub fn read(&mut self, bit_length: u8) -> CodecResult<u64> {
        check_bit_length(bit_length)?;
        let want = bit_length as u32;
        let mut value = 0u64;
        let mut got = 0u32;

        while got < want {
            let Some(&byte) = self.data.get(self.byte_index) else {
                return Err(CodecError::Truncated {
                    field: "packed bits",
                    needed: 1,
                    remaining: 0,
                });
            };
            let take = (8 - self.bit_offset).min(want - got);
            let bits = ((byte >> self.bit_offset) as u64) & ((1u64 << take) - 1);
            value |= bits << got;
            got += take;
            self.bit_offset += take;
            if self.bit_offset == 8 {
                self.byte_index += 1;
                self.bit_offset = 0;
            }
        }
        Ok(value)
    }

    /// Bytes touched so far, counting a partially read byte as consumed.
    pub fn consumed(&self) -> usize {
        self.byte_index + usize::from(self.bit_offset > 0)
    }
}

/// Appends `values` packed at `bit_length` bits each.
pub fn pack_component(values: &[u64], bit_length: u8, out: &mut Vec<u8>) -> CodecResult<()> {
    check_bit_length(bit_length)?;
    let start = out.len();
    let mut writer = BitWriter::new(out);
    for &value in values {
        writer.write(value, bit_length)?;
    }
    writer.finish();
    trace!(
        count = values.len(),
        bit_length,
        bytes = out.len() - start,
        "packed component"
    );
    Ok(())
}

/// Reads `count` values of `bit_length` bits, consuming exactly
/// `ceil(count * bit_length / 8)` bytes.
pub fn unpack_component(
    reader: &mut WireReader<'_>,
    bit_length: u8,
    count: usize,
) -> CodecResult<Vec<u64>> {
    check_bit_length(bit_length)?;
    let bytes = reader.take(packed_len(count, bit_length), "packed component")?;
    let mut bits = BitReader::new(bytes);
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(bits.read(bit_length)?);
    }
    debug_assert_eq!(bits.consumed(), bytes.len());
    trace!(count, bit_length, bytes = bytes.len(), "unpacked component");
    Ok(values)
}

/// Little-endian header writes onto a byte buffer.
pub trait WireWrite {
    fn put_u8(&mut self, value: u8);
    fn put_u16(&mut self, value: u16);
    fn put_u32(&mut self, value: u32);
    fn put_u64(&mut self, value: u64);
    fn put_f64(&mut self, value: f64);
    fn put_bool(&mut self, value: bool);
    fn put_bytes(&mut self, bytes: &[u8]);
}

impl WireWrite for Vec<u8> {
    fn put_u8(&mut self, value: u8) {
        self.push(value);
    }

    fn put_u16(&mut self, value: u16) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn put_u64(&mut self, value: u64) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn put_f64(&mut self, value: f64) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn put_bool(&mut self, value: bool) {
        self.push(u8::from(value));
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}
