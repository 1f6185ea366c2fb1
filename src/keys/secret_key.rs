//! Secret key: one polynomial over Q and one over P, always stored in full.
use crate::bitstream::WireReader;
use crate::codec::{QpHeader, WireFormat};
use crate::errors::CodecResult;
use crate::params::Parameters;
use crate::poly::PolyQP;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretKey {
    pub value: PolyQP,
}

impl SecretKey {
    pub fn new(value: PolyQP) -> Self {
        Self { value }
    }
}

impl WireFormat for SecretKey {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        let header = QpHeader::for_poly(params, &self.value)?;
        header.write(out)?;
        header.write_body(&self.value, out)
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let header = QpHeader::read(reader)?;
        let value = header.read_body(reader)?;
        Ok(Self { value })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        let header = QpHeader::for_poly(params, &self.value)?;
        Ok(header.header_len() + header.body_len()?)
    }
}
