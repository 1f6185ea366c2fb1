use super::gadget::SwitchingKey;
use crate::bitstream::{WireReader, WireWrite};
use crate::codec::{WireFormat, narrow_u8};
use crate::errors::CodecResult;
use crate::params::Parameters;

/// Switching keys for relinearizing degrees 2, 3, ... in order.
///
/// Layout: `count: u8` followed by the switching keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelinearizationKey {
    pub keys: Vec<SwitchingKey>,
}

impl RelinearizationKey {
    pub fn new(keys: Vec<SwitchingKey>) -> Self {
        Self { keys }
    }

    /// Highest ciphertext degree this key can bring back to 1.
    pub fn max_degree(&self) -> usize {
        self.keys.len() + 1
    }
}

impl WireFormat for RelinearizationKey {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        out.put_u8(narrow_u8("relinearization key count", self.keys.len())?);
        for key in &self.keys {
            key.write_to(params, out)?;
        }
        Ok(())
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let count = reader.read_u8("relinearization key count")?;
        let keys = (0..count)
            .map(|_| SwitchingKey::read_from(reader))
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Self { keys })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        let mut len = 1;
        for key in &self.keys {
            len += key.wire_len(params)?;
        }
        Ok(len)
    }
}
