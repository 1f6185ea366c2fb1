//! Rotation keys indexed by Galois element.
//!
//! Layout: `count: u16`, then `count` pairs of `(element: u64, switching key)`.
//! Entries are written in ascending element order.

use super::gadget::{GadgetCiphertext, SwitchingKey};
use crate::bitstream::{WireReader, WireWrite};
use crate::codec::{WireFormat, narrow_u16};
use crate::errors::{CodecError, CodecResult};
use crate::params::Parameters;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationKeySet {
    keys: BTreeMap<u64, SwitchingKey>,
}

impl RotationKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key, returning the one it replaced.
    pub fn insert(&mut self, galois_element: u64, key: SwitchingKey) -> Option<SwitchingKey> {
        self.keys.insert(galois_element, key)
    }

    pub fn get(&self, galois_element: u64) -> Option<&SwitchingKey> {
        self.keys.get(&galois_element)
    }

    pub fn contains(&self, galois_element: u64) -> bool {
        self.keys.contains_key(&galois_element)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn galois_elements(&self) -> impl Iterator<Item = u64> + '_ {
        self.keys.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &SwitchingKey)> {
        self.keys.iter().map(|(&g, k)| (g, k))
    }
}

impl FromIterator<(u64, SwitchingKey)> for RotationKeySet {
    fn from_iter<I: IntoIterator<Item = (u64, SwitchingKey)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl WireFormat for RotationKeySet {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        out.put_u16(narrow_u16("rotation key count", self.keys.len())?);
        for (&element, key) in &self.keys {
            out.put_u64(element);
            key.write_to(params, out)?;
        }
        Ok(())
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        let count = reader.read_u16("rotation key count")?;
        let mut keys = BTreeMap::new();
        for _ in 0..count {
            let element = reader.read_u64("galois element")?;
            let key = GadgetCiphertext::read_from(reader)?;
            match keys.entry(element) {
                Entry::Vacant(slot) => {
                    slot.insert(key);
                }
                Entry::Occupied(_) => {
                    warn!(element, "duplicate galois element in rotation key set");
                    return Err(CodecError::DuplicateGaloisElement { element });
                }
            }
        }
        Ok(Self { keys })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        let mut len = 2;
        for key in self.keys.values() {
            len += 8 + key.wire_len(params)?;
        }
        Ok(len)
    }
}
