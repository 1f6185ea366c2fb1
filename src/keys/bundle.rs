//! A party's key material in one buffer.
//!
//! Layout: for each of secret key, public key, relinearization key and
//! rotation keys, a presence byte (0 or 1) followed by the object when
//! present.

use super::gadget::GadgetCiphertext;
use super::public_key::{DecompressedQP, PublicKey};
use super::relin_key::RelinearizationKey;
use super::rotation_keys::RotationKeySet;
use super::secret_key::SecretKey;
use crate::bitstream::{WireReader, WireWrite};
use crate::codec::WireFormat;
use crate::errors::CodecResult;
use crate::params::Parameters;
use crate::sampling::SeedExpander;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBundle {
    pub secret_key: Option<SecretKey>,
    pub public_key: Option<PublicKey>,
    pub relinearization_key: Option<RelinearizationKey>,
    pub rotation_keys: Option<RotationKeySet>,
}

type DecompressedGadget = Vec<Vec<DecompressedQP>>;

/// Key material with every seeded mask regenerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecompressedKeys {
    pub secret_key: Option<SecretKey>,
    pub public_key: Option<DecompressedQP>,
    pub relinearization_key: Option<Vec<DecompressedGadget>>,
    pub rotation_keys: Option<BTreeMap<u64, DecompressedGadget>>,
}

fn write_optional<T: WireFormat>(
    value: Option<&T>,
    params: &Parameters,
    out: &mut Vec<u8>,
) -> CodecResult<()> {
    out.put_bool(value.is_some());
    match value {
        Some(v) => v.write_to(params, out),
        None => Ok(()),
    }
}

fn read_optional<T: WireFormat>(
    reader: &mut WireReader<'_>,
    field: &'static str,
) -> CodecResult<Option<T>> {
    if reader.read_bool(field)? {
        T::read_from(reader).map(Some)
    } else {
        Ok(None)
    }
}

fn optional_len<T: WireFormat>(value: Option<&T>, params: &Parameters) -> CodecResult<usize> {
    Ok(1 + value.map_or(Ok(0), |v| v.wire_len(params))?)
}

impl KeyBundle {
    #[instrument(skip_all)]
    pub fn decompress(
        &self,
        params: &Parameters,
        expander: &impl SeedExpander,
    ) -> CodecResult<DecompressedKeys> {
        let gadget = |key: &GadgetCiphertext| key.decompress(params, expander);

        let public_key = self
            .public_key
            .as_ref()
            .map(|pk| pk.decompress(params, expander))
            .transpose()?;
        let relinearization_key = self
            .relinearization_key
            .as_ref()
            .map(|rlk| rlk.keys.iter().map(gadget).collect::<CodecResult<Vec<_>>>())
            .transpose()?;
        let rotation_keys = self
            .rotation_keys
            .as_ref()
            .map(|set| {
                set.iter()
                    .map(|(g, key)| gadget(key).map(|d| (g, d)))
                    .collect::<CodecResult<BTreeMap<_, _>>>()
            })
            .transpose()?;

        debug!(
            public_key = public_key.is_some(),
            relinearization_keys = relinearization_key.as_ref().map_or(0, Vec::len),
            rotation_keys = rotation_keys.as_ref().map_or(0, BTreeMap::len),
            "decompressed key bundle"
        );
        Ok(DecompressedKeys {
            secret_key: self.secret_key.clone(),
            public_key,
            relinearization_key,
            rotation_keys,
        })
    }
}

impl WireFormat for KeyBundle {
    fn encode_into(&self, params: &Parameters, out: &mut Vec<u8>) -> CodecResult<()> {
        write_optional(self.secret_key.as_ref(), params, out)?;
        write_optional(self.public_key.as_ref(), params, out)?;
        write_optional(self.relinearization_key.as_ref(), params, out)?;
        write_optional(self.rotation_keys.as_ref(), params, out)
    }

    fn read_from(reader: &mut WireReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            secret_key: read_optional(reader, "secret key presence")?,
            public_key: read_optional(reader, "public key presence")?,
            relinearization_key: read_optional(reader, "relinearization key presence")?,
            rotation_keys: read_optional(reader, "rotation keys presence")?,
        })
    }

    fn wire_len(&self, params: &Parameters) -> CodecResult<usize> {
        Ok(optional_len(self.secret_key.as_ref(), params)?
            + optional_len(self.public_key.as_ref(), params)?
            + optional_len(self.relinearization_key.as_ref(), params)?
            + optional_len(self.rotation_keys.as_ref(), params)?)
    }
}
