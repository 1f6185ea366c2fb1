//! Bit-exact wire format for RLWE ciphertexts and key material.
//!
//! Residues are packed at the bit length of their modulus with no padding
//! between values. Every object carries its own ring size, levels and
//! bit-length tables, so any buffer decodes without [`Parameters`].
//!
//! ```
//! use rlwe_wire::{Ciphertext, Parameters, Poly, WireFormat};
//!
//! let params = Parameters::builder()
//!     .ring_degree(8)
//!     .q_moduli(&[17])
//!     .build()?;
//! let poly = Poly::from_limbs(vec![vec![1, 2, 3, 4, 5, 6, 7, 8]])?;
//! let ct = Ciphertext::new(vec![poly.clone(), poly])?;
//!
//! let bytes = ct.to_bytes(&params)?;
//! assert_eq!(Ciphertext::from_bytes(&bytes)?, ct);
//! # Ok::<(), rlwe_wire::CodecError>(())
//! ```
pub mod bitstream;
pub mod ciphertext;
pub mod codec;
pub mod errors;
pub mod keys;
pub mod math;
pub mod params;
pub mod poly;
pub mod sampling;

pub use bitstream::{BitReader, BitWriter, WireReader, WireWrite};
pub use ciphertext::{
    Ciphertext, CompressedCiphertext, ScaledCiphertext, ScaledCompressedCiphertext,
};
pub use codec::{WireFormat, decode_poly, encode_poly, poly_wire_len};
pub use errors::{CodecError, CodecResult};
pub use keys::{
    CiphertextQP, DecompressedKeys, DecompressedQP, GadgetCiphertext, KeyBundle, PublicKey,
    RelinearizationKey, RotationKeySet, SecretKey, SwitchingKey,
};
pub use params::{ModulusChain, Parameters, ParametersBuilder};
pub use poly::{Poly, PolyQP};
pub use sampling::{ChaChaExpander, SEED_LEN, Seed, SeedExpander};
