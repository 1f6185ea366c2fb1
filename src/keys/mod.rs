pub mod bundle;
pub mod gadget;
pub mod public_key;
pub mod relin_key;
pub mod rotation_keys;
pub mod secret_key;

pub use bundle::{DecompressedKeys, KeyBundle};
pub use gadget::{GadgetCiphertext, SwitchingKey};
pub use public_key::{CiphertextQP, DecompressedQP, PublicKey};
pub use relin_key::RelinearizationKey;
pub use rotation_keys::RotationKeySet;
pub use secret_key::SecretKey;
