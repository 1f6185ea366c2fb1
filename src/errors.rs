use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error(
        "truncated input while reading {field}: needed {needed} bytes, {remaining} remaining"
    )]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("malformed header: {message}")]
    MalformedHeader { message: String },
    #[error("{count} trailing bytes after decoded object")]
    TrailingBytes { count: usize },

    #[error("value {value} does not fit in {bit_length} bits")]
    ValueTooWide { value: u64, bit_length: u8 },
    #[error("bit length {bit_length} outside 1..=64")]
    InvalidBitLength { bit_length: u8 },
    #[error("drop bits {drop_bits} must be smaller than bit length {bit_length}")]
    DropBitsTooLarge { drop_bits: u8, bit_length: u8 },
    #[error("drop bits {drop_bits} requested at level {level}, only level 0 can drop bits")]
    DropBitsAboveLevelZero { drop_bits: u8, level: usize },
    #[error("got {actual} drop-bits values for {expected} ciphertext components")]
    DropBitsCountMismatch { expected: usize, actual: usize },

    #[error("{field} = {value} does not fit in its wire field (max {max})")]
    HeaderOverflow {
        field: &'static str,
        value: usize,
        max: usize,
    },
    #[error("ring degree mismatch: expected {expected}, got {actual}")]
    RingDegreeMismatch { expected: usize, actual: usize },
    #[error("level mismatch: expected {expected}, got {actual}")]
    LevelMismatch { expected: usize, actual: usize },
    #[error("level {level} exceeds modulus chain of length {chain_len}")]
    LevelOutOfChain { level: usize, chain_len: usize },
    #[error("parameters have no auxiliary P chain")]
    MissingAuxiliaryChain,
    #[error("object has no components")]
    EmptyObject,
    #[error("limb {limb} has {actual} coefficients, expected {expected}")]
    RaggedLimbs {
        limb: usize,
        expected: usize,
        actual: usize,
    },
    #[error("gadget row {row} has {actual} splits, expected {expected}")]
    RaggedGadget {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate Galois element {element} in rotation key set")]
    DuplicateGaloisElement { element: u64 },

    #[error("invalid parameters: {message}")]
    InvalidParameters { message: String },
    #[error("modulus {modulus} is not an odd prime")]
    InvalidModulus { modulus: u64 },
}

pub type CodecResult<T> = Result<T, CodecError>;

impl CodecError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            message: message.into(),
        }
    }
}
