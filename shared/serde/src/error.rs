use thiserror::Error;

/// Errors that can occur while reading or writing bit-packed data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Reader ran past the end of its buffer
    #[error("Attempted to read past the end of the stream ({bit_limit} bits available). The payload is truncated or malformed")]
    EndOfStream { bit_limit: u32 },

    /// Value does not fit the bit width it is being encoded with
    #[error("Value {value} cannot be encoded in {bits} bits")]
    ValueOutOfRange { value: i128, bits: u8 },

    /// A length prefix claimed more bits than the reader has left
    #[error("Length prefix of {claimed_bits} bits exceeds the {remaining_bits} bits remaining in the stream")]
    LengthExceedsStream {
        claimed_bits: u32,
        remaining_bits: u32,
    },

    /// String payload was not valid UTF-8
    #[error("String payload is not valid UTF-8")]
    InvalidUtf8,

    /// An enum discriminant that no variant maps to
    #[error("Invalid discriminant {index} for {type_name}")]
    InvalidDiscriminant {
        index: u32,
        type_name: &'static str,
    },

    /// A user serializer rejected the value
    #[error("Serializer rejected value: {reason}")]
    Rejected { reason: String },
}

impl SerdeErr {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}
