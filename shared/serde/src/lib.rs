//! # Tickstream Serde
//! Bit-level serialization for the tickstream event transport: a growable
//! writer that supports rollback, a bounded reader, owned nestable streams,
//! and the integer encodings used on the wire.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_stream;
mod bit_writer;
mod error;
mod impls;
mod integer;
mod serde;
mod tiered_integer;

pub use bit_reader::BitReader;
pub use bit_stream::BitStream;
pub use bit_writer::{BitCounter, BitWrite, BitWriter};
pub use error::SerdeErr;
pub use integer::{
    SerdeInteger, SignedInteger, SignedVariableInteger, UnsignedInteger, UnsignedVariableInteger,
};
pub use serde::{ConstBitLength, Serde};
pub use tiered_integer::TieredInteger;
