use crate::{
    bit_reader::BitReader,
    bit_writer::{BitCounter, BitWrite},
    error::SerdeErr,
};

/// A type that can be bit-packed onto a stream and read back
pub trait Serde: Sized + Clone + PartialEq {
    /// Encodes the value into the writer
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Decodes a value from the reader
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` will produce for this value
    fn bit_length(&self) -> u32 {
        let mut counter = BitCounter::new();
        self.ser(&mut counter);
        counter.bits_needed()
    }
}

/// Implemented by types that always serialize to the same number of bits
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}
