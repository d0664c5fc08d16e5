use crate::{
    bit_reader::BitReader,
    bit_writer::{BitWrite, BitWriter},
    error::SerdeErr,
    integer::UnsignedVariableInteger,
    serde::Serde,
};

type BitLengthPrefix = UnsignedVariableInteger<7>;

/// An owned, immutable run of bits with an exact length.
///
/// Streams are what a [`BitWriter`] turns into once it is done being written
/// to. Each call to [`reader`](BitStream::reader) starts from bit zero, so
/// the same stream can be read any number of times.
///
/// On the wire a stream is its bit length as a variable integer followed by
/// the bits themselves, so streams can nest inside other streams.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitStream {
    buffer: Vec<u8>,
    bit_length: u32,
}

impl BitStream {
    pub(crate) fn from_parts(buffer: Vec<u8>, bit_length: u32) -> Self {
        Self { buffer, bit_length }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }

    pub fn is_empty(&self) -> bool {
        self.bit_length == 0
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn reader(&self) -> BitReader<'_> {
        BitReader::with_bit_limit(&self.buffer, self.bit_length)
    }

    /// Writes the raw bits of this stream, without a length prefix
    pub fn write_bits_to(&self, writer: &mut dyn BitWrite) {
        let mut reader = self.reader();
        while let Ok(bit) = reader.read_bit() {
            writer.write_bit(bit);
        }
    }

    /// A new stream holding the bits of `self` followed by the bits of `other`
    pub fn concat(&self, other: &BitStream) -> BitStream {
        let total_bits = self.bit_length + other.bit_length;
        let mut writer = BitWriter::with_capacity(total_bits.div_ceil(8) as usize);
        self.write_bits_to(&mut writer);
        other.write_bits_to(&mut writer);
        writer.into_stream()
    }
}

impl Serde for BitStream {
    fn ser(&self, writer: &mut dyn BitWrite) {
        BitLengthPrefix::new(self.bit_length).ser(writer);
        self.write_bits_to(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let bit_length = BitLengthPrefix::de(reader)?.to_u32()?;
        let remaining_bits = reader.bits_remaining();
        if bit_length > remaining_bits {
            return Err(SerdeErr::LengthExceedsStream {
                claimed_bits: bit_length,
                remaining_bits,
            });
        }

        let mut writer = BitWriter::with_capacity(bit_length.div_ceil(8) as usize);
        for _ in 0..bit_length {
            writer.write_bit(reader.read_bit()?);
        }
        Ok(writer.into_stream())
    }
}
