use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde};

/// A signed integer in `-1 ..= 2^LARGE - 2`, biased by one so that `-1`
/// encodes as zero.
///
/// Wire form is a single tier bit followed by either `SMALL` or `LARGE` payload
/// bits, least significant bit first:
///
/// ```text
/// 0 | SMALL bits of (value + 1)     when value + 1 < 2^SMALL
/// 1 | LARGE bits of (value + 1)     otherwise
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct TieredInteger<const SMALL: u8, const LARGE: u8> {
    value: i32,
}

impl<const SMALL: u8, const LARGE: u8> TieredInteger<SMALL, LARGE> {
    pub const MIN: i32 = -1;
    pub const MAX: i32 = (1 << LARGE) - 2;

    /// # Panics
    /// Panics if `value` is outside `MIN ..= MAX`
    pub fn new(value: i32) -> Self {
        match Self::try_new(value) {
            Ok(integer) => integer,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_new(value: i32) -> Result<Self, SerdeErr> {
        if Self::fits(value) {
            Ok(Self { value })
        } else {
            Err(SerdeErr::ValueOutOfRange {
                value: value as i128,
                bits: LARGE,
            })
        }
    }

    pub fn fits(value: i32) -> bool {
        (Self::MIN..=Self::MAX).contains(&value)
    }

    pub fn get(&self) -> i32 {
        self.value
    }

    fn encoded(&self) -> u64 {
        (self.value + 1) as u64
    }

    fn is_small(&self) -> bool {
        self.encoded() < (1 << SMALL)
    }
}

impl<const SMALL: u8, const LARGE: u8> Serde for TieredInteger<SMALL, LARGE> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        if self.is_small() {
            writer.write_bit(false);
            writer.write_bits(self.encoded(), SMALL);
        } else {
            writer.write_bit(true);
            writer.write_bits(self.encoded(), LARGE);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let large = reader.read_bit()?;
        let encoded = if large {
            reader.read_bits(LARGE)?
        } else {
            reader.read_bits(SMALL)?
        };
        Ok(Self {
            value: encoded as i32 - 1,
        })
    }

    fn bit_length(&self) -> u32 {
        let payload_bits = if self.is_small() { SMALL } else { LARGE };
        1 + payload_bits as u32
    }
}
