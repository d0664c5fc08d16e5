use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, integer::UnsignedVariableInteger,
    serde::Serde, ConstBitLength,
};

// Unit

impl Serde for () {
    fn ser(&self, _: &mut dyn BitWrite) {}

    fn de(_: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(())
    }
}

impl ConstBitLength for () {
    fn const_bit_length() -> u32 {
        0
    }
}

// Bool

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

// Fixed width numbers

macro_rules! impl_serde_unsigned {
    ($t:ty, $bits:expr) => {
        #[allow(trivial_numeric_casts)]
        impl Serde for $t {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_bits(*self as u64, $bits);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                Ok(reader.read_bits($bits)? as $t)
            }
        }

        impl ConstBitLength for $t {
            fn const_bit_length() -> u32 {
                $bits
            }
        }
    };
}

macro_rules! impl_serde_signed {
    ($t:ty, $u:ty, $bits:expr) => {
        #[allow(trivial_numeric_casts)]
        impl Serde for $t {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_bits(*self as $u as u64, $bits);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                Ok(reader.read_bits($bits)? as $u as $t)
            }
        }

        impl ConstBitLength for $t {
            fn const_bit_length() -> u32 {
                $bits
            }
        }
    };
}

impl_serde_unsigned!(u8, 8);
impl_serde_unsigned!(u16, 16);
impl_serde_unsigned!(u32, 32);
impl_serde_unsigned!(u64, 64);
impl_serde_signed!(i8, u8, 8);
impl_serde_signed!(i16, u16, 16);
impl_serde_signed!(i32, u32, 32);
impl_serde_signed!(i64, u64, 64);

impl Serde for f32 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.to_bits().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(f32::from_bits(u32::de(reader)?))
    }
}

impl ConstBitLength for f32 {
    fn const_bit_length() -> u32 {
        32
    }
}

impl Serde for f64 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.to_bits().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(f64::from_bits(u64::de(reader)?))
    }
}

impl ConstBitLength for f64 {
    fn const_bit_length() -> u32 {
        64
    }
}

// Containers

type LengthPrefix = UnsignedVariableInteger<5>;

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        LengthPrefix::new(self.len() as u64).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length: usize = LengthPrefix::de(reader)?.to_usize()?;
        // each element costs at least one bit unless it is zero-sized, so this
        // bounds the allocation by what the stream could possibly hold
        let mut output = Vec::with_capacity(length.min(reader.bits_remaining() as usize));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let bytes = self.as_bytes();
        LengthPrefix::new(bytes.len() as u64).ser(writer);
        for byte in bytes {
            writer.write_byte(*byte);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = LengthPrefix::de(reader)?.to_usize()?;
        let remaining = reader.bits_remaining();
        if length as u64 * 8 > remaining as u64 {
            return Err(SerdeErr::LengthExceedsStream {
                claimed_bits: u32::try_from(length.saturating_mul(8)).unwrap_or(u32::MAX),
                remaining_bits: remaining,
            });
        }
        let mut bytes = Vec::with_capacity(length);
        for _ in 0..length {
            bytes.push(reader.read_byte()?);
        }
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidUtf8)
    }
}
