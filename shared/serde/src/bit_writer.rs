use crate::bit_stream::BitStream;

pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);
    fn write_byte(&mut self, byte: u8);

    /// Writes the lowest `bits` bits of `value`, least significant bit first
    fn write_bits(&mut self, mut value: u64, bits: u8) {
        for _ in 0..bits {
            self.write_bit(value & 1 != 0);
            value >>= 1;
        }
    }
}

/// A growable bit buffer. Unlike a packet writer it has no MTU cap, and it can
/// be truncated back to an earlier bit position, which is what makes
/// write-then-rollback possible for event payloads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitWriter {
    buffer: Vec<u8>,
    bits_written: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a writer with room for `bytes` bytes before reallocating
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(bytes),
            bits_written: 0,
        }
    }

    pub fn bits_written(&self) -> u32 {
        self.bits_written
    }

    pub fn is_empty(&self) -> bool {
        self.bits_written == 0
    }

    /// Discards every bit written after `bit_position`.
    /// Positions at or past the current length are ignored.
    pub fn truncate(&mut self, bit_position: u32) {
        if bit_position >= self.bits_written {
            return;
        }

        let byte_len = bit_position.div_ceil(8) as usize;
        self.buffer.truncate(byte_len);

        let used_bits = bit_position % 8;
        if used_bits != 0 {
            if let Some(last) = self.buffer.last_mut() {
                *last &= (1u8 << used_bits) - 1;
            }
        }

        self.bits_written = bit_position;
    }

    /// Empties the writer but keeps its allocation
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.bits_written = 0;
    }

    /// Freezes the written bits into an owned, readable stream
    pub fn into_stream(self) -> BitStream {
        BitStream::from_parts(self.buffer, self.bits_written)
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        let offset = self.bits_written % 8;
        if offset == 0 {
            self.buffer.push(0);
        }
        if bit {
            if let Some(last) = self.buffer.last_mut() {
                *last |= 1u8 << offset;
            }
        }
        self.bits_written += 1;
    }

    fn write_byte(&mut self, byte: u8) {
        self.write_bits(byte as u64, 8);
    }
}

/// Counts bits without storing them
#[derive(Clone, Copy, Debug, Default)]
pub struct BitCounter {
    bits: u32,
}

impl BitCounter {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn bits_needed(&self) -> u32 {
        self.bits
    }
}

impl BitWrite for BitCounter {
    fn write_bit(&mut self, _: bool) {
        self.bits += 1;
    }

    fn write_byte(&mut self, _: u8) {
        self.bits += 8;
    }

    fn write_bits(&mut self, _: u64, bits: u8) {
        self.bits += bits as u32;
    }
}
