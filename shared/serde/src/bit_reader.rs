use crate::error::SerdeErr;

/// Reads bits in the order a [`BitWriter`](crate::BitWriter) wrote them
#[derive(Clone, Debug)]
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_limit: u32,
    position: u32,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        let bit_limit = u32::try_from(buffer.len())
            .unwrap_or(u32::MAX / 8)
            .saturating_mul(8);
        Self::with_bit_limit(buffer, bit_limit)
    }

    /// Restricts reading to the first `bit_limit` bits of `buffer`
    pub fn with_bit_limit(buffer: &'b [u8], bit_limit: u32) -> Self {
        let max_bits = u32::try_from(buffer.len())
            .unwrap_or(u32::MAX / 8)
            .saturating_mul(8);
        Self {
            buffer,
            bit_limit: bit_limit.min(max_bits),
            position: 0,
        }
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn bit_limit(&self) -> u32 {
        self.bit_limit
    }

    pub fn bits_remaining(&self) -> u32 {
        self.bit_limit - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.bit_limit
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        if self.position >= self.bit_limit {
            return Err(SerdeErr::EndOfStream {
                bit_limit: self.bit_limit,
            });
        }
        let byte = self.buffer[(self.position / 8) as usize];
        let bit = (byte >> (self.position % 8)) & 1 != 0;
        self.position += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Reads `bits` bits into the low end of a u64, least significant bit first
    pub fn read_bits(&mut self, bits: u8) -> Result<u64, SerdeErr> {
        if bits as u32 > self.bits_remaining() {
            return Err(SerdeErr::EndOfStream {
                bit_limit: self.bit_limit,
            });
        }
        let mut output: u64 = 0;
        for index in 0..bits {
            if self.read_bit()? {
                output |= 1u64 << index;
            }
        }
        Ok(output)
    }
}
