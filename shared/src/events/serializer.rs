use std::marker::PhantomData;

use tickstream_serde::{BitReader, BitWrite, Serde, SerdeErr};

/// Writes and reads the payload of one event type.
///
/// A failed `serialize` may leave partial bits in the writer, the bus rolls
/// them back.
pub trait EventSerializer<T>: 'static {
    fn serialize(&self, event: &T, writer: &mut dyn BitWrite) -> Result<(), SerdeErr>;
    fn deserialize(&self, reader: &mut BitReader) -> Result<T, SerdeErr>;
}

/// Serializer for any event that implements [`Serde`]
pub struct SerdeSerializer<T> {
    phantom_t: PhantomData<fn() -> T>,
}

impl<T> SerdeSerializer<T> {
    pub fn new() -> Self {
        Self {
            phantom_t: PhantomData,
        }
    }
}

impl<T> Default for SerdeSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serde + 'static> EventSerializer<T> for SerdeSerializer<T> {
    fn serialize(&self, event: &T, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        event.ser(writer);
        Ok(())
    }

    fn deserialize(&self, reader: &mut BitReader) -> Result<T, SerdeErr> {
        T::de(reader)
    }
}
