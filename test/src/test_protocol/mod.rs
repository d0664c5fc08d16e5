use std::{fmt::Debug, hash::Hash};

use tickstream_shared::{
    BitReader, BitWrite, EventSerializer, EventTypes, ProtocolRegistry, Serde, SerdeErr,
    SerdeSerializer, UnsignedVariableInteger,
};

/// A unit appeared on the map
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnUnit {
    pub unit_id: u32,
    pub x: i16,
    pub y: i16,
}

impl Serde for SpawnUnit {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.unit_id).ser(writer);
        self.x.ser(writer);
        self.y.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            unit_id: UnsignedVariableInteger::<7>::de(reader)?.to_u32()?,
            x: i16::de(reader)?,
            y: i16::de(reader)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: u16,
    pub text: String,
}

impl Serde for ChatMessage {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.sender.ser(writer);
        self.text.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            sender: u16::de(reader)?,
            text: String::de(reader)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundStarted {
    pub round: u16,
}

impl Serde for RoundStarted {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.round.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            round: u16::de(reader)?,
        })
    }
}

/// Damage amount that only serializes up to [`MAX_DAMAGE`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Damage {
    pub amount: u16,
}

pub const MAX_DAMAGE: u16 = 1000;

/// Writes the amount before checking it, so a rejected value leaves partial
/// bits behind for the bus to roll back
pub struct DamageSerializer;

impl EventSerializer<Damage> for DamageSerializer {
    fn serialize(&self, event: &Damage, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        event.amount.ser(writer);
        if event.amount > MAX_DAMAGE {
            return Err(SerdeErr::rejected(format!(
                "damage {} is above {}",
                event.amount, MAX_DAMAGE
            )));
        }
        Ok(())
    }

    fn deserialize(&self, reader: &mut BitReader) -> Result<Damage, SerdeErr> {
        Ok(Damage {
            amount: u16::de(reader)?,
        })
    }
}

/// Message protocol shared by the test server and clients
pub fn protocol() -> ProtocolRegistry {
    let mut protocol = ProtocolRegistry::with_builtin_messages();
    protocol
        .add_message("tickstream_test::snapshot")
        .retire_message("tickstream_test::legacy_chat")
        .add_message("tickstream_test::input");
    protocol.init();
    protocol
}

/// Every networked event type of the test application
pub fn event_types<P: Eq + Hash + Clone + Debug + 'static>() -> EventTypes<P> {
    let mut event_types = EventTypes::new();
    event_types
        .add::<SpawnUnit>(SerdeSerializer::new())
        .add::<ChatMessage>(SerdeSerializer::new())
        .add::<RoundStarted>(SerdeSerializer::new())
        .add::<Damage>(DamageSerializer);
    event_types
}
