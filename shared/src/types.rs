use tickstream_serde::{TieredInteger, UnsignedVariableInteger};

use crate::constants::{EVENT_BITS_LARGE, EVENT_BITS_SMALL};

/// Authoritative simulation frame, incremented once per server tick
pub type FrameId = i32;
/// Wire id of a networked event type
pub type NetId = u16;
/// Wire id of a top-level protocol message
pub type MessageId = u16;

/// Distance from a packet's base frame back to an event frame, `-1` terminates
pub type FrameDelta = TieredInteger<EVENT_BITS_SMALL, EVENT_BITS_LARGE>;
/// Encoding for net ids inside event streams
pub type NetIdWire = UnsignedVariableInteger<7>;
/// Encoding for message ids at the head of a packet
pub type MessageIdWire = UnsignedVariableInteger<7>;
/// Encoding for absolute frame ids in packet headers and acks
pub type FrameIdWire = UnsignedVariableInteger<7>;
