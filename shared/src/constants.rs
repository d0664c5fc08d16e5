use crate::types::{FrameId, MessageId, NetId};

/// Payload bits of the short form of a frame delta
pub const EVENT_BITS_SMALL: u8 = 4;
/// Payload bits of the long form of a frame delta
pub const EVENT_BITS_LARGE: u8 = 10;
/// Frame delta that terminates the event section of a frame
pub const FRAME_DELTA_SENTINEL: FrameId = -1;

/// Last ack reported for a peer that has never acked anything
pub const NO_ACK: FrameId = -1;

/// Entries retained regardless of acks. With one entry per frame, the oldest
/// retained frame is still within the largest encodable frame delta.
pub const DEFAULT_OVERFLOW_LIMIT: usize = (1 << EVENT_BITS_LARGE) - 1;
/// Trims larger than this are logged as a lag symptom
pub const LARGE_TRIM_WARNING: usize = 500;
/// Initial byte capacity of per-tick and per-peer event streams
pub const EVENT_STREAM_INITIAL_SIZE: usize = 1024;

/// Event net id that means "no id assigned"
pub const UNASSIGNED_NET_ID: NetId = 0;
/// Message id that means "not yet initialized"
pub const UNASSIGNED_MESSAGE_ID: MessageId = 0;
/// Message ids below this are reserved
pub const FIRST_PROTOCOL_ID: MessageId = 2;
