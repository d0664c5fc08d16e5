//! # Tickstream Shared
//! Common functionality shared between tickstream-server & tickstream-client
//! crates: the frame-indexed event history, the networked event bus, and the
//! protocol id registries.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use tickstream_serde::{
    BitCounter, BitReader, BitStream, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr,
    SignedInteger, SignedVariableInteger, TieredInteger, UnsignedInteger,
    UnsignedVariableInteger,
};

mod config;
mod constants;
mod events;
mod protocol;
mod transport;
mod types;

pub use config::{EventBusConfig, EventHistoryConfig};
pub use constants::{
    DEFAULT_OVERFLOW_LIMIT, EVENT_BITS_LARGE, EVENT_BITS_SMALL, EVENT_STREAM_INITIAL_SIZE,
    FIRST_PROTOCOL_ID, FRAME_DELTA_SENTINEL, LARGE_TRIM_WARNING, NO_ACK, UNASSIGNED_MESSAGE_ID,
    UNASSIGNED_NET_ID,
};
pub use events::{
    EventBusError, EventHistory, EventSerializer, ListenerId, NetEventBus, SerdeSerializer,
};
pub use protocol::{
    describe_event_ids, resolve_event_ids, validate_event_ids, EventTypes, EventsMessage,
    FrameAckMessage, NetEventIds, NoOverrides, ProtocolError, ProtocolMessage, ProtocolRegistry,
    ResolvedEventId,
};
pub use transport::{ChannelType, Peer, TransportError};
pub use types::{FrameDelta, FrameId, FrameIdWire, MessageId, MessageIdWire, NetId, NetIdWire};
