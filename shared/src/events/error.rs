use thiserror::Error;

use tickstream_serde::SerdeErr;

use crate::types::{FrameId, NetId};

/// Errors that can occur while sending or receiving networked events
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventBusError {
    /// Event type declared twice
    #[error("Event type {type_name} is already declared on this bus")]
    DuplicateEventType { type_name: &'static str },

    /// Two event types declared with the same net id
    #[error("Net id {net_id} for event type {type_name} is already used by {existing}")]
    DuplicateNetId {
        net_id: NetId,
        type_name: &'static str,
        existing: &'static str,
    },

    /// Net id 0 is the unassigned sentinel
    #[error("Event type {type_name} cannot be declared with the unassigned net id 0")]
    UnassignedNetId { type_name: &'static str },

    /// Operation on a type that was never declared
    #[error("Event type {type_name} is not declared on this bus")]
    UndeclaredEvent { type_name: &'static str },

    /// A frame in an incoming event section has no readable sub-stream
    #[error("Event frame {frame_id} has no attached event stream: {source}")]
    MalformedEventStream {
        frame_id: FrameId,
        #[source]
        source: SerdeErr,
    },

    /// A frame in an incoming event section carries a zero-length sub-stream
    #[error("Event frame {frame_id} has an empty event stream")]
    EmptyEventStream { frame_id: FrameId },

    /// An incoming frame delta that points before frame 0 or is not readable
    #[error("Event section of packet for frame {frame_id} is malformed: {source}")]
    MalformedFrameSection {
        frame_id: FrameId,
        #[source]
        source: SerdeErr,
    },

    /// Serializer failure while sending
    #[error("Failed to serialize event: {0}")]
    Serde(#[from] SerdeErr),
}
