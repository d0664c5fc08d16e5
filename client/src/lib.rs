//! # Tickstream Client
//! The receiving side of the tickstream event transport. Reads event frames
//! from the server, acknowledges them, and replays every received event
//! exactly once, in frame order.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tickstream_shared::{
        BitReader, BitWrite, BitWriter, ChannelType, EventSerializer, EventTypes, FrameId,
        ListenerId, NetEventIds, NoOverrides, Peer, ProtocolRegistry, SerdeErr,
        SerdeSerializer, TransportError,
    };
}

mod client;
mod error;

pub use client::{ClientConfig, EventClient};
pub use error::ClientError;
