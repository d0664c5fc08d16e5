//! # Tickstream Server
//! The authoritative side of the tickstream event transport. Owns the frame
//! clock and the event bus, writes every frame a peer has not acked into each
//! of its packets, and tracks the acks coming back.

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

mod error;
mod server;

pub use error::ServerError;
pub use server::{EventServer, ServerConfig};
