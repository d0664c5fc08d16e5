use thiserror::Error;

use tickstream_shared::{EventBusError, MessageId, ProtocolError, SerdeErr};

/// Errors that can occur while running an EventServer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// The protocol registry is missing the event messages
    #[error("Server protocol is not usable: {0}")]
    Protocol(#[from] ProtocolError),

    /// Event declaration or send failed
    #[error(transparent)]
    EventBus(#[from] EventBusError),

    /// Incoming packet could not be read
    #[error("Failed to read incoming packet: {0}")]
    Serde(#[from] SerdeErr),

    /// Incoming packet is not a frame ack
    #[error("Expected a frame ack, received message id {message_id}")]
    UnexpectedMessage { message_id: MessageId },

    /// Packet or ack from a peer that was never added, or already removed
    #[error("Peer {peer} is not connected to this server")]
    UnknownPeer { peer: String },
}
