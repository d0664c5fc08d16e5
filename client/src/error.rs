use thiserror::Error;

use tickstream_shared::{EventBusError, MessageId, ProtocolError, SerdeErr, TransportError};

/// Errors that can occur while running an EventClient
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The protocol registry is missing the event messages
    #[error("Client protocol is not usable: {0}")]
    Protocol(#[from] ProtocolError),

    /// The event section of a packet is malformed. The connection is out of sync
    #[error(transparent)]
    EventBus(#[from] EventBusError),

    /// Packet header could not be read
    #[error("Failed to read incoming packet: {0}")]
    Serde(#[from] SerdeErr),

    /// Sending the ack failed
    #[error("Failed to send frame ack: {0}")]
    Transport(#[from] TransportError),

    /// Incoming packet is not an event frame
    #[error("Expected an event frame, received message id {message_id}")]
    UnexpectedMessage { message_id: MessageId },
}
