use thiserror::Error;

use super::ChannelType;

/// Errors a peer transport can report back to the event layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Peer is no longer connected
    #[error("Peer is not connected. The transport dropped it before the send completed")]
    NotConnected,

    /// end_send or abort_send without a matching begin_send
    #[error("No send in progress. begin_send() must be called before end_send()")]
    NoSendInProgress,

    /// Payload is larger than the channel accepts
    #[error("Payload of {bytes} bytes exceeds the {limit} byte limit of the {channel:?} channel")]
    PayloadTooLarge {
        bytes: usize,
        limit: usize,
        channel: ChannelType,
    },
}
