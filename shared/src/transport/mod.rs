use std::{fmt::Debug, hash::Hash};

use tickstream_serde::BitWriter;

pub mod error;
pub use error::TransportError;

/// Delivery guarantee requested for an outgoing packet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelType {
    Reliable,
    Unreliable,
}

/// One remote endpoint of an already-established connection.
///
/// The event layer only ever writes whole packets through this interface:
/// `begin_send`, fill the writer, then `end_send` (or `abort_send` to drop it).
/// Event frames are tolerant of loss on their own, so they can travel over
/// either channel.
pub trait Peer {
    /// Key identifying this peer in ack and per-peer bookkeeping
    type Key: Eq + Hash + Clone + Debug;

    fn key(&self) -> Self::Key;

    /// Whether the peer should receive frames this tick
    fn is_ready(&self) -> bool {
        true
    }

    /// Starts a new outgoing packet and returns the writer for it
    fn begin_send(&mut self, channel: ChannelType) -> &mut BitWriter;

    /// Hands the packet started by `begin_send` to the transport
    fn end_send(&mut self) -> Result<(), TransportError>;

    /// Drops the packet started by `begin_send`
    fn abort_send(&mut self);
}
