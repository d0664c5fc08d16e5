use log::{trace, warn};

use tickstream_shared::{
    BitReader, BitWrite, EventsMessage, FrameAckMessage, FrameId, FrameIdWire, ListenerId,
    MessageId, MessageIdWire, NetEventBus, Peer, ProtocolRegistry, Serde, NO_ACK,
};

use crate::{ClientConfig, ClientError};

/// Client side of the event transport.
///
/// Feed every event packet from the server to
/// [`receive_packet`](EventClient::receive_packet), call
/// [`replay`](EventClient::replay) with the frame the simulation has reached,
/// and send [`write_ack`](EventClient::write_ack) back each tick.
pub struct EventClient {
    config: ClientConfig,
    bus: NetEventBus<()>,
    events_message_id: MessageId,
    frame_ack_message_id: MessageId,
    last_received_frame: FrameId,
    replayed_through: FrameId,
}

impl EventClient {
    /// Create a new EventClient. `protocol` must be initialized and contain
    /// the built-in event messages.
    pub fn new(config: ClientConfig, protocol: &ProtocolRegistry) -> Result<Self, ClientError> {
        let events_message_id = protocol.try_id_of::<EventsMessage>()?;
        let frame_ack_message_id = protocol.try_id_of::<FrameAckMessage>()?;

        Ok(Self {
            bus: NetEventBus::new(config.event_bus.clone()),
            config,
            events_message_id,
            frame_ack_message_id,
            last_received_frame: NO_ACK,
            replayed_through: NO_ACK,
        })
    }

    pub fn bus(&self) -> &NetEventBus<()> {
        &self.bus
    }

    /// Used to declare event types
    pub fn bus_mut(&mut self) -> &mut NetEventBus<()> {
        &mut self.bus
    }

    pub fn register<E: 'static>(&mut self, listener: impl FnMut(&E) + 'static) -> Option<ListenerId> {
        self.bus.register(listener)
    }

    pub fn unregister<E: 'static>(&mut self, listener_id: ListenerId) -> bool {
        self.bus.unregister::<E>(listener_id)
    }

    // Receiving

    /// Reads an event packet and files its frames for replay. Returns the
    /// packet's base frame.
    ///
    /// An error here means the stream is out of sync with the server and the
    /// connection should be dropped.
    pub fn receive_packet(&mut self, reader: &mut BitReader) -> Result<FrameId, ClientError> {
        let message_id = MessageIdWire::de(reader)?.to_u16()?;
        if message_id != self.events_message_id {
            return Err(ClientError::UnexpectedMessage { message_id });
        }
        let base_frame = FrameIdWire::de(reader)?.to_i32()?;
        let frames_read = self.bus.process_events_from_server(reader, base_frame)?;

        if base_frame > self.last_received_frame {
            self.last_received_frame = base_frame;
        }
        trace!("Received {} event frames with base {}", frames_read, base_frame);
        Ok(base_frame)
    }

    /// Runs the listeners of every received event up to `target_frame_id` that
    /// has not run yet. Returns the number of frames replayed.
    pub fn replay(&mut self, target_frame_id: FrameId) -> usize {
        let frames_replayed = self.bus.ensure_events_replayed(target_frame_id);
        if target_frame_id > self.replayed_through {
            self.replayed_through = target_frame_id;
        }
        frames_replayed
    }

    // Acks

    /// Frame to report to the server: the newest frame that was both received
    /// and replayed. Frames after it keep being resent, so nothing is dropped
    /// before it had a chance to replay.
    pub fn ack_frame(&self) -> FrameId {
        self.last_received_frame.min(self.replayed_through)
    }

    pub fn last_received_frame(&self) -> FrameId {
        self.last_received_frame
    }

    /// Writes a frame ack message. Returns false, writing nothing, while there
    /// is nothing to ack yet.
    pub fn write_ack(&self, writer: &mut dyn BitWrite) -> bool {
        let ack_frame = self.ack_frame();
        if ack_frame == NO_ACK {
            return false;
        }
        MessageIdWire::new(self.frame_ack_message_id).ser(writer);
        FrameIdWire::new(ack_frame).ser(writer);
        true
    }

    /// Sends a frame ack to the server over `peer`. Returns whether one was
    /// sent.
    pub fn send_ack<T: Peer>(&self, peer: &mut T) -> Result<bool, ClientError> {
        if self.ack_frame() == NO_ACK {
            return Ok(false);
        }
        let writer = peer.begin_send(self.config.ack_channel);
        self.write_ack(writer);
        if let Err(err) = peer.end_send() {
            warn!("Client Error: cannot send frame ack {}: {}", self.ack_frame(), err);
            return Err(err.into());
        }
        Ok(true)
    }
}
