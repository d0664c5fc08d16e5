use std::collections::HashMap;

use log::{debug, info, warn};

use tickstream_shared::{
    BitReader, EventsMessage, FrameAckMessage, FrameId, FrameIdWire, MessageId, MessageIdWire,
    NetEventBus, Peer, ProtocolRegistry, Serde,
};

use crate::{ServerConfig, ServerError};

/// Server side of the event transport.
///
/// Each [`tick`](EventServer::tick) advances the frame, files the events sent
/// during the previous frame into history, and sends one event packet to each
/// ready peer holding every frame that peer has not acked yet.
pub struct EventServer<T: Peer> {
    config: ServerConfig,
    bus: NetEventBus<T::Key>,
    peers: HashMap<T::Key, T>,
    events_message_id: MessageId,
    frame_ack_message_id: MessageId,
    frame_id: FrameId,
}

impl<T: Peer> EventServer<T> {
    /// Create a new EventServer. `protocol` must be initialized and contain
    /// the built-in event messages.
    pub fn new(config: ServerConfig, protocol: &ProtocolRegistry) -> Result<Self, ServerError> {
        let events_message_id = protocol.try_id_of::<EventsMessage>()?;
        let frame_ack_message_id = protocol.try_id_of::<FrameAckMessage>()?;

        Ok(Self {
            bus: NetEventBus::new(config.event_bus.clone()),
            config,
            peers: HashMap::new(),
            events_message_id,
            frame_ack_message_id,
            frame_id: 0,
        })
    }

    pub fn bus(&self) -> &NetEventBus<T::Key> {
        &self.bus
    }

    /// Used to declare event types and register local listeners
    pub fn bus_mut(&mut self) -> &mut NetEventBus<T::Key> {
        &mut self.bus
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    // Peers

    /// Starts sending event frames to `peer`
    pub fn add_peer(&mut self, peer: T) {
        let key = peer.key();
        info!("adding event peer {:?}", key);
        self.bus.peer_connected(&key);
        self.peers.insert(key, peer);
    }

    /// Stops sending to the peer and drops everything kept for it
    pub fn remove_peer(&mut self, key: &T::Key) -> Option<T> {
        self.bus.peer_disconnected(key);
        let peer = self.peers.remove(key);
        if peer.is_some() {
            info!("removed event peer {:?}", key);
        }
        peer
    }

    pub fn peer(&self, key: &T::Key) -> Option<&T> {
        self.peers.get(key)
    }

    pub fn peer_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        self.peers.get_mut(key)
    }

    pub fn peer_keys(&self) -> Vec<T::Key> {
        self.peers.keys().cloned().collect()
    }

    pub fn peers_count(&self) -> usize {
        self.peers.len()
    }

    // Events

    /// Queues `event` for every peer, see [`NetEventBus::send`]
    pub fn send<E: 'static>(&mut self, event: &E) -> Result<(), ServerError> {
        self.bus.send(event)?;
        Ok(())
    }

    /// Queues `event` for a single peer, see [`NetEventBus::call_on_peer`]
    pub fn call_on_peer<E: 'static>(&mut self, event: &E, key: &T::Key) -> Result<(), ServerError> {
        if !self.peers.contains_key(key) {
            return Err(ServerError::UnknownPeer {
                peer: format!("{:?}", key),
            });
        }
        self.bus.call_on_peer(event, key)?;
        Ok(())
    }

    // Frame

    /// Advances the frame, files the events queued so far under it, and sends
    /// one event packet to every ready peer. Returns the new frame id.
    pub fn tick(&mut self) -> FrameId {
        self.frame_id += 1;
        let frame_id = self.frame_id;
        self.bus.on_update(frame_id);

        let mut peer_keys = self.peer_keys();

        // shuffle order of peers in order to avoid priority among them
        fastrand::shuffle(&mut peer_keys);

        for key in peer_keys {
            let Some(peer) = self.peers.get_mut(&key) else {
                continue;
            };
            if !peer.is_ready() {
                continue;
            }

            let writer = peer.begin_send(self.config.channel);
            MessageIdWire::new(self.events_message_id).ser(writer);
            FrameIdWire::new(frame_id).ser(writer);
            self.bus.append_to_frame(&key, writer, frame_id);

            if let Err(err) = peer.end_send() {
                warn!(
                    "Server Error: cannot send event frame {} to {:?}: {}",
                    frame_id, key, err
                );
            }
        }

        frame_id
    }

    // Acks

    /// Reads a frame ack packet from `key`
    pub fn receive_packet(&mut self, key: &T::Key, reader: &mut BitReader) -> Result<(), ServerError> {
        let message_id = MessageIdWire::de(reader)?.to_u16()?;
        if message_id != self.frame_ack_message_id {
            return Err(ServerError::UnexpectedMessage { message_id });
        }
        let acked_frame = FrameIdWire::de(reader)?.to_i32()?;
        self.receive_ack(key, acked_frame)
    }

    /// Records that `key` received every frame up to `acked_frame`. Acks from
    /// the future are ignored, and acks never move backwards.
    pub fn receive_ack(&mut self, key: &T::Key, acked_frame: FrameId) -> Result<(), ServerError> {
        if !self.peers.contains_key(key) {
            return Err(ServerError::UnknownPeer {
                peer: format!("{:?}", key),
            });
        }
        if acked_frame > self.frame_id {
            warn!(
                "Peer {:?} acked frame {} from the future, current frame is {}",
                key, acked_frame, self.frame_id
            );
            return Ok(());
        }

        let last_ack = self.bus.history().last_ack(key);
        if acked_frame <= last_ack {
            debug!(
                "Ignoring stale ack {} from {:?}, already at {}",
                acked_frame, key, last_ack
            );
            return Ok(());
        }
        self.bus.update_last_ack(key, acked_frame);
        Ok(())
    }
}
