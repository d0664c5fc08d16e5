use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    mem,
    panic::{catch_unwind, AssertUnwindSafe},
};

use log::{error, trace, warn};
use thiserror::Error;

use tickstream_serde::{BitReader, BitStream, BitWrite, BitWriter, Serde, SerdeErr};

use crate::{
    config::EventBusConfig,
    constants::{FRAME_DELTA_SENTINEL, NO_ACK, UNASSIGNED_NET_ID},
    events::{EventBusError, EventHistory, EventSerializer},
    types::{FrameDelta, FrameId, NetId, NetIdWire},
};

/// Handle returned by [`NetEventBus::register`], used to unregister the
/// listener again
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

struct EventEntry<T: 'static> {
    net_id: NetId,
    serializer: Box<dyn EventSerializer<T>>,
    listeners: Vec<(ListenerId, Listener<T>)>,
}

impl<T: 'static> EventEntry<T> {
    /// Writes net id and payload. On failure the writer is truncated back to
    /// where it was.
    fn write(&self, event: &T, writer: &mut BitWriter) -> Result<(), SerdeErr> {
        let start = writer.bits_written();
        NetIdWire::new(self.net_id).ser(writer);
        if let Err(err) = self.serializer.serialize(event, writer) {
            writer.truncate(start);
            return Err(err);
        }
        Ok(())
    }
}

trait ErasedEvent {
    fn type_name(&self) -> &'static str;
    fn net_id(&self) -> NetId;
    fn listener_count(&self) -> usize;
    /// Decodes one payload and hands it to every listener
    fn call_from_network(&mut self, reader: &mut BitReader) -> Result<(), SerdeErr>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedEvent for EventEntry<T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn net_id(&self) -> NetId {
        self.net_id
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn call_from_network(&mut self, reader: &mut BitReader) -> Result<(), SerdeErr> {
        let event = self.serializer.deserialize(reader)?;
        for (listener_id, listener) in self.listeners.iter_mut() {
            let result = catch_unwind(AssertUnwindSafe(|| listener(&event)));
            if let Err(panic) = result {
                error!(
                    "Listener {:?} for {} panicked: {}",
                    listener_id,
                    type_name::<T>(),
                    panic_message(panic.as_ref())
                );
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Typed events layered on top of an [`EventHistory`].
///
/// The server side collects everything sent during a tick into one stream,
/// files it under the tick's frame id in [`on_update`](Self::on_update), and
/// writes every frame a peer has not acked yet into each outgoing packet with
/// [`append_to_frame`](Self::append_to_frame). The client side reads those
/// sections back with
/// [`process_events_from_server`](Self::process_events_from_server) and runs
/// the listeners exactly once per frame in
/// [`ensure_events_replayed`](Self::ensure_events_replayed).
///
/// `P` is the key that identifies a peer. A client has a single remote, the
/// server, and uses `()`.
pub struct NetEventBus<P: Eq + Hash + Clone + Debug> {
    config: EventBusConfig,
    history: EventHistory<P>,
    current_stream: BitWriter,
    current_frame_id: FrameId,
    events: HashMap<TypeId, Box<dyn ErasedEvent>>,
    type_ids: HashMap<NetId, TypeId>,
    next_listener_id: u64,
}

impl<P: Eq + Hash + Clone + Debug> Default for NetEventBus<P> {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

impl<P: Eq + Hash + Clone + Debug> NetEventBus<P> {
    pub fn new(config: EventBusConfig) -> Self {
        let history = EventHistory::new(config.history.clone());
        let current_stream = BitWriter::with_capacity(config.stream_initial_capacity);
        Self {
            config,
            history,
            current_stream,
            current_frame_id: 0,
            events: HashMap::new(),
            type_ids: HashMap::new(),
            next_listener_id: 0,
        }
    }

    // Declaration

    /// Binds `T` to `net_id`.
    ///
    /// # Panics
    /// Panics if `T` or `net_id` is already declared, or `net_id` is 0
    pub fn declare<T: 'static>(&mut self, net_id: NetId, serializer: impl EventSerializer<T>) {
        if let Err(err) = self.try_declare(net_id, serializer) {
            panic!("{}", err);
        }
    }

    pub fn try_declare<T: 'static>(
        &mut self,
        net_id: NetId,
        serializer: impl EventSerializer<T>,
    ) -> Result<(), EventBusError> {
        let type_id = TypeId::of::<T>();
        if self.events.contains_key(&type_id) {
            return Err(EventBusError::DuplicateEventType {
                type_name: type_name::<T>(),
            });
        }
        if net_id == UNASSIGNED_NET_ID {
            return Err(EventBusError::UnassignedNetId {
                type_name: type_name::<T>(),
            });
        }
        if let Some(existing) = self.type_ids.get(&net_id) {
            let existing = self
                .events
                .get(existing)
                .map(|event| event.type_name())
                .unwrap_or("<unknown>");
            return Err(EventBusError::DuplicateNetId {
                net_id,
                type_name: type_name::<T>(),
                existing,
            });
        }

        let entry = EventEntry::<T> {
            net_id,
            serializer: Box::new(serializer),
            listeners: Vec::new(),
        };
        self.events.insert(type_id, Box::new(entry));
        self.type_ids.insert(net_id, type_id);
        Ok(())
    }

    pub fn is_declared<T: 'static>(&self) -> bool {
        self.events.contains_key(&TypeId::of::<T>())
    }

    pub fn net_id_of<T: 'static>(&self) -> Option<NetId> {
        self.events
            .get(&TypeId::of::<T>())
            .map(|event| event.net_id())
    }

    // Listeners

    /// Adds a listener for replayed `T` events. Returns `None`, and keeps
    /// nothing, if `T` was never declared.
    pub fn register<T: 'static>(
        &mut self,
        listener: impl FnMut(&T) + 'static,
    ) -> Option<ListenerId> {
        let listener_id = ListenerId(self.next_listener_id);
        let entry = self.entry_mut::<T>()?;
        entry.listeners.push((listener_id, Box::new(listener)));
        self.next_listener_id += 1;
        Some(listener_id)
    }

    /// Removes a listener. Unknown ids and undeclared types are ignored.
    pub fn unregister<T: 'static>(&mut self, listener_id: ListenerId) -> bool {
        let Some(entry) = self.entry_mut::<T>() else {
            return false;
        };
        let before = entry.listeners.len();
        entry.listeners.retain(|(id, _)| *id != listener_id);
        entry.listeners.len() != before
    }

    pub fn listener_count<T: 'static>(&self) -> usize {
        self.events
            .get(&TypeId::of::<T>())
            .map(|event| event.listener_count())
            .unwrap_or(0)
    }

    // Sending

    /// Queues `event` for every peer in the current tick's stream. Sending an
    /// undeclared type does nothing. Local listeners are not called.
    ///
    /// If serialization fails, nothing of this event stays in the stream.
    pub fn send<T: 'static>(&mut self, event: &T) -> Result<(), EventBusError> {
        let Some(entry) = downcast_entry::<T>(&self.events) else {
            return Ok(());
        };
        entry.write(event, &mut self.current_stream)?;
        Ok(())
    }

    /// Queues `event` for `peer` alone. It goes out with the peer's next packet
    /// and is not kept in the history. Local listeners are not called.
    pub fn call_on_peer<T: 'static>(&mut self, event: &T, peer: &P) -> Result<(), EventBusError> {
        let entry = downcast_entry::<T>(&self.events).ok_or(EventBusError::UndeclaredEvent {
                type_name: type_name::<T>(),
            })?;
        let writer = self.history.peer_stream(peer);
        entry.write(event, writer)?;
        Ok(())
    }

    /// Bits queued by `send` since the last `on_update`
    pub fn pending_bits(&self) -> u32 {
        self.current_stream.bits_written()
    }

    /// End of tick. Files this tick's stream under `frame_id` and trims the
    /// history against the known acks. A tick without events adds no frame.
    pub fn on_update(&mut self, frame_id: FrameId) {
        self.current_frame_id = frame_id;
        if self.current_stream.is_empty() {
            return;
        }

        let stream = mem::replace(
            &mut self.current_stream,
            BitWriter::with_capacity(self.config.stream_initial_capacity),
        )
        .into_stream();
        self.history.insert(stream, frame_id);
        self.history.limit_history_by_acks();
    }

    /// Writes the event section of a packet for `peer`: every frame the peer has
    /// not acked, each as its distance from `base_frame` followed by its stream,
    /// then the `-1` terminator.
    pub fn append_to_frame(&mut self, peer: &P, writer: &mut dyn BitWrite, base_frame: FrameId) {
        let mut frames_written = 0;
        self.history.process_for_peer(
            |frame_id, stream| {
                let delta = base_frame - frame_id;
                if delta < 0 || delta >= base_frame {
                    warn!(
                        "Frame {} is outside the packet for base frame {}. Skipping it",
                        frame_id, base_frame
                    );
                    return;
                }
                let Ok(delta) = FrameDelta::try_new(delta) else {
                    warn!(
                        "Frame {} is {} frames behind {}, which cannot be encoded. Skipping it",
                        frame_id, delta, base_frame
                    );
                    return;
                };
                delta.ser(writer);
                stream.ser(writer);
                frames_written += 1;
            },
            peer,
            self.current_frame_id,
        );
        FrameDelta::new(FRAME_DELTA_SENTINEL).ser(writer);
        trace!("Wrote {} in frame {}", frames_written, base_frame);
    }

    // Receiving

    /// Reads the event section of a packet whose base frame is `frame_id` and
    /// files every frame in the history. Once the server stops resending a frame
    /// it has seen our ack for it, so anything older than the oldest frame in
    /// this packet is forgotten.
    ///
    /// A malformed section is rejected as a whole and nothing is inserted.
    /// Returns the number of frames read.
    pub fn process_events_from_server(
        &mut self,
        reader: &mut BitReader,
        frame_id: FrameId,
    ) -> Result<usize, EventBusError> {
        let mut frames = Vec::new();
        loop {
            let delta = FrameDelta::de(reader)
                .map_err(|source| EventBusError::MalformedFrameSection { frame_id, source })?
                .get();
            if delta == FRAME_DELTA_SENTINEL {
                break;
            }
            let event_frame_id = frame_id - delta;
            let stream = BitStream::de(reader).map_err(|source| {
                EventBusError::MalformedEventStream {
                    frame_id: event_frame_id,
                    source,
                }
            })?;
            if stream.is_empty() {
                return Err(EventBusError::EmptyEventStream {
                    frame_id: event_frame_id,
                });
            }
            frames.push((event_frame_id, stream));
        }

        let frames_read = frames.len();
        let oldest = frames.iter().map(|(id, _)| *id).min();
        let newest = frames.iter().map(|(id, _)| *id).max();
        for (event_frame_id, stream) in frames {
            self.history.insert(stream, event_frame_id);
        }
        if let (Some(oldest), Some(newest)) = (oldest, newest) {
            self.history.limit_history(oldest - 1);
            trace!(
                "Read {} in frame {} oldest was {} newest was {}",
                frames_read,
                frame_id,
                oldest,
                newest
            );
        }
        Ok(frames_read)
    }

    /// Runs the listeners for every received frame up to `target_frame_id`
    /// that has not been replayed yet. Returns the number of frames replayed.
    ///
    /// A frame that fails to decode is abandoned at that point with an error
    /// log, the remaining frames are still replayed.
    pub fn ensure_events_replayed(&mut self, target_frame_id: FrameId) -> usize {
        let events = &mut self.events;
        let type_ids = &self.type_ids;
        let mut frames_replayed = 0;

        self.history.process_events(
            |frame_id, stream| {
                let mut reader = stream.reader();
                if let Err(err) = replay_stream(events, type_ids, &mut reader) {
                    error!("Failed to replay events of frame {}: {}", frame_id, err);
                }
                frames_replayed += 1;
            },
            target_frame_id,
        );

        trace!("Replayed {} in frame {}", frames_replayed, target_frame_id);
        frames_replayed
    }

    // Peers

    /// Starts tracking `peer` as having acked nothing, which holds back ack
    /// trimming until it acks for the first time
    pub fn peer_connected(&mut self, peer: &P) {
        self.history.update_last_ack(peer, NO_ACK);
    }

    pub fn update_last_ack(&mut self, peer: &P, acked_frame: FrameId) {
        self.history.update_last_ack(peer, acked_frame);
    }

    pub fn peer_disconnected(&mut self, peer: &P) {
        self.history.remove_peer(peer);
    }

    // Introspection

    pub fn current_frame_id(&self) -> FrameId {
        self.current_frame_id
    }

    pub fn history(&self) -> &EventHistory<P> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut EventHistory<P> {
        &mut self.history
    }

    fn entry_mut<T: 'static>(&mut self) -> Option<&mut EventEntry<T>> {
        self.events
            .get_mut(&TypeId::of::<T>())
            .and_then(|event| event.as_any_mut().downcast_mut::<EventEntry<T>>())
    }
}

fn downcast_entry<T: 'static>(
    events: &HashMap<TypeId, Box<dyn ErasedEvent>>,
) -> Option<&EventEntry<T>> {
    events
        .get(&TypeId::of::<T>())
        .and_then(|event| event.as_any().downcast_ref::<EventEntry<T>>())
}

#[derive(Debug, Error)]
enum ReplayError {
    #[error("unknown net id {0}")]
    UnknownNetId(NetId),
    #[error(transparent)]
    Serde(#[from] SerdeErr),
}

fn replay_stream(
    events: &mut HashMap<TypeId, Box<dyn ErasedEvent>>,
    type_ids: &HashMap<NetId, TypeId>,
    reader: &mut BitReader,
) -> Result<(), ReplayError> {
    while reader.has_remaining() {
        let net_id = NetIdWire::de(reader)?.to_u16()?;
        let event = type_ids
            .get(&net_id)
            .and_then(|type_id| events.get_mut(type_id))
            .ok_or(ReplayError::UnknownNetId(net_id))?;
        event.call_from_network(reader)?;
    }
    Ok(())
}
