use std::{collections::HashMap, fmt::Debug, hash::Hash, mem};

use log::{debug, warn};

use tickstream_serde::{BitStream, BitWriter};

use crate::{
    config::EventHistoryConfig,
    constants::{EVENT_STREAM_INITIAL_SIZE, NO_ACK},
    types::FrameId,
};

#[derive(Clone, Debug)]
struct HistoryEntry {
    frame_id: FrameId,
    /// `None` once the client has replayed it
    payload: Option<BitStream>,
}

/// Frame-ordered event streams, plus the per-peer ack and unicast state
/// needed to decide what each peer still has to receive.
///
/// On the server every entry is kept until all peers have acked past it, and
/// is resent to each peer until then. On the client the same structure holds
/// received frames until they are replayed and the server stops resending
/// them.
pub struct EventHistory<P: Eq + Hash + Clone + Debug> {
    config: EventHistoryConfig,
    entries: Vec<HistoryEntry>,
    watermark: FrameId,
    last_acks: HashMap<P, FrameId>,
    peer_streams: HashMap<P, BitWriter>,
}

impl<P: Eq + Hash + Clone + Debug> Default for EventHistory<P> {
    fn default() -> Self {
        Self::new(EventHistoryConfig::default())
    }
}

impl<P: Eq + Hash + Clone + Debug> EventHistory<P> {
    pub fn new(config: EventHistoryConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            watermark: 0,
            last_acks: HashMap::new(),
            peer_streams: HashMap::new(),
        }
    }

    /// Inserts the stream for `frame_id`, keeping the history sorted.
    ///
    /// Frames below the watermark were already covered by a newer ack and are
    /// dropped. A frame that is already present is left as it is: the server
    /// resends frames until it sees our ack, and the first copy wins.
    pub fn insert(&mut self, payload: BitStream, frame_id: FrameId) {
        if frame_id < self.watermark {
            warn!(
                "Frame {} is older than the event history limit {}, dropping it",
                frame_id, self.watermark
            );
            return;
        }

        match self.search(frame_id) {
            Ok(_) => {
                debug!("Frame {} is already in the event history", frame_id);
            }
            Err(index) => {
                self.entries.insert(
                    index,
                    HistoryEntry {
                        frame_id,
                        payload: Some(payload),
                    },
                );
            }
        }
    }

    /// The unicast buffer for `peer`, created on first use
    pub fn peer_stream(&mut self, peer: &P) -> &mut BitWriter {
        self.peer_streams
            .entry(peer.clone())
            .or_insert_with(|| BitWriter::with_capacity(EVENT_STREAM_INITIAL_SIZE))
    }

    /// Drops every frame all known peers have acked, keeping one frame of
    /// overlap. With no peers at all, nobody can need any of it. The overflow
    /// limit applies even if some peer never acked.
    pub fn limit_history_by_acks(&mut self) {
        match self.last_acks.values().min().copied() {
            Some(low_water_mark) => {
                if low_water_mark > 0 {
                    self.limit_history(low_water_mark);
                } else {
                    self.limit_overflow();
                }
            }
            None => {
                self.entries.clear();
            }
        }
    }

    /// Drops frames older than `oldest_frame_id`, keeping the newest of them as
    /// overlap, and raises the watermark to `oldest_frame_id - 1`. Regardless
    /// of acks, never keeps more than the overflow limit.
    ///
    /// The watermark never moves back: a late packet must not let frames that
    /// were already trimmed in again.
    pub fn limit_history(&mut self, oldest_frame_id: FrameId) {
        self.watermark = self.watermark.max(oldest_frame_id.saturating_sub(1));

        let oldest_index = match self.search(oldest_frame_id) {
            Ok(index) | Err(index) => index,
        };
        let overflow = self.entries.len().saturating_sub(self.config.overflow_limit);
        self.drop_oldest(oldest_index.saturating_sub(1).max(overflow));
    }

    /// Applies only the overflow limit. Used while some peer has not acked
    /// anything yet.
    fn limit_overflow(&mut self) {
        let overflow = self.entries.len().saturating_sub(self.config.overflow_limit);
        self.drop_oldest(overflow);
    }

    fn drop_oldest(&mut self, count: usize) {
        if count > self.config.large_trim_warning {
            warn!(
                "Dropping {} frames of event history at once. If this keeps happening, the connection is lagging",
                count
            );
        }
        if count > 0 {
            self.entries.drain(..count);
        }
    }

    /// Visits every frame `peer` has not acked yet, oldest first, then the
    /// peer's unicast buffer tagged with `current_frame_id`. The unicast buffer
    /// is emptied afterwards.
    ///
    /// If the newest history frame is `current_frame_id` itself, the unicast
    /// data is appended to it and visited once, since a receiver keeps only one
    /// stream per frame.
    pub fn process_for_peer<F: FnMut(FrameId, &BitStream)>(
        &mut self,
        mut visit: F,
        peer: &P,
        current_frame_id: FrameId,
    ) {
        let last_ack = self.last_ack(peer);
        let start = self.entries.partition_point(|entry| entry.frame_id <= last_ack);

        let unicast = match self.peer_streams.get_mut(peer) {
            Some(writer) if !writer.is_empty() => {
                let writer = mem::replace(
                    writer,
                    BitWriter::with_capacity(EVENT_STREAM_INITIAL_SIZE),
                );
                Some(writer.into_stream())
            }
            _ => None,
        };

        let mut unicast_merged = false;
        let newest = self.entries.len().saturating_sub(1);
        for (index, entry) in self.entries.iter().enumerate().skip(start) {
            let Some(payload) = &entry.payload else {
                continue;
            };
            match &unicast {
                Some(unicast) if index == newest && entry.frame_id == current_frame_id => {
                    visit(entry.frame_id, &payload.concat(unicast));
                    unicast_merged = true;
                }
                _ => visit(entry.frame_id, payload),
            }
        }

        if let Some(unicast) = unicast {
            if !unicast_merged {
                visit(current_frame_id, &unicast);
            }
        }
    }

    /// Visits every frame up to `limit_frame_id` that has not been visited
    /// before, oldest first. Each frame is visited at most once.
    pub fn process_events<F: FnMut(FrameId, &BitStream)>(
        &mut self,
        mut visit: F,
        limit_frame_id: FrameId,
    ) {
        for entry in self.entries.iter_mut() {
            if entry.frame_id > limit_frame_id {
                break;
            }
            if let Some(payload) = entry.payload.take() {
                visit(entry.frame_id, &payload);
            }
        }
    }

    pub fn update_last_ack(&mut self, peer: &P, frame_id: FrameId) {
        self.last_acks.insert(peer.clone(), frame_id);
    }

    /// Forgets the peer's ack and its unicast buffer
    pub fn remove_peer(&mut self, peer: &P) {
        self.last_acks.remove(peer);
        self.peer_streams.remove(peer);
    }

    /// Last frame acked by `peer`, `-1` if it never acked
    pub fn last_ack(&self, peer: &P) -> FrameId {
        self.last_acks.get(peer).copied().unwrap_or(NO_ACK)
    }

    pub fn has_peer(&self, peer: &P) -> bool {
        self.last_acks.contains_key(peer) || self.peer_streams.contains_key(peer)
    }

    pub fn peer_count(&self) -> usize {
        self.last_acks.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frames below this are rejected by `insert`
    pub fn watermark(&self) -> FrameId {
        self.watermark
    }

    pub fn frame_ids(&self) -> Vec<FrameId> {
        self.entries.iter().map(|entry| entry.frame_id).collect()
    }

    pub fn contains(&self, frame_id: FrameId) -> bool {
        self.search(frame_id).is_ok()
    }

    /// Whether `frame_id` is present and still waiting to be replayed
    pub fn is_pending(&self, frame_id: FrameId) -> bool {
        match self.search(frame_id) {
            Ok(index) => self.entries[index].payload.is_some(),
            Err(_) => false,
        }
    }

    pub fn config(&self) -> &EventHistoryConfig {
        &self.config
    }

    fn search(&self, frame_id: FrameId) -> Result<usize, usize> {
        self.entries
            .binary_search_by_key(&frame_id, |entry| entry.frame_id)
    }
}
