/// PROPERTY-BASED TESTS: event history and replay invariants
///
/// Key invariants:
/// 1. A frame's events run at most once, however often it is received
/// 2. Replay follows frame order regardless of arrival order
/// 3. Ack trimming never drops a frame some peer still needs
/// 4. Net id resolution only depends on the set of type names
/// 5. Over a lossy link every event is replayed exactly once

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use tickstream_shared::{
    resolve_event_ids, BitReader, BitWriter, EventHistory, FrameId, NetEventBus, NetId,
    NoOverrides, Serde, SerdeSerializer,
};
use tickstream_test::{
    tick_and_exchange, tick_and_exchange_n_times, LinkConfig, ReplayedEvent, RoundStarted,
    TestServer,
};

const EVENT_NAMES: [&str; 8] = [
    "game::Attack",
    "game::Chat",
    "game::Die",
    "game::Heal",
    "game::Jump",
    "game::Loot",
    "game::Spawn",
    "game::Walk",
];

fn frames_strategy() -> impl Strategy<Value = BTreeSet<FrameId>> {
    prop::collection::btree_set(1..200i32, 1..40)
}

fn stream_for(frame_id: FrameId) -> tickstream_shared::BitStream {
    let mut writer = BitWriter::new();
    (frame_id as u16).ser(&mut writer);
    writer.into_stream()
}

/// Every section a server would send to a peer that never acks: the packet
/// for frame `n` carries frames `1..=n`
fn cumulative_sections(frames: u16) -> Vec<(FrameId, Vec<u8>)> {
    let mut server = NetEventBus::<u32>::default();
    server.declare::<u16>(1, SerdeSerializer::new());
    server.peer_connected(&1);

    let mut sections = Vec::new();
    for frame in 1..=frames {
        server.send(&frame).unwrap();
        server.on_update(frame as FrameId);
        let mut writer = BitWriter::new();
        server.append_to_frame(&1, &mut writer, frame as FrameId);
        sections.push((frame as FrameId, writer.to_bytes()));
    }
    sections
}

proptest! {
    /// Inserting a frame any number of times keeps a single entry
    #[test]
    fn prop_insert_is_idempotent(frames in frames_strategy(), repeats in 1..4usize) {
        let mut history = EventHistory::<u32>::default();
        for _ in 0..repeats {
            for frame_id in frames.iter().rev() {
                history.insert(stream_for(*frame_id), *frame_id);
            }
        }

        let expected: Vec<FrameId> = frames.iter().copied().collect();
        prop_assert_eq!(history.frame_ids(), expected);
    }

    /// Processing with rising limits visits each frame exactly once
    #[test]
    fn prop_frames_are_processed_once(
        frames in frames_strategy(),
        limits in prop::collection::vec(0..220i32, 1..10),
    ) {
        let mut history = EventHistory::<u32>::default();
        for frame_id in &frames {
            history.insert(stream_for(*frame_id), *frame_id);
        }

        let mut visited = Vec::new();
        let mut highest = FrameId::MIN;
        for limit in limits {
            highest = highest.max(limit);
            history.process_events(|frame_id, _| visited.push(frame_id), limit);
        }

        let expected: Vec<FrameId> = frames.iter().copied().filter(|id| *id <= highest).collect();
        let mut sorted = visited.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, expected);
    }

    /// After trimming, every frame at or above the lowest ack is still there,
    /// and at most one older frame is kept
    #[test]
    fn prop_trim_keeps_unacked_frames(
        frames in frames_strategy(),
        acks in prop::collection::vec(-1..200i32, 1..5),
    ) {
        let mut history = EventHistory::<u32>::default();
        for frame_id in &frames {
            history.insert(stream_for(*frame_id), *frame_id);
        }
        for (peer, ack) in acks.iter().enumerate() {
            history.update_last_ack(&(peer as u32), *ack);
        }
        let min_ack = acks.iter().copied().min().unwrap_or(-1);

        history.limit_history_by_acks();

        let remaining = history.frame_ids();
        for frame_id in frames.iter().filter(|id| **id >= min_ack) {
            prop_assert!(remaining.contains(frame_id), "frame {} was dropped", frame_id);
        }
        if min_ack > 0 {
            let older = remaining.iter().filter(|id| **id < min_ack).count();
            prop_assert!(older <= 1, "{} frames below ack {} survived", older, min_ack);
        } else {
            prop_assert_eq!(remaining.len(), frames.len());
        }
    }

    /// Net ids do not depend on the order types are listed in
    #[test]
    fn prop_net_ids_ignore_declaration_order(
        names in prop::sample::subsequence(EVENT_NAMES.to_vec(), 0..EVENT_NAMES.len())
            .prop_shuffle(),
        pinned in prop::option::of(1..20u16),
    ) {
        let mut overrides: HashMap<&'static str, NetId> = HashMap::new();
        if let (Some(net_id), Some(name)) = (pinned, names.first()) {
            overrides.insert(*name, net_id);
        }
        let mut sorted = names.clone();
        sorted.sort_unstable();

        let shuffled = resolve_event_ids(&names, &overrides);
        let ordered = resolve_event_ids(&sorted, &overrides);

        prop_assert_eq!(&shuffled, &ordered);
        prop_assert_eq!(&shuffled, &resolve_event_ids(&names, &overrides));
        if pinned.is_none() {
            prop_assert_eq!(shuffled, resolve_event_ids(&names, &NoOverrides));
        }
    }

    /// Packets delivered in any order still replay every frame once, in
    /// frame order
    #[test]
    fn prop_reordered_packets_replay_in_order(
        order in Just((0..12usize).collect::<Vec<_>>()).prop_shuffle(),
        deliver in prop::collection::vec(any::<bool>(), 12),
    ) {
        let sections = cumulative_sections(12);
        let mut client = NetEventBus::<()>::default();
        client.declare::<u16>(1, SerdeSerializer::new());
        let replayed = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = replayed.clone();
        client.register::<u16>(move |value| sink.borrow_mut().push(*value));

        // the newest packet always arrives, the others only sometimes
        let mut newest_base = 0;
        for index in order {
            if !deliver[index] && index != 11 {
                continue;
            }
            let (base, bytes) = &sections[index];
            client
                .process_events_from_server(&mut BitReader::new(bytes), *base)
                .unwrap();
            newest_base = newest_base.max(*base);
        }
        client.ensure_events_replayed(newest_base);

        let expected: Vec<u16> = (1..=12).collect();
        prop_assert_eq!(replayed.borrow().clone(), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// End to end over a link dropping packets both ways
    #[test]
    fn prop_lossy_link_replays_exactly_once(
        loss in 0.0f32..0.6,
        seed in any::<u64>(),
        rounds in 1..40u16,
    ) {
        let mut server = TestServer::new();
        let mut client = server.connect(1, LinkConfig::lossy(loss, seed));

        let mut expected = Vec::new();
        for round in 0..rounds {
            server.server.send(&RoundStarted { round }).unwrap();
            expected.push(ReplayedEvent::Round(RoundStarted { round }));
            tick_and_exchange(&mut server, &mut [&mut client]);
        }
        // enough quiet ticks that the tail gets through
        tick_and_exchange_n_times(&mut server, &mut [&mut client], 200);

        prop_assert_eq!(client.replayed(), expected);
    }
}
