/// End-to-end event replication between an EventServer and EventClients over
/// local links

use std::{cell::RefCell, rc::Rc};

use tickstream_server::ServerError;
use tickstream_shared::EventBusError;
use tickstream_test::{
    assert_replayed, tick_and_exchange, tick_and_exchange_n_times, ChatMessage, Damage,
    LinkConfig, ReplayedEvent, RoundStarted, SpawnUnit, TestServer,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn spawn(unit_id: u32) -> SpawnUnit {
    SpawnUnit {
        unit_id,
        x: unit_id as i16,
        y: -(unit_id as i16),
    }
}

fn chat(sender: u16, text: &str) -> ChatMessage {
    ChatMessage {
        sender,
        text: text.to_string(),
    }
}

#[test]
fn test_events_arrive_in_send_order() {
    init_logger();
    let mut server = TestServer::new();
    let mut client = server.connect(1, LinkConfig::default());

    server.server.send(&spawn(7)).unwrap();
    server.server.send(&chat(3, "gl hf")).unwrap();
    server.server.send(&RoundStarted { round: 1 }).unwrap();
    tick_and_exchange(&mut server, &mut [&mut client]);

    assert_replayed!(
        client,
        vec![
            ReplayedEvent::Spawn(spawn(7)),
            ReplayedEvent::Chat(chat(3, "gl hf")),
            ReplayedEvent::Round(RoundStarted { round: 1 }),
        ]
    );
}

#[test]
fn test_events_across_ticks_replay_once() {
    let mut server = TestServer::new();
    let mut client = server.connect(1, LinkConfig::default());

    let mut expected = Vec::new();
    for round in 1..=10u16 {
        server.server.send(&RoundStarted { round }).unwrap();
        expected.push(ReplayedEvent::Round(RoundStarted { round }));
        tick_and_exchange(&mut server, &mut [&mut client]);
    }
    tick_and_exchange_n_times(&mut server, &mut [&mut client], 5);

    assert_replayed!(client, expected);
}

#[test]
fn test_broadcast_reaches_every_client() {
    let mut server = TestServer::new();
    let mut first = server.connect(1, LinkConfig::default());
    let mut second = server.connect(2, LinkConfig::default());

    server.server.send(&spawn(1)).unwrap();
    tick_and_exchange(&mut server, &mut [&mut first, &mut second]);
    server.server.send(&spawn(2)).unwrap();
    tick_and_exchange(&mut server, &mut [&mut first, &mut second]);

    let expected = vec![ReplayedEvent::Spawn(spawn(1)), ReplayedEvent::Spawn(spawn(2))];
    assert_replayed!(first, expected.clone());
    assert_replayed!(second, expected);
}

#[test]
fn test_call_on_peer_reaches_only_target() {
    let mut server = TestServer::new();
    let mut first = server.connect(1, LinkConfig::default());
    let mut second = server.connect(2, LinkConfig::default());

    server.server.send(&RoundStarted { round: 4 }).unwrap();
    server.server.call_on_peer(&chat(0, "whisper"), &2).unwrap();
    tick_and_exchange(&mut server, &mut [&mut first, &mut second]);

    assert_replayed!(first, vec![ReplayedEvent::Round(RoundStarted { round: 4 })]);
    assert_replayed!(
        second,
        vec![
            ReplayedEvent::Round(RoundStarted { round: 4 }),
            ReplayedEvent::Chat(chat(0, "whisper")),
        ]
    );
}

#[test]
fn test_call_on_peer_is_not_resent() {
    let mut server = TestServer::new();
    let mut client = server.connect(1, LinkConfig::default());

    server.server.call_on_peer(&chat(0, "once"), &1).unwrap();
    server.server.tick();
    // the packet was never read, so nothing got acked
    client.receive_all().unwrap();
    tick_and_exchange_n_times(&mut server, &mut [&mut client], 3);

    assert_replayed!(client, vec![ReplayedEvent::Chat(chat(0, "once"))]);
}

#[test]
fn test_call_on_unknown_peer() {
    let mut server = TestServer::new();

    let result = server.server.call_on_peer(&chat(0, "anyone?"), &9);

    match result {
        Err(ServerError::UnknownPeer { peer }) => assert_eq!(peer, "9"),
        other => panic!("Expected UnknownPeer error, got {:?}", other),
    }
}

#[test]
fn test_rejected_event_leaves_frame_intact() {
    let mut server = TestServer::new();
    let mut client = server.connect(1, LinkConfig::default());

    server.server.send(&Damage { amount: 10 }).unwrap();
    let result = server.server.send(&Damage { amount: 5000 });
    server.server.send(&Damage { amount: 20 }).unwrap();
    tick_and_exchange(&mut server, &mut [&mut client]);

    match result {
        Err(ServerError::EventBus(EventBusError::Serde(_))) => {}
        other => panic!("Expected serializer error, got {:?}", other),
    }
    assert_replayed!(
        client,
        vec![
            ReplayedEvent::Damage(Damage { amount: 10 }),
            ReplayedEvent::Damage(Damage { amount: 20 }),
        ]
    );
}

#[test]
fn test_panicking_listener_does_not_break_replay() {
    init_logger();
    let mut server = TestServer::new();
    let mut client = server.connect(1, LinkConfig::default());
    client
        .client
        .register::<ChatMessage>(|_| panic!("chat listener failure"));

    server.server.send(&chat(1, "first")).unwrap();
    server.server.send(&RoundStarted { round: 2 }).unwrap();
    tick_and_exchange(&mut server, &mut [&mut client]);
    server.server.send(&chat(1, "second")).unwrap();
    tick_and_exchange(&mut server, &mut [&mut client]);

    assert_replayed!(
        client,
        vec![
            ReplayedEvent::Chat(chat(1, "first")),
            ReplayedEvent::Round(RoundStarted { round: 2 }),
            ReplayedEvent::Chat(chat(1, "second")),
        ]
    );
}

#[test]
fn test_unregistered_listener_stops_receiving() {
    let mut server = TestServer::new();
    let mut client = server.connect(1, LinkConfig::default());
    let rounds = Rc::new(RefCell::new(Vec::new()));
    let sink = rounds.clone();
    let listener_id = client
        .client
        .register::<RoundStarted>(move |event| sink.borrow_mut().push(event.round))
        .unwrap();

    server.server.send(&RoundStarted { round: 1 }).unwrap();
    tick_and_exchange(&mut server, &mut [&mut client]);
    assert!(client.client.unregister::<RoundStarted>(listener_id));
    server.server.send(&RoundStarted { round: 2 }).unwrap();
    tick_and_exchange(&mut server, &mut [&mut client]);

    assert_eq!(*rounds.borrow(), vec![1]);
    assert_eq!(client.replayed().len(), 2);
}

#[test]
fn test_replay_waits_for_simulation() {
    let mut server = TestServer::new();
    let mut client = server.connect(1, LinkConfig::default());

    server.server.send(&RoundStarted { round: 1 }).unwrap();
    server.server.tick();
    server.server.send(&RoundStarted { round: 2 }).unwrap();
    server.server.tick();
    client.receive_all().unwrap();

    assert!(client.replayed().is_empty());
    assert_eq!(client.client.replay(1), 1);
    assert_replayed!(client, vec![ReplayedEvent::Round(RoundStarted { round: 1 })]);
    assert_eq!(client.client.replay(2), 1);
    assert_eq!(client.replayed().len(), 2);
}

#[test]
fn test_not_ready_peer_catches_up() {
    let mut server = TestServer::new();
    let mut client = server.connect(1, LinkConfig::default());

    server
        .server
        .peer_mut(&1)
        .unwrap()
        .set_connected(false);
    for unit_id in 1..=3 {
        server.server.send(&spawn(unit_id)).unwrap();
        tick_and_exchange(&mut server, &mut [&mut client]);
    }
    assert!(client.replayed().is_empty());

    server.server.peer_mut(&1).unwrap().set_connected(true);
    tick_and_exchange(&mut server, &mut [&mut client]);

    assert_replayed!(
        client,
        vec![
            ReplayedEvent::Spawn(spawn(1)),
            ReplayedEvent::Spawn(spawn(2)),
            ReplayedEvent::Spawn(spawn(3)),
        ]
    );
}

#[test]
fn test_lossy_link_replays_every_event_once() {
    init_logger();
    let mut server = TestServer::new();
    let mut client = server.connect(1, LinkConfig::lossy(0.3, 42));

    let mut expected = Vec::new();
    for unit_id in 0..100 {
        server.server.send(&spawn(unit_id)).unwrap();
        expected.push(ReplayedEvent::Spawn(spawn(unit_id)));
        tick_and_exchange(&mut server, &mut [&mut client]);
    }
    // quiet ticks until a packet gets through with everything left
    tick_and_exchange_n_times(&mut server, &mut [&mut client], 50);

    assert!(client.ack_peer().dropped() > 0);
    assert_replayed!(client, expected);
}

#[test]
fn test_history_is_dropped_without_peers() {
    let mut server = TestServer::new();

    server.server.send(&spawn(1)).unwrap();
    server.server.tick();
    let mut client = server.connect(1, LinkConfig::default());
    server.server.send(&spawn(2)).unwrap();
    tick_and_exchange(&mut server, &mut [&mut client]);

    assert_replayed!(client, vec![ReplayedEvent::Spawn(spawn(2))]);
}
