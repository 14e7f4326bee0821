//! End-to-end scenarios for the two-party network.

use std::time::Duration;

use tandem_core::{FrameError, ReceiveOptions, RecvError, SendError, Side};
use tandem_stream::{Accept, TwoPartyNetwork};
use tandem_testkit::{network_pair, BrokenStream};

const TICK: Duration = Duration::from_millis(100);

#[tokio::test]
async fn client_message_arrives_at_server_intact() {
    let (client, server) = network_pair(ReceiveOptions::default());

    let conn = client.network.connect_to_peer(Side::Server).unwrap();
    let mut msg = conn.new_outgoing_message(0);
    msg.write_body(b"bootstrap request");
    msg.send().unwrap();

    let server_conn = server.network.accept_connection().await;
    let received = server_conn.recv().await.unwrap().unwrap();
    assert_eq!(received.body(), b"bootstrap request");
}

#[tokio::test]
async fn submissions_hit_the_wire_in_order() {
    let (client, server) = network_pair(ReceiveOptions::default());

    let conn = client.network.connect_to_peer(Side::Server).unwrap();
    for i in 0..100u32 {
        let mut msg = conn.new_outgoing_message(16);
        msg.body_mut().extend_from_slice(&i.to_le_bytes());
        msg.send().unwrap();
    }

    let server_conn = server.network.accept_connection().await;
    for i in 0..100u32 {
        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received.body(), &i.to_le_bytes());
    }
}

#[tokio::test]
async fn concurrent_submitters_never_interleave_frames() {
    const TASKS: u32 = 8;
    const PER_TASK: u32 = 25;

    let (client, server) = network_pair(ReceiveOptions::default());
    let conn = client.network.connect_to_peer(Side::Server).unwrap();

    let mut senders = Vec::new();
    for task in 0..TASKS {
        let conn = conn.clone();
        senders.push(tokio::spawn(async move {
            for seq in 0..PER_TASK {
                let mut msg = conn.new_outgoing_message(8);
                msg.body_mut().extend_from_slice(&task.to_le_bytes());
                msg.body_mut().extend_from_slice(&seq.to_le_bytes());
                msg.send().unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for sender in senders {
        sender.await.unwrap();
    }

    // Each frame must arrive whole, and each task's messages must
    // arrive in that task's submission order.
    let server_conn = server.network.accept_connection().await;
    let mut next_seq = [0u32; TASKS as usize];
    for _ in 0..TASKS * PER_TASK {
        let received = server_conn.recv().await.unwrap().unwrap();
        let body = received.body();
        assert_eq!(body.len(), 8);
        let task = u32::from_le_bytes(body[..4].try_into().unwrap());
        let seq = u32::from_le_bytes(body[4..].try_into().unwrap());
        assert_eq!(seq, next_seq[task as usize]);
        next_seq[task as usize] += 1;
    }
}

#[tokio::test]
async fn peer_close_resolves_recv_with_end_of_stream() {
    let (client, server) = network_pair(ReceiveOptions::default());

    // Tear the client side down entirely: dropping the network closes
    // the write queue, which ends the driver and releases the stream.
    drop(client.network);
    client.driver.await.unwrap();

    let server_conn = server.network.accept_connection().await;
    let end = server_conn.recv().await.unwrap();
    assert!(end.is_none());
    assert!(server.network.is_disconnected());
    tokio::time::timeout(TICK, server.network.disconnected())
        .await
        .expect("disconnect signal should be raised");

    // Further reads keep reporting end-of-stream; the signal stays
    // raised without firing twice.
    assert!(server_conn.recv().await.unwrap().is_none());
    assert!(server.network.is_disconnected());
}

#[tokio::test]
async fn write_failure_raises_disconnect_and_later_submits_are_harmless() {
    let (network, driver) =
        TwoPartyNetwork::new(BrokenStream, Side::Client, ReceiveOptions::default());
    let driver = tokio::spawn(driver.run());

    let conn = network.connect_to_peer(Side::Server).unwrap();
    let mut msg = conn.new_outgoing_message(0);
    msg.write_body(b"doomed");
    msg.send().unwrap();

    tokio::time::timeout(TICK, network.disconnected())
        .await
        .expect("write failure should raise the disconnect signal");

    // The driver is still consuming; a later submission fails its
    // write quietly without a second disconnect or a crash.
    let mut msg = conn.new_outgoing_message(0);
    msg.write_body(b"also doomed");
    msg.send().unwrap();
    tokio::task::yield_now().await;
    assert!(network.is_disconnected());

    drop(conn);
    drop(network);
    driver.await.unwrap();
}

#[tokio::test]
async fn oversize_frame_fails_the_reader_and_raises_disconnect() {
    let (client, server) = network_pair(ReceiveOptions::default().max_message_bytes(8));

    let conn = client.network.connect_to_peer(Side::Server).unwrap();
    let mut msg = conn.new_outgoing_message(64);
    msg.write_body(&[0u8; 32]);
    msg.send().unwrap();

    let server_conn = server.network.accept_connection().await;
    let err = server_conn.recv().await.unwrap_err();
    assert!(matches!(
        err,
        RecvError::Frame(FrameError::TooLarge { len: 32, limit: 8 })
    ));
    assert!(server.network.is_disconnected());
    // The client side is unaffected; only its peer observed the fault.
    assert!(!client.network.is_disconnected());
}

#[tokio::test]
async fn second_accept_never_resolves() {
    let (_client, server) = network_pair(ReceiveOptions::default());

    let first = server.network.accept_connection().await;
    assert_eq!(first.side(), Side::Server);

    let second = tokio::time::timeout(TICK, server.network.accept_connection()).await;
    assert!(second.is_err(), "second accept must stay pending");
    assert!(matches!(
        server.network.try_accept_connection(),
        Accept::Pending
    ));
}

#[tokio::test]
async fn client_accept_never_resolves() {
    let (client, _server) = network_pair(ReceiveOptions::default());

    let accepted = tokio::time::timeout(TICK, client.network.accept_connection()).await;
    assert!(accepted.is_err(), "client-side accept must stay pending");
}

#[tokio::test]
async fn connect_to_peer_is_idempotent_and_rejects_self() {
    let (client, _server) = network_pair(ReceiveOptions::default());

    assert!(client.network.connect_to_peer(Side::Client).is_none());
    let first = client.network.connect_to_peer(Side::Server);
    let again = client.network.connect_to_peer(Side::Server);
    assert!(first.is_some());
    assert!(again.is_some());
}

#[tokio::test]
async fn dropping_peer_handles_raises_drain() {
    let (client, _server) = network_pair(ReceiveOptions::default());

    let conn = client.network.connect_to_peer(Side::Server).unwrap();
    let pending_drain =
        tokio::time::timeout(Duration::from_millis(20), client.network.drained()).await;
    assert!(pending_drain.is_err(), "drain must wait for handle drop");

    drop(conn);
    tokio::time::timeout(TICK, client.network.drained())
        .await
        .expect("drain signal should be raised");
}

#[tokio::test]
async fn bidirectional_traffic_flows_independently() {
    let (client, server) = network_pair(ReceiveOptions::default());

    let client_conn = client.network.connect_to_peer(Side::Server).unwrap();
    let server_conn = server.network.accept_connection().await;

    let mut question = client_conn.new_outgoing_message(0);
    question.write_body(b"question");
    question.send().unwrap();

    let mut answer = server_conn.new_outgoing_message(0);
    answer.write_body(b"answer");
    answer.send().unwrap();

    let got_question = server_conn.recv().await.unwrap().unwrap();
    assert_eq!(got_question.body(), b"question");
    let got_answer = client_conn.recv().await.unwrap().unwrap();
    assert_eq!(got_answer.body(), b"answer");
}

#[tokio::test]
async fn submit_after_teardown_reports_disconnected() {
    let (stream, _peer) = tokio::io::duplex(64);
    let (network, driver) = TwoPartyNetwork::new(stream, Side::Client, ReceiveOptions::default());

    let conn = network.connect_to_peer(Side::Server).unwrap();
    let mut msg = conn.new_outgoing_message(0);
    msg.write_body(b"late");

    // Tearing the driver down closes the write queue; the held
    // message is the only submitter left.
    drop(driver);
    assert_eq!(msg.send(), Err(SendError::Disconnected));
}

#[tokio::test]
async fn unsent_outgoing_message_is_cancelled_by_drop() {
    let (client, server) = network_pair(ReceiveOptions::default());

    let conn = client.network.connect_to_peer(Side::Server).unwrap();
    let mut dropped = conn.new_outgoing_message(0);
    dropped.write_body(b"never sent");
    drop(dropped);

    let mut msg = conn.new_outgoing_message(0);
    msg.write_body(b"sent");
    msg.send().unwrap();

    let server_conn = server.network.accept_connection().await;
    let received = server_conn.recv().await.unwrap().unwrap();
    assert_eq!(received.body(), b"sent");
}
