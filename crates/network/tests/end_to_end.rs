//! Full client exchanges against a listening server on a loopback port.

use bytes::{Buf, Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use nanogame_game::{PlayerRegistry, SPAWN};
use nanogame_network::{GameServer, ServerConfig};
use nanogame_protocol::{read_string, write_string, write_varint, FrameCodec};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_util::codec::Framed;

type Client = Framed<TcpStream, FrameCodec>;

struct TestServer {
    addr: SocketAddr,
    registry: Arc<PlayerRegistry>,
    _stop: oneshot::Sender<()>,
}

async fn start_server() -> TestServer {
    let config = ServerConfig {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        demo_world: false,
        ..Default::default()
    };
    let registry = Arc::new(PlayerRegistry::new());
    let server = GameServer::new(config, registry.clone()).await.unwrap();
    let addr = server.local_addr().unwrap();

    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(async move {
        server
            .run_until(async {
                let _ = stopped.await;
            })
            .await
    });

    TestServer {
        addr,
        registry,
        _stop: stop,
    }
}

fn handshake(next_state: i32) -> Bytes {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&[0x00]);
    write_varint(&mut buf, 47);
    write_string(&mut buf, "localhost");
    buf.extend_from_slice(&6969u16.to_be_bytes());
    write_varint(&mut buf, next_state);
    buf.freeze()
}

fn login_start(name: &str) -> Bytes {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&[0x00]);
    write_string(&mut buf, name);
    buf.freeze()
}

async fn connect(addr: SocketAddr) -> Client {
    Framed::new(TcpStream::connect(addr).await.unwrap(), FrameCodec::new())
}

async fn next_frame(client: &mut Client) -> Option<Bytes> {
    match tokio::time::timeout(Duration::from_secs(5), client.next()).await {
        Ok(Some(Ok(frame))) => Some(frame),
        Ok(Some(Err(_))) | Ok(None) => None,
        Err(_) => panic!("timed out waiting for a frame"),
    }
}

fn chat_text(mut frame: Bytes) -> String {
    assert_eq!(frame.get_u8(), 0x02, "expected a chat message");
    read_string(&mut frame).unwrap()
}

/// Log in and consume the login batch plus the player's own join notice
async fn login(addr: SocketAddr, name: &str) -> Client {
    let mut client = connect(addr).await;
    client.send(handshake(2)).await.unwrap();
    client.send(login_start(name)).await.unwrap();

    for id in [0x02, 0x01, 0x08] {
        assert_eq!(next_frame(&mut client).await.unwrap()[0], id);
    }
    let notice = chat_text(next_frame(&mut client).await.unwrap());
    assert!(notice.contains(name));
    client
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition never became true");
}

#[tokio::test]
async fn status_query_reports_online_count_and_echoes_ping() {
    let server = start_server().await;
    let _steve = login(server.addr, "Steve").await;

    let mut client = connect(server.addr).await;
    client.send(handshake(1)).await.unwrap();
    client.send(Bytes::from_static(&[0x00])).await.unwrap();

    let mut response = next_frame(&mut client).await.unwrap();
    assert_eq!(response.get_u8(), 0x00);
    let json: serde_json::Value =
        serde_json::from_str(&read_string(&mut response).unwrap()).unwrap();
    assert_eq!(json["version"]["name"], "1.8.8");
    assert_eq!(json["players"]["online"], server.registry.count_online());
    assert_eq!(json["players"]["online"], 1);

    client.send(Bytes::from_static(&[0x01, 0x12, 0x34])).await.unwrap();
    assert_eq!(&next_frame(&mut client).await.unwrap()[..], &[0x01, 0x12, 0x34]);
    assert!(next_frame(&mut client).await.is_none());
}

#[tokio::test]
async fn concurrent_logins_with_same_name_admit_one() {
    let server = start_server().await;

    let mut first = connect(server.addr).await;
    let mut second = connect(server.addr).await;
    for client in [&mut first, &mut second] {
        client.send(handshake(2)).await.unwrap();
        client.send(login_start("Alice")).await.unwrap();
    }

    let (a, b) = tokio::join!(next_frame(&mut first), next_frame(&mut second));
    let admitted = [a, b]
        .into_iter()
        .map(|frame| match frame {
            Some(frame) => {
                assert_eq!(frame[0], 0x02);
                true
            }
            None => false,
        })
        .filter(|admitted| *admitted)
        .count();

    assert_eq!(admitted, 1);
    assert_eq!(server.registry.count_online(), 1);
}

#[tokio::test]
async fn name_is_free_again_after_leave() {
    let server = start_server().await;

    let alice = login(server.addr, "Alice").await;
    drop(alice);
    wait_for(|| server.registry.get("Alice").is_none()).await;

    let _alice = login(server.addr, "Alice").await;
    assert_eq!(server.registry.names(), vec!["Alice".to_string()]);
}

#[tokio::test]
async fn chat_is_relayed_to_everyone_including_sender() {
    let server = start_server().await;

    let mut alice = login(server.addr, "Alice").await;
    let mut bob = login(server.addr, "Bob").await;
    assert!(chat_text(next_frame(&mut alice).await.unwrap()).contains("Bob"));

    let mut chat = BytesMut::new();
    chat.extend_from_slice(&[0x01]);
    write_string(&mut chat, "hi");
    alice.send(chat.freeze()).await.unwrap();

    for client in [&mut alice, &mut bob] {
        let json: serde_json::Value =
            serde_json::from_str(&chat_text(next_frame(client).await.unwrap())).unwrap();
        assert_eq!(json[0]["text"], "Alice");
        assert_eq!(json[1]["text"], " \u{00bb} ");
        assert_eq!(json[2]["text"], "hi");
    }
}

#[tokio::test]
async fn invalid_utf8_chat_is_relayed_lossily() {
    let server = start_server().await;

    let mut bob = login(server.addr, "Bob").await;
    bob.send(Bytes::from_static(&[0x01, 0x02, 0xC3, 0x28])).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&chat_text(next_frame(&mut bob).await.unwrap())).unwrap();
    assert_eq!(json[0]["text"], "Bob");
    assert_eq!(json[2]["text"], "\u{fffd}(");
    assert!(server.registry.get("Bob").is_some());
}

#[tokio::test]
async fn stalled_reader_does_not_hold_up_chat() {
    const MESSAGES: usize = 3000;

    let server = start_server().await;

    // Logged in, then never read from again
    let _stall = login(server.addr, "Stall").await;
    let mut bob = login(server.addr, "Bob").await;

    let text = "x".repeat(100);
    let mut chat = BytesMut::new();
    chat.extend_from_slice(&[0x01]);
    write_string(&mut chat, &text);
    let chat = chat.freeze();

    tokio::time::timeout(Duration::from_secs(60), async {
        for _ in 0..MESSAGES {
            bob.send(chat.clone()).await.unwrap();
        }
        for _ in 0..MESSAGES {
            let json: serde_json::Value =
                serde_json::from_str(&chat_text(next_frame(&mut bob).await.unwrap())).unwrap();
            assert_eq!(json[2]["text"], text.as_str());
        }
    })
    .await
    .expect("chat relay stalled");

    assert_eq!(server.registry.count_online(), 2);
}

#[tokio::test]
async fn short_position_packet_closes_connection() {
    let server = start_server().await;

    let mut alice = login(server.addr, "Alice").await;
    let mut bob = login(server.addr, "Bob").await;
    chat_text(next_frame(&mut alice).await.unwrap());
    let player = server.registry.get("Alice").unwrap();

    let mut position = BytesMut::new();
    position.extend_from_slice(&[0x04]);
    position.extend_from_slice(&[0u8; 20]);
    alice.send(position.freeze()).await.unwrap();

    assert!(next_frame(&mut alice).await.is_none());
    assert_eq!(player.location(), SPAWN);

    let notice = chat_text(next_frame(&mut bob).await.unwrap());
    assert!(notice.contains("Alice"));
    assert!(server.registry.get("Alice").is_none());
}

#[tokio::test]
async fn position_update_is_stored() {
    let server = start_server().await;

    let mut alice = login(server.addr, "Alice").await;

    let mut position = BytesMut::new();
    position.extend_from_slice(&[0x04]);
    position.extend_from_slice(&10.5f64.to_be_bytes());
    position.extend_from_slice(&65.0f64.to_be_bytes());
    position.extend_from_slice(&(-3.0f64).to_be_bytes());
    position.extend_from_slice(&[0x01]);
    alice.send(position.freeze()).await.unwrap();

    let player = server.registry.get("Alice").unwrap();
    wait_for(|| player.location().x == 10.5).await;

    let location = player.location();
    assert_eq!((location.y, location.z), (65.0, -3.0));
    assert!(location.on_ground);
}

#[tokio::test]
async fn invalid_username_is_turned_away() {
    let server = start_server().await;

    let mut client = connect(server.addr).await;
    client.send(handshake(2)).await.unwrap();
    client.send(login_start("this_name_is_far_too_long")).await.unwrap();

    assert!(next_frame(&mut client).await.is_none());
    assert_eq!(server.registry.count_online(), 0);
}
