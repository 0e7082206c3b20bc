//! End-to-end scenarios: a Bedrock client on an in-memory packet
//! channel joined to a scripted Java server on a local TCP socket.

use minecraft_bedrock_proxy::{
    config::ProxyConfig,
    forms::Form,
    protocol::bedrock::{
        chunk::parse_sub_chunk,
        codec::BedrockCodec,
        packets::{self as bedrock, level_event, play_status, Packet},
    },
    protocol::java::play,
    protocol::{Decoder, Encode, Encoder},
    session::Session,
    session_manager::SessionManager,
    translator,
    transport::{memory_pair, PacketChannel},
    ProxyContext,
};
use std::{collections::VecDeque, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    time::timeout,
};

const WAIT: Duration = Duration::from_secs(5);

/// A Bedrock client on the near side of the packet channel.
struct BedrockClient {
    channel: PacketChannel,
    codec: BedrockCodec,
    pending: VecDeque<Packet>,
}

impl BedrockClient {
    fn new(channel: PacketChannel) -> Self {
        Self {
            channel,
            codec: BedrockCodec::latest(),
            pending: VecDeque::new(),
        }
    }

    async fn send(&mut self, packet: Packet) {
        let batch = self.codec.encode_batch(&[packet]).unwrap();
        self.channel.send(batch).await.unwrap();
    }

    async fn login(&mut self, protocol_version: i32, name: &str) {
        let payload = serde_json::json!({
            "identity": {
                "displayName": name,
                "identity": "3a965816-8b0c-4e2c-b633-cca2ae1b0c38",
                "xuid": "2535460987654321",
            },
            "client": {
                "skinData": "c3RldmU=",
                "languageCode": "en_US",
            },
        });
        self.send(Packet::Login(bedrock::Login {
            protocol_version,
            payload: serde_json::to_vec(&payload).unwrap(),
        }))
        .await;
    }

    async fn next_packet(&mut self) -> Packet {
        loop {
            if let Some(packet) = self.pending.pop_front() {
                return packet;
            }
            let bytes = timeout(WAIT, self.channel.recv())
                .await
                .expect("timed out waiting for a Bedrock packet")
                .expect("channel closed");
            self.pending.extend(self.codec.decode_batch(&bytes).unwrap());
        }
    }

    /// Skips packets until `select` matches.
    async fn expect<T>(&mut self, mut select: impl FnMut(Packet) -> Option<T>) -> T {
        loop {
            let packet = self.next_packet().await;
            if let Some(found) = select(packet) {
                return found;
            }
        }
    }
}

/// A scripted Java server: accepts one connection, answers the login,
/// then emits whatever each test injects.
struct JavaServer {
    stream: TcpStream,
    read_buffer: Vec<u8>,
}

impl JavaServer {
    async fn accept(listener: TcpListener) -> Self {
        let (stream, _) = timeout(WAIT, listener.accept())
            .await
            .expect("proxy never connected")
            .unwrap();
        let mut server = Self {
            stream,
            read_buffer: Vec::new(),
        };

        // Handshake, then LoginStart.
        let handshake = server.read_frame().await;
        assert_eq!(handshake[0], 0x00);
        let login_start = server.read_frame().await;
        let mut decoder = Decoder::new(&login_start);
        assert_eq!(decoder.read_var_int().unwrap(), 0x00);
        let username = decoder.read_string().unwrap().to_owned();

        // LoginSuccess; no compression keeps the scripting simple.
        let mut body = Vec::new();
        let mut encoder = Encoder::new(&mut body);
        encoder.write_var_int(0x02);
        encoder.write_string("3a965816-8b0c-4e2c-b633-cca2ae1b0c38");
        encoder.write_string(&username);
        server.write_frame(&body).await;

        server
    }

    async fn read_frame(&mut self) -> Vec<u8> {
        loop {
            let mut decoder = Decoder::new(&self.read_buffer);
            if let Ok((length, prefix)) = decoder.read_var_int_with_size() {
                let length = length as usize;
                if self.read_buffer.len() >= prefix + length {
                    let frame = self.read_buffer[prefix..prefix + length].to_vec();
                    self.read_buffer.drain(..prefix + length);
                    return frame;
                }
            }
            let mut chunk = [0u8; 1024];
            let read = timeout(WAIT, self.stream.read(&mut chunk))
                .await
                .expect("timed out reading from the proxy")
                .unwrap();
            assert!(read > 0, "proxy closed the Java connection");
            self.read_buffer.extend_from_slice(&chunk[..read]);
        }
    }

    async fn write_frame(&mut self, body: &[u8]) {
        let mut frame = Vec::new();
        Encoder::new(&mut frame).write_var_int(body.len() as i32);
        frame.extend_from_slice(body);
        self.stream.write_all(&frame).await.unwrap();
    }

    async fn send(&mut self, packet: &play::Clientbound) {
        let mut body = Vec::new();
        packet.encode(&mut Encoder::new(&mut body));
        self.write_frame(&body).await;
    }
}

struct Harness {
    client: BedrockClient,
    java: JavaServer,
    manager: Arc<SessionManager>,
}

fn test_config(java_port: u16, max_players: usize) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.remote_address = "127.0.0.1".to_owned();
    config.remote_port = java_port;
    config.max_players = max_players;
    config
}

/// Brings a session to the `Spawned` state and returns all the pieces.
async fn join(entity_id: i32, gamemode: u8, dimension: i32) -> Harness {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let java_port = listener.local_addr().unwrap().port();

    let ctx = Arc::new(ProxyContext::new(test_config(java_port, 4)).unwrap());
    let manager = Arc::new(SessionManager::new(ctx));

    let (proxy_side, client_side) = memory_pair();
    {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.accept_connection(proxy_side).await });
    }

    let mut client = BedrockClient::new(client_side);
    client.login(390, "TestPlayer").await;

    let status = client
        .expect(|packet| match packet {
            Packet::PlayStatus(status) => Some(status.status),
            _ => None,
        })
        .await;
    assert_eq!(status, play_status::LOGIN_SUCCESS);

    let mut java = JavaServer::accept(listener).await;
    java.send(&play::Clientbound::JoinGame(play::JoinGame {
        entity_id,
        gamemode,
        dimension,
        max_players: 20,
        level_type: "default".to_owned(),
        view_distance: 8,
        reduced_debug_info: false,
    }))
    .await;

    Harness {
        client,
        java,
        manager,
    }
}

#[tokio::test]
async fn join_flow_reaches_spawned_with_translated_start_game() {
    let mut harness = join(42, 1, 0).await;

    let start_game = harness
        .client
        .expect(|packet| match packet {
            Packet::StartGame(start) => Some(start),
            _ => None,
        })
        .await;
    assert_eq!(start_game.dimension, 0, "overworld translates to 0");
    assert_eq!(start_game.player_gamemode, 1, "creative translates to 1");
    assert_ne!(start_game.runtime_entity_id, 0);

    let status = harness
        .client
        .expect(|packet| match packet {
            Packet::PlayStatus(status) => Some(status.status),
            _ => None,
        })
        .await;
    assert_eq!(status, play_status::PLAYER_SPAWN);

    assert_eq!(harness.manager.session_count(), 1);
}

#[tokio::test]
async fn weather_events_translate_with_rounded_strength() {
    let mut harness = join(42, 0, 0).await;

    harness
        .java
        .send(&play::Clientbound::ChangeGameState(play::ChangeGameState {
            reason: play::game_state::START_RAIN,
            value: 0.0,
        }))
        .await;
    let event = harness
        .client
        .expect(|packet| match packet {
            Packet::LevelEvent(event) => Some(event),
            _ => None,
        })
        .await;
    assert_eq!(event.event_id, level_event::START_RAIN);
    assert!((10_000..60_000).contains(&event.data), "data {}", event.data);
    assert_eq!(event.position.x, 0.0);
    assert_eq!(event.position.y, 0.0);
    assert_eq!(event.position.z, 0.0);

    harness
        .java
        .send(&play::Clientbound::ChangeGameState(play::ChangeGameState {
            reason: play::game_state::RAIN_STRENGTH,
            value: 0.5,
        }))
        .await;
    let event = harness
        .client
        .expect(|packet| match packet {
            Packet::LevelEvent(event) => Some(event),
            _ => None,
        })
        .await;
    assert_eq!(event.event_id, level_event::START_RAIN);
    assert_eq!(event.data, 32_768, "0.5 * 65535 rounds to 32768");

    harness
        .java
        .send(&play::Clientbound::ChangeGameState(play::ChangeGameState {
            reason: play::game_state::STOP_RAIN,
            value: 0.0,
        }))
        .await;
    let event = harness
        .client
        .expect(|packet| match packet {
            Packet::LevelEvent(event) => Some(event),
            _ => None,
        })
        .await;
    assert_eq!(event.event_id, level_event::STOP_RAIN);
    assert_eq!(event.data, 0);
}

#[tokio::test]
async fn gamemode_change_translates() {
    let mut harness = join(42, 0, 0).await;

    harness
        .java
        .send(&play::Clientbound::ChangeGameState(play::ChangeGameState {
            reason: play::game_state::CHANGE_GAMEMODE,
            value: 2.0,
        }))
        .await;
    let packet = harness
        .client
        .expect(|packet| match packet {
            Packet::SetPlayerGameType(packet) => Some(packet),
            _ => None,
        })
        .await;
    assert_eq!(packet.gamemode, 2, "adventure translates to 2");
}

/// Packs palette indices the way the Java chunk format does, values
/// allowed to straddle long boundaries.
fn pack_java_words(states: &[u16], bits: u8) -> Vec<u64> {
    let word_count = (states.len() * usize::from(bits) + 63) / 64;
    let mut words = vec![0u64; word_count];
    for (i, &state) in states.iter().enumerate() {
        let bit_index = i * usize::from(bits);
        words[bit_index / 64] |= u64::from(state) << (bit_index % 64);
        if bit_index % 64 + usize::from(bits) > 64 {
            words[bit_index / 64 + 1] |= u64::from(state) >> (64 - bit_index % 64);
        }
    }
    words
}

fn java_chunk_data(chunk_x: i32, chunk_z: i32, palette: &[i32], states: &[u16]) -> play::ChunkData {
    let bits = 4u8;
    let mut data = Vec::new();
    let mut encoder = Encoder::new(&mut data);
    encoder.write_i16(states.iter().filter(|&&s| s != 0).count() as i16);
    encoder.write_u8(bits);
    encoder.write_var_int(palette.len() as i32);
    for &entry in palette {
        encoder.write_var_int(entry);
    }
    let words = pack_java_words(states, bits);
    encoder.write_var_int(words.len() as i32);
    for word in words {
        encoder.write_u64(word);
    }

    play::ChunkData {
        chunk_x,
        chunk_z,
        full_chunk: true,
        primary_bitmask: 0b1,
        heightmaps: vec![0x00],
        biomes: Some(vec![1; 256]),
        data,
        block_entities: Vec::new(),
    }
}

#[tokio::test]
async fn unknown_block_becomes_the_info_update_placeholder() {
    let mut harness = join(42, 0, 0).await;

    // Palette: air, stone, and a state id far outside the table.
    let mut states = vec![0u16; 4096];
    states[0] = 2; // the unknown block at x=0, z=0, y=0
    states[1] = 1; // stone at x=1
    let chunk = java_chunk_data(3, -1, &[0, 1, 999_999], &states);
    harness.java.send(&play::Clientbound::ChunkData(chunk)).await;

    let level_chunk = harness
        .client
        .expect(|packet| match packet {
            Packet::LevelChunk(chunk) => Some(chunk),
            _ => None,
        })
        .await;
    assert_eq!(level_chunk.chunk_x, 3);
    assert_eq!(level_chunk.chunk_z, -1);
    assert_eq!(level_chunk.sub_chunk_count, 1);

    let mut decoder = Decoder::new(&level_chunk.payload);
    let (palette, indices) = parse_sub_chunk(&mut decoder).unwrap();
    // The unknown state mapped to the info update placeholder.
    assert!(palette.contains(&4484), "palette {palette:?}");
    // Bedrock block order is x-major: java (x=0,z=0,y=0) stays index 0.
    assert_eq!(palette[indices[0] as usize], 4484);
    // Stone (java state 1 -> runtime 134) at x=1 lands at index 256.
    assert_eq!(palette[indices[256] as usize], 134);
}

#[tokio::test]
async fn chunk_emissions_preserve_arrival_order() {
    let mut harness = join(42, 0, 0).await;

    let states = vec![1u16; 4096];
    for chunk_x in 0..4 {
        let chunk = java_chunk_data(chunk_x, 0, &[0, 1], &states);
        harness.java.send(&play::Clientbound::ChunkData(chunk)).await;
    }

    for expected_x in 0..4 {
        let level_chunk = harness
            .client
            .expect(|packet| match packet {
                Packet::LevelChunk(chunk) => Some(chunk),
                _ => None,
            })
            .await;
        assert_eq!(level_chunk.chunk_x, expected_x, "chunks arrived out of order");
    }
}

#[tokio::test]
async fn server_kick_reaches_the_bedrock_peer() {
    let mut harness = join(42, 0, 0).await;

    harness
        .java
        .send(&play::Clientbound::Disconnect(play::Disconnect {
            reason: "{\"text\":\"You are banned\"}".to_owned(),
        }))
        .await;

    let disconnect = harness
        .client
        .expect(|packet| match packet {
            Packet::Disconnect(packet) => Some(packet),
            _ => None,
        })
        .await;
    assert!(disconnect.message.contains("You are banned"));
}

async fn refuse_status_for(protocol_version: i32, max_players: usize) -> i32 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let java_port = listener.local_addr().unwrap().port();
    let ctx = Arc::new(ProxyContext::new(test_config(java_port, max_players)).unwrap());
    let manager = Arc::new(SessionManager::new(ctx));

    let (proxy_side, client_side) = memory_pair();
    {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.accept_connection(proxy_side).await });
    }

    let mut client = BedrockClient::new(client_side);
    client.login(protocol_version, "TooNew").await;
    let status = client
        .expect(|packet| match packet {
            Packet::PlayStatus(status) => Some(status.status),
            _ => None,
        })
        .await;
    assert_eq!(manager.session_count(), 0, "no session may be allocated");
    status
}

#[tokio::test]
async fn outdated_client_is_refused_before_any_session_exists() {
    let status = refuse_status_for(100, 4).await;
    assert_eq!(status, play_status::FAILED_CLIENT_OUTDATED);
}

#[tokio::test]
async fn newer_client_is_refused_before_any_session_exists() {
    let status = refuse_status_for(9_999, 4).await;
    assert_eq!(status, play_status::FAILED_SERVER_OUTDATED);
}

#[tokio::test]
async fn full_server_refuses_new_connections() {
    let status = refuse_status_for(390, 0).await;
    assert_eq!(status, play_status::FAILED_SERVER_FULL);
}

#[tokio::test]
async fn form_round_trip_completes_exactly_once() {
    let ctx = ProxyContext::new(test_config(25565, 4)).unwrap();
    let (bedrock_tx, bedrock_rx) = flume::bounded(16);
    let mut session = Session::new(7, bedrock_tx);

    let form = Form::Simple {
        title: "Choice".to_owned(),
        content: "Pick".to_owned(),
        buttons: vec![],
    };
    let mut receiver = session.send_form(&form);

    let request = match bedrock_rx.try_recv().unwrap() {
        Packet::ModalFormRequest(request) => request,
        other => panic!("unexpected packet {}", other.as_ref()),
    };
    assert!(request.form_data.contains("Choice"));

    translator::translate_bedrock(
        &mut session,
        &ctx,
        Packet::ModalFormResponse(bedrock::ModalFormResponse {
            form_id: request.form_id,
            form_data: "[\"yes\"]".to_owned(),
        }),
    )
    .unwrap();
    assert_eq!(
        receiver.try_recv().unwrap(),
        Some(serde_json::json!(["yes"]))
    );

    // A second response with the same id is dropped without error.
    translator::translate_bedrock(
        &mut session,
        &ctx,
        Packet::ModalFormResponse(bedrock::ModalFormResponse {
            form_id: request.form_id,
            form_data: "[\"no\"]".to_owned(),
        }),
    )
    .unwrap();
    assert_eq!(session.pending_form_count(), 0);
}
