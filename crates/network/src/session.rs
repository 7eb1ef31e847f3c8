//! # Client Session
//!
//! One client connection from accept to close.
//!
//! # Lifecycle
//!
//! ```text
//! Handshake ──(next state 1)──→ Status ──→ Closed
//!     │
//!     └──(anything else)──→ Login ──→ Play ──→ Closed
//! ```
//!
//! # Tasks
//!
//! The session task owns the read half for its whole life. Until play starts
//! it also writes replies itself. On entering play the write half moves into
//! a delivery task that drains the player's outbound queue, so from then on
//! every outbound frame (own or broadcast) goes through that queue.
//!
//! # Closing
//!
//! Any read, decode or protocol error ends the session. A player that made it
//! into the registry is removed, its queue is closed and the remaining players
//! see a leave notice. Only then does the delivery task get `write_timeout` to
//! flush what is left before it is aborted.

use crate::config::ServerConfig;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use nanogame_core::{NanoError, ProtocolState, Result, Username};
use nanogame_game::{
    announce_join, announce_leave, handle_packet, OutboundReceiver, Player, PlayerRegistry, SPAWN,
};
use nanogame_protocol::{
    build_demo_chunk, build_join_game, build_login_success, build_pong, build_position_look,
    build_status_response, ChatComponent, FrameCodec, Handshake, InboundPacket, JoinGame,
    LoginStart, PositionLook, StatusResponse, OFFLINE_UUID,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;

/// Server side of one client connection
///
/// Generic over the byte stream so tests can drive it over an in-memory
/// duplex pipe.
pub struct Session<S> {
    /// Peer address (IP:port)
    peer: SocketAddr,

    /// Inbound frames
    reader: FramedRead<ReadHalf<S>, FrameCodec>,

    /// Write half, until it moves into the delivery task
    writer: Option<WriteHalf<S>>,

    /// Delivery task, once play has started
    delivery: Option<JoinHandle<u64>>,

    state: ProtocolState,
    username: Option<Username>,

    registry: Arc<PlayerRegistry>,
    config: Arc<ServerConfig>,

    // Statistics
    connected_at: Instant,
    frames_received: u64,
    frames_sent: u64,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(
        stream: S,
        peer: SocketAddr,
        registry: Arc<PlayerRegistry>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);

        Self {
            peer,
            reader: FramedRead::new(read_half, FrameCodec::new()),
            writer: Some(write_half),
            delivery: None,
            state: ProtocolState::Handshake,
            username: None,
            registry,
            config,
            connected_at: Instant::now(),
            frames_received: 0,
            frames_sent: 0,
        }
    }

    /// Run the session until the connection ends
    ///
    /// # Errors
    /// The error that ended the session. A client that simply disconnects
    /// or is turned away at login yields `Ok(())`.
    pub async fn run(mut self) -> Result<()> {
        tracing::debug!("Session {} started", self.peer);

        let result = match self.serve().await {
            Err(NanoError::ConnectionClosed) => Ok(()),
            other => other,
        };

        self.enter(ProtocolState::Closed);
        self.log_stats();
        result
    }

    async fn serve(&mut self) -> Result<()> {
        let frame = self.next_frame().await?;

        match Handshake::parse(&frame) {
            Ok(handshake) => tracing::debug!("Session {} handshake: {:?}", self.peer, handshake),
            Err(e) => tracing::debug!("Session {} sent an unparsable handshake: {}", self.peer, e),
        }

        self.enter(Handshake::requested_state(&frame));
        match self.state {
            ProtocolState::Status => self.serve_status().await,
            _ => self.serve_login().await,
        }
    }

    //=== Status ===//

    async fn serve_status(&mut self) -> Result<()> {
        // The request carries nothing
        self.next_frame().await?;

        let response = StatusResponse::new(
            self.registry.count_online(),
            usize::from(self.config.max_players),
            ChatComponent::colored(
                self.config.description.clone(),
                self.config.description_color.clone(),
            ),
        );
        let mut buf = BytesMut::new();
        build_status_response(&mut buf, &response)?;
        self.write_direct(&buf, 1).await?;

        let ping = self.next_frame().await?;
        buf.clear();
        build_pong(&mut buf, &ping);
        self.write_direct(&buf, 1).await?;

        self.shutdown_direct().await;
        Ok(())
    }

    //=== Login ===//

    async fn serve_login(&mut self) -> Result<()> {
        let frame = self.next_frame().await?;
        let start = LoginStart::parse(&frame)?;

        let name = match Username::parse(&start.username) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Session {} login rejected: {}", self.peer, e);
                return Ok(());
            }
        };

        let (player, rx) = Player::new(name.clone());
        let player = Arc::new(player);
        if let Err(e) = self.registry.join(player.clone()) {
            tracing::warn!("Session {} login rejected: {}", self.peer, e);
            return Ok(());
        }
        self.username = Some(name);

        let result = self.play(&player, rx).await;
        self.close(&player).await;
        result
    }

    //=== Play ===//

    async fn play(&mut self, player: &Player, rx: OutboundReceiver) -> Result<()> {
        let mut buf = BytesMut::new();
        let mut frames = 3;
        build_login_success(&mut buf, OFFLINE_UUID, player.name.get());
        build_join_game(&mut buf, &JoinGame::flat_world(self.config.max_players));
        build_position_look(&mut buf, &PositionLook::absolute(SPAWN.x, SPAWN.y, SPAWN.z));
        if self.config.demo_world {
            build_demo_chunk(&mut buf, 0, 0);
            frames += 1;
        }
        self.write_direct(&buf, frames).await?;

        let writer = self.writer.take().ok_or(NanoError::ConnectionClosed)?;
        self.delivery = Some(tokio::spawn(deliver(writer, rx)));
        self.enter(ProtocolState::Play);

        tracing::info!("{} logged in from {}", player.name, self.peer);
        announce_join(&self.registry, player.name.get())?;

        let rules = self.config.play_rules();
        loop {
            let frame = match self.config.idle_timeout {
                Some(limit) => tokio::time::timeout(limit, self.next_frame())
                    .await
                    .map_err(|_| NanoError::IdleTimeout(limit))??,
                None => self.next_frame().await?,
            };

            let packet = InboundPacket::decode(frame)?;
            tracing::trace!("{} sent {:?}", player.name, packet);
            handle_packet(player, &self.registry, &rules, packet)?;
        }
    }

    async fn close(&mut self, player: &Player) {
        self.enter(ProtocolState::Closed);
        self.registry.leave(player.name.get());
        player.close_queue();

        tracing::info!("{} left", player.name);
        if let Err(e) = announce_leave(&self.registry, player.name.get()) {
            tracing::error!("Failed to announce that {} left: {}", player.name, e);
        }

        if let Some(mut delivery) = self.delivery.take() {
            match tokio::time::timeout(self.config.write_timeout, &mut delivery).await {
                Ok(Ok(sent)) => self.frames_sent += sent,
                Ok(Err(e)) => tracing::error!("{} delivery task failed: {}", player.name, e),
                Err(_) => {
                    tracing::warn!(
                        "{} outbound queue not drained after {:?}, dropping it",
                        player.name,
                        self.config.write_timeout
                    );
                    delivery.abort();
                }
            }
        } else {
            self.shutdown_direct().await;
        }
    }

    fn enter(&mut self, state: ProtocolState) {
        if self.state != state {
            tracing::debug!("Session {} entering {}", self.peer, state.as_str());
            self.state = state;
        }
    }

    //=== I/O ===//

    async fn next_frame(&mut self) -> Result<Bytes> {
        match self.reader.next().await {
            Some(Ok(frame)) => {
                self.frames_received += 1;
                Ok(frame)
            }
            Some(Err(e)) => Err(e),
            None => Err(NanoError::ConnectionClosed),
        }
    }

    /// Write from the session task itself (before play)
    async fn write_direct(&mut self, data: &[u8], frames: u64) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(NanoError::ConnectionClosed)?;
        writer.write_all(data).await?;
        writer.flush().await?;
        self.frames_sent += frames;
        Ok(())
    }

    async fn shutdown_direct(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.shutdown().await;
        }
    }

    fn log_stats(&self) {
        let name = self.username.as_ref().map_or("-", Username::get);
        tracing::info!(
            "Session {} ({}) closed - Duration: {:?}, RX: {} frames, TX: {} frames",
            self.peer,
            name,
            self.connected_at.elapsed(),
            self.frames_received,
            self.frames_sent
        );
    }
}

/// Drain a player's outbound queue into the socket
///
/// Ends when the queue is closed and empty, or on the first write error.
/// Returns the number of frames written.
async fn deliver<W>(mut writer: W, mut rx: OutboundReceiver) -> u64
where
    W: AsyncWrite + Unpin,
{
    let mut sent = 0;
    while let Some(frame) = rx.recv().await {
        if let Err(e) = writer.write_all(&frame).await {
            tracing::debug!("Outbound write failed: {}", e);
            return sent;
        }
        sent += 1;
    }
    let _ = writer.shutdown().await;
    sent
}
