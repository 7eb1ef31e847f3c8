//! # Player State
//!
//! A logged-in player: its name, its outbound queue and its location.

use bytes::Bytes;
use nanogame_core::{Location, Username};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Producer side of a player's outbound queue
pub type OutboundSender = mpsc::UnboundedSender<Bytes>;

/// Consumer side of a player's outbound queue, owned by its delivery task
pub type OutboundReceiver = mpsc::UnboundedReceiver<Bytes>;

/// Where a player spawns after login
pub const SPAWN: Location = Location::new(0.0, 64.0, 0.0);

/// Individual player
///
/// # Purpose
/// Shared between the player's own session (which alone mutates the
/// location) and the registry (which enqueues broadcast frames).
///
/// # Outbound Queue
/// Unbounded and ordered. Frames are already framed packet bytes. Any task
/// may enqueue; only the session's delivery task dequeues. Closing the queue
/// lets the delivery task drain what is left and stop.
pub struct Player {
    /// Unique, validated name
    pub name: Username,

    /// Queue producer, `None` once closed
    outbound: Mutex<Option<OutboundSender>>,

    /// Position and orientation reported by the client
    location: Mutex<Location>,
}

impl Player {
    /// Create a player and the receiving end of its outbound queue
    #[inline]
    pub fn new(name: Username) -> (Self, OutboundReceiver) {
        tracing::debug!("Creating player {}", name);

        let (tx, rx) = mpsc::unbounded_channel();
        let player = Self {
            name,
            outbound: Mutex::new(Some(tx)),
            location: Mutex::new(SPAWN),
        };
        (player, rx)
    }

    /// Clone of the queue producer, `None` once closed
    pub fn sender(&self) -> Option<OutboundSender> {
        self.outbound.lock().clone()
    }

    /// Close the outbound queue
    ///
    /// Frames already queued are still delivered. Idempotent.
    pub fn close_queue(&self) {
        self.outbound.lock().take();
    }

    pub fn is_queue_open(&self) -> bool {
        self.outbound.lock().as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub fn location(&self) -> Location {
        *self.location.lock()
    }

    pub fn set_position(&self, x: f64, y: f64, z: f64, on_ground: bool) {
        let mut loc = self.location.lock();
        loc.x = x;
        loc.y = y;
        loc.z = z;
        loc.on_ground = on_ground;
    }

    pub fn set_look(&self, yaw: f32, pitch: f32, on_ground: bool) {
        let mut loc = self.location.lock();
        loc.yaw = yaw;
        loc.pitch = pitch;
        loc.on_ground = on_ground;
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("location", &self.location())
            .finish()
    }
}
