//! # Player Registry
//!
//! This module tracks every logged-in player by name.

use crate::player::Player;
use bytes::Bytes;
use nanogame_core::{NanoError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Player Registry
///
/// # Purpose
/// Maps username to live player. A name is present exactly while a
/// logged-in session owns it.
///
/// # Thread Safety
/// One reader/writer lock guards the map. Join and leave take the write
/// lock; broadcast, lookup and counting take the read lock. The lock is
/// never held while a frame is enqueued: broadcast copies the recipients'
/// queue handles first and sends after releasing it.
///
/// The registry is an owned value; each server (or test) creates its own
/// and hands an `Arc` to every session.
#[derive(Default)]
pub struct PlayerRegistry {
    /// Key: username, Value: player handle
    players: RwLock<HashMap<String, Arc<Player>>>,
}

impl PlayerRegistry {
    /// Create an empty registry
    #[inline]
    pub fn new() -> Self {
        tracing::debug!("Creating PlayerRegistry");
        Self::default()
    }

    /// Register a player under its name
    ///
    /// # Errors
    /// `NameTaken` if a player with the same name is registered.
    pub fn join(&self, player: Arc<Player>) -> Result<()> {
        let mut players = self.players.write();
        let name = player.name.get();

        if players.contains_key(name) {
            return Err(NanoError::NameTaken(name.to_string()));
        }

        tracing::debug!("Registering player {}", name);
        players.insert(name.to_string(), player);
        Ok(())
    }

    /// Remove a player by name
    ///
    /// # Returns
    /// The removed player, or `None` if the name was not registered
    pub fn leave(&self, name: &str) -> Option<Arc<Player>> {
        let removed = self.players.write().remove(name);
        if removed.is_some() {
            tracing::debug!("Unregistered player {}", name);
        }
        removed
    }

    /// Look up a player by name
    pub fn get(&self, name: &str) -> Option<Arc<Player>> {
        self.players.read().get(name).cloned()
    }

    /// Number of registered players
    pub fn count_online(&self) -> usize {
        self.players.read().len()
    }

    /// Names of all registered players
    pub fn names(&self) -> Vec<String> {
        self.players.read().keys().cloned().collect()
    }

    /// Enqueue a frame on every registered player's outbound queue
    ///
    /// # Returns
    /// The number of queues the frame was delivered to
    ///
    /// # Notes
    /// - Queues are unbounded, so a stalled receiver never delays the others
    /// - Players whose queue has just closed are skipped
    pub fn broadcast(&self, frame: Bytes) -> usize {
        let recipients: Vec<_> = self
            .players
            .read()
            .values()
            .filter_map(|player| player.sender())
            .collect();

        let sent = recipients
            .into_iter()
            .filter(|tx| tx.send(frame.clone()).is_ok())
            .count();

        tracing::trace!("Broadcast frame of {} bytes to {} players", frame.len(), sent);
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanogame_core::Username;
    use std::sync::Barrier;

    fn player(name: &str) -> (Arc<Player>, crate::OutboundReceiver) {
        let (player, rx) = Player::new(Username::parse(name).unwrap());
        (Arc::new(player), rx)
    }

    #[test]
    fn test_registry_creation() {
        let registry = PlayerRegistry::new();
        assert_eq!(registry.count_online(), 0);
    }

    #[test]
    fn test_join_leave() {
        let registry = PlayerRegistry::new();
        let (alice, _rx) = player("Alice");

        registry.join(alice.clone()).unwrap();
        assert_eq!(registry.count_online(), 1);
        assert!(registry.get("Alice").is_some());
        assert!(registry.get("alice").is_none());

        assert!(registry.leave("Alice").is_some());
        assert_eq!(registry.count_online(), 0);
        assert!(registry.leave("Alice").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = PlayerRegistry::new();
        let (first, _rx1) = player("Alice");
        let (second, _rx2) = player("Alice");

        registry.join(first.clone()).unwrap();
        let err = registry.join(second).unwrap_err();
        assert!(matches!(err, NanoError::NameTaken(name) if name == "Alice"));

        // the first registration is untouched
        assert!(Arc::ptr_eq(&registry.get("Alice").unwrap(), &first));
    }

    #[test]
    fn test_rejoin_after_leave() {
        let registry = PlayerRegistry::new();
        let (first, _rx1) = player("Alice");
        let (second, _rx2) = player("Alice");

        registry.join(first).unwrap();
        registry.leave("Alice");
        assert!(registry.join(second).is_ok());
    }

    #[test]
    fn test_concurrent_joins_same_name() {
        let registry = Arc::new(PlayerRegistry::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    let (p, _rx) = player("Alice");
                    barrier.wait();
                    registry.join(p).is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(registry.count_online(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_everyone() {
        let registry = PlayerRegistry::new();
        let (alice, mut alice_rx) = player("Alice");
        let (bob, mut bob_rx) = player("Bob");
        registry.join(alice).unwrap();
        registry.join(bob).unwrap();

        let sent = registry.broadcast(Bytes::from_static(b"frame"));
        assert_eq!(sent, 2);
        assert_eq!(alice_rx.recv().await.unwrap(), Bytes::from_static(b"frame"));
        assert_eq!(bob_rx.recv().await.unwrap(), Bytes::from_static(b"frame"));
    }

    #[test]
    fn test_broadcast_skips_closed_queues() {
        let registry = PlayerRegistry::new();
        let (alice, _alice_rx) = player("Alice");
        let (bob, bob_rx) = player("Bob");
        registry.join(alice).unwrap();
        registry.join(bob.clone()).unwrap();

        bob.close_queue();
        assert_eq!(registry.broadcast(Bytes::from_static(b"x")), 1);

        drop(bob_rx);
        assert_eq!(registry.broadcast(Bytes::from_static(b"y")), 1);
    }

    #[test]
    fn test_names() {
        let registry = PlayerRegistry::new();
        let (alice, _rx1) = player("Alice");
        let (bob, _rx2) = player("Bob");
        registry.join(alice).unwrap();
        registry.join(bob).unwrap();

        let mut names = registry.names();
        names.sort();
        assert_eq!(names, vec!["Alice".to_string(), "Bob".to_string()]);
    }
}
