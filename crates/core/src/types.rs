//! Core type definitions

use crate::{NanoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest username a client may log in with
pub const MAX_USERNAME_LENGTH: usize = 16;

/// Validated player name
///
/// Case-sensitive, 1-16 characters from `[0-9A-Za-z_]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Validate `name` and wrap it
    pub fn parse(name: &str) -> Result<Self> {
        if is_valid_username(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(NanoError::InvalidUsername(name.to_string()))
        }
    }

    pub fn get(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check a username against the login rules
#[inline]
pub fn is_valid_username(name: &str) -> bool {
    (1..=MAX_USERNAME_LENGTH).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Connection state for the handshake-driven protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolState {
    Handshake,
    Status,
    Login,
    Play,
    Closed,
}

impl ProtocolState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::Status => "status",
            Self::Login => "login",
            Self::Play => "play",
            Self::Closed => "closed",
        }
    }
}
