//! Position types for world and entity coordinates

use serde::{Deserialize, Serialize};

/// Integer block coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Pack into the 64-bit wire layout (26 bits x, 12 bits y, 26 bits z)
    pub const fn pack(self) -> u64 {
        ((self.x as u64 & 0x3FF_FFFF) << 38)
            | ((self.y as u64 & 0xFFF) << 26)
            | (self.z as u64 & 0x3FF_FFFF)
    }

    /// Unpack the 64-bit wire layout
    ///
    /// Components are read back unsigned, so only non-negative coordinates
    /// survive a round trip.
    pub const fn unpack(packed: u64) -> Self {
        Self {
            x: (packed >> 38) as i32,
            y: ((packed >> 26) & 0xFFF) as i32,
            z: (packed & 0x3FF_FFFF) as i32,
        }
    }

    /// Chunk column containing this block
    pub const fn chunk(self) -> (i32, i32) {
        (self.x >> 4, self.z >> 4)
    }
}

/// Entity position and orientation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: false,
        }
    }
}
