//! Position types and the coordinate-frame conversions between the
//! two editions.
//!
//! Java positions are doubles with the player origin at the feet; Bedrock
//! positions are floats with the player origin at eye level, 1.62 blocks
//! above the feet. Java yaw spans 0..360 clockwise from south, Bedrock yaw
//! spans -180..180 clockwise from south.

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Eye height offset applied to player positions crossing editions.
pub const PLAYER_EYE_HEIGHT: f64 = 1.62;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn chunk(self) -> ChunkPosition {
        ChunkPosition {
            x: self.x.div_euclid(16),
            z: self.z.div_euclid(16),
        }
    }
}

/// A float vector in the Bedrock coordinate frame.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Last-known position and rotation of an entity, in the Java frame.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct EntityPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl From<(f64, f64, f64, f32, f32)> for EntityPosition {
    fn from((x, y, z, yaw, pitch): (f64, f64, f64, f32, f32)) -> Self {
        Self {
            x,
            y,
            z,
            yaw,
            pitch,
        }
    }
}

/// A relative movement in the Java fixed-point delta encoding
/// (1/4096 of a block per unit).
#[derive(Copy, Clone, Debug)]
pub struct EntityPositionDelta {
    pub dx: i16,
    pub dy: i16,
    pub dz: i16,
}

impl Add<EntityPositionDelta> for EntityPosition {
    type Output = EntityPosition;

    fn add(self, delta: EntityPositionDelta) -> EntityPosition {
        EntityPosition {
            x: self.x + f64::from(delta.dx) / 4096.0,
            y: self.y + f64::from(delta.dy) / 4096.0,
            z: self.z + f64::from(delta.dz) / 4096.0,
            ..self
        }
    }
}

impl EntityPosition {
    /// The Bedrock-frame position of a non-player entity.
    pub fn to_bedrock(self) -> Vec3 {
        Vec3 {
            x: self.x as f32,
            y: self.y as f32,
            z: self.z as f32,
        }
    }

    /// The Bedrock-frame position of a player, whose origin sits at
    /// eye level rather than the feet.
    pub fn to_bedrock_player(self) -> Vec3 {
        Vec3 {
            x: self.x as f32,
            y: (self.y + PLAYER_EYE_HEIGHT) as f32,
            z: self.z as f32,
        }
    }
}

/// Converts a Java yaw (0..360 clockwise from south) to the Bedrock
/// range (-180..180 clockwise from south).
pub fn yaw_to_bedrock(yaw: f32) -> f32 {
    let yaw = yaw.rem_euclid(360.0);
    if yaw > 180.0 {
        yaw - 360.0
    } else {
        yaw
    }
}

/// Converts a Bedrock yaw (-180..180) to the Java range (0..360).
pub fn yaw_to_java(yaw: f32) -> f32 {
    yaw.rem_euclid(360.0)
}

/// Maps a Bedrock player position (eye origin) back to the Java frame
/// (feet origin).
pub fn player_y_to_java(y: f32) -> f64 {
    f64::from(y) - PLAYER_EYE_HEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_to_chunk_handles_negatives() {
        let pos = BlockPosition { x: -1, y: 64, z: 17 };
        assert_eq!(pos.chunk(), ChunkPosition { x: -1, z: 1 });
        let pos = BlockPosition {
            x: -16,
            y: 0,
            z: -17,
        };
        assert_eq!(pos.chunk(), ChunkPosition { x: -1, z: -2 });
    }

    #[test]
    fn yaw_round_trips_modulo_360() {
        for yaw in [0.0f32, 45.0, 90.0, 179.5, 180.0, 250.0, 359.0] {
            let there = yaw_to_bedrock(yaw);
            assert!((-180.0..=180.0).contains(&there), "{there} out of range");
            let back = yaw_to_java(there);
            assert!(
                (back - yaw.rem_euclid(360.0)).abs() < 1e-4,
                "{yaw} -> {there} -> {back}"
            );
        }
    }

    #[test]
    fn player_eye_height_round_trips() {
        let java = EntityPosition {
            x: 100.5,
            y: 64.0,
            z: -20.25,
            yaw: 0.0,
            pitch: 0.0,
        };
        let bedrock = java.to_bedrock_player();
        assert!((f64::from(bedrock.y) - 65.62).abs() < 1e-6);
        assert!((player_y_to_java(bedrock.y) - 64.0).abs() < 1e-4);
    }

    #[test]
    fn integer_coordinates_translate_exactly() {
        let java = EntityPosition {
            x: 12.0,
            y: 70.0,
            z: -9.0,
            yaw: 0.0,
            pitch: 0.0,
        };
        let bedrock = java.to_bedrock();
        assert_eq!((bedrock.x, bedrock.y, bedrock.z), (12.0, 70.0, -9.0));
    }

    #[test]
    fn delta_accumulates_in_fixed_point() {
        let start = EntityPosition {
            x: 0.0,
            y: 64.0,
            z: 0.0,
            yaw: 0.0,
            pitch: 0.0,
        };
        let moved = start
            + EntityPositionDelta {
                dx: 4096,
                dy: 0,
                dz: -2048,
            };
        assert!((moved.x - 1.0).abs() < 1e-9);
        assert!((moved.z + 0.5).abs() < 1e-9);
    }
}
