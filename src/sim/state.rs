//! Game state and core types
//!
//! Blocks are opaque handles into the physics collaborator. The core owns
//! only the decisions made about them.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque handle to a block owned by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World pose of a block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Height of the block above the floor plane
    #[inline]
    pub fn z(&self) -> f32 {
        self.position.z
    }
}

/// Stability classification of the tower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TowerStatus {
    #[default]
    Balanced,
    Moving,
    /// Terminal until the next new game
    Collapsed,
}

/// The block currently in the player's hand, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PickState {
    pub picked: Option<BlockId>,
    pub is_held: bool,
}

impl PickState {
    /// Block that is picked and still held by the input collaborator
    pub fn held_block(&self) -> Option<BlockId> {
        self.picked.filter(|_| self.is_held)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Turn cursor snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// -1 before the first round of a game
    pub turn_index: i32,
    /// Furthest turn reached on the current timeline
    pub max_moves: i32,
    pub player_count: u32,
}

/// Notifications pushed to the presentation collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A round began (fresh, or replayed through undo/redo)
    RoundStarted { turn_index: i32, replayed: bool },
    /// The current player changed (only with more than one player)
    TurnChanged { player: u32 },
    /// A settled placement broke the placement rule; the round restarts
    MoveRejected { block: BlockId },
    /// A block hit the floor unexpectedly
    GameOver {
        turn_index: i32,
        player: Option<u32>,
        block: BlockId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_block() {
        let mut pick = PickState {
            picked: Some(BlockId(3)),
            is_held: true,
        };
        assert_eq!(pick.held_block(), Some(BlockId(3)));
        pick.is_held = false;
        assert_eq!(pick.held_block(), None);
        pick.clear();
        assert_eq!(pick, PickState::default());
    }

    #[test]
    fn test_block_id_display() {
        assert_eq!(BlockId(12).to_string(), "#12");
    }
}
