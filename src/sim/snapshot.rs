//! Tower configuration snapshots
//!
//! A configuration is the ordered list of block poses, index-aligned with
//! the block order fixed at game start. Snapshots serve as the pristine
//! tower and as per-round history for undo/redo.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::physics::PhysicsWorld;
use super::state::{BlockId, Pose};
use crate::error::{GameError, GameResult};

/// Poses of every block, in block order. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerConfiguration {
    poses: Vec<Pose>,
}

impl TowerConfiguration {
    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl From<Vec<Pose>> for TowerConfiguration {
    fn from(poses: Vec<Pose>) -> Self {
        Self { poses }
    }
}

/// Read the current pose of every block, in order
pub fn capture<W: PhysicsWorld + ?Sized>(
    world: &W,
    blocks: &[BlockId],
) -> GameResult<TowerConfiguration> {
    let poses = blocks
        .iter()
        .map(|&block| world.pose(block).ok_or(GameError::UnknownBlock(block)))
        .collect::<GameResult<Vec<_>>>()?;
    Ok(TowerConfiguration { poses })
}

/// Write a configuration back, leaving every block at rest
pub fn apply<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    blocks: &[BlockId],
    configuration: &TowerConfiguration,
) -> GameResult<()> {
    if configuration.len() != blocks.len() {
        log::warn!(
            "Refusing to apply configuration of {} poses to {} blocks",
            configuration.len(),
            blocks.len()
        );
        return Err(GameError::ConfigurationMismatch {
            expected: blocks.len(),
            actual: configuration.len(),
        });
    }

    for (&block, &pose) in blocks.iter().zip(configuration.poses()) {
        world.set_pose(block, pose);
        world.reset_momentum(block);
    }
    Ok(())
}

/// Offset every block position by an independent uniform amount per axis
/// in `[-max_offset, max_offset]`. Breaks coincident contact geometry.
pub fn jitter<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    blocks: &[BlockId],
    max_offset: f32,
    rng: &mut Pcg32,
) {
    if max_offset <= 0.0 {
        return;
    }

    for &block in blocks {
        let Some(mut pose) = world.pose(block) else {
            continue;
        };
        let offset = Vec3::new(
            rng.random_range(-max_offset..=max_offset),
            rng.random_range(-max_offset..=max_offset),
            rng.random_range(-max_offset..=max_offset),
        );
        pose.position += offset;
        world.set_pose(block, pose);
    }
}

/// Append-indexed history: entry `t` is the tower before move `t`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationHistory {
    entries: Vec<TowerConfiguration>,
}

impl ConfigurationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, turn_index: i32) -> Option<&TowerConfiguration> {
        usize::try_from(turn_index)
            .ok()
            .and_then(|i| self.entries.get(i))
    }

    pub fn push(&mut self, configuration: TowerConfiguration) {
        self.entries.push(configuration);
    }

    /// Drop every entry recorded after `turn_index`
    pub fn truncate_after(&mut self, turn_index: i32) {
        let keep = usize::try_from(turn_index + 1).unwrap_or(0);
        if keep < self.entries.len() {
            log::info!(
                "Discarding {} rewound round(s) after turn {}",
                self.entries.len() - keep,
                turn_index
            );
            self.entries.truncate(keep);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
