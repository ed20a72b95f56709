//! Which blocks may be picked
//!
//! At the start of a round only the topmost layer is interactive. While a
//! block is held it is the only interactive one, which rules out
//! overlapping picks. Input hit-testing must reject any block not flagged here.

use std::collections::BTreeSet;

use super::state::{BlockId, Pose};

/// Blocks within `tolerance` below the tallest block.
///
/// `blocks` and `poses` are index-aligned.
pub fn topmost_blocks(blocks: &[BlockId], poses: &[Pose], tolerance: f32) -> Vec<BlockId> {
    let Some(highest) = poses.iter().map(Pose::z).reduce(f32::max) else {
        return Vec::new();
    };

    blocks
        .iter()
        .zip(poses)
        .filter(|(_, pose)| highest - pose.z() < tolerance)
        .map(|(&block, _)| block)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct InteractivityGate {
    interactive: BTreeSet<BlockId>,
    highlighted: Option<BlockId>,
}

impl InteractivityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_interactive(&mut self, block: BlockId, interactive: bool) {
        if interactive {
            self.interactive.insert(block);
        } else {
            self.interactive.remove(&block);
        }
    }

    pub fn is_interactive(&self, block: BlockId) -> bool {
        self.interactive.contains(&block)
    }

    /// Interactive blocks, in id order
    pub fn interactive_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.interactive.iter().copied()
    }

    pub fn highlighted(&self) -> Option<BlockId> {
        self.highlighted
    }

    /// Start-of-round policy: topmost set interactive, everything else not
    pub fn open_round(&mut self, blocks: &[BlockId], poses: &[Pose], tolerance: f32) {
        self.clear();
        self.interactive.extend(topmost_blocks(blocks, poses, tolerance));
        log::debug!("{} block(s) open for picking", self.interactive.len());
    }

    /// Active-pick policy: only the held block stays interactive and lit
    pub fn hold(&mut self, block: BlockId) {
        self.interactive.clear();
        self.interactive.insert(block);
        self.highlighted = Some(block);
    }

    /// Nothing interactive, nothing highlighted
    pub fn clear(&mut self) {
        self.interactive.clear();
        self.highlighted = None;
    }
}
