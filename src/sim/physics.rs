//! Boundary to the physics collaborator
//!
//! The core never owns block geometry. It reads poses and speeds through
//! this trait and writes poses back only when restoring a snapshot.

use super::state::{BlockId, Pose};

pub trait PhysicsWorld {
    /// Tagged set of tower blocks, in any order
    fn blocks(&self) -> Vec<BlockId>;

    fn pose(&self, block: BlockId) -> Option<Pose>;

    fn set_pose(&mut self, block: BlockId, pose: Pose);

    /// Linear speed of the block (units/s)
    fn velocity_magnitude(&self, block: BlockId) -> f32;

    /// Zero all accumulated velocity and acceleration on the block
    fn reset_momentum(&mut self, block: BlockId);
}
