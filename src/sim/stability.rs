//! Tower stability classification
//!
//! Velocity feedback moves the tower between Balanced and Moving. Collapse
//! comes from outside (an unexpected floor strike) and sticks until reset.

use super::physics::PhysicsWorld;
use super::state::{BlockId, TowerStatus};

#[derive(Debug, Clone)]
pub struct StabilityMonitor {
    threshold: f32,
    status: TowerStatus,
}

impl StabilityMonitor {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            status: TowerStatus::Balanced,
        }
    }

    pub fn status(&self) -> TowerStatus {
        self.status
    }

    pub fn is_collapsed(&self) -> bool {
        self.status == TowerStatus::Collapsed
    }

    /// Classify from per-block speeds. A collapsed tower stays collapsed.
    pub fn evaluate_speeds<I>(&mut self, speeds: I) -> TowerStatus
    where
        I: IntoIterator<Item = f32>,
    {
        if self.is_collapsed() {
            return self.status;
        }

        let moving = speeds.into_iter().any(|speed| speed > self.threshold);
        let next = if moving {
            TowerStatus::Moving
        } else {
            TowerStatus::Balanced
        };
        if next != self.status {
            log::debug!("Tower {:?} -> {:?}", self.status, next);
        }
        self.status = next;
        self.status
    }

    /// Sample every block's speed from the physics collaborator
    pub fn evaluate<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        blocks: &[BlockId],
    ) -> TowerStatus {
        self.evaluate_speeds(blocks.iter().map(|&b| world.velocity_magnitude(b)))
    }

    /// Returns true on the transition into Collapsed, false if already down
    pub fn mark_collapsed(&mut self) -> bool {
        let was_collapsed = self.is_collapsed();
        self.status = TowerStatus::Collapsed;
        !was_collapsed
    }

    pub fn reset(&mut self) {
        self.status = TowerStatus::Balanced;
    }
}
