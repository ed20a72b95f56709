//! In-memory physics collaborator
//!
//! A deterministic kinematic stand-in for a rigid-body engine: bodies drift
//! with their velocity, lose speed to linear damping and stop at the floor
//! plane. Used by the demo binary and the tests to drive the controller.

use glam::{Quat, Vec3};

use super::physics::PhysicsWorld;
use super::state::{BlockId, Pose};

/// Linear damping rate (1/s)
pub const LINEAR_DAMPING: f32 = 4.0;
/// Below this speed a body is snapped to rest
pub const REST_SPEED: f32 = 0.05;

/// Block width relative to its thickness
const BLOCK_WIDTH_RATIO: f32 = 5.0 / 3.0;

#[derive(Debug, Clone)]
pub struct SandboxBody {
    pub id: BlockId,
    pub pose: Pose,
    pub vel: Vec3,
    /// Simulation is toggled off while a pose is being restored
    pub simulating: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    bodies: Vec<SandboxBody>,
    floor_contacts: Vec<BlockId>,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body at rest, returning its handle
    pub fn spawn(&mut self, pose: Pose) -> BlockId {
        let id = BlockId(self.bodies.len() as u32);
        self.bodies.push(SandboxBody {
            id,
            pose,
            vel: Vec3::ZERO,
            simulating: true,
        });
        id
    }

    pub fn body(&self, block: BlockId) -> Option<&SandboxBody> {
        self.bodies.iter().find(|b| b.id == block)
    }

    fn body_mut(&mut self, block: BlockId) -> Option<&mut SandboxBody> {
        self.bodies.iter_mut().find(|b| b.id == block)
    }

    /// Give a body a velocity (a shove from the input collaborator)
    pub fn push(&mut self, block: BlockId, vel: Vec3) {
        if let Some(body) = self.body_mut(block) {
            body.vel = vel;
        }
    }

    /// Pin a held body at a target, as the input collaborator's physics
    /// handle does. Held bodies carry no momentum.
    pub fn hold_at(&mut self, block: BlockId, target: Vec3) {
        if let Some(body) = self.body_mut(block) {
            body.pose.position = target;
            body.vel = Vec3::ZERO;
        }
    }

    /// Advance all bodies by one step
    pub fn step(&mut self, dt: f32) {
        let damping = (-LINEAR_DAMPING * dt).exp();
        for body in &mut self.bodies {
            if !body.simulating {
                continue;
            }

            let was_above = body.pose.position.z > 0.0;
            body.pose.position += body.vel * dt;

            if body.pose.position.z <= 0.0 {
                body.pose.position.z = 0.0;
                body.vel.z = body.vel.z.max(0.0);
                if was_above {
                    self.floor_contacts.push(body.id);
                }
            }

            body.vel *= damping;
            if body.vel.length() < REST_SPEED {
                body.vel = Vec3::ZERO;
            }
        }
    }

    /// Floor contacts raised since the last drain, in the order they happened
    pub fn drain_floor_contacts(&mut self) -> Vec<BlockId> {
        std::mem::take(&mut self.floor_contacts)
    }
}

impl PhysicsWorld for SandboxWorld {
    fn blocks(&self) -> Vec<BlockId> {
        self.bodies.iter().map(|b| b.id).collect()
    }

    fn pose(&self, block: BlockId) -> Option<Pose> {
        self.body(block).map(|b| b.pose)
    }

    fn set_pose(&mut self, block: BlockId, pose: Pose) {
        if let Some(body) = self.body_mut(block) {
            body.pose = pose;
        }
    }

    fn velocity_magnitude(&self, block: BlockId) -> f32 {
        self.body(block).map(|b| b.vel.length()).unwrap_or(0.0)
    }

    fn reset_momentum(&mut self, block: BlockId) {
        if let Some(body) = self.body_mut(block) {
            body.simulating = false;
            body.vel = Vec3::ZERO;
            body.simulating = true;
        }
    }
}

/// Build a standard tower: three blocks per layer, alternating direction,
/// the bottom layer resting on the floor at z = 0.
pub fn build_tower(layers: u32, block_height: f32) -> SandboxWorld {
    let mut world = SandboxWorld::new();
    let width = block_height * BLOCK_WIDTH_RATIO;

    for layer in 0..layers {
        let z = layer as f32 * block_height;
        let across = layer % 2 == 1;
        let rotation = if across {
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)
        } else {
            Quat::IDENTITY
        };
        for slot in -1..=1 {
            let offset = slot as f32 * width;
            let position = if across {
                Vec3::new(offset, 0.0, z)
            } else {
                Vec3::new(0.0, offset, z)
            };
            world.spawn(Pose::new(position, rotation));
        }
    }
    world
}
