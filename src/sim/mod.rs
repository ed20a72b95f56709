//! Game state machine
//!
//! Pure turn and move logic over an external physics collaborator:
//! - Fixed block order, captured once per load
//! - Seeded RNG only (jitter)
//! - No rendering, input-device or engine dependencies

pub mod controller;
pub mod interactivity;
pub mod physics;
pub mod sandbox;
pub mod snapshot;
pub mod stability;
pub mod state;
pub mod turns;

pub use controller::GameController;
pub use interactivity::{InteractivityGate, topmost_blocks};
pub use physics::PhysicsWorld;
pub use sandbox::{SandboxWorld, build_tower};
pub use snapshot::{ConfigurationHistory, TowerConfiguration, apply, capture, jitter};
pub use stability::StabilityMonitor;
pub use state::{BlockId, GameEvent, PickState, Pose, TowerStatus, TurnState};
pub use turns::TurnManager;
