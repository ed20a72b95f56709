//! Tumble Tower - a turn-based block tower game over a physics simulation
//!
//! Core modules:
//! - `sim`: Game state machine (snapshots, stability, interactivity, turns, controller)
//! - `settings`: Tunables loaded from JSON
//! - `hud`: Player roster and status line for the presentation layer
//! - `error`: Rejected-operation taxonomy

pub mod error;
pub mod hud;
pub mod settings;
pub mod sim;

pub use error::{GameError, GameResult};
pub use hud::Hud;
pub use settings::{PlacementPolicy, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the demo host loop (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Nominal block thickness; half of it is the topmost-band tolerance
    pub const DEFAULT_BLOCK_HEIGHT: f32 = 15.0;
    /// Speed (units/s) above which the tower counts as moving
    pub const DEFAULT_VELOCITY_THRESHOLD: f32 = 7.0;
    /// Maximum per-axis jitter applied at game start
    pub const DEFAULT_JITTER_OFFSET: f32 = 0.05;

    /// Player count limits
    pub const MIN_PLAYERS: u32 = 1;
    pub const MAX_PLAYERS: u32 = 100;
}
