//! Player roster and status line for the presentation layer
//!
//! Widgets and layout belong to the host. This keeps the bits of HUD logic
//! that are game rules: the clamped player count, which of the +/- controls
//! are enabled, and the text describing the latest game event.

use crate::consts::{MAX_PLAYERS, MIN_PLAYERS};
use crate::error::GameResult;
use crate::sim::{GameController, GameEvent, PhysicsWorld};

#[derive(Debug, Clone)]
pub struct Hud {
    player_count: u32,
    status_line: String,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            player_count: MIN_PLAYERS,
            status_line: String::new(),
        }
    }
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_count(&self) -> u32 {
        self.player_count
    }

    pub fn set_player_count(&mut self, n: u32) {
        self.player_count = n.clamp(MIN_PLAYERS, MAX_PLAYERS);
    }

    pub fn add_one_player(&mut self) {
        self.set_player_count(self.player_count.saturating_add(1));
    }

    pub fn remove_one_player(&mut self) {
        self.set_player_count(self.player_count.saturating_sub(1));
    }

    /// Whether the "-" control is enabled
    pub fn can_remove_player(&self) -> bool {
        self.player_count > MIN_PLAYERS
    }

    /// Whether the "+" control is enabled
    pub fn can_add_player(&self) -> bool {
        self.player_count < MAX_PLAYERS
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Start a fresh game with the roster's player count
    pub fn restart<W: PhysicsWorld + ?Sized>(
        &mut self,
        game: &mut GameController,
        world: &mut W,
    ) -> GameResult<()> {
        log::info!("Starting a game with {} player(s)", self.player_count);
        game.new_game(world, self.player_count)?;
        self.sync(game);
        Ok(())
    }

    pub fn undo<W: PhysicsWorld + ?Sized>(
        &mut self,
        game: &mut GameController,
        world: &mut W,
    ) -> GameResult<()> {
        game.undo_round(world)?;
        self.sync(game);
        Ok(())
    }

    pub fn redo<W: PhysicsWorld + ?Sized>(
        &mut self,
        game: &mut GameController,
        world: &mut W,
    ) -> GameResult<()> {
        game.redo_round(world)?;
        self.sync(game);
        Ok(())
    }

    /// Consume the controller's pending events into the status line
    pub fn sync(&mut self, game: &mut GameController) {
        let players = game.turn_state().player_count;
        for event in game.drain_events() {
            self.apply_event(&event, players);
        }
    }

    /// `players` is the running game's count, which the roster only
    /// matches until the next +/- before a restart
    pub fn apply_event(&mut self, event: &GameEvent, players: u32) {
        self.status_line = match *event {
            GameEvent::RoundStarted { turn_index, .. } if players == 1 => {
                format!("Move {}", turn_index + 1)
            }
            GameEvent::RoundStarted { .. } => return,
            GameEvent::TurnChanged { player } => format!("Player {}'s turn", player + 1),
            GameEvent::MoveRejected { .. } => "Place the block on top of the tower".to_string(),
            GameEvent::GameOver {
                player: Some(player),
                ..
            } if players > 1 => {
                format!("Tower collapsed! Player {} loses", player + 1)
            }
            GameEvent::GameOver { .. } => "Tower collapsed!".to_string(),
        };
    }
}
