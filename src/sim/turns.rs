//! Turn cursor and undo/redo bookkeeping
//!
//! `turn_index` walks forward one per completed move and back through undo.
//! `max_moves` remembers the furthest turn reached so redo knows where the
//! timeline ends.

use super::state::TurnState;
use crate::consts::{MAX_PLAYERS, MIN_PLAYERS};
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone)]
pub struct TurnManager {
    turn_index: i32,
    max_moves: i32,
    player_count: u32,
}

impl Default for TurnManager {
    fn default() -> Self {
        Self {
            turn_index: -1,
            max_moves: -1,
            player_count: MIN_PLAYERS,
        }
    }
}

impl TurnManager {
    pub fn new(player_count: u32) -> GameResult<Self> {
        let mut turns = Self::default();
        turns.reset(player_count)?;
        Ok(turns)
    }

    /// Back to "no move taken yet" with a new roster size
    pub fn reset(&mut self, player_count: u32) -> GameResult<()> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(GameError::InvalidState("player count out of range"));
        }
        self.turn_index = -1;
        self.max_moves = -1;
        self.player_count = player_count;
        Ok(())
    }

    pub fn turn_index(&self) -> i32 {
        self.turn_index
    }

    pub fn max_moves(&self) -> i32 {
        self.max_moves
    }

    pub fn player_count(&self) -> u32 {
        self.player_count
    }

    pub fn state(&self) -> TurnState {
        TurnState {
            turn_index: self.turn_index,
            max_moves: self.max_moves,
            player_count: self.player_count,
        }
    }

    pub fn current_player(&self) -> GameResult<u32> {
        if self.turn_index < 0 {
            return Err(GameError::InvalidState("no move has been taken yet"));
        }
        Ok(self.turn_index as u32 % self.player_count)
    }

    pub fn advance(&mut self) {
        self.turn_index += 1;
        self.max_moves = self.max_moves.max(self.turn_index);
    }

    /// Rewind exactly one completed move
    pub fn undo(&mut self) -> GameResult<()> {
        if self.turn_index < 1 {
            return Err(GameError::AtBoundary {
                turn_index: self.turn_index,
            });
        }
        self.turn_index -= 2;
        self.advance();
        Ok(())
    }

    pub fn redo(&mut self) -> GameResult<()> {
        if self.turn_index + 1 > self.max_moves {
            return Err(GameError::AtBoundary {
                turn_index: self.turn_index,
            });
        }
        self.advance();
        Ok(())
    }

    /// True while undone moves are still available to redo
    pub fn has_redo(&self) -> bool {
        self.turn_index < self.max_moves
    }

    /// Forget undone moves: the current turn becomes the end of the timeline
    pub fn truncate_future(&mut self) {
        self.max_moves = self.turn_index;
    }
}
