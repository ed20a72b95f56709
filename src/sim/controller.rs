//! Game orchestrator
//!
//! The only component the host talks to. Input reports picks and releases,
//! physics reports per-tick speeds (through [`PhysicsWorld`]) and floor
//! contacts, the HUD starts games and walks the history. The controller
//! sequences a move through pick, drag, release and settle, then advances
//! the round.
//!
//! All operations take `&mut self`, so the host's loop serializes them;
//! floor contacts raised between ticks are forwarded on the same thread.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::interactivity::{InteractivityGate, topmost_blocks};
use super::physics::PhysicsWorld;
use super::snapshot::{ConfigurationHistory, TowerConfiguration, apply, capture, jitter};
use super::stability::StabilityMonitor;
use super::state::{BlockId, GameEvent, PickState, TowerStatus, TurnState};
use super::turns::TurnManager;
use crate::error::{GameError, GameResult};
use crate::settings::{PlacementPolicy, Settings};

#[derive(Debug, Clone)]
pub struct GameController {
    settings: Settings,
    /// Stable block order shared by every configuration
    blocks: Vec<BlockId>,
    pristine: TowerConfiguration,
    history: ConfigurationHistory,
    turns: TurnManager,
    stability: StabilityMonitor,
    gate: InteractivityGate,
    pick: PickState,
    /// Blocks whose floor contact is expected
    grounded: BTreeSet<BlockId>,
    rng: Pcg32,
    events: Vec<GameEvent>,
    /// Simulated seconds ticked in the current game
    elapsed: f32,
}

impl GameController {
    /// Capture the freshly loaded tower as the pristine configuration.
    /// No game is running until [`new_game`](Self::new_game) is called.
    pub fn new<W: PhysicsWorld + ?Sized>(world: &W, settings: Settings) -> GameResult<Self> {
        let settings = settings.sanitized();
        let mut blocks = world.blocks();
        blocks.sort_unstable();
        blocks.dedup();
        let pristine = capture(world, &blocks)?;
        log::info!("Tower loaded with {} blocks", blocks.len());

        Ok(Self {
            stability: StabilityMonitor::new(settings.velocity_threshold),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            blocks,
            pristine,
            history: ConfigurationHistory::new(),
            turns: TurnManager::default(),
            gate: InteractivityGate::new(),
            pick: PickState::default(),
            grounded: BTreeSet::new(),
            events: Vec::new(),
            elapsed: 0.0,
        })
    }

    /// Reset to the pristine tower and start round one
    pub fn new_game<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        player_count: u32,
    ) -> GameResult<()> {
        self.turns.reset(player_count)?;
        self.pick.clear();
        self.stability.reset();
        self.gate.clear();
        self.elapsed = 0.0;

        apply(world, &self.blocks, &self.pristine)?;
        self.history.clear();
        self.grounded = self
            .blocks
            .iter()
            .zip(self.pristine.poses())
            .filter(|(_, pose)| pose.z() == 0.0)
            .map(|(&block, _)| block)
            .collect();

        jitter(
            world,
            &self.blocks,
            self.settings.jitter_max_offset,
            &mut self.rng,
        );

        log::info!(
            "New game: {} player(s), {} grounded block(s)",
            player_count,
            self.grounded.len()
        );
        self.advance_round(&*world)
    }

    /// Take hold of an interactive block
    pub fn pick(&mut self, block: BlockId) -> GameResult<()> {
        if self.stability.is_collapsed() || !self.gate.is_interactive(block) {
            log::warn!("Rejected pick of block {block}");
            return Err(GameError::IllegalPick(block));
        }

        self.pick = PickState {
            picked: Some(block),
            is_held: true,
        };
        self.grounded.remove(&block);
        self.gate.hold(block);
        log::debug!("Picked block {block}");
        Ok(())
    }

    /// Let go of the held block. The round ends once the tower settles.
    pub fn release(&mut self) -> GameResult<()> {
        let Some(block) = self.pick.picked else {
            return Err(GameError::InvalidState("no block is picked"));
        };
        self.pick.is_held = false;
        log::debug!("Released block {block}");
        Ok(())
    }

    /// Advance the game clock; checks stability while a move is in flight
    pub fn tick<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        dt: f32,
    ) -> GameResult<TowerStatus> {
        if self.stability.is_collapsed() {
            return Ok(TowerStatus::Collapsed);
        }
        if self.turns.turn_index() >= 0 {
            self.elapsed += dt;
        }
        let Some(block) = self.pick.picked else {
            return Ok(self.stability.status());
        };

        let status = self.stability.evaluate(&*world, &self.blocks);
        if self.pick.is_held {
            return Ok(status);
        }

        if status == TowerStatus::Balanced {
            log::debug!("Block {block} settled at {:.2}s", self.elapsed);
            self.complete_move(world, block)?;
        }
        Ok(self.stability.status())
    }

    /// Floor contact reported by the physics collaborator.
    ///
    /// Returns true when this contact collapsed the tower.
    pub fn floor_hit(&mut self, block: BlockId) -> bool {
        if self.grounded.contains(&block) || self.pick.held_block() == Some(block) {
            return false;
        }
        if self.blocks.binary_search(&block).is_err() {
            log::warn!("Floor contact from unknown block {block}");
            return false;
        }

        let collapsed_now = self.stability.mark_collapsed();
        self.gate.clear();
        self.pick.clear();

        if collapsed_now {
            let turn_index = self.turns.turn_index();
            let player = self.turns.current_player().ok();
            log::info!("Tower collapsed on turn {turn_index}: block {block} hit the floor");
            self.events.push(GameEvent::GameOver {
                turn_index,
                player,
                block,
            });
        }
        collapsed_now
    }

    /// Step back one completed move
    pub fn undo_round<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> GameResult<()> {
        self.ensure_standing()?;
        self.turns.undo()?;
        log::info!("Undo to turn {}", self.turns.turn_index());
        self.replay_round(world)
    }

    /// Step forward through an undone move
    pub fn redo_round<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> GameResult<()> {
        self.ensure_standing()?;
        self.turns.redo()?;
        log::info!("Redo to turn {}", self.turns.turn_index());
        self.replay_round(world)
    }

    /// Queued notifications for the presentation layer, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn current_player(&self) -> GameResult<u32> {
        self.turns.current_player()
    }

    /// Simulated seconds since the game started, frozen on collapse
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn tower_status(&self) -> TowerStatus {
        self.stability.status()
    }

    pub fn turn_state(&self) -> TurnState {
        self.turns.state()
    }

    pub fn pick_state(&self) -> PickState {
        self.pick
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_entry(&self, turn_index: i32) -> Option<&TowerConfiguration> {
        self.history.get(turn_index)
    }

    pub fn is_interactive(&self, block: BlockId) -> bool {
        self.gate.is_interactive(block)
    }

    pub fn interactive_blocks(&self) -> Vec<BlockId> {
        self.gate.interactive_blocks().collect()
    }

    pub fn highlighted(&self) -> Option<BlockId> {
        self.gate.highlighted()
    }

    pub fn is_grounded(&self, block: BlockId) -> bool {
        self.grounded.contains(&block)
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn ensure_standing(&self) -> GameResult<()> {
        if self.stability.is_collapsed() {
            return Err(GameError::InvalidState("tower has collapsed"));
        }
        Ok(())
    }

    /// A released block came to rest: accept or reject the placement
    fn complete_move<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        block: BlockId,
    ) -> GameResult<()> {
        if self.settings.placement_policy == PlacementPolicy::RequireTopmost {
            let current = capture(&*world, &self.blocks)?;
            let on_top = topmost_blocks(
                &self.blocks,
                current.poses(),
                self.settings.topmost_tolerance(),
            );
            if !on_top.contains(&block) {
                log::info!(
                    "Block {block} left below the top layer, turn {} restarts",
                    self.turns.turn_index()
                );
                self.events.push(GameEvent::MoveRejected { block });
                self.restore_current(world)?;
                return self.open_round(&*world);
            }
        }

        if self.turns.has_redo() {
            self.history.truncate_after(self.turns.turn_index());
            self.turns.truncate_future();
        }
        self.advance_round(&*world)
    }

    /// Move the cursor onto a fresh round and record its opening snapshot
    fn advance_round<W: PhysicsWorld + ?Sized>(&mut self, world: &W) -> GameResult<()> {
        self.turns.advance();
        let turn_index = self.turns.turn_index();
        // Rewound rounds were truncated before any new move got here
        debug_assert_eq!(turn_index as usize, self.history.len());

        self.history.push(capture(&*world, &self.blocks)?);
        log::info!("Turn {turn_index} begins");
        self.events.push(GameEvent::RoundStarted {
            turn_index,
            replayed: false,
        });
        self.open_round(&*world)
    }

    /// Restore the snapshot recorded for the current turn
    fn replay_round<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> GameResult<()> {
        self.restore_current(world)?;
        self.stability.reset();
        self.events.push(GameEvent::RoundStarted {
            turn_index: self.turns.turn_index(),
            replayed: true,
        });
        self.open_round(&*world)
    }

    fn restore_current<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> GameResult<()> {
        let configuration = self
            .history
            .get(self.turns.turn_index())
            .ok_or(GameError::InvalidState("no snapshot for the current turn"))?;
        apply(world, &self.blocks, configuration)?;

        // Anything resting in the bottom band is expected to touch the floor
        let tolerance = self.settings.topmost_tolerance();
        self.grounded = self
            .blocks
            .iter()
            .zip(configuration.poses())
            .filter(|(_, pose)| pose.z() < tolerance)
            .map(|(&block, _)| block)
            .collect();
        Ok(())
    }

    /// Open the top layer for picking and announce whose turn it is
    fn open_round<W: PhysicsWorld + ?Sized>(&mut self, world: &W) -> GameResult<()> {
        let current = capture(world, &self.blocks)?;
        self.gate.open_round(
            &self.blocks,
            current.poses(),
            self.settings.topmost_tolerance(),
        );
        self.pick.clear();

        if self.turns.player_count() > 1 {
            let player = self.turns.current_player()?;
            self.events.push(GameEvent::TurnChanged { player });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::sandbox::{SandboxWorld, build_tower};
    use glam::Vec3;

    fn settings() -> Settings {
        Settings {
            jitter_max_offset: 0.0,
            ..Default::default()
        }
    }

    fn started(layers: u32, players: u32) -> (SandboxWorld, GameController) {
        let mut world = build_tower(layers, 15.0);
        let mut game = GameController::new(&world, settings()).unwrap();
        game.new_game(&mut world, players).unwrap();
        (world, game)
    }

    #[test]
    fn test_new_game_first_round() {
        let (_world, mut game) = started(3, 2);
        assert_eq!(game.turn_state().turn_index, 0);
        assert_eq!(game.current_player(), Ok(0));
        assert_eq!(game.tower_status(), TowerStatus::Balanced);
        assert_eq!(game.history_len(), 1);
        assert_eq!(
            game.interactive_blocks(),
            vec![BlockId(6), BlockId(7), BlockId(8)]
        );
        assert!(game.is_grounded(BlockId(0)));
        assert!(!game.is_grounded(BlockId(3)));
        assert_eq!(
            game.drain_events(),
            vec![
                GameEvent::RoundStarted {
                    turn_index: 0,
                    replayed: false
                },
                GameEvent::TurnChanged { player: 0 },
            ]
        );
    }

    #[test]
    fn test_single_player_has_no_turn_notifications() {
        let (_world, mut game) = started(2, 1);
        assert!(
            !game
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::TurnChanged { .. }))
        );
    }

    #[test]
    fn test_new_game_rejects_bad_player_count() {
        let mut world = build_tower(2, 15.0);
        let mut game = GameController::new(&world, settings()).unwrap();
        assert!(matches!(
            game.new_game(&mut world, 0),
            Err(GameError::InvalidState(_))
        ));
        assert_eq!(game.turn_state().turn_index, -1);
    }

    #[test]
    fn test_pick_before_new_game_rejected() {
        let world = build_tower(2, 15.0);
        let mut game = GameController::new(&world, settings()).unwrap();
        assert_eq!(game.pick(BlockId(4)), Err(GameError::IllegalPick(BlockId(4))));
    }

    #[test]
    fn test_pick_locks_out_other_blocks() {
        let (_world, mut game) = started(3, 2);
        game.pick(BlockId(7)).unwrap();
        assert_eq!(game.interactive_blocks(), vec![BlockId(7)]);
        assert_eq!(game.highlighted(), Some(BlockId(7)));
        assert_eq!(game.pick(BlockId(6)), Err(GameError::IllegalPick(BlockId(6))));
        assert_eq!(game.pick(BlockId(0)), Err(GameError::IllegalPick(BlockId(0))));
    }

    #[test]
    fn test_release_without_pick() {
        let (_world, mut game) = started(2, 1);
        assert!(matches!(game.release(), Err(GameError::InvalidState(_))));
    }

    #[test]
    fn test_tick_idle_is_noop() {
        let (mut world, mut game) = started(2, 1);
        world.push(BlockId(0), Vec3::new(50.0, 0.0, 0.0));
        assert_eq!(game.tick(&mut world, SIM_DT), Ok(TowerStatus::Balanced));
        assert_eq!(game.turn_state().turn_index, 0);
    }

    #[test]
    fn test_held_block_never_ends_turn() {
        let (mut world, mut game) = started(3, 2);
        game.pick(BlockId(8)).unwrap();
        for _ in 0..10 {
            assert_eq!(game.tick(&mut world, SIM_DT), Ok(TowerStatus::Balanced));
        }
        assert_eq!(game.turn_state().turn_index, 0);
    }

    #[test]
    fn test_move_completes_after_settle() {
        let (mut world, mut game) = started(3, 2);
        game.drain_events();

        // Lay the block across the top and let it slide a little
        game.pick(BlockId(8)).unwrap();
        world.set_pose(BlockId(8), crate::sim::Pose::at(Vec3::new(0.0, 0.0, 45.0)));
        world.push(BlockId(8), Vec3::new(10.0, 0.0, 0.0));
        game.release().unwrap();

        world.step(SIM_DT);
        assert_eq!(game.tick(&mut world, SIM_DT), Ok(TowerStatus::Moving));
        assert_eq!(game.turn_state().turn_index, 0);

        for _ in 0..300 {
            world.step(SIM_DT);
            game.tick(&mut world, SIM_DT).unwrap();
            if game.turn_state().turn_index == 1 {
                break;
            }
        }
        assert_eq!(game.turn_state().turn_index, 1);
        assert_eq!(game.current_player(), Ok(1));
        assert_eq!(game.history_len(), 2);
        assert_eq!(game.pick_state(), PickState::default());
        assert_eq!(game.interactive_blocks(), vec![BlockId(8)]);
    }

    #[test]
    fn test_placement_below_top_rejected() {
        let (mut world, mut game) = started(3, 2);
        game.drain_events();

        game.pick(BlockId(8)).unwrap();
        world.set_pose(BlockId(8), crate::sim::Pose::at(Vec3::new(40.0, 0.0, 5.0)));
        game.release().unwrap();
        game.tick(&mut world, SIM_DT).unwrap();

        assert_eq!(game.turn_state().turn_index, 0);
        assert_eq!(
            game.drain_events()[0],
            GameEvent::MoveRejected { block: BlockId(8) }
        );
        assert_eq!(world.pose(BlockId(8)).unwrap().z(), 30.0);
        assert!(game.is_interactive(BlockId(6)));
        assert!(game.is_interactive(BlockId(8)));
    }

    #[test]
    fn test_accept_any_advances_on_low_placement() {
        let mut world = build_tower(3, 15.0);
        let mut game = GameController::new(
            &world,
            Settings {
                placement_policy: PlacementPolicy::AcceptAny,
                ..settings()
            },
        )
        .unwrap();
        game.new_game(&mut world, 2).unwrap();

        game.pick(BlockId(8)).unwrap();
        world.set_pose(BlockId(8), crate::sim::Pose::at(Vec3::new(40.0, 0.0, 5.0)));
        game.release().unwrap();
        game.tick(&mut world, SIM_DT).unwrap();
        assert_eq!(game.turn_state().turn_index, 1);
    }

    #[test]
    fn test_floor_hit_filters() {
        let (_world, mut game) = started(3, 2);
        assert!(!game.floor_hit(BlockId(0)));
        game.pick(BlockId(7)).unwrap();
        assert!(!game.floor_hit(BlockId(7)));
        assert!(!game.floor_hit(BlockId(99)));
        assert_eq!(game.tower_status(), TowerStatus::Balanced);
    }

    #[test]
    fn test_floor_hit_collapses_once() {
        let (mut world, mut game) = started(3, 2);
        game.drain_events();
        game.pick(BlockId(7)).unwrap();

        assert!(game.floor_hit(BlockId(4)));
        assert!(!game.floor_hit(BlockId(5)));
        assert_eq!(game.tower_status(), TowerStatus::Collapsed);
        assert!(game.interactive_blocks().is_empty());
        assert_eq!(game.highlighted(), None);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::GameOver {
                turn_index: 0,
                player: Some(0),
                block: BlockId(4),
            }]
        );

        assert_eq!(game.pick(BlockId(7)), Err(GameError::IllegalPick(BlockId(7))));
        assert!(matches!(game.undo_round(&mut world), Err(GameError::InvalidState(_))));

        game.new_game(&mut world, 2).unwrap();
        assert_eq!(game.tower_status(), TowerStatus::Balanced);
        assert!(game.pick(BlockId(7)).is_ok());
    }

    #[test]
    fn test_released_block_hitting_floor_collapses() {
        let (_world, mut game) = started(3, 2);
        game.pick(BlockId(7)).unwrap();
        game.release().unwrap();
        assert!(game.floor_hit(BlockId(7)));
    }

    #[test]
    fn test_picked_floor_block_loses_grounding() {
        let (_world, mut game) = started(1, 2);
        assert!(game.is_grounded(BlockId(1)));
        assert!(!game.floor_hit(BlockId(1)));

        game.pick(BlockId(1)).unwrap();
        assert!(!game.is_grounded(BlockId(1)));
        assert!(game.is_grounded(BlockId(0)));
        game.release().unwrap();
        assert!(game.floor_hit(BlockId(1)));
        assert_eq!(game.tower_status(), TowerStatus::Collapsed);
    }

    #[test]
    fn test_elapsed_covers_whole_game() {
        let mut world = build_tower(3, 15.0);
        let mut game = GameController::new(&world, settings()).unwrap();
        game.tick(&mut world, 1.0).unwrap();
        assert_eq!(game.elapsed(), 0.0);

        game.new_game(&mut world, 2).unwrap();
        for _ in 0..4 {
            game.tick(&mut world, 0.5).unwrap();
        }
        game.pick(BlockId(8)).unwrap();
        game.tick(&mut world, 0.5).unwrap();
        assert_eq!(game.elapsed(), 2.5);

        game.floor_hit(BlockId(4));
        game.tick(&mut world, 0.5).unwrap();
        assert_eq!(game.elapsed(), 2.5);

        game.new_game(&mut world, 2).unwrap();
        assert_eq!(game.elapsed(), 0.0);
    }

    #[test]
    fn test_undo_redo_at_boundaries() {
        let (mut world, mut game) = started(3, 2);
        assert_eq!(
            game.undo_round(&mut world),
            Err(GameError::AtBoundary { turn_index: 0 })
        );
        assert_eq!(
            game.redo_round(&mut world),
            Err(GameError::AtBoundary { turn_index: 0 })
        );
    }
}
