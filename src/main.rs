//! Tumble Tower entry point
//!
//! Runs a scripted headless game against the sandbox physics world:
//! players take turns moving the top block, one move is undone and redone,
//! and finally a block is knocked to the floor.

use glam::Vec3;

use tumble_tower::consts::SIM_DT;
use tumble_tower::sim::{
    BlockId, GameController, PhysicsWorld, Pose, SandboxWorld, TowerStatus, build_tower,
};
use tumble_tower::{GameResult, Hud, Settings};

const TOWER_LAYERS: u32 = 18;
/// Give up on a move that never settles
const MAX_SETTLE_TICKS: u32 = 600;

struct Session {
    world: SandboxWorld,
    game: GameController,
    hud: Hud,
}

impl Session {
    fn new(settings: Settings) -> GameResult<Self> {
        let world = build_tower(TOWER_LAYERS, settings.block_height);
        let game = GameController::new(&world, settings)?;
        Ok(Self {
            world,
            game,
            hud: Hud::new(),
        })
    }

    /// Advance physics one step and feed its feedback to the controller
    fn step(&mut self) -> GameResult<TowerStatus> {
        self.world.step(SIM_DT);
        for block in self.world.drain_floor_contacts() {
            self.game.floor_hit(block);
        }
        let status = self.game.tick(&mut self.world, SIM_DT)?;
        self.hud.sync(&mut self.game);
        Ok(status)
    }

    /// Pick the first open block, set it down on top of the tower, let go
    fn play_move(&mut self) -> GameResult<()> {
        let Some(&block) = self.game.interactive_blocks().first() else {
            log::warn!("No block available to pick");
            return Ok(());
        };
        self.game.pick(block)?;

        let top = self
            .game
            .blocks()
            .iter()
            .filter_map(|&b| self.world.pose(b))
            .map(|p| p.z())
            .fold(0.0_f32, f32::max);
        let target = Vec3::new(0.0, 0.0, top + self.game.settings().block_height);
        self.world.hold_at(block, target);
        self.step()?;
        self.game.release()?;
        self.world.push(block, Vec3::new(12.0, 0.0, 0.0));

        let turn = self.game.turn_state().turn_index;
        for _ in 0..MAX_SETTLE_TICKS {
            self.step()?;
            if self.game.turn_state().turn_index != turn
                || self.game.tower_status() == TowerStatus::Collapsed
            {
                break;
            }
        }
        log::info!("{}", self.hud.status_line());
        Ok(())
    }

    /// Shove a mid-tower block off the edge until it lands
    fn knock_over(&mut self, block: BlockId) -> GameResult<()> {
        let Some(pose) = self.world.pose(block) else {
            return Ok(());
        };
        self.world
            .set_pose(block, Pose::new(pose.position + Vec3::X * 60.0, pose.rotation));
        self.world.push(block, Vec3::new(0.0, 0.0, -2000.0));
        for _ in 0..MAX_SETTLE_TICKS {
            self.step()?;
            if self.game.tower_status() == TowerStatus::Collapsed {
                break;
            }
        }
        log::info!("{}", self.hud.status_line());
        Ok(())
    }
}

fn run() -> GameResult<()> {
    let settings = match std::env::args().nth(1) {
        Some(json) => Settings::from_json(&json),
        None => Settings::default(),
    };
    let mut session = Session::new(settings)?;

    session.hud.set_player_count(3);
    let Session { world, game, hud } = &mut session;
    hud.restart(game, world)?;
    log::info!("{}", hud.status_line());

    for _ in 0..4 {
        session.play_move()?;
    }

    let Session { world, game, hud } = &mut session;
    hud.undo(game, world)?;
    log::info!("After undo: {}", hud.status_line());
    hud.redo(game, world)?;
    log::info!("After redo: {}", hud.status_line());

    let victim = session.game.blocks()[(TOWER_LAYERS as usize / 2) * 3];
    session.knock_over(victim)?;

    let state = session.game.turn_state();
    println!(
        "Game over after {} move(s) by {} players: {:?}",
        state.turn_index,
        state.player_count,
        session.game.tower_status()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Tumble Tower (headless) starting...");

    if let Err(e) = run() {
        log::error!("Demo aborted: {e}");
        std::process::exit(1);
    }
}
