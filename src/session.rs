use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{ConfigError, GameConfig};
use crate::enemy::step_enemies;
use crate::grid::Grid;
use crate::maze::generate_maze;
use crate::placement::{place_enemies, place_pickups};
use crate::rng::Rng;
use crate::types::{Direction, EnemyView, GameEvent, MazeView, RoundState, Snapshot, Vec2};

fn now_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    now as u64
}

/// The whole game state for one player: maze, entities, score, and the
/// round state machine. All mutation happens through `handle_move` and
/// `step`; both are no-ops outside the active round window.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub config: GameConfig,

    started_at_ms: u64,
    rng: Rng,
    grid: Grid,
    goal: Vec2,
    player: Vec2,
    enemies: Vec<Vec2>,
    pickups: Vec<Vec2>,
    score: u32,
    state: RoundState,
    round: u32,
    tick_counter: u64,
    elapsed_ms: u64,
    enemy_timer_ms: u64,
    restart_at_ms: Option<u64>,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self {
            config,
            started_at_ms: now_ms(),
            rng: Rng::new(seed),
            grid: Grid::solid(config.width, config.height),
            goal: config.goal(),
            player: config.start(),
            enemies: Vec::new(),
            pickups: Vec::new(),
            score: 0,
            state: RoundState::Active,
            round: 0,
            tick_counter: 0,
            elapsed_ms: 0,
            enemy_timer_ms: 0,
            restart_at_ms: None,
            events: Vec::new(),
        };
        session.begin_round();
        Ok(session)
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn player(&self) -> Vec2 {
        self.player
    }

    pub fn goal(&self) -> Vec2 {
        self.goal
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pickups(&self) -> &[Vec2] {
        &self.pickups
    }

    /// Fresh maze, fresh entities, player back on the start cell. The
    /// enemy-tick accumulator restarts so a tick carried over from the
    /// previous maze never fires against the new one.
    fn begin_round(&mut self) {
        let start = self.config.start();
        self.grid = generate_maze(self.config.width, self.config.height, start, &mut self.rng);
        self.enemies = place_enemies(
            &self.grid,
            start,
            self.goal,
            self.config.enemy_count,
            &mut self.rng,
        );
        self.pickups = place_pickups(
            &self.grid,
            start,
            self.goal,
            self.config.pickup_count,
            &mut self.rng,
        );
        self.player = start;
        self.state = RoundState::Active;
        self.enemy_timer_ms = 0;
        self.restart_at_ms = None;
        self.round += 1;
        self.events.push(GameEvent::RoundStarted {
            round: self.round,
            score: self.score,
        });
    }

    /// Advance the session's logical clock. Fires due enemy ticks while
    /// the round is active, and the deferred round transition once its
    /// deadline passes.
    pub fn step(&mut self, dt_ms: u64) {
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);

        if self.state == RoundState::Active {
            self.enemy_timer_ms = self.enemy_timer_ms.saturating_add(dt_ms);
            let mut safety = 0;
            while self.state == RoundState::Active
                && self.enemy_timer_ms >= self.config.enemy_tick_ms
            {
                self.enemy_timer_ms -= self.config.enemy_tick_ms;
                safety += 1;
                if safety > 8 {
                    break;
                }
                step_enemies(&mut self.enemies, &self.grid, &mut self.rng);
                self.check_collision();
            }
            return;
        }

        if let Some(restart_at_ms) = self.restart_at_ms {
            if self.elapsed_ms >= restart_at_ms {
                if self.state == RoundState::Lost {
                    self.score = 0;
                }
                self.begin_round();
            }
        }
    }

    /// A directional move command. Moves into walls or the border are
    /// silently ignored; commands outside the active window do nothing.
    pub fn handle_move(&mut self, dir: Direction) {
        if self.state != RoundState::Active {
            return;
        }
        let next = dir.offset(self.player);
        if !self.grid.in_interior(next.x, next.y) || self.grid.is_wall(next.x, next.y) {
            return;
        }
        self.player = next;
        self.collect_pickups();
        self.check_win();
        // Reaching the goal flips the state, which gates the collision
        // check: a win suppresses a same-move loss.
        if self.state == RoundState::Active {
            self.check_collision();
        }
    }

    fn collect_pickups(&mut self) {
        let player = self.player;
        let before = self.pickups.len();
        self.pickups.retain(|pickup| *pickup != player);
        let collected = (before - self.pickups.len()) as u32;
        if collected > 0 {
            self.score += collected;
            self.events.push(GameEvent::PickupCollected {
                x: player.x,
                y: player.y,
                score: self.score,
            });
        }
    }

    fn check_win(&mut self) {
        if self.player == self.goal {
            self.state = RoundState::Won;
            self.restart_at_ms = Some(self.elapsed_ms + self.config.round_delay_ms);
            self.events.push(GameEvent::RoundWon { score: self.score });
        }
    }

    fn check_collision(&mut self) {
        if self.enemies.iter().any(|enemy| *enemy == self.player) {
            self.state = RoundState::Lost;
            self.restart_at_ms = Some(self.elapsed_ms + self.config.round_delay_ms);
            self.events.push(GameEvent::RoundLost {
                final_score: self.score,
            });
        }
    }

    pub fn maze_view(&self) -> MazeView {
        MazeView {
            width: self.grid.width(),
            height: self.grid.height(),
            tiles: self.grid.rows(),
            start: self.config.start(),
            goal: self.goal,
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            now_ms: self.started_at_ms + self.elapsed_ms,
            round: self.round,
            state: self.state,
            score: self.score,
            player: self.player,
            goal: self.goal,
            enemies: self
                .enemies
                .iter()
                .enumerate()
                .map(|(id, enemy)| EnemyView {
                    id,
                    x: enemy.x,
                    y: enemy.y,
                })
                .collect(),
            pickups: self.pickups.clone(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ENEMY_TICK_MS, ROUND_DELAY_MS};

    fn make_session(seed: u32) -> GameSession {
        GameSession::new(GameConfig::default(), seed).expect("default config is valid")
    }

    /// A session with no enemies or pickups in the way, for move tests.
    fn cleared_session(seed: u32) -> GameSession {
        let mut session = make_session(seed);
        session.enemies.clear();
        session.pickups.clear();
        session
    }

    fn first_open_move(session: &GameSession) -> (Direction, Vec2) {
        for dir in Direction::ALL {
            let next = dir.offset(session.player);
            if session.grid.is_floor(next.x, next.y) {
                return (dir, next);
            }
        }
        panic!("player has no open neighbor");
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = GameConfig {
            width: 10,
            ..GameConfig::default()
        };
        assert!(GameSession::new(config, 1).is_err());
    }

    #[test]
    fn new_session_starts_an_active_round_at_the_start_cell() {
        let mut session = make_session(42);
        assert_eq!(session.state(), RoundState::Active);
        assert_eq!(session.player(), Vec2::new(1, 1));
        assert_eq!(session.round(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.enemies.len(), 3);
        assert_eq!(session.pickups.len(), 5);

        let snapshot = session.build_snapshot(true);
        assert!(matches!(
            snapshot.events.as_slice(),
            [GameEvent::RoundStarted { round: 1, score: 0 }]
        ));
    }

    #[test]
    fn move_onto_open_floor_updates_only_the_player() {
        let mut session = cleared_session(7);
        let (dir, target) = first_open_move(&session);

        session.handle_move(dir);
        assert_eq!(session.player(), target);
        assert_eq!(session.score(), 0);
        assert_eq!(session.state(), RoundState::Active);
    }

    #[test]
    fn move_into_wall_or_border_is_silently_ignored() {
        let mut session = cleared_session(7);
        // (1,1) borders the outer wall above and to the left.
        session.handle_move(Direction::Up);
        assert_eq!(session.player(), Vec2::new(1, 1));
        session.handle_move(Direction::Left);
        assert_eq!(session.player(), Vec2::new(1, 1));
        assert_eq!(session.score(), 0);
        assert_eq!(session.state(), RoundState::Active);
    }

    #[test]
    fn collecting_a_pickup_increments_score_and_removes_it() {
        let mut session = cleared_session(3);
        let (dir, target) = first_open_move(&session);
        session.pickups = vec![target, Vec2::new(9, 9)];
        session.build_snapshot(true);

        session.handle_move(dir);
        assert_eq!(session.score(), 1);
        assert_eq!(session.pickups(), &[Vec2::new(9, 9)]);

        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::PickupCollected { score: 1, .. })));
    }

    #[test]
    fn moving_onto_plain_floor_leaves_pickups_alone() {
        let mut session = cleared_session(3);
        let (dir, _) = first_open_move(&session);
        session.pickups = vec![Vec2::new(9, 9)];

        session.handle_move(dir);
        assert_eq!(session.score(), 0);
        assert_eq!(session.pickups().len(), 1);
    }

    #[test]
    fn reaching_the_goal_wins_and_schedules_a_restart() {
        let mut session = cleared_session(5);
        session.grid.set_floor(18, 19);
        session.player = Vec2::new(18, 19);
        session.score = 4;

        session.handle_move(Direction::Right);
        assert_eq!(session.player(), session.goal());
        assert_eq!(session.state(), RoundState::Won);

        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::RoundWon { score: 4 })));

        // The deferred transition keeps the score and builds a new maze.
        session.step(ROUND_DELAY_MS);
        assert_eq!(session.state(), RoundState::Active);
        assert_eq!(session.score(), 4);
        assert_eq!(session.round(), 2);
        assert_eq!(session.player(), Vec2::new(1, 1));
    }

    #[test]
    fn win_takes_precedence_over_a_same_move_collision() {
        let mut session = cleared_session(5);
        session.grid.set_floor(18, 19);
        session.player = Vec2::new(18, 19);
        session.enemies = vec![session.goal()];

        session.handle_move(Direction::Right);
        assert_eq!(session.state(), RoundState::Won);
    }

    #[test]
    fn moving_onto_an_enemy_loses_and_full_reset_zeroes_the_score() {
        let mut session = cleared_session(9);
        let (dir, target) = first_open_move(&session);
        session.enemies = vec![target];
        session.score = 6;
        session.build_snapshot(true);

        session.handle_move(dir);
        assert_eq!(session.state(), RoundState::Lost);
        assert_eq!(session.score(), 6);

        let snapshot = session.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::RoundLost { final_score: 6 })));

        session.step(ROUND_DELAY_MS);
        assert_eq!(session.state(), RoundState::Active);
        assert_eq!(session.score(), 0);
        assert_eq!(session.round(), 2);
    }

    #[test]
    fn enemy_tick_can_catch_a_stationary_player() {
        let mut session = cleared_session(1);
        // Dead-end corridor: the enemy's only open neighbor is the player.
        let mut grid = Grid::solid(session.config.width, session.config.height);
        grid.set_floor(2, 2);
        grid.set_floor(3, 2);
        session.grid = grid;
        session.player = Vec2::new(3, 2);
        session.enemies = vec![Vec2::new(2, 2)];

        session.step(ENEMY_TICK_MS);
        assert_eq!(session.enemies, vec![Vec2::new(3, 2)]);
        assert_eq!(session.state(), RoundState::Lost);
    }

    #[test]
    fn commands_and_ticks_are_inert_while_the_round_is_won() {
        let mut session = cleared_session(5);
        session.grid.set_floor(18, 19);
        session.player = Vec2::new(18, 19);
        session.enemies = vec![Vec2::new(9, 9)];
        session.handle_move(Direction::Right);
        assert_eq!(session.state(), RoundState::Won);

        let enemies_before = session.enemies.clone();
        let player_before = session.player();
        for dir in Direction::ALL {
            session.handle_move(dir);
        }
        session.step(ENEMY_TICK_MS);
        assert_eq!(session.player(), player_before);
        assert_eq!(session.enemies, enemies_before);
        assert_eq!(session.state(), RoundState::Won);
    }

    #[test]
    fn enemy_timer_restarts_with_the_new_round() {
        let mut session = cleared_session(5);
        // Accumulate most of a tick period, then win.
        session.step(ENEMY_TICK_MS - 100);
        session.grid.set_floor(18, 19);
        session.player = Vec2::new(18, 19);
        session.handle_move(Direction::Right);
        assert_eq!(session.state(), RoundState::Won);

        session.step(ROUND_DELAY_MS);
        assert_eq!(session.state(), RoundState::Active);

        // The carried-over 900ms must not count against the new round.
        let placed = session.enemies.clone();
        session.step(ENEMY_TICK_MS - 1);
        assert_eq!(session.enemies, placed);
        session.step(1);
        assert_ne!(session.enemies, placed);
    }

    #[test]
    fn enemy_ticks_fire_once_per_period() {
        let mut session = make_session(13);
        let placed = session.enemies.clone();
        session.step(ENEMY_TICK_MS - 1);
        assert_eq!(session.enemies, placed);
        session.step(1);
        assert_ne!(session.enemies, placed);
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let mut a = make_session(424_242);
        let mut b = make_session(424_242);
        let mut script = Rng::new(99);

        for _ in 0..500 {
            let dir = Direction::ALL[script.pick_index(4)];
            a.handle_move(dir);
            b.handle_move(dir);
            a.step(250);
            b.step(250);

            let sa = a.build_snapshot(false);
            let sb = b.build_snapshot(false);
            assert_eq!(sa.player, sb.player);
            assert_eq!(sa.enemies, sb.enemies);
            assert_eq!(sa.pickups, sb.pickups);
            assert_eq!(sa.score, sb.score);
            assert_eq!(sa.state, sb.state);
            assert_eq!(sa.round, sb.round);
        }
    }

    #[test]
    fn build_snapshot_drains_events_when_requested() {
        let mut session = make_session(333);
        let first = session.build_snapshot(true);
        assert!(!first.events.is_empty());
        let second = session.build_snapshot(true);
        assert!(second.events.is_empty());
    }

    #[test]
    fn maze_view_matches_the_current_grid() {
        let mut session = make_session(21);
        let view = session.maze_view();
        assert_eq!(view.width, 21);
        assert_eq!(view.height, 21);
        assert_eq!(view.tiles.len(), 21);
        assert_eq!(view.goal, Vec2::new(19, 19));
        assert_eq!(view.tiles[1].as_bytes()[1], b'.');

        // A new round carves a new maze and reports a new view.
        session.grid.set_floor(18, 19);
        session.player = Vec2::new(18, 19);
        session.handle_move(Direction::Right);
        session.step(ROUND_DELAY_MS);
        assert_eq!(session.round(), 2);
        assert_eq!(session.maze_view().tiles.len(), 21);
    }
}
