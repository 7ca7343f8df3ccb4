//! Session controller.
//!
//! `Session` owns the game state, the locked character pool, the RNG and
//! the driver clocks. It turns key presses and elapsed time into calls to
//! the pure functions in [`crate::compute`], and reports what happened
//! through an event queue and two handlers.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::clock::{Driver, Scheduler};
use crate::compute;
use crate::config::{normalize_char, CharSelection, GameConfig, Tuning};
use crate::entities::{GameEvent, GameState, KeyPress, SessionStatus, Snapshot, Viewport};
use crate::error::ConfigError;

type GameOverHandler = Box<dyn FnMut(u32)>;
type RestartHandler = Box<dyn FnMut()>;

pub struct Session {
    status: SessionStatus,
    state: GameState,
    tuning: Tuning,
    selection: CharSelection,
    pool: Vec<char>,
    scheduler: Scheduler,
    rng: StdRng,
    events: Vec<GameEvent>,
    game_over_handler: Option<GameOverHandler>,
    restart_handler: Option<RestartHandler>,
}

impl Session {
    /// Build an unstarted session, rejecting tuning the simulation cannot run.
    pub fn new(config: GameConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            status: SessionStatus::NotStarted,
            state: compute::init_state(viewport),
            scheduler: Scheduler::new(&config.tuning),
            pool: config.selection.pool(),
            tuning: config.tuning,
            selection: config.selection,
            rng,
            events: Vec::new(),
            game_over_handler: None,
            restart_handler: None,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Pool locked in by the last `start`.
    pub fn pool(&self) -> &[char] {
        &self.pool
    }

    pub fn selection(&self) -> &CharSelection {
        &self.selection
    }

    /// The selection may only be edited before the session starts.
    pub fn selection_mut(&mut self) -> Option<&mut CharSelection> {
        (self.status == SessionStatus::NotStarted).then_some(&mut self.selection)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status,
            enemies: self.state.enemies.clone(),
            projectiles: self.state.projectiles.clone(),
            explosions: self.state.explosions.clone(),
            backdrop: self.state.backdrop,
            score: self.state.score,
            elapsed_seconds: self.state.elapsed_seconds,
            shot_down: self.state.shot_down,
            missed: self.state.missed,
            viewport: self.state.viewport,
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Boundary with the presentation layer ────────────────────────────────

    /// Called once with the final score when the session is lost.
    pub fn on_game_over(&mut self, handler: impl FnMut(u32) + 'static) {
        self.game_over_handler = Some(Box::new(handler));
    }

    /// Called when the player asks for a fresh session after losing.
    pub fn on_restart(&mut self, handler: impl FnMut() + 'static) {
        self.restart_handler = Some(Box::new(handler));
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    /// Route a key press. Returns the number of projectiles launched.
    pub fn press(&mut self, key: KeyPress) -> usize {
        match (key, self.status) {
            (KeyPress::Space, SessionStatus::NotStarted) => {
                self.start();
                0
            }
            (KeyPress::Space, SessionStatus::Active | SessionStatus::Paused) => {
                self.toggle_pause();
                0
            }
            (KeyPress::Space, SessionStatus::Ended) => {
                self.request_restart();
                0
            }
            (KeyPress::Char(c), SessionStatus::Active) => self.fire(c),
            (KeyPress::Char(_), _) => 0,
        }
    }

    /// NOT_STARTED → ACTIVE. Clears every counter and entity and locks the pool.
    pub fn start(&mut self) -> bool {
        if self.status != SessionStatus::NotStarted {
            return false;
        }
        self.pool = self.selection.pool();
        self.state = compute::init_state(self.state.viewport);
        self.scheduler.reset();
        self.status = SessionStatus::Active;
        self.events.push(GameEvent::Started);
        info!(pool = %self.pool.iter().collect::<String>(), "session started");
        true
    }

    /// ACTIVE ⇄ PAUSED. No-op in any other status.
    pub fn toggle_pause(&mut self) {
        match self.status {
            SessionStatus::Active => {
                self.status = SessionStatus::Paused;
                self.events.push(GameEvent::Paused);
                info!(elapsed = self.state.elapsed_seconds, "session paused");
            }
            SessionStatus::Paused => {
                self.status = SessionStatus::Active;
                self.events.push(GameEvent::Resumed);
                info!("session resumed");
            }
            SessionStatus::NotStarted | SessionStatus::Ended => {}
        }
    }

    /// ENDED → NOT_STARTED, keeping the character selection.
    pub fn request_restart(&mut self) -> bool {
        if self.status != SessionStatus::Ended {
            return false;
        }
        self.status = SessionStatus::NotStarted;
        self.events.push(GameEvent::RestartRequested);
        if let Some(handler) = self.restart_handler.as_mut() {
            handler();
        }
        info!("restart requested");
        true
    }

    // ── Actions (ACTIVE only) ────────────────────────────────────────────────

    /// Launch projectiles at every enemy showing `c`.
    pub fn fire(&mut self, c: char) -> usize {
        if self.status != SessionStatus::Active {
            return 0;
        }
        let Some(letter) = normalize_char(c) else {
            return 0;
        };
        let before = self.state.next_projectile_id;
        self.state = compute::fire(&self.state, letter, &self.tuning);
        let count = (self.state.next_projectile_id - before) as usize;
        if count > 0 {
            self.events.push(GameEvent::Fired { letter, count });
            debug!(%letter, count, "fired");
        }
        count
    }

    pub fn spawn_enemy(&mut self) {
        if self.status != SessionStatus::Active {
            return;
        }
        self.state = compute::spawn(&self.state, &self.pool, &self.tuning, &mut self.rng);
        if let Some(enemy) = self.state.enemies.last() {
            self.events.push(GameEvent::EnemySpawned {
                id: enemy.id,
                letter: enemy.letter,
            });
            debug!(id = enemy.id, letter = %enemy.letter, x = enemy.x, "enemy spawned");
        }
    }

    /// One simulation frame, followed by the loss check.
    pub fn step_frame(&mut self) {
        if self.status != SessionStatus::Active {
            return;
        }
        let (next, report) = compute::tick_with_report(&self.state, &self.tuning);

        if report.escaped > 0 {
            self.events.push(GameEvent::EnemiesMissed {
                count: report.escaped,
            });
            debug!(count = report.escaped, total = next.missed, "enemies got through");
        }
        for enemy in &report.destroyed {
            self.events.push(GameEvent::EnemyDestroyed {
                enemy_id: enemy.id,
                x: enemy.x,
                y: enemy.y,
            });
        }
        if !report.destroyed.is_empty() {
            debug!(hits = report.destroyed.len(), score = next.score, "enemies destroyed");
        }
        trace!(
            frame = next.frame,
            enemies = next.enemies.len(),
            projectiles = next.projectiles.len(),
            "frame"
        );

        self.state = next;
        if self.state.missed >= self.tuning.miss_limit {
            self.end();
        }
    }

    pub fn tick_second(&mut self) {
        if self.status == SessionStatus::Active {
            self.state = compute::tick_second(&self.state);
        }
    }

    pub fn scroll_backdrop(&mut self) {
        if self.status == SessionStatus::Active {
            self.state = compute::scroll(&self.state);
        }
    }

    /// Feed wall-clock time. Drivers only run while ACTIVE; the rest of
    /// `dt` is dropped as soon as the session stops being active.
    pub fn advance(&mut self, dt: Duration) {
        if self.status != SessionStatus::Active {
            return;
        }
        for driver in self.scheduler.advance(dt) {
            if self.status != SessionStatus::Active {
                break;
            }
            match driver {
                Driver::Spawn => self.spawn_enemy(),
                Driver::Frame => self.step_frame(),
                Driver::Second => self.tick_second(),
                Driver::Backdrop => self.scroll_backdrop(),
            }
        }
    }

    fn end(&mut self) {
        self.status = SessionStatus::Ended;
        let score = self.state.score;
        self.events.push(GameEvent::GameOver { score });
        info!(
            score,
            shot_down = self.state.shot_down,
            missed = self.state.missed,
            elapsed = self.state.elapsed_seconds,
            "game over"
        );
        if let Some(handler) = self.game_over_handler.as_mut() {
            handler(score);
        }
    }
}
