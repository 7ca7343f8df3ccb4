//! Game entity types. Pure data, no logic.

// ── Field ────────────────────────────────────────────────────────────────────

/// Size of the play field in simulation units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// ── Session lifecycle ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionStatus {
    NotStarted,
    Active,
    Paused,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyPress {
    /// Start / pause / resume / restart, depending on the session status.
    Space,
    Char(char),
}

/// Notifications queued by the session for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    EnemySpawned { id: u32, letter: char },
    Fired { letter: char, count: usize },
    EnemyDestroyed { enemy_id: u32, x: f32, y: f32 },
    EnemiesMissed { count: u32 },
    GameOver { score: u32 },
    RestartRequested,
}

// ── Entities ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: u32,
    /// Centre of the sprite.
    pub x: f32,
    pub y: f32,
    /// Units moved downward per frame.
    pub speed: f32,
    pub letter: char,
    pub width: f32,
    pub height: f32,
}

/// A homing shot. It knows its target only by id; the enemy may already be
/// gone when the projectile next looks for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    /// Target position at launch.
    pub target_x: f32,
    pub target_y: f32,
    pub target_letter: char,
    pub target_enemy_id: u32,
    /// Launch speed.
    pub speed: f32,
    /// Launch heading, already scaled by speed. Used whenever the projectile
    /// is not re-aiming.
    pub dx: f32,
    pub dy: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub frames_remaining: u32,
    /// Sprite frame, 0..=5.
    pub animation_frame: u32,
}

/// Parallax scroll offsets for the three background layers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Backdrop {
    pub far: f32,
    pub middle: f32,
    pub near: f32,
}

/// Memory of the previous letter so enemies come in short runs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LetterStreak {
    pub last_letter: Option<char>,
    pub repeat_count: u32,
}

// ── Master game state ────────────────────────────────────────────────────────

/// Everything the simulation mutates. Cloneable so the pure update
/// functions can return a new copy without touching the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub backdrop: Backdrop,
    pub streak: LetterStreak,
    pub score: u32,
    pub shot_down: u32,
    pub missed: u32,
    pub elapsed_seconds: u32,
    pub frame: u64,
    pub next_enemy_id: u32,
    pub next_projectile_id: u32,
    pub next_explosion_id: u32,
    pub viewport: Viewport,
}

/// What the presentation layer draws each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub status: SessionStatus,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub backdrop: Backdrop,
    pub score: u32,
    pub elapsed_seconds: u32,
    pub shot_down: u32,
    pub missed: u32,
    pub viewport: Viewport,
}
