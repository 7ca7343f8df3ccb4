//! Tuning constants, the character pool, and the selection edited on the
//! start screen.

use std::time::Duration;

use crate::error::ConfigError;

// ── Defaults ─────────────────────────────────────────────────────────────────

/// Pool used when nothing is selected.
pub const DEFAULT_POOL: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Selector layout, one string per keyboard row.
pub const KEYBOARD_ROWS: [&str; 4] = ["1234567890", "QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

pub const STREAK_CHANCE: f64 = 0.4;
pub const MAX_STREAK: u32 = 5;

/// Projectile speed when first launched (units per frame).
pub const LAUNCH_SPEED: f32 = 8.0;
/// Projectile speed while re-aiming at a live target (units per frame).
pub const HOMING_SPEED: f32 = 10.0;
/// Below this distance a projectile stops re-aiming and flies straight.
pub const HOMING_RADIUS: f32 = 50.0;

pub const EXPLOSION_FRAMES: u32 = 20;
pub const SCORE_PER_KILL: u32 = 10;
pub const MISS_LIMIT: u32 = 60;

pub const FRAME_PERIOD: Duration = Duration::from_millis(16);
pub const SPAWN_PERIOD: Duration = Duration::from_millis(2000);
pub const CLOCK_PERIOD: Duration = Duration::from_millis(1000);
pub const BACKDROP_PERIOD: Duration = Duration::from_millis(33);

// ── Tuning ───────────────────────────────────────────────────────────────────

/// Every gameplay constant a session reads.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    /// Chance of an enemy reusing the previous letter.
    pub streak_chance: f64,
    /// Longest run of one letter the streak may produce.
    pub max_streak: u32,
    pub launch_speed: f32,
    pub homing_speed: f32,
    pub homing_radius: f32,
    pub explosion_frames: u32,
    pub score_per_kill: u32,
    /// Session ends once this many enemies got through.
    pub miss_limit: u32,
    pub frame_period: Duration,
    pub spawn_period: Duration,
    pub clock_period: Duration,
    pub backdrop_period: Duration,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            streak_chance: STREAK_CHANCE,
            max_streak: MAX_STREAK,
            launch_speed: LAUNCH_SPEED,
            homing_speed: HOMING_SPEED,
            homing_radius: HOMING_RADIUS,
            explosion_frames: EXPLOSION_FRAMES,
            score_per_kill: SCORE_PER_KILL,
            miss_limit: MISS_LIMIT,
            frame_period: FRAME_PERIOD,
            spawn_period: SPAWN_PERIOD,
            clock_period: CLOCK_PERIOD,
            backdrop_period: BACKDROP_PERIOD,
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.streak_chance) {
            return Err(ConfigError::StreakChance(self.streak_chance));
        }
        if self.miss_limit == 0 {
            return Err(ConfigError::ZeroMissLimit);
        }
        let periods = [
            ("frame", self.frame_period),
            ("spawn", self.spawn_period),
            ("clock", self.clock_period),
            ("backdrop", self.backdrop_period),
        ];
        for (name, period) in periods {
            if period.is_zero() {
                return Err(ConfigError::ZeroPeriod(name));
            }
        }
        Ok(())
    }
}

// ── Character selection ──────────────────────────────────────────────────────

/// Canned selections offered on the start screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Preset {
    /// F and J, the home-row anchors.
    HomeRow,
    /// A S D F.
    LeftHand,
}

impl Preset {
    pub fn chars(self) -> &'static str {
        match self {
            Preset::HomeRow => "FJ",
            Preset::LeftHand => "ASDF",
        }
    }
}

/// Upper-cases `c` and checks it is a legal target character.
pub fn normalize_char(c: char) -> Option<char> {
    let c = c.to_ascii_uppercase();
    c.is_ascii_alphanumeric().then_some(c)
}

/// Ordered set of characters the player chose to practise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharSelection {
    chars: Vec<char>,
}

impl CharSelection {
    /// Builds a selection from user text, rejecting anything outside A-Z/0-9.
    /// Duplicates collapse; lowercase is accepted.
    pub fn from_chars(text: &str) -> Result<Self, ConfigError> {
        let mut selection = Self::default();
        for c in text.chars() {
            let c = normalize_char(c).ok_or(ConfigError::InvalidChar(c))?;
            if !selection.contains(c) {
                selection.chars.push(c);
            }
        }
        Ok(selection)
    }

    /// Adds or removes `c`. Returns false when `c` is not selectable.
    pub fn toggle(&mut self, c: char) -> bool {
        let Some(c) = normalize_char(c) else {
            return false;
        };
        if let Some(pos) = self.chars.iter().position(|&x| x == c) {
            self.chars.remove(pos);
        } else {
            self.chars.push(c);
        }
        true
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    pub fn apply(&mut self, preset: Preset) {
        self.chars = preset.chars().chars().collect();
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c.to_ascii_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// The pool a session locks in: the selection, or the full default set.
    pub fn pool(&self) -> Vec<char> {
        if self.chars.is_empty() {
            DEFAULT_POOL.chars().collect()
        } else {
            self.chars.clone()
        }
    }
}

// ── Session config ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub selection: CharSelection,
    /// Fixed RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tuning.validate()
    }
}
