//! Pure game-logic functions.
//!
//! Every public function takes immutable inputs (and, where needed, an RNG
//! handle) and returns brand-new values. Side effects are limited to the
//! injected RNG, so a seeded RNG replays a session exactly.

use rand::Rng;

use crate::config::{Tuning, DEFAULT_POOL};
use crate::entities::{
    Backdrop, Enemy, Explosion, GameState, LetterStreak, Projectile, Viewport,
};

// ── Geometry ─────────────────────────────────────────────────────────────────

pub const ENEMY_SIZE: f32 = 40.0;
/// Enemies appear just above the visible field.
pub const SPAWN_Y: f32 = -50.0;
/// Spawn x keeps this distance from both side edges.
pub const SPAWN_MARGIN: f32 = 25.0;
pub const MIN_ENEMY_SPEED: f32 = 1.0;
pub const MAX_ENEMY_SPEED: f32 = 2.5;
pub const PROJECTILE_HALF_SIZE: f32 = 5.0;
/// Launch point height above the bottom edge (top of the player sprite).
pub const LAUNCH_OFFSET: f32 = 140.0;
pub const MAX_ANIMATION_FRAME: u32 = 5;
pub const BACKDROP_WRAP: f32 = 1080.0;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Empty field with all counters at zero.
pub fn init_state(viewport: Viewport) -> GameState {
    GameState {
        enemies: Vec::new(),
        projectiles: Vec::new(),
        explosions: Vec::new(),
        backdrop: Backdrop::default(),
        streak: LetterStreak::default(),
        score: 0,
        shot_down: 0,
        missed: 0,
        elapsed_seconds: 0,
        frame: 0,
        next_enemy_id: 0,
        next_projectile_id: 0,
        next_explosion_id: 0,
        viewport,
    }
}

// ── Enemy factory ────────────────────────────────────────────────────────────

/// Pick the next enemy letter.
///
/// While the previous letter is still in the pool and its run is shorter
/// than `max_streak`, it is reused with probability `streak_chance`.
/// Otherwise a fresh letter is drawn uniformly and the run restarts at 1.
pub fn next_letter(
    streak: &LetterStreak,
    pool: &[char],
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> (char, LetterStreak) {
    if let Some(last) = streak.last_letter {
        if streak.repeat_count < tuning.max_streak
            && pool.contains(&last)
            && rng.gen_bool(tuning.streak_chance)
        {
            let next = LetterStreak {
                last_letter: Some(last),
                repeat_count: streak.repeat_count + 1,
            };
            return (last, next);
        }
    }

    let letter = if pool.is_empty() {
        let bytes = DEFAULT_POOL.as_bytes();
        bytes[rng.gen_range(0..bytes.len())] as char
    } else {
        pool[rng.gen_range(0..pool.len())]
    };
    let next = LetterStreak {
        last_letter: Some(letter),
        repeat_count: 1,
    };
    (letter, next)
}

/// Build a new enemy above the field. Returns the streak to carry forward.
pub fn spawn_enemy(
    id: u32,
    width: f32,
    pool: &[char],
    streak: &LetterStreak,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> (Enemy, LetterStreak) {
    let (letter, streak) = next_letter(streak, pool, tuning, rng);
    let x = if width >= 2.0 * SPAWN_MARGIN {
        rng.gen_range(SPAWN_MARGIN..=width - SPAWN_MARGIN)
    } else {
        width / 2.0
    };
    let enemy = Enemy {
        id,
        x,
        y: SPAWN_Y,
        speed: rng.gen_range(MIN_ENEMY_SPEED..=MAX_ENEMY_SPEED),
        letter,
        width: ENEMY_SIZE,
        height: ENEMY_SIZE,
    };
    (enemy, streak)
}

pub fn advance_enemy(enemy: &Enemy) -> Enemy {
    Enemy {
        y: enemy.y + enemy.speed,
        ..enemy.clone()
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// Where every projectile starts: centre column, just above the player.
/// On fields shorter than twice the offset it sits at mid-height so shots
/// never start outside the field.
pub fn launch_origin(viewport: Viewport) -> (f32, f32) {
    let y = (viewport.height - LAUNCH_OFFSET).max(viewport.height / 2.0);
    (viewport.width / 2.0, y)
}

/// Velocity of length `speed` pointing from one point to another, or `None`
/// when the two points coincide.
fn heading(from: (f32, f32), to: (f32, f32), speed: f32) -> Option<(f32, f32)> {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let length = dx.hypot(dy);
    if length <= f32::EPSILON {
        return None;
    }
    Some((dx / length * speed, dy / length * speed))
}

/// Aim a new projectile at `target`'s current position.
pub fn launch_projectile(id: u32, origin: (f32, f32), target: &Enemy, speed: f32) -> Projectile {
    let (dx, dy) = heading(origin, (target.x, target.y), speed).unwrap_or((0.0, -speed));
    Projectile {
        id,
        x: origin.0,
        y: origin.1,
        target_x: target.x,
        target_y: target.y,
        target_letter: target.letter,
        target_enemy_id: target.id,
        speed,
        dx,
        dy,
    }
}

fn fly_straight(projectile: &Projectile) -> Projectile {
    Projectile {
        x: projectile.x + projectile.dx,
        y: projectile.y + projectile.dy,
        ..projectile.clone()
    }
}

/// Move a projectile one frame.
///
/// The target is looked up by id. A missing target, or one closer than
/// `homing_radius`, means the projectile flies on its launch heading.
/// Otherwise it steps toward the target's current position at
/// `homing_speed`; the stored heading is left untouched.
pub fn steer_projectile(projectile: &Projectile, enemies: &[Enemy], tuning: &Tuning) -> Projectile {
    let Some(target) = enemies.iter().find(|e| e.id == projectile.target_enemy_id) else {
        return fly_straight(projectile);
    };

    let from = (projectile.x, projectile.y);
    let to = (target.x, target.y);
    let distance = (to.0 - from.0).hypot(to.1 - from.1);
    if distance < tuning.homing_radius {
        return fly_straight(projectile);
    }

    match heading(from, to, tuning.homing_speed) {
        Some((dx, dy)) => Projectile {
            x: projectile.x + dx,
            y: projectile.y + dy,
            ..projectile.clone()
        },
        None => fly_straight(projectile),
    }
}

/// Projectiles touching the top or bottom edge are dropped.
pub fn in_vertical_bounds(projectile: &Projectile, height: f32) -> bool {
    projectile.y > 0.0 && projectile.y < height
}

// ── Collisions ───────────────────────────────────────────────────────────────

/// Axis-aligned box test: the projectile is a 10×10 square, the enemy a
/// `width`×`height` box, both centred on their positions.
pub fn overlaps(projectile: &Projectile, enemy: &Enemy) -> bool {
    let half_w = enemy.width / 2.0;
    let half_h = enemy.height / 2.0;
    projectile.x + PROJECTILE_HALF_SIZE >= enemy.x - half_w
        && projectile.x - PROJECTILE_HALF_SIZE <= enemy.x + half_w
        && projectile.y + PROJECTILE_HALF_SIZE >= enemy.y - half_h
        && projectile.y - PROJECTILE_HALF_SIZE <= enemy.y + half_h
}

/// Survivors and by-products of one collision pass.
#[derive(Clone, Debug)]
pub struct CollisionOutcome {
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    /// Enemies removed by this pass, at their hit positions.
    pub destroyed: Vec<Enemy>,
    /// Explosions created by this pass, one per hit.
    pub explosions: Vec<Explosion>,
    pub hits: u32,
    pub next_explosion_id: u32,
}

/// Match projectiles against enemies.
///
/// Projectiles and enemies are both scanned from the back. A hit needs the
/// letters to match and the boxes to overlap; each projectile takes at most
/// one enemy and each enemy dies at most once.
pub fn resolve_collisions(
    projectiles: &[Projectile],
    enemies: &[Enemy],
    next_explosion_id: u32,
    tuning: &Tuning,
) -> CollisionOutcome {
    let mut enemy_hit = vec![false; enemies.len()];
    let mut spent = vec![false; projectiles.len()];
    let mut explosions = Vec::new();
    let mut next_id = next_explosion_id;

    for (pi, projectile) in projectiles.iter().enumerate().rev() {
        let target = enemies.iter().enumerate().rev().find(|(ei, enemy)| {
            !enemy_hit[*ei]
                && enemy.letter == projectile.target_letter
                && overlaps(projectile, enemy)
        });
        if let Some((ei, enemy)) = target {
            enemy_hit[ei] = true;
            spent[pi] = true;
            explosions.push(Explosion {
                id: next_id,
                x: enemy.x,
                y: enemy.y,
                frames_remaining: tuning.explosion_frames,
                animation_frame: 0,
            });
            next_id += 1;
        }
    }

    let (destroyed, enemies): (Vec<(&Enemy, &bool)>, Vec<(&Enemy, &bool)>) =
        enemies.iter().zip(&enemy_hit).partition(|(_, hit)| **hit);
    let projectiles = projectiles
        .iter()
        .zip(&spent)
        .filter(|(_, used)| !**used)
        .map(|(p, _)| p.clone())
        .collect();

    CollisionOutcome {
        enemies: enemies.into_iter().map(|(e, _)| e.clone()).collect(),
        destroyed: destroyed.into_iter().map(|(e, _)| e.clone()).collect(),
        projectiles,
        hits: explosions.len() as u32,
        explosions,
        next_explosion_id: next_id,
    }
}

// ── Effects ──────────────────────────────────────────────────────────────────

/// Age an explosion by one frame; `None` once it has burnt out.
/// The sprite advances on every other frame.
pub fn decay_explosion(explosion: &Explosion) -> Option<Explosion> {
    let frames_remaining = explosion.frames_remaining.saturating_sub(1);
    if frames_remaining == 0 {
        return None;
    }
    let animation_frame = if explosion.frames_remaining % 2 == 0 {
        (explosion.animation_frame + 1).min(MAX_ANIMATION_FRAME)
    } else {
        explosion.animation_frame
    };
    Some(Explosion {
        frames_remaining,
        animation_frame,
        ..explosion.clone()
    })
}

pub fn scroll_backdrop(backdrop: &Backdrop) -> Backdrop {
    Backdrop {
        far: (backdrop.far + 0.5) % BACKDROP_WRAP,
        middle: (backdrop.middle + 1.0) % BACKDROP_WRAP,
        near: (backdrop.near + 2.0) % BACKDROP_WRAP,
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Launch one projectile at every live enemy showing `letter`.
pub fn fire(state: &GameState, letter: char, tuning: &Tuning) -> GameState {
    let origin = launch_origin(state.viewport);
    let mut next_id = state.next_projectile_id;
    let mut projectiles = state.projectiles.clone();
    for enemy in state.enemies.iter().filter(|e| e.letter == letter) {
        projectiles.push(launch_projectile(next_id, origin, enemy, tuning.launch_speed));
        next_id += 1;
    }
    GameState {
        projectiles,
        next_projectile_id: next_id,
        ..state.clone()
    }
}

// ── Timer-driven transitions ─────────────────────────────────────────────────

/// Add one enemy drawn from `pool`.
pub fn spawn(state: &GameState, pool: &[char], tuning: &Tuning, rng: &mut impl Rng) -> GameState {
    let (enemy, streak) = spawn_enemy(
        state.next_enemy_id,
        state.viewport.width,
        pool,
        &state.streak,
        tuning,
        rng,
    );
    let mut enemies = state.enemies.clone();
    enemies.push(enemy);
    GameState {
        enemies,
        streak,
        next_enemy_id: state.next_enemy_id + 1,
        ..state.clone()
    }
}

pub fn tick_second(state: &GameState) -> GameState {
    GameState {
        elapsed_seconds: state.elapsed_seconds + 1,
        ..state.clone()
    }
}

pub fn scroll(state: &GameState) -> GameState {
    GameState {
        backdrop: scroll_backdrop(&state.backdrop),
        ..state.clone()
    }
}

/// What happened during one frame, for callers that report it onward.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Enemies that left the bottom of the field.
    pub escaped: u32,
    /// Enemies shot down, at the positions they were hit.
    pub destroyed: Vec<Enemy>,
}

/// Advance the simulation by one frame.
pub fn tick(state: &GameState, tuning: &Tuning) -> GameState {
    tick_with_report(state, tuning).0
}

/// Advance the simulation by one frame and report escapes and kills.
///
/// Order matters: enemies move first, then projectiles steer against the
/// moved enemies, then collisions are resolved on the new positions, then
/// older explosions age. Explosions born this frame are not aged yet.
pub fn tick_with_report(state: &GameState, tuning: &Tuning) -> (GameState, FrameReport) {
    let height = state.viewport.height;

    // ── 1. Move enemies, retire the ones below the field ─────────────────────
    let moved: Vec<Enemy> = state.enemies.iter().map(advance_enemy).collect();
    let escaped = moved.iter().filter(|e| e.y > height).count() as u32;
    let enemies: Vec<Enemy> = moved.into_iter().filter(|e| e.y <= height).collect();

    // ── 2. Steer projectiles toward their targets ────────────────────────────
    let projectiles: Vec<Projectile> = state
        .projectiles
        .iter()
        .map(|p| steer_projectile(p, &enemies, tuning))
        .filter(|p| in_vertical_bounds(p, height))
        .collect();

    // ── 3. Collisions ────────────────────────────────────────────────────────
    let outcome = resolve_collisions(&projectiles, &enemies, state.next_explosion_id, tuning);

    // ── 4. Age explosions ────────────────────────────────────────────────────
    let mut explosions: Vec<Explosion> = state
        .explosions
        .iter()
        .filter_map(decay_explosion)
        .collect();
    explosions.extend(outcome.explosions);

    let next = GameState {
        enemies: outcome.enemies,
        projectiles: outcome.projectiles,
        explosions,
        score: state.score + outcome.hits * tuning.score_per_kill,
        shot_down: state.shot_down + outcome.hits,
        missed: state.missed + escaped,
        frame: state.frame + 1,
        next_explosion_id: outcome.next_explosion_id,
        ..state.clone()
    };
    let report = FrameReport {
        escaped,
        destroyed: outcome.destroyed,
    };
    (next, report)
}
