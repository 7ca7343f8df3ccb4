use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use typing_shooter::config::{CharSelection, GameConfig, Tuning};
use typing_shooter::entities::*;
use typing_shooter::error::ConfigError;
use typing_shooter::session::Session;

fn config(chars: &str, tuning: Tuning) -> GameConfig {
    GameConfig {
        tuning,
        selection: CharSelection::from_chars(chars).unwrap(),
        seed: Some(7),
    }
}

fn make_session(chars: &str) -> Session {
    Session::new(config(chars, Tuning::default()), Viewport::new(800.0, 600.0)).unwrap()
}

fn started(chars: &str) -> Session {
    let mut s = make_session(chars);
    s.press(KeyPress::Space);
    s
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn out_of_range_streak_chance_is_rejected() {
    let tuning = Tuning {
        streak_chance: 1.5,
        ..Tuning::default()
    };
    let err = Session::new(config("A", tuning), Viewport::new(800.0, 600.0)).err();
    assert_eq!(err, Some(ConfigError::StreakChance(1.5)));
}

#[test]
fn zero_driver_period_is_rejected() {
    let tuning = Tuning {
        frame_period: Duration::ZERO,
        ..Tuning::default()
    };
    let err = Session::new(config("A", tuning), Viewport::new(800.0, 600.0)).err();
    assert_eq!(err, Some(ConfigError::ZeroPeriod("frame")));
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn new_session_waits_for_start() {
    let mut s = make_session("A");
    assert_eq!(s.status(), SessionStatus::NotStarted);
    s.advance(Duration::from_secs(5));
    assert_eq!(s.state().elapsed_seconds, 0);
    assert!(s.state().enemies.is_empty());
    assert_eq!(s.press(KeyPress::Char('A')), 0);
}

#[test]
fn space_starts_and_locks_default_pool() {
    let mut s = make_session("");
    s.press(KeyPress::Space);
    assert_eq!(s.status(), SessionStatus::Active);
    assert_eq!(s.pool().len(), 36);
    assert_eq!(s.drain_events(), vec![GameEvent::Started]);
    assert!(s.drain_events().is_empty());
}

#[test]
fn selection_is_editable_only_before_start() {
    let mut s = make_session("");
    s.selection_mut().unwrap().toggle('f');
    s.selection_mut().unwrap().toggle('j');
    s.press(KeyPress::Space);
    assert_eq!(s.pool(), &['F', 'J']);
    assert!(s.selection_mut().is_none());
}

#[test]
fn space_toggles_pause() {
    let mut s = started("A");
    s.drain_events();
    s.press(KeyPress::Space);
    assert_eq!(s.status(), SessionStatus::Paused);
    s.press(KeyPress::Space);
    assert_eq!(s.status(), SessionStatus::Active);
    assert_eq!(s.drain_events(), vec![GameEvent::Paused, GameEvent::Resumed]);
}

#[test]
fn pause_freezes_everything() {
    let mut s = started("A");
    s.spawn_enemy();
    for _ in 0..5 {
        s.step_frame();
    }
    s.advance(Duration::from_millis(1500));
    let before = s.snapshot();

    s.press(KeyPress::Space);
    s.advance(Duration::from_secs(10));
    s.step_frame();
    s.spawn_enemy();
    s.tick_second();
    s.scroll_backdrop();
    assert_eq!(s.press(KeyPress::Char('A')), 0);
    let during = s.snapshot();

    assert_eq!(during.status, SessionStatus::Paused);
    assert_eq!(during.enemies, before.enemies);
    assert_eq!(during.projectiles, before.projectiles);
    assert_eq!(during.explosions, before.explosions);
    assert_eq!(during.backdrop, before.backdrop);
    assert_eq!(during.elapsed_seconds, before.elapsed_seconds);
    assert_eq!(during.missed, before.missed);

    // Resuming picks up exactly where it stopped
    s.press(KeyPress::Space);
    let frame = s.state().frame;
    s.advance(Duration::from_millis(16));
    assert_eq!(s.state().frame, frame + 1);
}

// ── Clocks ────────────────────────────────────────────────────────────────────

#[test]
fn two_seconds_of_play() {
    let mut s = started("A");
    s.advance(Duration::from_millis(2000));
    let state = s.state();
    assert_eq!(state.enemies.len(), 1);
    // Spawned at the same instant as frame 125, and moved by it
    assert!(state.enemies[0].y > -50.0);
    assert_eq!(state.frame, 125);
    assert_eq!(state.elapsed_seconds, 2);
    assert_eq!(state.backdrop.near, 120.0);
}

#[test]
fn small_deltas_add_up() {
    let mut whole = started("A");
    whole.advance(Duration::from_millis(4000));

    let mut pieces = started("A");
    for _ in 0..400 {
        pieces.advance(Duration::from_millis(10));
    }

    assert_eq!(pieces.state().frame, whole.state().frame);
    assert_eq!(pieces.state().elapsed_seconds, whole.state().elapsed_seconds);
    assert_eq!(pieces.state().enemies, whole.state().enemies);
}

#[test]
fn a_minute_without_enemies_loses_nothing() {
    let tuning = Tuning {
        spawn_period: Duration::from_secs(3600),
        ..Tuning::default()
    };
    let mut s = Session::new(config("A", tuning), Viewport::new(800.0, 600.0)).unwrap();
    s.press(KeyPress::Space);
    s.advance(Duration::from_secs(60));

    assert_eq!(s.state().elapsed_seconds, 60);
    assert_eq!(s.state().frame, 3750);
    assert_eq!(s.state().missed, 0);
    assert_eq!(s.status(), SessionStatus::Active);
}

// ── Firing ────────────────────────────────────────────────────────────────────

#[test]
fn lowercase_key_fires_at_matching_enemy() {
    let mut s = started("A");
    s.spawn_enemy();
    s.drain_events();

    assert_eq!(s.press(KeyPress::Char('a')), 1);
    let p = &s.state().projectiles[0];
    assert_eq!(p.target_enemy_id, s.state().enemies[0].id);
    assert_eq!((p.x, p.y), (400.0, 460.0));
    assert_eq!(s.drain_events(), vec![GameEvent::Fired { letter: 'A', count: 1 }]);
}

#[test]
fn keys_without_targets_fire_nothing() {
    let mut s = started("A");
    s.spawn_enemy();
    s.drain_events();
    assert_eq!(s.press(KeyPress::Char('B')), 0);
    assert_eq!(s.press(KeyPress::Char('?')), 0);
    assert!(s.state().projectiles.is_empty());
    assert!(s.drain_events().is_empty());
}

#[test]
fn viewport_changes_move_the_launch_point() {
    let mut s = started("A");
    s.spawn_enemy();
    s.set_viewport(Viewport::new(400.0, 300.0));
    s.press(KeyPress::Char('A'));
    let p = &s.state().projectiles[0];
    assert_eq!((p.x, p.y), (200.0, 160.0));
}

#[test]
fn shooting_down_a_single_enemy() {
    let mut s = started("A");
    s.spawn_enemy();
    let id = s.state().enemies[0].id;
    while s.state().enemies[0].y <= 0.0 {
        s.step_frame();
    }
    s.drain_events();

    assert_eq!(s.press(KeyPress::Char('A')), 1);
    assert_eq!(s.state().projectiles[0].target_enemy_id, id);

    let mut frames = 0;
    while s.state().shot_down == 0 && frames < 300 {
        s.step_frame();
        frames += 1;
    }

    let snap = s.snapshot();
    assert_eq!(snap.shot_down, 1);
    assert_eq!(snap.score, 10);
    assert!(snap.enemies.is_empty());
    assert!(snap.projectiles.is_empty());
    assert_eq!(snap.explosions.len(), 1);
    assert_eq!(snap.explosions[0].frames_remaining, 20);
    let blast = &snap.explosions[0];
    let destroyed: Vec<GameEvent> = s
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
        .collect();
    assert_eq!(
        destroyed,
        vec![GameEvent::EnemyDestroyed {
            enemy_id: id,
            x: blast.x,
            y: blast.y,
        }]
    );
}

// ── Losing ────────────────────────────────────────────────────────────────────

fn play_until_lost(s: &mut Session) {
    for _ in 0..2000 {
        if s.status() == SessionStatus::Ended {
            return;
        }
        s.advance(Duration::from_millis(500));
    }
    panic!("session never ended");
}

fn fast_spawns() -> Tuning {
    Tuning {
        spawn_period: Duration::from_millis(100),
        ..Tuning::default()
    }
}

#[test]
fn sixty_misses_end_the_session_once() {
    let mut s = Session::new(config("AB", fast_spawns()), Viewport::new(800.0, 600.0)).unwrap();
    let calls = Rc::new(Cell::new(0u32));
    let final_score = Rc::new(Cell::new(u32::MAX));
    let (c, f) = (Rc::clone(&calls), Rc::clone(&final_score));
    s.on_game_over(move |score| {
        c.set(c.get() + 1);
        f.set(score);
    });

    s.press(KeyPress::Space);
    play_until_lost(&mut s);

    let missed = s.state().missed;
    assert!(missed >= 60);
    assert_eq!(calls.get(), 1);
    assert_eq!(final_score.get(), 0);
    let overs = s
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::GameOver { .. }))
        .count();
    assert_eq!(overs, 1);

    // Frozen: time passes, nothing moves, keys only restart
    let frozen = s.snapshot();
    s.advance(Duration::from_secs(30));
    assert_eq!(s.press(KeyPress::Char('A')), 0);
    assert_eq!(s.snapshot(), frozen);
    assert_eq!(calls.get(), 1);
}

#[test]
fn misses_add_up_exactly() {
    let mut s = Session::new(config("A", fast_spawns()), Viewport::new(800.0, 600.0)).unwrap();
    s.press(KeyPress::Space);
    play_until_lost(&mut s);

    let reported: u32 = s
        .drain_events()
        .iter()
        .filter_map(|e| match e {
            GameEvent::EnemiesMissed { count } => Some(*count),
            _ => None,
        })
        .sum();
    assert_eq!(reported, s.state().missed);
}

#[test]
fn restart_after_loss_returns_to_a_fresh_session() {
    let mut s = Session::new(config("F", fast_spawns()), Viewport::new(800.0, 600.0)).unwrap();
    let restarts = Rc::new(Cell::new(0u32));
    let r = Rc::clone(&restarts);
    s.on_restart(move || r.set(r.get() + 1));

    s.press(KeyPress::Space);
    play_until_lost(&mut s);
    s.drain_events();

    s.press(KeyPress::Space);
    assert_eq!(s.status(), SessionStatus::NotStarted);
    assert_eq!(restarts.get(), 1);
    assert_eq!(s.drain_events(), vec![GameEvent::RestartRequested]);
    assert!(s.selection().contains('F'));

    s.press(KeyPress::Space);
    assert_eq!(s.status(), SessionStatus::Active);
    let state = s.state();
    assert_eq!(state.missed, 0);
    assert_eq!(state.score, 0);
    assert_eq!(state.elapsed_seconds, 0);
    assert!(state.enemies.is_empty());
    assert!(state.projectiles.is_empty());
    assert!(state.explosions.is_empty());
    assert_eq!(s.pool(), &['F']);
}
