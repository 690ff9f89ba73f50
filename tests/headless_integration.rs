use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use wordmatch::{
    best_time::MemoryBestTimeStore,
    controls::{command_for, Controls, Flow, Focus},
    deck::{Deck, DEFAULT_DECK},
    feedback::Feedback,
    game::{Game, Phase},
    runtime::{ChannelSource, GameEvent, Runner},
};

fn key(code: KeyCode) -> GameEvent {
    GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn new_game(seed: u64) -> Game {
    Game::new(
        Deck::embedded(DEFAULT_DECK).unwrap(),
        MemoryBestTimeStore::new(),
        Feedback::silent(),
        Some(seed),
    )
}

/// Drive a tiny event loop the way the binary does, bounded by `max_steps`.
fn drive(
    runner: &mut Runner<ChannelSource>,
    game: &mut Game,
    controls: &mut Controls,
    max_steps: u32,
) -> Flow {
    for _ in 0..max_steps {
        match runner.step().event {
            GameEvent::Tick => game.on_tick(runner.tick_ms()),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                let Some(cmd) = command_for(game.phase(), &key, controls.is_holding()) else {
                    continue;
                };
                match controls.apply(cmd, game) {
                    Flow::Continue => {}
                    flow => return flow,
                }
            }
        }
    }
    Flow::Continue
}

/// Key presses that carry pool word 0 into the slot it belongs in, starting
/// with focus on the pool and the cursor on the first word.
fn keys_for_first_word(game: &Game) -> Vec<GameEvent> {
    let target = &game.pool()[0].correct_slot;
    let slot_idx = game.slots().iter().position(|s| &s.id == target).unwrap();
    let ups = game.slots().len() - slot_idx;

    let mut keys = vec![key(KeyCode::Char(' '))];
    keys.extend((0..ups).map(|_| key(KeyCode::Up)));
    keys.push(key(KeyCode::Enter));
    // back down to the pool row
    keys.extend((0..ups).map(|_| key(KeyCode::Down)));
    keys.push(key(KeyCode::Left));
    keys
}

#[test]
fn headless_perfect_session_completes() {
    let mut game = new_game(11);
    let mut controls = Controls::default();
    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(ChannelSource::new(rx), Duration::from_millis(5));

    tx.send(key(KeyCode::Enter)).unwrap();
    drive(&mut runner, &mut game, &mut controls, 10);
    assert_eq!(game.phase(), Phase::Playing);

    while !game.pool().is_empty() {
        for event in keys_for_first_word(&game) {
            tx.send(event).unwrap();
        }
        let before = game.pool().len();
        for _ in 0..50 {
            drive(&mut runner, &mut game, &mut controls, 1);
            if game.pool().len() < before && controls.focus == Focus::Pool {
                break;
            }
        }
        assert_eq!(game.pool().len(), before - 1);
    }
    assert_eq!(game.stars(), 3);

    tx.send(key(KeyCode::Char('s'))).unwrap();
    assert_eq!(drive(&mut runner, &mut game, &mut controls, 50), Flow::Submitted);

    let result = game.result().unwrap();
    assert_eq!(result.card.correct, 3);
    assert_eq!(result.card.stars, 3);
    assert!(result.new_best);
    assert!(!game.timer_running());
}

#[test]
fn headless_ticks_advance_clock_only_while_playing() {
    let mut game = new_game(3);
    let mut controls = Controls::default();
    let (tx, rx) = mpsc::channel::<GameEvent>();
    let mut runner = Runner::new(ChannelSource::new(rx), Duration::from_millis(20));

    // idle ticks never count
    drive(&mut runner, &mut game, &mut controls, 20);
    assert_eq!(game.elapsed_secs(), 0);

    tx.send(key(KeyCode::Enter)).unwrap();
    drive(&mut runner, &mut game, &mut controls, 1);
    assert_eq!(game.phase(), Phase::Playing);

    // the runner's tick length, not the wall clock, drives this loop
    let ticks_per_sec = (1000 / runner.tick_ms()) as u32;
    drive(&mut runner, &mut game, &mut controls, ticks_per_sec);
    assert_eq!(game.elapsed_secs(), 1);
}

#[test]
fn headless_escape_quits_from_menu() {
    let mut game = new_game(1);
    let mut controls = Controls::default();
    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(ChannelSource::new(rx), Duration::from_millis(5));

    tx.send(key(KeyCode::Char('z'))).unwrap();
    tx.send(key(KeyCode::Esc)).unwrap();
    assert_eq!(drive(&mut runner, &mut game, &mut controls, 10), Flow::Quit);
    assert_eq!(game.phase(), Phase::Idle);
}
