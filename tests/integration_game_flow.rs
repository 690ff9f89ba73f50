use assert_matches::assert_matches;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashSet;
use tempfile::tempdir;

use wordmatch::{
    best_time::{BestTimeStore, SqliteBestTimeStore, BEST_TIME_KEY},
    deck::{Deck, SlotId, WordId},
    feedback::{Cue, Feedback, RecordingSink},
    game::{Game, Phase},
    GameError,
};

fn word_ids(game: &Game) -> Vec<WordId> {
    let mut ids: Vec<WordId> = game.pool().iter().map(|w| w.id.clone()).collect();
    ids.extend(game.slots().iter().filter_map(|s| s.placed()).map(|w| w.id.clone()));
    ids
}

fn finish(game: &mut Game, correct: bool) {
    let slots: Vec<SlotId> = game.slots().iter().map(|s| s.id.clone()).collect();
    for (i, slot) in slots.iter().enumerate() {
        let word = if correct {
            game.pool()
                .iter()
                .find(|w| &w.correct_slot == slot)
                .unwrap()
                .id
                .clone()
        } else {
            // shift every word one slot along
            let wrong = &slots[(i + 1) % slots.len()];
            game.pool()
                .iter()
                .find(|w| &w.correct_slot == wrong)
                .unwrap()
                .id
                .clone()
        };
        game.place(&word, slot).unwrap();
    }
}

#[test]
fn every_word_lives_in_exactly_one_place() {
    let deck = Deck::embedded("opposites_en").unwrap();
    let expected: HashSet<WordId> = deck.words.iter().map(|w| w.id.clone()).collect();
    let mut game = Game::new(
        deck,
        SqliteBestTimeStore::in_memory().unwrap(),
        Feedback::silent(),
        Some(99),
    );
    game.start().unwrap();

    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..500 {
        match rng.gen_range(0..3) {
            0 if !game.pool().is_empty() => {
                let word = game.pool()[rng.gen_range(0..game.pool().len())].id.clone();
                let slot = game.slots()[rng.gen_range(0..game.slots().len())].id.clone();
                let _ = game.place(&word, &slot);
            }
            1 => {
                let slot = game.slots()[rng.gen_range(0..game.slots().len())].id.clone();
                let _ = game.unplace(&slot);
            }
            _ if !game.pool().is_empty() => {
                let from = rng.gen_range(0..game.pool().len());
                let to = rng.gen_range(0..game.pool().len() + 2);
                game.reorder(from, to).unwrap();
            }
            _ => {}
        }

        let ids = word_ids(&game);
        let unique: HashSet<WordId> = ids.iter().cloned().collect();
        assert_eq!(ids.len(), unique.len(), "a word is in two places");
        assert_eq!(unique, expected, "a word went missing");
        assert!(game.stars() <= 3);
    }
}

#[test]
fn best_time_persists_across_games() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.db");

    {
        let mut game = Game::new(
            Deck::embedded("animals_en").unwrap(),
            SqliteBestTimeStore::open(&path).unwrap(),
            Feedback::silent(),
            Some(2),
        );
        assert_eq!(game.best_time(), None);
        game.start().unwrap();
        for _ in 0..42 {
            game.on_tick(1000);
        }
        finish(&mut game, true);
        let result = game.submit().unwrap();
        assert!(result.new_best);
        assert_eq!(result.card.elapsed_secs, 42);
    }

    let store = SqliteBestTimeStore::open(&path).unwrap();
    assert_eq!(store.load().unwrap(), Some(42));

    let mut game = Game::new(
        Deck::embedded("animals_en").unwrap(),
        store,
        Feedback::silent(),
        Some(2),
    );
    assert_eq!(game.best_time(), Some(42));

    // slower and perfect: no new record
    game.start().unwrap();
    for _ in 0..50 {
        game.on_tick(1000);
    }
    finish(&mut game, true);
    assert!(!game.submit().unwrap().new_best);
    assert_eq!(game.best_time(), Some(42));
}

#[test]
fn imperfect_runs_never_set_a_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.db");
    let mut game = Game::new(
        Deck::embedded("animals_en").unwrap(),
        SqliteBestTimeStore::open(&path).unwrap(),
        Feedback::silent(),
        Some(8),
    );
    game.start().unwrap();
    finish(&mut game, false);

    let result = game.submit().unwrap();
    assert_eq!(result.card.correct, 0);
    assert_eq!(result.card.stars, 0);
    assert_eq!(result.card.score, 1000);
    assert!(!result.new_best);
    assert_eq!(SqliteBestTimeStore::open(&path).unwrap().load().unwrap(), None);
}

#[test]
fn garbage_best_time_reads_as_none() {
    let store = SqliteBestTimeStore::in_memory().unwrap();
    store.put_raw("not a number").unwrap();

    let game = Game::new(
        Deck::embedded("animals_pt").unwrap(),
        store,
        Feedback::silent(),
        Some(1),
    );
    assert_eq!(game.best_time(), None);
    assert_eq!(BEST_TIME_KEY, "dragGame_bestTime");
}

#[test]
fn four_slot_deck_rounds_stars() {
    let mut game = Game::new(
        Deck::embedded("opposites_en").unwrap(),
        SqliteBestTimeStore::in_memory().unwrap(),
        Feedback::silent(),
        Some(4),
    );
    game.start().unwrap();
    assert_eq!(game.slots().len(), 4);

    // two of four right: 1.5 stars rounds up to 2
    let slots: Vec<SlotId> = game.slots().iter().map(|s| s.id.clone()).collect();
    let right = |game: &Game, slot: &SlotId| {
        game.pool().iter().find(|w| &w.correct_slot == slot).unwrap().id.clone()
    };
    for slot in &slots[..2] {
        let word = right(&game, slot);
        game.place(&word, slot).unwrap();
    }
    let third = right(&game, &slots[3]);
    game.place(&third, &slots[2]).unwrap();
    let fourth = right(&game, &slots[2]);
    game.place(&fourth, &slots[3]).unwrap();

    let card = game.submit().unwrap().card;
    assert_eq!(card.correct, 2);
    assert_eq!(card.stars, 2);
}

#[test]
fn cues_follow_the_session() {
    let sink = RecordingSink::new();
    let mut game = Game::new(
        Deck::embedded("animals_pt").unwrap(),
        SqliteBestTimeStore::in_memory().unwrap(),
        Feedback::new(sink.clone()),
        Some(6),
    );
    game.start().unwrap();

    assert_matches!(
        game.submit(),
        Err(GameError::IncompleteSubmission { empty: 3 })
    );
    assert_eq!(sink.cues(), vec![Cue::Incorrect]);
    sink.clear();

    finish(&mut game, true);
    game.submit().unwrap();

    let cues = sink.cues();
    assert_eq!(cues.iter().filter(|c| **c == Cue::Correct).count(), 3);
    assert_eq!(cues.iter().filter(|c| **c == Cue::Star).count(), 3);
    assert_eq!(cues.last(), Some(&Cue::Success));
    assert_eq!(game.phase(), Phase::Results);
}
