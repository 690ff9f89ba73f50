use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::DeckError;

static DECK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/decks");

pub const DEFAULT_DECK: &str = "animals_pt";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub String);

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WordId {
    fn from(s: &str) -> Self {
        WordId(s.to_string())
    }
}

impl From<&str> for SlotId {
    fn from(s: &str) -> Self {
        SlotId(s.to_string())
    }
}

/// A draggable token with the slot it belongs in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub content: String,
    pub correct_slot: SlotId,
}

/// Static description of a sentence blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub id: SlotId,
    pub prefix: String,
}

/// A set of sentences and the words that complete them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub title: String,
    pub slots: Vec<SlotSpec>,
    pub words: Vec<Word>,
}

impl Deck {
    /// Load one of the decks compiled into the binary.
    pub fn embedded(name: &str) -> Result<Self, DeckError> {
        let file = DECK_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| DeckError::NotFound(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| DeckError::NotFound(name.to_string()))?;
        Self::from_json(contents)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DeckError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, DeckError> {
        let deck: Deck = serde_json::from_str(json)?;
        deck.validate()?;
        Ok(deck)
    }

    /// Names of the embedded decks, sorted.
    pub fn embedded_names() -> Vec<String> {
        DECK_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
            .filter_map(|f| f.path().file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .sorted()
            .collect()
    }

    /// A deck is playable when every word points at a real slot, every
    /// slot has a word that belongs in it, and ids are unique.
    pub fn validate(&self) -> Result<(), DeckError> {
        if self.slots.is_empty() {
            return Err(DeckError::NoSlots(self.name.clone()));
        }
        if self.words.len() < self.slots.len() {
            return Err(DeckError::TooFewWords {
                deck: self.name.clone(),
                words: self.words.len(),
                slots: self.slots.len(),
            });
        }

        let mut slot_ids = HashSet::new();
        for slot in &self.slots {
            if !slot_ids.insert(&slot.id) {
                return Err(DeckError::DuplicateId(slot.id.0.clone()));
            }
        }

        let mut word_ids = HashSet::new();
        let mut answered = HashSet::new();
        for word in &self.words {
            if !word_ids.insert(&word.id) {
                return Err(DeckError::DuplicateId(word.id.0.clone()));
            }
            if !slot_ids.contains(&word.correct_slot) {
                return Err(DeckError::MissingSlot {
                    word: word.id.0.clone(),
                    slot: word.correct_slot.0.clone(),
                });
            }
            answered.insert(&word.correct_slot);
        }

        // a slot no word belongs in makes a perfect round impossible
        if let Some(slot) = self.slots.iter().find(|s| !answered.contains(&s.id)) {
            return Err(DeckError::UnreachableSlot(slot.id.0.clone()));
        }

        Ok(())
    }
}
