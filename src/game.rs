use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::best_time::BestTimeStore;
use crate::celebration::CelebrationAnimation;
use crate::deck::{Deck, SlotId, SlotSpec, Word, WordId};
use crate::error::GameError;
use crate::feedback::{Cue, Feedback, Notice};
use crate::scoring::{self, Scorecard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Playing,
    Results,
}

/// A sentence blank. A filled slot owns the word placed in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: SlotId,
    pub prefix: String,
    placed: Option<Word>,
}

impl Slot {
    fn empty(spec: &SlotSpec) -> Self {
        Self {
            id: spec.id.clone(),
            prefix: spec.prefix.clone(),
            placed: None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.placed.as_ref().map(|w| w.content.as_str())
    }

    pub fn placed(&self) -> Option<&Word> {
        self.placed.as_ref()
    }

    pub fn is_filled(&self) -> bool {
        self.placed.is_some()
    }

    pub fn is_correct(&self) -> bool {
        self.placed
            .as_ref()
            .is_some_and(|w| w.correct_slot == self.id)
    }
}

/// One-second game clock. Only counts while armed; disarming drops any
/// partial second.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SecondTimer {
    armed: bool,
    pending_ms: u64,
}

impl SecondTimer {
    pub fn arm(&mut self) {
        self.armed = true;
        self.pending_ms = 0;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.pending_ms = 0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Feed `ms` of wall time, returns the whole seconds that completed.
    pub fn advance(&mut self, ms: u64) -> u64 {
        if !self.armed {
            return 0;
        }
        self.pending_ms += ms;
        let secs = self.pending_ms / 1000;
        self.pending_ms %= 1000;
        secs
    }
}

/// Where a dragged word starts or lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Pool(usize),
    Slot(SlotId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub correct: bool,
    pub star_awarded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Dropped outside every target
    Cancelled,
    Reordered,
    Placed(Placement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionResult {
    pub card: Scorecard,
    pub new_best: bool,
}

/// The matching game: phase machine, word pool, slots, clock and score
#[derive(Debug)]
pub struct Game {
    deck: Deck,
    phase: Phase,
    pool: Vec<Word>,
    slots: Vec<Slot>,
    elapsed_secs: u64,
    stars: u8,
    score: u32,
    best_time: Option<u64>,
    result: Option<SessionResult>,
    notice: Option<Notice>,
    timer: SecondTimer,
    rng: StdRng,
    feedback: Feedback,
    store: StoreHandle,
    pub celebration: CelebrationAnimation,
}

struct StoreHandle(Box<dyn BestTimeStore>);

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BestTimeStore")
    }
}

impl Game {
    /// Builds an idle game. The best time is read once here; a missing or
    /// unreadable record means no record yet.
    pub fn new<S: BestTimeStore + 'static>(
        deck: Deck,
        store: S,
        feedback: Feedback,
        seed: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        let best_time = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read best time");
            None
        });
        let slots = deck.slots.iter().map(Slot::empty).collect();
        info!(deck = %deck.name, seed, ?best_time, "game ready");

        Self {
            deck,
            phase: Phase::Idle,
            pool: Vec::new(),
            slots,
            elapsed_secs: 0,
            stars: 0,
            score: 0,
            best_time,
            result: None,
            notice: None,
            timer: SecondTimer::default(),
            rng: StdRng::seed_from_u64(seed),
            feedback,
            store: StoreHandle(Box::new(store)),
            celebration: CelebrationAnimation::with_seed(seed),
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pool(&self) -> &[Word] {
        &self.pool
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn stars(&self) -> u8 {
        self.stars
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_time(&self) -> Option<u64> {
        self.best_time
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn correct_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_correct()).count()
    }

    pub fn all_slots_filled(&self) -> bool {
        self.slots.iter().all(Slot::is_filled)
    }

    fn require(&self, phase: Phase) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::InvalidPhase(self.phase))
        }
    }

    fn slot_index(&self, slot_id: &SlotId) -> Result<usize, GameError> {
        self.slots
            .iter()
            .position(|s| &s.id == slot_id)
            .ok_or_else(|| GameError::UnknownSlot(slot_id.clone()))
    }

    /// Idle -> Playing
    pub fn start(&mut self) -> Result<(), GameError> {
        self.require(Phase::Idle)?;
        self.begin_session();
        Ok(())
    }

    /// Results -> Playing, same as a fresh start
    pub fn play_again(&mut self) -> Result<(), GameError> {
        self.require(Phase::Results)?;
        self.begin_session();
        Ok(())
    }

    /// Results -> Idle, discarding the finished session
    pub fn main_menu(&mut self) -> Result<(), GameError> {
        self.require(Phase::Results)?;
        self.timer.disarm();
        self.celebration.stop();
        self.pool.clear();
        self.slots = self.deck.slots.iter().map(Slot::empty).collect();
        self.elapsed_secs = 0;
        self.stars = 0;
        self.score = 0;
        self.result = None;
        self.notice = None;
        self.phase = Phase::Idle;
        info!("back to main menu");
        Ok(())
    }

    fn begin_session(&mut self) {
        let mut pool = self.deck.words.clone();
        pool.shuffle(&mut self.rng);
        self.pool = pool;
        self.slots = self.deck.slots.iter().map(Slot::empty).collect();
        self.elapsed_secs = 0;
        self.stars = 0;
        self.score = 0;
        self.result = None;
        self.notice = None;
        self.celebration.stop();
        self.timer.arm();
        self.phase = Phase::Playing;
        info!(deck = %self.deck.name, words = self.pool.len(), "session started");
    }

    /// Advance the game clock by one runtime tick.
    pub fn on_tick(&mut self, tick_ms: u64) {
        if self.phase != Phase::Playing {
            return;
        }
        self.elapsed_secs += self.timer.advance(tick_ms);
    }

    pub fn update_celebration(&mut self) {
        self.celebration.update();
    }

    /// Start the confetti when the submitted result earned two stars or more.
    pub fn start_celebration_if_earned(&mut self, width: u16, height: u16) -> bool {
        match self.result {
            Some(result) if result.card.stars >= 2 => {
                self.celebration.start(width, height, result.card.stars);
                true
            }
            _ => false,
        }
    }

    pub fn drag_start(&mut self) -> Result<(), GameError> {
        self.require(Phase::Playing)?;
        self.feedback.cue(Cue::Drag);
        Ok(())
    }

    /// Finish a drag gesture. `None` means the word was let go outside any
    /// target, which changes nothing.
    pub fn drag_end(
        &mut self,
        source: DropTarget,
        destination: Option<DropTarget>,
    ) -> Result<DragOutcome, GameError> {
        self.require(Phase::Playing)?;
        let Some(destination) = destination else {
            return Ok(DragOutcome::Cancelled);
        };

        self.feedback.cue(Cue::Drop);
        match (source, destination) {
            (DropTarget::Pool(from), DropTarget::Pool(to)) => {
                self.reorder(from, to)?;
                Ok(DragOutcome::Reordered)
            }
            (DropTarget::Pool(from), DropTarget::Slot(slot_id)) => {
                let word_id = self
                    .pool
                    .get(from)
                    .map(|w| w.id.clone())
                    .ok_or(GameError::PoolIndex(from))?;
                self.place(&word_id, &slot_id).map(DragOutcome::Placed)
            }
            (DropTarget::Slot(_), _) => Err(GameError::InvalidMove),
        }
    }

    /// Move a pool word into an empty slot.
    pub fn place(&mut self, word_id: &WordId, slot_id: &SlotId) -> Result<Placement, GameError> {
        self.require(Phase::Playing)?;
        let word_idx = self
            .pool
            .iter()
            .position(|w| &w.id == word_id)
            .ok_or_else(|| GameError::UnknownWord(word_id.clone()))?;
        let slot_idx = self.slot_index(slot_id)?;

        if self.slots[slot_idx].is_filled() {
            debug!(slot = %slot_id, "slot already filled");
            self.feedback.cue(Cue::Incorrect);
            return Err(GameError::SlotOccupied(slot_id.clone()));
        }

        let word = self.pool.remove(word_idx);
        let correct = word.correct_slot == *slot_id;
        debug!(word = %word.id, slot = %slot_id, correct, "word placed");
        self.slots[slot_idx].placed = Some(word);

        let mut star_awarded = false;
        if correct {
            self.feedback.cue(Cue::Correct);
            let earned = scoring::stars_earned(self.correct_count(), self.slots.len());
            if earned > self.stars {
                self.add_star();
                star_awarded = true;
            }
        } else {
            self.feedback.cue(Cue::Incorrect);
        }

        Ok(Placement {
            correct,
            star_awarded,
        })
    }

    fn add_star(&mut self) {
        self.stars += 1;
        self.feedback.cue(Cue::Star);
        info!(stars = self.stars, "star earned");
    }

    /// Send the word in `slot_id` back to the pool and reshuffle the pool.
    pub fn unplace(&mut self, slot_id: &SlotId) -> Result<WordId, GameError> {
        self.require(Phase::Playing)?;
        let slot_idx = self.slot_index(slot_id)?;
        let word = self.slots[slot_idx]
            .placed
            .take()
            .ok_or_else(|| GameError::SlotEmpty(slot_id.clone()))?;
        let word_id = word.id.clone();

        self.pool.push(word);
        self.pool.shuffle(&mut self.rng);
        self.feedback.cue(Cue::Drag);
        debug!(word = %word_id, slot = %slot_id, "word returned to pool");
        Ok(word_id)
    }

    /// Move a pool word from one position to another.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), GameError> {
        self.require(Phase::Playing)?;
        if from >= self.pool.len() {
            return Err(GameError::PoolIndex(from));
        }
        let word = self.pool.remove(from);
        let to = to.min(self.pool.len());
        self.pool.insert(to, word);
        Ok(())
    }

    /// Playing -> Results. Rejected, with a notice, while any slot is empty.
    pub fn submit(&mut self) -> Result<SessionResult, GameError> {
        self.require(Phase::Playing)?;

        let empty = self.slots.iter().filter(|s| !s.is_filled()).count();
        if empty > 0 {
            self.notice = Some(Notice::incomplete_submission());
            self.feedback.cue(Cue::Incorrect);
            debug!(empty, "submission rejected");
            return Err(GameError::IncompleteSubmission { empty });
        }

        self.timer.disarm();
        let card = Scorecard::compute(self.correct_count(), self.slots.len(), self.elapsed_secs);
        self.stars = card.stars;
        self.score = card.score;

        let new_best =
            scoring::improves_best_time(card.correct, card.total, card.elapsed_secs, self.best_time);
        if new_best {
            self.best_time = Some(card.elapsed_secs);
            if let Err(e) = self.store.0.save(card.elapsed_secs) {
                warn!(error = %e, "could not save best time");
            }
        }

        let result = SessionResult { card, new_best };
        self.result = Some(result);
        self.phase = Phase::Results;
        self.feedback.cue(Cue::Success);
        info!(
            correct = card.correct,
            total = card.total,
            secs = card.elapsed_secs,
            score = card.score,
            stars = card.stars,
            new_best,
            "session submitted"
        );
        Ok(result)
    }
}
