//! Keyboard rendition of the drag-and-drop gesture.
//!
//! The player walks a cursor over the pool row and the slot list, picks a
//! pool word up, carries it to a slot (or another pool position) and drops
//! it there. The return key on a filled slot sends its word back.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::deck::WordId;
use crate::error::GameError;
use crate::game::{DropTarget, Game, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    PlayAgain,
    MainMenu,
    Submit,
    Left,
    Right,
    Up,
    Down,
    /// Pick up the word under the cursor, or drop the held one
    GrabOrDrop,
    /// Send the focused slot's word back to the pool
    Return,
    /// Let go of the held word outside every target
    Cancel,
    Quit,
}

/// Map a key press to a command for the current phase.
pub fn command_for(phase: Phase, key: &KeyEvent, holding: bool) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    match phase {
        Phase::Idle => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Start),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        },
        Phase::Playing => match key.code {
            KeyCode::Left | KeyCode::Char('h') => Some(Command::Left),
            KeyCode::Right | KeyCode::Char('l') => Some(Command::Right),
            KeyCode::Up | KeyCode::Char('k') => Some(Command::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::Down),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::GrabOrDrop),
            KeyCode::Char('x') | KeyCode::Backspace | KeyCode::Delete => Some(Command::Return),
            KeyCode::Char('s') => Some(Command::Submit),
            KeyCode::Esc if holding => Some(Command::Cancel),
            KeyCode::Esc => Some(Command::Quit),
            _ => None,
        },
        Phase::Results => match key.code {
            KeyCode::Char('r') => Some(Command::PlayAgain),
            KeyCode::Char('m') => Some(Command::MainMenu),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Pool,
    Slot(usize),
}

/// What the event loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Submitted,
    Quit,
}

/// Cursor state of the play screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub focus: Focus,
    pub pool_cursor: usize,
    /// The word being carried. Returning a word reshuffles the pool, so
    /// this is an id and never a pool position.
    pub held: Option<WordId>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            focus: Focus::Pool,
            pool_cursor: 0,
            held: None,
        }
    }
}

impl Controls {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Current pool position of the carried word
    pub fn held_index(&self, game: &Game) -> Option<usize> {
        let held = self.held.as_ref()?;
        game.pool().iter().position(|w| &w.id == held)
    }

    /// Apply `cmd` to `game`. Rejected moves are already signalled by the
    /// game's cues and notice, so they only get logged here.
    pub fn apply(&mut self, cmd: Command, game: &mut Game) -> Flow {
        let result = match cmd {
            Command::Quit => return Flow::Quit,
            Command::Start => game.start().map(|_| self.reset()),
            Command::PlayAgain => game.play_again().map(|_| self.reset()),
            Command::MainMenu => game.main_menu().map(|_| self.reset()),
            Command::Submit => match game.submit() {
                Ok(_) => {
                    self.reset();
                    return Flow::Submitted;
                }
                Err(e) => Err(e),
            },
            Command::Left => {
                if self.focus == Focus::Pool {
                    self.pool_cursor = self.pool_cursor.saturating_sub(1);
                }
                Ok(())
            }
            Command::Right => {
                if self.focus == Focus::Pool {
                    self.pool_cursor = (self.pool_cursor + 1).min(self.pool_limit(game));
                }
                Ok(())
            }
            Command::Up => {
                let slots = game.slots().len();
                self.focus = match self.focus {
                    Focus::Pool if slots > 0 => Focus::Slot(slots - 1),
                    Focus::Pool => Focus::Pool,
                    Focus::Slot(i) => Focus::Slot(i.saturating_sub(1)),
                };
                Ok(())
            }
            Command::Down => {
                let slots = game.slots().len();
                self.focus = match self.focus {
                    Focus::Slot(i) if i + 1 < slots => Focus::Slot(i + 1),
                    _ => Focus::Pool,
                };
                Ok(())
            }
            Command::GrabOrDrop => self.grab_or_drop(game),
            Command::Return => match self.focus {
                Focus::Slot(i) => match game.slots().get(i).map(|s| s.id.clone()) {
                    Some(slot_id) => game.unplace(&slot_id).map(|_| ()),
                    None => Ok(()),
                },
                Focus::Pool => Ok(()),
            },
            Command::Cancel => {
                let from = self.held_index(game);
                self.held = None;
                match from {
                    Some(from) => game.drag_end(DropTarget::Pool(from), None).map(|_| ()),
                    None => Ok(()),
                }
            }
        };

        if let Err(e) = result {
            debug!(?cmd, error = %e, "command rejected");
        }
        self.clamp(game);
        Flow::Continue
    }

    fn grab_or_drop(&mut self, game: &mut Game) -> Result<(), GameError> {
        if self.held.is_none() {
            if self.focus == Focus::Pool {
                if let Some(word) = game.pool().get(self.pool_cursor) {
                    let id = word.id.clone();
                    game.drag_start()?;
                    self.held = Some(id);
                }
            }
            return Ok(());
        }

        let from = self.held_index(game);
        self.held = None;
        match from {
            None => Ok(()),
            Some(from) => {
                let destination = match self.focus {
                    Focus::Pool => DropTarget::Pool(self.pool_cursor),
                    Focus::Slot(i) => match game.slots().get(i) {
                        Some(slot) => DropTarget::Slot(slot.id.clone()),
                        None => return Ok(()),
                    },
                };
                game.drag_end(DropTarget::Pool(from), Some(destination))
                    .map(|_| ())
            }
        }
    }

    /// Also the last useful drop position: a carried word leaves the pool
    /// before it is reinserted.
    fn pool_limit(&self, game: &Game) -> usize {
        game.pool().len().saturating_sub(1)
    }

    fn clamp(&mut self, game: &Game) {
        self.pool_cursor = self.pool_cursor.min(self.pool_limit(game));
        if let Focus::Slot(i) = self.focus {
            if i >= game.slots().len() {
                self.focus = Focus::Pool;
            }
        }
        if game.phase() != Phase::Playing || self.held_index(game).is_none() {
            self.held = None;
        }
    }
}
