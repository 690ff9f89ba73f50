use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::{debug, warn};

/// Short cues emitted while playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Cue {
    Drag,
    Drop,
    Correct,
    Incorrect,
    Star,
    Success,
}

/// Where cues go. Playback is fire-and-forget: errors are reported but
/// never reach the game.
pub trait FeedbackSink {
    fn play(&mut self, cue: Cue) -> io::Result<()>;
}

/// Rings the terminal bell for the cues that matter
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> FeedbackSink for TerminalBell<W> {
    fn play(&mut self, cue: Cue) -> io::Result<()> {
        match cue {
            Cue::Incorrect | Cue::Star | Cue::Success => {
                self.out.write_all(b"\x07")?;
                self.out.flush()
            }
            Cue::Drag | Cue::Drop | Cue::Correct => Ok(()),
        }
    }
}

pub struct SilentSink;

impl FeedbackSink for SilentSink {
    fn play(&mut self, _cue: Cue) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps every cue it is given; clone the handle to inspect them
#[derive(Clone, Default)]
pub struct RecordingSink {
    cues: Rc<RefCell<Vec<Cue>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.borrow().clone()
    }

    pub fn clear(&self) {
        self.cues.borrow_mut().clear();
    }
}

impl FeedbackSink for RecordingSink {
    fn play(&mut self, cue: Cue) -> io::Result<()> {
        self.cues.borrow_mut().push(cue);
        Ok(())
    }
}

/// Cue dispatcher owned by the game
pub struct Feedback {
    sink: Box<dyn FeedbackSink>,
}

impl Feedback {
    pub fn new<S: FeedbackSink + 'static>(sink: S) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }

    pub fn silent() -> Self {
        Self::new(SilentSink)
    }

    pub fn cue(&mut self, cue: Cue) {
        debug!(%cue, "feedback cue");
        if let Err(e) = self.sink.play(cue) {
            warn!(%cue, error = %e, "feedback cue failed");
        }
    }
}

impl std::fmt::Debug for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feedback").finish_non_exhaustive()
    }
}

/// Blocking message shown over the play screen until dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub detail: String,
}

impl Notice {
    pub fn incomplete_submission() -> Self {
        Self {
            title: "Fill in every sentence before submitting!".to_string(),
            detail: "Move the words into all of the sentences.".to_string(),
        }
    }
}
