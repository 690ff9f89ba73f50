mod ui;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::KeyEvent,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    io::{self, stdin},
    path::PathBuf,
};
use tracing::{info, warn};

use wordmatch::{
    app_dirs::AppDirs,
    best_time::{BestTimeStore, MemoryBestTimeStore, SqliteBestTimeStore},
    config::{Config, ConfigStore, FileConfigStore},
    controls::{command_for, Command, Controls, Flow},
    deck::{Deck, DEFAULT_DECK},
    feedback::{Feedback, TerminalBell},
    game::Game,
    logging::init_file_logging,
    runtime::{ChannelSource, GameEvent, GameEventSource, Runner},
};

/// match words to sentences, against the clock
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal word matching game: carry each word from the pool into the sentence it completes, then submit for stars, points and a best time."
)]
pub struct Cli {
    /// embedded deck to play (see --list-decks)
    #[clap(short = 'd', long)]
    deck: Option<String>,

    /// play a deck from a JSON file instead of an embedded one
    #[clap(long, conflicts_with = "deck")]
    deck_file: Option<PathBuf>,

    /// seed for shuffling the word pool
    #[clap(long)]
    seed: Option<u64>,

    /// no terminal bell on mistakes, stars and success
    #[clap(long)]
    mute: bool,

    /// skip the confetti on the results screen
    #[clap(long)]
    no_celebration: bool,

    /// keep the best time in this database instead of the state dir
    #[clap(long)]
    best_time_file: Option<PathBuf>,

    /// print the embedded decks and exit
    #[clap(long)]
    list_decks: bool,
}

/// Stored preferences with this run's flags applied on top
fn effective_config(cli: &Cli, mut config: Config) -> Config {
    if let Some(deck) = &cli.deck {
        config.deck = deck.clone();
    }
    if cli.mute {
        config.sound = false;
    }
    if cli.no_celebration {
        config.celebrate = false;
    }
    config
}

fn load_deck(cli: &Cli, config: &mut Config) -> Result<Deck> {
    if let Some(path) = &cli.deck_file {
        return Deck::from_path(path)
            .with_context(|| format!("could not load deck file {}", path.display()));
    }
    if cli.deck.is_some() {
        return Deck::embedded(&config.deck)
            .with_context(|| format!("could not load deck '{}'", config.deck));
    }

    // a remembered deck may have been renamed since it was saved
    match Deck::embedded(&config.deck) {
        Ok(deck) => Ok(deck),
        Err(e) => {
            warn!(deck = %config.deck, error = %e, "stored deck unavailable, using default");
            config.deck = DEFAULT_DECK.to_string();
            Deck::embedded(DEFAULT_DECK).context("default deck is broken")
        }
    }
}

/// Only the deck choice outlives the run; `--mute` and
/// `--no-celebration` apply to this run alone.
fn remember_deck<S: ConfigStore>(store: &S, stored: Config, effective: &Config) {
    let remembered = Config {
        deck: effective.deck.clone(),
        ..stored.clone()
    };
    if remembered == stored {
        return;
    }
    if let Err(e) = store.save(&remembered) {
        warn!(error = %e, "could not save config");
    }
}

fn list_decks() -> Result<()> {
    for name in Deck::embedded_names() {
        let deck = Deck::embedded(&name)?;
        println!(
            "{:<16} {} ({} sentences, {} words)",
            name,
            deck.title,
            deck.slots.len(),
            deck.words.len()
        );
    }
    Ok(())
}

fn open_store(cli: &Cli) -> Box<dyn BestTimeStore> {
    let opened = match &cli.best_time_file {
        Some(path) => SqliteBestTimeStore::open(path),
        None => SqliteBestTimeStore::open_default(),
    };
    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "best time store unavailable, keeping it in memory");
            Box::new(MemoryBestTimeStore::new())
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub game: Game,
    pub controls: Controls,
    pub config: Config,
}

impl App {
    pub fn new(game: Game, config: Config) -> Self {
        Self {
            game,
            controls: Controls::default(),
            config,
        }
    }

    /// Any key clears a showing notice before it is handled.
    pub fn on_key(&mut self, key: &KeyEvent) -> Flow {
        let cmd = command_for(self.game.phase(), key, self.controls.is_holding());
        if self.game.notice().is_some() && cmd != Some(Command::Quit) {
            self.game.dismiss_notice();
        }
        match cmd {
            Some(cmd) => self.controls.apply(cmd, &mut self.game),
            None => Flow::Continue,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_decks {
        return list_decks();
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = init_file_logging(&path) {
            eprintln!("wordmatch: logging disabled ({}): {e}", path.display());
        }
    }

    let config_store = FileConfigStore::new();
    let stored = config_store.load();
    let mut config = effective_config(&cli, stored.clone());
    let deck = load_deck(&cli, &mut config)?;
    remember_deck(&config_store, stored, &config);

    let feedback = if config.sound {
        Feedback::new(TerminalBell::stdout())
    } else {
        Feedback::silent()
    };
    let game = Game::new(deck, open_store(&cli), feedback, cli.seed);
    let mut app = App::new(game, config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::with_default_tick(ChannelSource::crossterm());
    let outcome = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("bye");
    outcome
}

fn start_tui<B: Backend, E: GameEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E>,
) -> Result<()> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let step = runner.step();

        // the clock follows wall time, keys arriving between ticks included
        let shown_secs = app.game.elapsed_secs();
        app.game.on_tick(step.elapsed.as_millis() as u64);

        match step.event {
            GameEvent::Tick => {
                // one more frame after the last particle fades
                let animating = app.game.celebration.is_active;
                app.game.update_celebration();
                if animating || app.game.elapsed_secs() != shown_secs {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            GameEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            GameEvent::Key(key) => {
                match app.on_key(&key) {
                    Flow::Quit => break,
                    Flow::Submitted if app.config.celebrate => {
                        let size = terminal.size().unwrap_or_default();
                        app.game.start_celebration_if_earned(size.width, size.height);
                    }
                    Flow::Submitted | Flow::Continue => {}
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}
