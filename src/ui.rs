use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use wordmatch::{
    celebration::CelebrationAnimation,
    controls::Focus,
    game::Phase,
    scoring::MAX_STARS,
    util::{format_time, star_row},
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const EMPTY_SLOT: &str = "______";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.game.phase() {
            Phase::Idle => render_menu(self, area, buf),
            Phase::Playing => render_board(self, area, buf),
            Phase::Results => {
                render_results(self, area, buf);
                if self.game.celebration.is_active {
                    render_celebration_particles(&self.game.celebration, area, buf);
                }
            }
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn title_style() -> Style {
    bold().fg(Color::Blue)
}

fn legend_style() -> Style {
    Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC)
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let deck = app.game.deck();
    let mut lines = vec![
        Line::from(Span::styled(deck.title.clone(), title_style())),
        Line::default(),
        Line::from("Move the words into the sentences!"),
        Line::from(Span::styled(
            "Complete every sentence to earn all the stars!",
            Style::default().fg(Color::Blue),
        )),
        Line::default(),
        Line::from(Span::styled(
            format!("Deck: {} ({} sentences)", deck.name, deck.slots.len()),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    if let Some(best) = app.game.best_time() {
        lines.push(Line::from(Span::styled(
            format!("Best time: {}", format_time(best)),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(enter) start game / (esc)ape",
        legend_style(),
    )));

    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let inner = Rect::new(area.x, area.y + top, area.width, height.min(area.height));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

fn render_board(app: &App, area: Rect, buf: &mut Buffer) {
    let game = &app.game;
    let controls = &app.controls;
    let slot_count = game.slots().len() as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),              // stars + timer
            Constraint::Length(2),              // title
            Constraint::Length(slot_count * 2), // sentences
            Constraint::Length(3),              // word pool
            Constraint::Length(2),              // notice
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    // header: stars on the left, clock on the right
    let stars = Paragraph::new(Span::styled(
        star_row(game.stars(), MAX_STARS),
        bold().fg(Color::Yellow),
    ));
    stars.render(chunks[0], buf);
    let timer = Paragraph::new(Span::styled(
        format_time(game.elapsed_secs()),
        bold().fg(Color::Blue),
    ))
    .alignment(Alignment::Right);
    timer.render(chunks[0], buf);

    Paragraph::new(Span::styled(game.deck().title.clone(), title_style()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let held_word = controls
        .held_index(game)
        .and_then(|i| game.pool().get(i))
        .map(|w| w.content.as_str());

    let mut slot_lines = Vec::with_capacity(game.slots().len() * 2);
    for (i, slot) in game.slots().iter().enumerate() {
        let focused = controls.focus == Focus::Slot(i);
        let marker = if focused { "▶ " } else { "  " };

        let filler = match slot.content() {
            Some(content) => Span::styled(
                format!("[ {content} ]"),
                bold().fg(Color::White).bg(Color::Blue),
            ),
            None if focused && held_word.is_some() => Span::styled(
                format!("[ {} ]", held_word.unwrap_or(EMPTY_SLOT)),
                bold().fg(Color::Yellow),
            ),
            None => Span::styled(
                format!("[ {EMPTY_SLOT} ]"),
                Style::default().fg(Color::Blue).add_modifier(Modifier::DIM),
            ),
        };

        let prefix_style = if focused {
            bold()
        } else {
            Style::default()
        };
        slot_lines.push(Line::from(vec![
            Span::styled(marker, bold().fg(Color::Yellow)),
            Span::styled(slot.prefix.clone(), prefix_style),
            filler,
        ]));
        slot_lines.push(Line::default());
    }
    Paragraph::new(slot_lines).render(chunks[2], buf);

    let mut word_spans = Vec::new();
    for (i, word) in game.pool().iter().enumerate() {
        let at_cursor = controls.focus == Focus::Pool && controls.pool_cursor == i;
        let style = if controls.held.as_ref() == Some(&word.id) {
            bold().fg(Color::Yellow)
        } else if at_cursor {
            bold().add_modifier(Modifier::REVERSED)
        } else {
            bold().fg(Color::White).bg(Color::Blue)
        };
        let style = if at_cursor && controls.is_holding() {
            style.add_modifier(Modifier::UNDERLINED)
        } else {
            style
        };
        if !word_spans.is_empty() {
            word_spans.push(Span::raw("  "));
        }
        word_spans.push(Span::styled(format!(" {} ", word.content), style));
    }
    let pool_border = if controls.focus == Focus::Pool {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Blue)
    };
    Paragraph::new(Line::from(word_spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(pool_border)
                .title("Words"),
        )
        .render(chunks[3], buf);

    if let Some(notice) = game.notice() {
        Paragraph::new(vec![
            Line::from(Span::styled(notice.title.clone(), bold().fg(Color::Red))),
            Line::from(Span::styled(
                notice.detail.clone(),
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }

    let legend = if controls.is_holding() {
        "←/→ ↑/↓ move   (space) drop   (esc) let go"
    } else {
        "←/→ ↑/↓ move   (space) pick up   (x) return word   (s)ubmit   (esc)ape"
    };
    let legend = if legend.width() > chunks[6].width as usize {
        "(space) (x) (s) (esc)"
    } else {
        legend
    };
    Paragraph::new(Span::styled(legend, legend_style()))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
}

fn results_message(stars: u8) -> &'static str {
    match stars {
        s if s >= MAX_STARS => "Congratulations! You got everything right!",
        2 => "Very good! You're almost there!",
        _ => "Keep practicing to improve!",
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(result) = app.game.result() else {
        return;
    };
    let card = result.card;

    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::raw(format!("{label:<10}")),
            Span::styled(format!("{value:>14}"), bold().fg(Color::Blue)),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled("Your Results", title_style())),
        Line::default(),
        Line::from(results_message(card.stars)),
        Line::default(),
        Line::from(Span::styled(
            star_row(card.stars, MAX_STARS),
            bold().fg(Color::Yellow),
        )),
        Line::default(),
        row("Time:", format_time(card.elapsed_secs)),
        row("Correct:", format!("{}/{}", card.correct, card.total)),
        row("Stars:", format!("{}/{}", card.stars, MAX_STARS)),
        row("Score:", format!("{} points", card.score)),
        Line::default(),
    ];

    if result.new_best {
        lines.push(Line::from(Span::styled(
            "New best time!",
            bold().fg(Color::Green),
        )));
    } else if let Some(best) = app.game.best_time() {
        lines.push(Line::from(Span::styled(
            format!("Best time: {}", format_time(best)),
            Style::default().fg(Color::Gray),
        )));
    } else {
        lines.push(Line::default());
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(r) play again / (m) main menu / (esc)ape",
        legend_style(),
    )));

    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let inner = Rect::new(area.x, area.y + top, area.width, height.min(area.height));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(inner, buf);
}

/// Render celebration particles on top of the results screen
fn render_celebration_particles(celebration: &CelebrationAnimation, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    for particle in &celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = particle.x as u16;
        let y = particle.y as u16;
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[particle.color_index % colors.len()];
        let alpha = 1.0 - (particle.age / particle.max_age);
        let style = if particle.is_text || alpha > 0.7 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if alpha > 0.3 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordmatch::{
        best_time::MemoryBestTimeStore,
        config::Config,
        controls::Command,
        deck::{Deck, DEFAULT_DECK},
        feedback::Feedback,
        game::Game,
    };

    fn create_test_app(best: Option<&str>) -> App {
        let store = match best {
            Some(raw) => MemoryBestTimeStore::with_raw(raw),
            None => MemoryBestTimeStore::new(),
        };
        let game = Game::new(
            Deck::embedded(DEFAULT_DECK).unwrap(),
            store,
            Feedback::silent(),
            Some(8),
        );
        App::new(game, Config::default())
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn finish_all_correct(app: &mut App) {
        while let Some(word) = app.game.pool().first().cloned() {
            app.game.place(&word.id, &word.correct_slot).unwrap();
        }
        app.controls.apply(Command::Submit, &mut app.game);
    }

    #[test]
    fn test_menu_shows_title_and_best_time() {
        let app = create_test_app(Some("75"));
        let text = rendered(&app, 80, 24);

        assert!(text.contains("English Word Match"));
        assert!(text.contains("Best time: 01:15"));
        assert!(text.contains("(enter) start game"));
    }

    #[test]
    fn test_menu_without_best_time() {
        let app = create_test_app(None);
        let text = rendered(&app, 80, 24);
        assert!(!text.contains("Best time"));
    }

    #[test]
    fn test_board_shows_sentences_and_words() {
        let mut app = create_test_app(None);
        app.controls.apply(Command::Start, &mut app.game);
        let text = rendered(&app, 80, 24);

        assert!(text.contains("Gato é"));
        assert!(text.contains("Cachorro é"));
        assert!(text.contains("Cavalo é"));
        for word in ["felino", "canino", "equino"] {
            assert!(text.contains(word), "missing {word}");
        }
        assert!(text.contains("00:00"));
        assert!(text.contains("☆☆☆"));
    }

    #[test]
    fn test_board_shows_placed_word_and_star() {
        let mut app = create_test_app(None);
        app.controls.apply(Command::Start, &mut app.game);
        let word = app.game.pool()[0].clone();
        app.game.place(&word.id, &word.correct_slot).unwrap();

        let text = rendered(&app, 80, 24);
        assert!(text.contains(&format!("[ {} ]", word.content)));
        assert!(text.contains("★☆☆"));
    }

    #[test]
    fn test_board_shows_notice() {
        let mut app = create_test_app(None);
        app.controls.apply(Command::Start, &mut app.game);
        app.controls.apply(Command::Submit, &mut app.game);

        let text = rendered(&app, 80, 24);
        assert!(text.contains("Fill in every sentence before submitting!"));
    }

    #[test]
    fn test_results_screen() {
        let mut app = create_test_app(None);
        app.controls.apply(Command::Start, &mut app.game);
        finish_all_correct(&mut app);

        let text = rendered(&app, 80, 24);
        assert!(text.contains("Your Results"));
        assert!(text.contains("Congratulations!"));
        assert!(text.contains("★★★"));
        assert!(text.contains("3/3"));
        assert!(text.contains("points"));
        assert!(text.contains("New best time!"));
        assert!(text.contains("(r) play again"));
    }

    #[test]
    fn test_results_messages() {
        assert_eq!(results_message(3), "Congratulations! You got everything right!");
        assert_eq!(results_message(2), "Very good! You're almost there!");
        assert_eq!(results_message(1), "Keep practicing to improve!");
        assert_eq!(results_message(0), "Keep practicing to improve!");
    }

    #[test]
    fn test_celebration_rendering() {
        let mut app = create_test_app(None);
        app.controls.apply(Command::Start, &mut app.game);
        finish_all_correct(&mut app);
        assert!(app.game.start_celebration_if_earned(80, 24));

        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
        assert!(*buffer.area() == area);
    }

    #[test]
    fn test_renders_in_tiny_and_huge_areas() {
        let mut app = create_test_app(Some("3"));
        for (w, h) in [(1, 1), (10, 5), (20, 8), (250, 80)] {
            let _ = rendered(&app, w, h);
        }
        app.controls.apply(Command::Start, &mut app.game);
        app.controls.apply(Command::GrabOrDrop, &mut app.game);
        for (w, h) in [(1, 1), (10, 5), (20, 8), (250, 80)] {
            let _ = rendered(&app, w, h);
        }
    }

    #[test]
    fn test_ui_constants() {
        assert_eq!(HORIZONTAL_MARGIN, 5);
        assert_eq!(VERTICAL_MARGIN, 1);
    }
}
