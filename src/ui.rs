use flowtype::{
    leaderboard::ResultRecord,
    observer::Remaining,
    session::{CharState, Mode, RunState},
    stats::Stats,
    tokenize::current_word_range,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const TIPS: [&str; 8] = [
    "accuracy first, the speed follows",
    "keep a steady rhythm, consistency beats bursts",
    "small mistakes are fine: breathe and carry on",
    "relax your shoulders and let the fingers flow",
    "eyes on the text, trust your muscle memory",
    "try another content mode for a change",
    "precision mode (--precision) makes a good focus drill",
    "numbers and symbols sharpen precision, quotes train cadence",
];
const TIP_ROTATION: Duration = Duration::from_millis(6_500);

pub fn draw(app: &App, f: &mut Frame) {
    match app.state {
        AppState::Typing => draw_typing(app, f),
        AppState::Results => draw_results(app, f),
    }
}

fn draw_typing(app: &App, f: &mut Frame) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // settings
            Constraint::Length(1), // live stats
            Constraint::Length(1), // progress
            Constraint::Length(1), // padding
            Constraint::Min(3),    // text
            Constraint::Length(1), // hint
            Constraint::Length(1), // tip
        ])
        .split(f.area());

    let session = &app.session;
    let settings = format!(
        "{} {}  ·  {}  ·  {}{}",
        session.duration(),
        match session.mode() {
            Mode::TimeLimited => "seconds",
            Mode::WordCountLimited => "words",
        },
        app.config.content,
        app.config.difficulty,
        if session.allow_backspace() { "" } else { "  ·  precision" },
    );
    f.render_widget(
        Paragraph::new(Span::styled(settings, dim_style)).alignment(Alignment::Center),
        chunks[0],
    );

    let stats = app
        .last_update
        .as_ref()
        .map(|u| u.stats)
        .unwrap_or_default();
    f.render_widget(
        Paragraph::new(Span::styled(format_stats(&stats), bold_style)).alignment(Alignment::Center),
        chunks[1],
    );

    f.render_widget(progress_gauge(app), chunks[2]);

    let lines = prompt_lines(
        session.chars(),
        session.typed_states(),
        session.current_index(),
    );
    let scroll = scroll_offset(session.chars(), session.current_index(), chunks[4]);
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0)),
        chunks[4],
    );

    let hint = match session.run_state() {
        RunState::Idle => "start typing to begin  ·  (tab) start  (ctrl+r) new text  (esc) quit",
        RunState::Paused => "PAUSED  ·  (tab) resume  (ctrl+r) new text  (esc) quit",
        RunState::Running => "(tab) pause  (ctrl+r) new text  (esc) quit",
        RunState::Finished => "",
    };
    f.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().add_modifier(Modifier::ITALIC)))
            .alignment(Alignment::Center),
        chunks[5],
    );

    if !session.is_running() {
        f.render_widget(tip_line(app.opened_at.elapsed()), chunks[6]);
    }
}

fn draw_results(app: &App, f: &mut Frame) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // final stats
            Constraint::Min(4),    // leaderboard
            Constraint::Length(1), // legend
            Constraint::Length(1), // tip
        ])
        .split(f.area());

    if let Some(end) = app.last_result {
        let summary = Paragraph::new(vec![
            Line::from(Span::styled(format_stats(&end.stats), bold_style)),
            Line::from(Span::styled(
                format!(
                    "{} words in text  ·  {:.1}s",
                    end.words_total,
                    end.elapsed_ms as f64 / 1000.0
                ),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
        f.render_widget(summary, chunks[0]);
    }

    f.render_widget(leaderboard_table(&app.board), chunks[1]);

    let legend = Paragraph::new(Span::styled(
        "(r)etry same text / (n)ew text / (c)lear leaderboard / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(legend, chunks[2]);
    f.render_widget(tip_line(app.opened_at.elapsed()), chunks[3]);
}

/// Tips rotate while the app is open
fn tip(shown_for: Duration) -> &'static str {
    let idx = shown_for.as_millis() / TIP_ROTATION.as_millis();
    TIPS[idx as usize % TIPS.len()]
}

fn tip_line(shown_for: Duration) -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        tip(shown_for),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
}

fn format_stats(stats: &Stats) -> String {
    format!(
        "{} wpm   {} raw   {}% acc   {} errors",
        stats.wpm, stats.raw, stats.accuracy, stats.errors
    )
}

fn progress_gauge(app: &App) -> Gauge<'static> {
    let session = &app.session;
    let remaining = app
        .last_update
        .as_ref()
        .map(|u| u.remaining)
        .unwrap_or_else(|| session.remaining());

    let (label, total) = match remaining {
        Remaining::Time { ms } => (
            format!("{}s", ms.div_ceil(1000)),
            session.duration() as u64 * 1000,
        ),
        Remaining::Words { count } => (format!("{count}"), session.duration() as u64),
    };

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(remaining.percent_complete(total) / 100.0)
        .label(label)
}

/// One styled span per character; newlines start a new line and are shown as a return glyph
fn prompt_lines(chars: &[char], states: &[CharState], cursor: usize) -> Vec<Line<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = bold_style.fg(Color::Green);
    let red_bold_style = bold_style.fg(Color::Red);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let word_style = Style::default().fg(Color::Cyan);

    let current_word = current_word_range(chars, cursor);

    let mut lines = Vec::new();
    let mut spans = Vec::new();
    for (idx, (&c, state)) in chars.iter().zip(states).enumerate() {
        let mut style = match state {
            CharState::Correct => green_bold_style,
            CharState::Incorrect => red_bold_style,
            CharState::Untyped if current_word.contains(&idx) => word_style,
            CharState::Untyped => dim_style,
        };
        if idx == cursor {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }

        let shown = match (c, state) {
            ('\n', _) => "↵".to_string(),
            (' ', CharState::Incorrect) => "·".to_string(),
            (c, _) => c.to_string(),
        };
        spans.push(Span::styled(shown, style));

        if c == '\n' {
            lines.push(Line::from(std::mem::take(&mut spans)));
        }
    }
    lines.push(Line::from(spans));
    lines
}

/// Rows to scroll so the cursor stays inside `area`
fn scroll_offset(chars: &[char], cursor: usize, area: Rect) -> u16 {
    let width = area.width.max(1) as usize;
    let cursor = cursor.min(chars.len());

    // the word under the cursor moves to the next row as a whole if it doesn't fit
    let word_len = chars[cursor..]
        .iter()
        .take_while(|c| !c.is_whitespace())
        .count();
    let upto = if word_len <= width { cursor + word_len } else { cursor };
    let before: String = chars[..upto].iter().collect();

    let mut rows = 0usize;
    let mut segments = before.split('\n').peekable();
    while let Some(segment) = segments.next() {
        let last = last_row(segment, width);
        rows += if segments.peek().is_some() { last + 1 } else { last };
    }

    let visible = area.height.max(1) as usize;
    // keep one line of context above the cursor once scrolling starts
    rows.saturating_sub(visible.saturating_sub(2)) as u16
}

/// Row holding the end of `line` when wrapped at word boundaries, the way
/// `Paragraph` with `Wrap { trim: false }` lays it out. Words longer than a row are split.
fn last_row(line: &str, width: usize) -> usize {
    let mut row = 0;
    let mut col = 0;
    for token in line.split_inclusive(' ') {
        let word = token.trim_end_matches(' ').width();
        if col > 0 && col + word > width {
            row += 1;
            col = 0;
        }
        col += token.width();
        while col >= width {
            row += 1;
            col -= width;
        }
    }
    row
}

fn leaderboard_table(board: &[ResultRecord]) -> Table<'static> {
    let header = Row::new(vec!["#", "wpm", "acc", "raw", "errors", "test", "when"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = board.iter().enumerate().map(|(i, r)| {
        Row::new(vec![
            format!("{}", i + 1),
            r.wpm.to_string(),
            format!("{}%", r.accuracy),
            r.raw.to_string(),
            r.errors.to_string(),
            r.describe_test(),
            r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Min(16),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_prompt_lines_split_on_newline() {
        let text = chars("ab\ncd");
        let states = vec![CharState::Untyped; text.len()];
        let lines = prompt_lines(&text, &states, 0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 3);
        assert_eq!(lines[0].spans[2].content, "↵");
        assert_eq!(lines[1].spans.len(), 2);
    }

    #[test]
    fn test_prompt_lines_mark_wrong_space() {
        let text = chars("a b");
        let states = vec![CharState::Correct, CharState::Incorrect, CharState::Untyped];
        let lines = prompt_lines(&text, &states, 2);
        assert_eq!(lines[0].spans[1].content, "·");
        assert_eq!(lines[0].spans[1].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_scroll_offset_stays_zero_for_short_text() {
        let text = chars("hello world");
        assert_eq!(scroll_offset(&text, 5, Rect::new(0, 0, 40, 5)), 0);
    }

    #[test]
    fn test_tips_rotate_and_wrap_around() {
        assert_eq!(tip(Duration::ZERO), TIPS[0]);
        assert_eq!(tip(Duration::from_millis(6_499)), TIPS[0]);
        assert_eq!(tip(Duration::from_millis(6_500)), TIPS[1]);
        assert_eq!(tip(TIP_ROTATION * TIPS.len() as u32), TIPS[0]);
    }

    #[test]
    fn test_last_row_wraps_whole_words() {
        assert_eq!(last_row("", 6), 0);
        assert_eq!(last_row("aaaa", 6), 0);
        // "aaaa " / "bbbb " / "cc"
        assert_eq!(last_row("aaaa bbbb cc", 6), 2);
        assert_eq!(last_row("xxxxxxxxxxxxxx", 6), 2);
    }

    #[test]
    fn test_scroll_offset_counts_word_wrapped_rows() {
        // 40 five-letter words in a 12 column box: two words per row
        let text = chars(&vec!["abcd"; 40].join(" "));
        let area = Rect::new(0, 0, 12, 4);
        // cursor at the start of word 30, which sits on row 15
        let cursor = 30 * 5;
        assert_eq!(scroll_offset(&text, cursor, area), 15 - 2);
    }

    #[test]
    fn test_scroll_offset_follows_cursor() {
        let text = chars(&"x".repeat(400));
        // 10 columns wide, cursor on row 30, 5 visible rows
        assert_eq!(scroll_offset(&text, 300, Rect::new(0, 0, 10, 5)), 27);
    }
}
