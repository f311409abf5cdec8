use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::{
    app::App,
    palette::{EyeColor, Pattern, MAX_INTENSITY},
    sequencer::Page,
    submission::SubmissionSink,
    ui::{
        eyes::{ColorWheel, EyesWidget},
        legend, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
    },
};

/// A UI Screen boundary: one per page of the session
pub trait Screen<K> {
    fn render(&self, app: &App<K>, area: Rect, buf: &mut Buffer);
}

/// Selection screen: header, live eyes, controls
pub struct MainScreen;

impl<K: SubmissionSink> Screen<K> for MainScreen {
    fn render(&self, app: &App<K>, area: Rect, buf: &mut Buffer) {
        let seq = &app.sequencer;
        let selection = seq.selection().current();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(5),    // eyes
                Constraint::Length(9), // controls
                Constraint::Length(1), // legend
            ])
            .split(area);

        let header = Line::from(vec![
            Span::styled(
                format!("Task {}/{}: ", seq.current_task(), seq.total_tasks()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                seq.current_label().to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        let header_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(8)])
            .split(chunks[0]);
        Paragraph::new(header).render(header_chunks[0], buf);
        Paragraph::new(Span::styled(
            seq.timer().display(),
            Style::default().add_modifier(Modifier::BOLD | Modifier::DIM),
        ))
        .alignment(Alignment::Right)
        .render(header_chunks[1], buf);

        EyesWidget {
            display: seq.selection().display(),
        }
        .render(chunks[1], buf);

        let controls = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(24),
                Constraint::Min(22),
                Constraint::Length(26),
            ])
            .split(chunks[2]);

        let color_name = EyeColor::from_index(selection.color_index)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());
        let wheel_block = Block::default()
            .borders(Borders::ALL)
            .title(format!("color: {color_name}"));
        let wheel_area = wheel_block.inner(controls[0]);
        wheel_block.render(controls[0], buf);
        ColorWheel {
            selected: selection.color_index,
        }
        .render(wheel_area, buf);

        let pattern_lines: Vec<Line> = Pattern::ALL
            .iter()
            .map(|p| {
                if p.index() == selection.pattern_index {
                    Line::from(Span::styled(
                        format!("› {p}"),
                        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED),
                    ))
                } else {
                    Line::from(format!("  {p}"))
                }
            })
            .collect();
        Paragraph::new(pattern_lines)
            .block(Block::default().borders(Borders::ALL).title("pattern"))
            .render(controls[1], buf);

        let filled = selection.intensity.min(MAX_INTENSITY) as usize;
        let bar = format!(
            "{}{} {}",
            "▮".repeat(filled),
            "▯".repeat(MAX_INTENSITY as usize - filled),
            selection.intensity
        );
        Paragraph::new(vec![Line::from(""), Line::from(bar)])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("intensity"))
            .render(controls[2], buf);

        let mut keys = vec![
            ("←/→", "color"),
            ("↑/↓", "pattern"),
            ("1-0 +/-", "intensity"),
            ("b", "back"),
        ];
        if app.confirm_available() {
            keys.insert(0, ("enter", "confirm"));
        }
        keys.push(("esc", "quit"));
        legend(&keys).render(chunks[3], buf);
    }
}

/// Per-task results: the raw stored triple for the task just completed
pub struct ResultsScreen;

impl<K: SubmissionSink> Screen<K> for ResultsScreen {
    fn render(&self, app: &App<K>, area: Rect, buf: &mut Buffer) {
        let seq = &app.sequencer;
        let task = seq.current_task();
        let saved = seq.saved().get(task).unwrap_or_default();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(6),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        let name = |n: Option<String>| n.unwrap_or_else(|| "?".to_string());
        let lines = vec![
            Line::from(Span::styled(
                format!("Task {task} · {}", seq.current_label()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(
                "color={} pattern={} intensity={}",
                saved.color_index, saved.pattern_index, saved.intensity
            )),
            Line::from(Span::styled(
                format!(
                    "{} / {}",
                    name(EyeColor::from_index(saved.color_index).map(|c| c.to_string())),
                    name(Pattern::from_index(saved.pattern_index).map(|p| p.to_string())),
                ),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("saved"))
            .render(chunks[1], buf);

        let next_label = if task >= seq.total_tasks() {
            "finish"
        } else {
            "next task"
        };
        legend(&[("n", next_label), ("b", "back"), ("esc", "quit")]).render(chunks[3], buf);
    }
}

/// Final confirmation with the fixed completion code
pub struct FinalScreen;

impl<K: SubmissionSink> Screen<K> for FinalScreen {
    fn render(&self, app: &App<K>, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(5),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        let lines = vec![
            Line::from("All tasks complete. Thank you!"),
            Line::from(""),
            Line::from(vec![
                Span::raw("Confirmation code: "),
                Span::styled(
                    app.confirmation_code().to_string(),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(chunks[1], buf);

        legend(&[("b", "back"), ("esc", "quit")]).render(chunks[3], buf);
    }
}

/// Helper to construct the appropriate screen for the current page
pub fn current_screen<K: SubmissionSink>(page: Page) -> Box<dyn Screen<K>> {
    match page {
        Page::Main => Box::new(MainScreen),
        Page::Results => Box::new(ResultsScreen),
        Page::Final => Box::new(FinalScreen),
    }
}
