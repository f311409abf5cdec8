pub mod eyes;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

use unicode_width::UnicodeWidthStr;

use crate::{app::App, submission::SubmissionSink, ui::screen::current_screen};

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;
const NOTICE_MIN_WIDTH: u16 = 24;
const NOTICE_HEIGHT: u16 = 5;

impl<K: SubmissionSink> Widget for &App<K> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        current_screen::<K>(self.page()).render(self, area, buf);

        if let Some(notice) = self.notice() {
            render_notice(notice, area, buf);
        }
    }
}

pub fn draw<K: SubmissionSink>(app: &App<K>, f: &mut Frame) {
    f.render_widget(app, f.area());
}

/// `(key) action` pairs on one dimmed line
fn legend<'a>(keys: &[(&'a str, &'a str)]) -> Paragraph<'a> {
    let key_style = Style::default().add_modifier(Modifier::BOLD);
    let pairs = keys.iter().map(|(key, action)| {
        vec![
            Span::styled(format!("({key})"), key_style),
            Span::raw(format!(" {action}")),
        ]
    });
    let spans = Itertools::intersperse(pairs, vec![Span::raw("  ")])
        .flatten()
        .collect::<Vec<Span>>();

    Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
}

fn render_notice(message: &str, area: Rect, buf: &mut Buffer) {
    // borders plus one cell of padding each side
    let wanted = (message.width() as u16).saturating_add(4);
    let width = wanted.max(NOTICE_MIN_WIDTH).min(area.width);
    let height = NOTICE_HEIGHT.min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "press any key",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title("notice"))
    .render(popup, buf);
}
