use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::{
    display::{Eye, EyeDisplay},
    palette::{radial_position, EyeColor, Rgba},
};

const EYE_MAX_WIDTH: u16 = 18;
const EYE_MAX_HEIGHT: u16 = 9;
const LIT_SYMBOL: &str = "█";
const DARK_SYMBOL: &str = "·";

fn rgb(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Both robot eyes, sampled from the display surface at its current clock
pub struct EyesWidget<'a> {
    pub display: &'a EyeDisplay,
}

impl Widget for EyesWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let half = area.width / 2;
        let left = Rect::new(area.x, area.y, half, area.height);
        let right = Rect::new(area.x + half, area.y, area.width - half, area.height);
        draw_eye(self.display, Eye::Left, left, buf);
        draw_eye(self.display, Eye::Right, right, buf);
    }
}

fn draw_eye(display: &EyeDisplay, eye: Eye, area: Rect, buf: &mut Buffer) {
    let width = area.width.saturating_sub(2).min(EYE_MAX_WIDTH);
    let height = area.height.min(EYE_MAX_HEIGHT);
    if width == 0 || height == 0 {
        return;
    }
    let x0 = area.x + (area.width - width) / 2;
    let y0 = area.y + (area.height - height) / 2;

    // blank baseline: outline only
    let Some(frame) = display.frame(eye, width, height) else {
        let dim = Style::default().fg(Color::DarkGray);
        let outline = display_outline(width, height);
        for (x, y) in outline {
            if let Some(cell) = buf.cell_mut((x0 + x, y0 + y)) {
                cell.set_symbol(DARK_SYMBOL).set_style(dim);
            }
        }
        return;
    };
    let color = display.effect().map(|e| e.rgba).unwrap_or(Rgba::opaque(0, 0, 0));

    for y in 0..height {
        for x in 0..width {
            let Some(level) = frame.get(x, y) else {
                continue;
            };
            let Some(cell) = buf.cell_mut((x0 + x, y0 + y)) else {
                continue;
            };
            if level > 0.05 {
                cell.set_symbol(LIT_SYMBOL)
                    .set_style(Style::default().fg(rgb(color.dimmed(level))));
            } else {
                cell.set_symbol(DARK_SYMBOL)
                    .set_style(Style::default().fg(Color::DarkGray));
            }
        }
    }
}

/// Cells on the rim of a round eye
fn display_outline(width: u16, height: u16) -> Vec<(u16, u16)> {
    let mut cells = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let nx = (x as f64 + 0.5) / width as f64 * 2.0 - 1.0;
            let ny = (y as f64 + 0.5) / height as f64 * 2.0 - 1.0;
            let r = nx * nx + ny * ny;
            if (0.55..=1.0).contains(&r) {
                cells.push((x, y));
            }
        }
    }
    cells
}

/// The eight color swatches laid out on a circle, first one at the top
pub struct ColorWheel {
    pub selected: u8,
}

impl Widget for ColorWheel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        let cx = area.x as f64 + area.width as f64 / 2.0;
        let cy = area.y as f64 + area.height as f64 / 2.0;
        // terminal cells are about twice as tall as wide
        let ry = (area.height as f64 / 2.0 - 1.0).max(1.0);
        let rx = (ry * 2.0).min(area.width as f64 / 2.0 - 1.0);

        for (i, color) in EyeColor::ALL.iter().enumerate() {
            let (dx, dy) = radial_position(i, EyeColor::ALL.len(), 1.0);
            let x = (cx + dx * rx).floor() as u16;
            let y = (cy + dy * ry).floor() as u16;
            let selected = color.index() == self.selected;
            let (symbol, style) = if selected {
                (
                    "◉",
                    Style::default()
                        .fg(rgb(color.rgba()))
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                )
            } else {
                ("●", Style::default().fg(rgb(color.rgba())))
            };
            if area.contains((x, y).into()) {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(symbol).set_style(style);
                }
            }
        }
    }
}
