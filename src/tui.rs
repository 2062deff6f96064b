use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::fmt::money;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const PURCHASE_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const VIEW_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const ACTUAL_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const PREDICTED_STYLE: Style = Style::new().fg(Color::Magenta);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Format an amount as a colored Span: green when the event is a purchase,
/// dim otherwise (non-purchase amounts are list prices, not revenue).
pub fn amount_span(amount: f64, is_purchase: bool) -> Span<'static> {
    let style = if is_purchase { PURCHASE_STYLE } else { VIEW_STYLE };
    Span::styled(money(amount), style)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}
