use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

/// Render a centered one-line input box with a trailing cursor
pub fn render_input(frame: &mut Frame, title: &str, input: &str) {
    let area = centered_rect(50, 3, frame.area());
    frame.render_widget(Clear, area);

    let line = Line::from(vec![
        Span::raw(input.to_string()),
        Span::styled("_", Style::default().fg(Color::Yellow)),
    ]);

    let popup = Paragraph::new(line).block(
        Block::default().borders(Borders::ALL).title(Span::styled(
            format!(" {} (Enter/Esc) ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    );

    frame.render_widget(popup, area);
}

/// Create a centered rect of the given size, clamped to `outer`
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let popup_width = width.min(outer.width);
    let popup_height = height.min(outer.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((outer.height.saturating_sub(popup_height)) / 2),
            Constraint::Length(popup_height),
            Constraint::Min(0),
        ])
        .split(outer);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((outer.width.saturating_sub(popup_width)) / 2),
            Constraint::Length(popup_width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped() {
        let outer = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(50, 3, outer);
        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 3);
        assert_eq!(rect.y, 3);
    }
}
