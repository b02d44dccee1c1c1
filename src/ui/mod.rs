mod detail;
mod list;
mod popup;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::action::InputMode;
use crate::app::{App, Screen};
use crate::helpers::format_pokemon_name;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::List => list::render(frame, app, chunks[1]),
        Screen::Detail => detail::render(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);

    match app.input_mode {
        InputMode::Search => popup::render_input(frame, "Search by name", &app.input),
        InputMode::GoToPage => popup::render_input(frame, "Go to page", &app.input),
        InputMode::Normal => {}
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.screen {
        Screen::List if app.view.is_search_active => {
            format!("dexview - Search: \"{}\"", app.view.search_query)
        }
        Screen::List => format!(
            "dexview - Page {}/{} ({} total)",
            app.view.current_page,
            app.view.total_pages.max(1),
            app.view.pagination.total
        ),
        Screen::Detail => match &app.detail {
            Some(p) => format!("dexview - #{} {}", p.id, format_pokemon_name(&p.name)),
            None => "dexview - Detail".to_string(),
        },
    };

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (error, loading) = match app.screen {
        Screen::List => (app.view.error.as_ref(), app.view.loading),
        Screen::Detail => (app.detail_error.as_ref(), app.detail_loading),
    };

    let status = if let Some(error) = error {
        Line::from(vec![Span::styled(
            format!("Error: {} (x: dismiss)", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )])
    } else if loading {
        Line::from(vec![Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = match app.screen {
            Screen::List if app.view.is_search_active => {
                "j/k: nav | Enter: open | /: search | c: clear search | q: quit"
            }
            Screen::List => {
                "j/k: nav | n/p: page | g: go to | +/-: size | /: search | r: refresh | Enter: open | q: quit"
            }
            Screen::Detail => "j/k: scroll | o: open image | r: reload | q: back",
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
