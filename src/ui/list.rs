use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::helpers::{format_pokemon_name, format_types};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.view;
    let title = if view.is_search_active {
        format!("Search results ({})", view.entities.len())
    } else {
        format!("Pokemon ({} per page)", view.pagination.limit)
    };

    if !view.has_pokemons && !view.loading {
        let message = if view.is_search_active {
            format!("No Pokemon named \"{}\"", view.search_query)
        } else {
            "No Pokemon found".to_string()
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let empty = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = view
        .entities
        .iter()
        .enumerate()
        .map(|(i, pokemon)| {
            let style = if i == app.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("#{:<5}", pokemon.id),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(format!("{:<24}", format_pokemon_name(&pokemon.name)), style),
                Span::raw(" "),
                Span::styled(format_types(&pokemon.types), Style::default().fg(Color::Gray)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.selected));

    frame.render_stateful_widget(list, area, &mut state);
}
