use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::helpers::{format_abilities, format_height, format_pokemon_name, format_types, format_weight};
use crate::types::Pokemon;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Detail");

    let Some(pokemon) = &app.detail else {
        let empty = Paragraph::new("Nothing selected")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let paragraph = Paragraph::new(detail_lines(pokemon))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset.min(u16::MAX as usize) as u16, 0));

    frame.render_widget(paragraph, area);
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn detail_lines(pokemon: &Pokemon) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("#{} {}", pokemon.id, format_pokemon_name(&pokemon.name)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field("Types", format_types(&pokemon.types)),
        field("Height", format_height(pokemon.height)),
        field("Weight", format_weight(pokemon.weight)),
        field("Abilities", format_abilities(&pokemon.abilities)),
    ];

    if let Some(image) = &pokemon.image {
        lines.push(field("Image", image.clone()));
    }

    if let Some(stats) = pokemon.stats {
        lines.push(Line::from(""));
        lines.push(section("Stats"));
        for (label, value) in [
            ("HP", stats.hp),
            ("Attack", stats.attack),
            ("Defense", stats.defense),
            ("Sp. Atk", stats.special_attack),
            ("Sp. Def", stats.special_defense),
            ("Speed", stats.speed),
        ] {
            let bar = "█".repeat((value / 10) as usize);
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{:>3} ", value)),
                Span::styled(bar, Style::default().fg(Color::Green)),
            ]));
        }
    }

    if !pokemon.moves.is_empty() {
        lines.push(Line::from(""));
        lines.push(section("Moves"));
        for mv in &pokemon.moves {
            let power = mv.power.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
            let accuracy = mv
                .accuracy
                .map(|a| format!("{}%", a))
                .unwrap_or_else(|| "-".into());
            lines.push(Line::from(vec![
                Span::raw(format!("{:<20}", format_pokemon_name(&mv.name))),
                Span::styled(format!("{:<10}", mv.kind), Style::default().fg(Color::Gray)),
                Span::raw(format!("pow {:>3}  acc {:>4}", power, accuracy)),
            ]));
        }
    }

    if !pokemon.forms.is_empty() {
        lines.push(Line::from(""));
        lines.push(section("Forms"));
        for form in &pokemon.forms {
            lines.push(Line::from(vec![
                Span::raw(format!("  {:<20}", format_pokemon_name(&form.name))),
                Span::styled(form.url.clone(), Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    lines
}
