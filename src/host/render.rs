// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! User interface rendering.
//!
//! [`draw`] is called on every tick. The screen shows the active page, the
//! commands that can fire right now, the example state and recent activity.

use keymaster::{KeyToken, Page};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Padding, Paragraph, Row, Table},
};

use crate::host::{App, theme::Theme};

pub(crate) fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    // Outer layout: header, main, footer
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(9),
            Constraint::Length(1),
        ])
        .split(area);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(outer[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(outer[2]);

    draw_header(f, outer[0], app);

    let registry = app.keymaster.registry();
    draw_commands(f, main[0], "Page Selection", registry.page_selection(), &app.theme);

    let page = app.keymaster.active_page();
    let active = match page {
        Page::None => &[][..],
        page => registry.tokens_for_page(page),
    };
    draw_commands(f, main[1], &format!("{page} Commands"), active, &app.theme);

    draw_state(f, bottom[0], app);
    draw_activity(f, bottom[1], app);

    f.render_widget(
        Paragraph::new(" 0-4 select page   Esc quit").style(Style::default().fg(app.theme.muted_colour)),
        outer[3],
    );
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(50)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(" KeyMaster ", Style::default().add_modifier(Modifier::BOLD)).fg(theme.accent_colour),
        Span::raw(" page "),
        Span::styled(app.keymaster.active_page().name(), Style::default().add_modifier(Modifier::BOLD))
            .fg(theme.label_fg),
    ]);
    f.render_widget(Paragraph::new(title), chunks[0]);

    let remote = Line::from(vec![
        Span::raw("remote "),
        Span::styled(app.remote_status.as_str(), Style::default().fg(theme.muted_colour)),
    ]);
    f.render_widget(Paragraph::new(remote).alignment(Alignment::Right), chunks[1]);
}

fn draw_commands(f: &mut Frame, area: Rect, title: &str, tokens: &[KeyToken], theme: &Theme) {
    let rows = tokens.iter().map(|token| {
        Row::new(vec![
            Cell::from(Line::from(token.trigger().to_string()).alignment(Alignment::Right))
                .style(Style::default().fg(theme.key_fg)),
            Cell::from(token.label()).style(Style::default().fg(theme.label_fg)),
            Cell::from(token.source_type()).style(Style::default().fg(theme.source_fg)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ],
    )
    .header(
        Row::new(vec![
            Cell::from(Line::from("Key").alignment(Alignment::Right)),
            Cell::from("Command"),
            Cell::from("Source"),
        ])
        .style(Style::default().bold().fg(theme.accent_colour)),
    )
    .column_spacing(2)
    .block(block(title, theme));

    f.render_widget(table, area);
}

fn draw_state(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let state = app.state.get();

    let flag = |name: &str, on: bool| {
        Line::from(vec![
            Span::raw(format!("{name:<12}")),
            if on {
                Span::styled("on", Style::default().fg(theme.on_fg))
            } else {
                Span::styled("off", Style::default().fg(theme.off_fg))
            },
        ])
    };

    let mut lines = vec![
        flag("Dev mode", state.dev_mode),
        flag("Console", state.console_output),
        flag("Spotlight", state.spotlight),
        Line::from(format!("{:<12}{}°", "Light", state.light_rotation)),
        flag("UI", state.ui_visible),
    ];
    if state.ui_visible {
        if let Some(clock) = &state.clock {
            lines.push(Line::from(format!("{:<12}{clock}", "Time")));
        }
    }

    f.render_widget(Paragraph::new(lines).block(block("State", theme)), area);
}

fn draw_activity(f: &mut Frame, area: Rect, app: &App) {
    let state = app.state.get();
    let visible = area.height.saturating_sub(2) as usize;

    let items: Vec<ListItem> = state
        .activity
        .iter()
        .rev()
        .take(visible)
        .map(|line| ListItem::new(line.as_str()))
        .collect();

    f.render_widget(List::new(items).block(block("Activity", &app.theme)), area);
}

fn block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_colour))
        .padding(Padding::horizontal(1))
}
