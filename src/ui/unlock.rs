use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(9),
        Constraint::Fill(1),
    ])
    .split(area);

    let masked = "*".repeat(app.unlock_input().chars().count());
    let error = app.unlock_error().unwrap_or_default();

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "ADMIN MODE",
            Style::default().fg(Color::Magenta).bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Passphrase: ", Style::default().fg(Color::White)),
            Span::styled(masked, Style::default().fg(Color::Yellow)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(Span::styled(error, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from("enter unlock  ·  esc back".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}
