use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::admin::EditorField;
use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let form = app.editor();
    let heading = if form.editing.is_some() {
        "EDIT QUESTION"
    } else {
        "NEW QUESTION"
    };

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let title = Paragraph::new(heading).fg(Color::Magenta).bold().block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(title, chunks[0]);

    for (field, chunk) in EditorField::ALL.into_iter().zip(&chunks[1..5]) {
        render_field(frame, *chunk, field, form.field(field), form.focused == field);
    }

    let error = Paragraph::new(form.error.as_deref().unwrap_or_default())
        .alignment(Alignment::Center)
        .fg(Color::Red);
    frame.render_widget(error, chunks[5]);

    let controls = Paragraph::new(
        "mark answers with [brackets]  ·  tab next field  ·  ^s save  ·  esc cancel",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[6]);
}

fn render_field(frame: &mut Frame, area: Rect, field: EditorField, value: &str, focused: bool) {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let mut line = vec![Span::styled(value, Style::default().fg(Color::White))];
    if focused {
        line.push(Span::styled("_", Style::default().fg(Color::Cyan)));
    }

    let widget = Paragraph::new(Line::from(line))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {} ", field.label()))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}
