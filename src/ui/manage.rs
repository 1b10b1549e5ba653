use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::models::Question;

const TITLE_PREVIEW_LENGTH: usize = 40;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let heading = Paragraph::new(format!("QUESTIONS ({})", app.total_questions()))
        .fg(Color::Magenta)
        .bold()
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(heading, chunks[0]);

    render_list(frame, chunks[1], app);

    let status = Paragraph::new(app.status().unwrap_or_default())
        .alignment(Alignment::Center)
        .fg(Color::Yellow);
    frame.render_widget(status, chunks[2]);

    let controls = Paragraph::new(
        "j/k select  ·  enter play  ·  a add  ·  e edit  ·  d delete  ·  l lock  ·  esc back",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[3]);
}

fn render_list(frame: &mut Frame, area: Rect, app: &App) {
    let selected = app.manage_selected();
    let active = app.current_question_number() - 1;

    let lines: Vec<Line> = app
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let is_selected = index == selected;
            let style = if is_selected {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if is_selected { ">" } else { " " };
            let playing = if index == active { "*" } else { " " };

            Line::from(vec![
                Span::styled(format!(" {}{} ", marker, playing), style),
                Span::styled(
                    format!("{:2}. ", index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(truncate_title(&question.title), style),
                Span::styled(summary(question), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let scroll = selected.saturating_sub(area.height.saturating_sub(1) as usize);
    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn summary(question: &Question) -> String {
    let timing = question
        .time_limit_sec
        .map(|secs| format!("{}s", secs))
        .unwrap_or_else(|| "untimed".to_string());
    format!("  ({} blanks, {})", question.blank_count(), timing)
}

fn truncate_title(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > TITLE_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(TITLE_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
