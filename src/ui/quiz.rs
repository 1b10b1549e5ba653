use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::{Question, Token};
use crate::session::Session;

use super::format_clock;

const LOW_TIME_SECS: u32 = 10;
const EMPTY_BLANK: &str = "____";

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(question) = app.current_question() else {
        let widget = Paragraph::new("No questions available")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray);
        frame.render_widget(widget, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], app, question);
    render_audio(frame, chunks[1], app);
    render_transcript(frame, chunks[2], app.session(), question, app.focused_blank());
    render_status(frame, chunks[3], app, question);
    render_controls(frame, chunks[4]);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, question: &Question) {
    let columns = Layout::horizontal([Constraint::Fill(1), Constraint::Length(24)]).split(area);

    let title = Paragraph::new(question.title.as_str()).fg(Color::Cyan).bold();
    frame.render_widget(title, columns[0]);

    let mut right = vec![Span::styled(
        format!("{}/{}", app.current_question_number(), app.total_questions()),
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(remaining) = app.session().time_remaining() {
        let color = if remaining <= LOW_TIME_SECS {
            Color::Red
        } else {
            Color::Yellow
        };
        right.push(Span::raw("  "));
        right.push(Span::styled(
            format!("time {}", format_clock(u64::from(remaining))),
            Style::default().fg(color).bold(),
        ));
    }
    if app.is_admin() {
        right.push(Span::styled("  admin", Style::default().fg(Color::Magenta)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        columns[1],
    );
}

fn render_audio(frame: &mut Frame, area: Rect, app: &App) {
    let playback = app.playback();
    let (symbol, color) = if playback.is_playing() {
        ("||", Color::Green)
    } else {
        ("|>", Color::Gray)
    };
    let duration = playback
        .duration()
        .map(|d| format_clock(d.as_secs()))
        .unwrap_or_else(|| "--:--".to_string());

    let line = Line::from(vec![
        Span::styled(format!("{} ", symbol), Style::default().fg(color).bold()),
        Span::styled(
            format!("{} / {}", format_clock(playback.current_time().as_secs()), duration),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("  {}x  ", playback.rate()), Style::default().fg(Color::Cyan)),
        Span::styled(playback.url(), Style::default().fg(Color::DarkGray)),
    ]);

    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .title(" Audio ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn blank_style(session: &Session, question: &Question, index: usize, focused: usize) -> Style {
    match session.blank_status(index, question) {
        Some(true) => Style::default().fg(Color::Green).bold(),
        Some(false) => Style::default().fg(Color::Red).bold(),
        None if index == focused => Style::default()
            .fg(Color::Cyan)
            .bold()
            .add_modifier(Modifier::UNDERLINED),
        None => Style::default().fg(Color::Yellow),
    }
}

/// Literal text split on newlines with each blank drawn inline.
fn transcript_lines<'a>(
    session: &'a Session,
    question: &'a Question,
    focused: usize,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span> = Vec::new();

    for token in &question.tokens {
        match token {
            Token::Text { value } => {
                let mut parts = value.split('\n');
                if let Some(first) = parts.next() {
                    current.push(Span::raw(first));
                }
                for part in parts {
                    lines.push(Line::from(std::mem::take(&mut current)));
                    current.push(Span::raw(part));
                }
            }
            Token::Blank { index } => {
                let answer = session.answer(*index);
                let shown = if answer.is_empty() { EMPTY_BLANK } else { answer };
                current.push(Span::styled(
                    format!("[{}]", shown),
                    blank_style(session, question, *index, focused),
                ));
            }
        }
    }

    lines.push(Line::from(current));
    lines
}

fn render_transcript(
    frame: &mut Frame,
    area: Rect,
    session: &Session,
    question: &Question,
    focused: usize,
) {
    let widget = Paragraph::new(transcript_lines(session, question, focused))
        .wrap(Wrap { trim: false })
        .fg(Color::White)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray)
                .title(" Transcript ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App, question: &Question) {
    let session = app.session();
    let line = if session.is_checked() {
        let color = if session.score() == question.blank_count() {
            Color::Green
        } else {
            Color::Yellow
        };
        Line::from(Span::styled(
            format!("Score {} / {}", session.score(), question.blank_count()),
            Style::default().fg(color).bold(),
        ))
    } else {
        Line::from(Span::styled(
            app.status().unwrap_or_default(),
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "tab next blank  ·  enter check  ·  ^a answers  ·  ^r reset  ·  pgup/pgdn question  ·  ^p play  ·  ^←/→ seek  ·  ^↑/↓ speed  ·  F2 admin  ·  esc quit",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
