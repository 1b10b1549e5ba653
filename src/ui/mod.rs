mod editor;
mod manage;
mod quiz;
mod unlock;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::models::AppState;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.state {
        AppState::Quiz => quiz::render(frame, area, app),
        AppState::Unlock => unlock::render(frame, area, app),
        AppState::Manage => manage::render(frame, area, app),
        AppState::Editor => editor::render(frame, area, app),
    }
}

/// `m:ss` for a whole number of seconds.
fn format_clock(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
