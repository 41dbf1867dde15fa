mod quiz;
mod result;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    // Each frame is drawn from one snapshot.
    let snapshot = app.snapshot();
    if snapshot.is_submitted() {
        result::render(frame, area, app, &snapshot);
    } else {
        quiz::render(frame, area, app, &snapshot);
    }
}
