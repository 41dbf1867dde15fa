use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::session::QuizSnapshot;

use super::OPTION_LABELS;

pub fn render(frame: &mut Frame, area: Rect, app: &App, snapshot: &QuizSnapshot) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_header(frame, chunks[0], app.title(), snapshot);
    render_progress(frame, chunks[1], snapshot);
    render_question_text(frame, chunks[3], &snapshot.current_question().question);
    render_options(frame, chunks[4], snapshot, app.highlighted_option());
    render_controls(frame, chunks[5], snapshot);
}

/// Where the cursor is; matches the gauge fill.
fn position_label(snapshot: &QuizSnapshot) -> String {
    format!(
        "Question {} of {}",
        snapshot.current_index() + 1,
        snapshot.total_questions()
    )
}

fn answered_label(snapshot: &QuizSnapshot) -> String {
    format!(
        "{} of {} answered",
        snapshot.answered_count(),
        snapshot.total_questions()
    )
}

fn render_header(frame: &mut Frame, area: Rect, title: &str, snapshot: &QuizSnapshot) {
    let halves = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);

    frame.render_widget(Paragraph::new(title).fg(Color::Cyan).bold(), halves[0]);
    frame.render_widget(
        Paragraph::new(answered_label(snapshot))
            .alignment(Alignment::Right)
            .fg(Color::DarkGray),
        halves[1],
    );
}

fn render_progress(frame: &mut Frame, area: Rect, snapshot: &QuizSnapshot) {
    let widget = Gauge::default()
        .ratio(snapshot.progress_fraction().clamp(0.0, 1.0))
        .label(position_label(snapshot))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black));
    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, snapshot: &QuizSnapshot, highlighted: usize) {
    let question = snapshot.current_question();
    let selected = snapshot.selected_answer(snapshot.current_index());
    let mut lines: Vec<Line> = Vec::with_capacity(question.options.len() * 2);

    for (index, option) in question.options.iter().enumerate() {
        let is_highlighted = index == highlighted;
        let is_selected = selected == Some(option.as_str());

        let style = match (is_highlighted, is_selected) {
            (_, true) => Style::default().fg(Color::Green).bold(),
            (true, false) => Style::default().fg(Color::Cyan).bold(),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let cursor = if is_highlighted { ">" } else { " " };
        let radio = if is_selected { "(*)" } else { "( )" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} {} ", cursor, radio), style),
            Span::styled(format!("{}. ", OPTION_LABELS[index]), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Color::DarkGray)
                .padding(Padding::vertical(1)),
        );
    frame.render_widget(widget, area);
}

/// Only actions whose guard currently holds are offered.
fn render_controls(frame: &mut Frame, area: Rect, snapshot: &QuizSnapshot) {
    let mut hints = vec!["j/k move", "enter choose"];
    if snapshot.can_go_previous() {
        hints.push("h previous");
    }
    if snapshot.can_go_next() {
        hints.push("l next");
    }
    if snapshot.can_submit() {
        hints.push("s submit");
    }
    hints.push("r reset");
    hints.push("q quit");

    let widget = Paragraph::new(hints.join("  ·  "))
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuizQuestion;
    use crate::session::QuizSession;

    #[test]
    fn test_gauge_label_follows_position() {
        let questions = vec![
            QuizQuestion::new("One?", ["a", "b", "c", "d"], "a", ""),
            QuizQuestion::new("Two?", ["a", "b", "c", "d"], "a", ""),
            QuizQuestion::new("Three?", ["a", "b", "c", "d"], "a", ""),
        ];
        let mut session = QuizSession::new(questions).unwrap();
        session.select_answer(0, "a").unwrap();
        session.go_next().unwrap();
        session.select_answer(1, "b").unwrap();
        session.go_previous().unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.progress_fraction(), 1.0 / 3.0);
        assert_eq!(position_label(&snapshot), "Question 1 of 3");
        assert_eq!(answered_label(&snapshot), "2 of 3 answered");
    }
}
