use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::session::{OptionMark, QuizSnapshot};

use super::OPTION_LABELS;

pub fn render(frame: &mut Frame, area: Rect, app: &App, snapshot: &QuizSnapshot) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], snapshot);
    render_question_breakdown(frame, chunks[2], app, snapshot);
    render_controls(frame, chunks[3]);
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, snapshot: &QuizSnapshot) {
    let score = snapshot.score().unwrap_or(0);
    let total = snapshot.total_questions();
    let percentage = snapshot.percentage().unwrap_or(0.0);
    let verdict = snapshot.verdict().map(|v| v.message()).unwrap_or_default();

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "QUIZ COMPLETE",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("You scored {} out of {}  ({:.0}%)", score, total, percentage),
            Style::default().fg(get_grade_color(percentage)).bold(),
        )),
        Line::from(verdict.fg(Color::DarkGray)),
        Line::from(format!("attempt {}", snapshot.attempt()).fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn mark_style(mark: OptionMark) -> (&'static str, Style) {
    match mark {
        OptionMark::Correct => ("✓", Style::default().fg(Color::Green).bold()),
        OptionMark::IncorrectSelected => ("✗", Style::default().fg(Color::Red).bold()),
        OptionMark::Neutral => (" ", Style::default().fg(Color::Gray)),
    }
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, app: &App, snapshot: &QuizSnapshot) {
    let mut lines: Vec<Line> = Vec::new();

    for (index, question) in snapshot.questions().iter().enumerate() {
        let (symbol, color) = if snapshot.is_correct(index) {
            ("+", Color::Green)
        } else {
            ("-", Color::Red)
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", symbol), Style::default().fg(color).bold()),
            Span::styled(
                format!("{:2}. ", index + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(question.question.as_str(), Style::default().fg(Color::White)),
        ]));

        let marks = snapshot.option_marks(index).unwrap_or_default();
        for ((option, mark), label) in question.options.iter().zip(marks).zip(OPTION_LABELS) {
            let (glyph, style) = mark_style(mark);
            lines.push(Line::from(vec![
                Span::styled(format!("     {} ", glyph), style),
                Span::styled(format!("{}. ", label), style),
                Span::styled(option.as_str(), style),
            ]));
        }

        if !question.explanation.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("     Explanation: ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    question.explanation.as_str(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().padding(Padding::horizontal(1)));
    let limit = widget.line_count(area.width).saturating_sub(area.height as usize);
    app.set_result_scroll_limit(limit);

    let scroll = u16::try_from(app.result_scroll()).unwrap_or(u16::MAX);
    frame.render_widget(widget.scroll((scroll, 0)), area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r try again  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::models::QuizQuestion;

    fn graded_app(explanation: &str) -> App {
        let questions = vec![
            QuizQuestion::new("First?", ["a", "b", "c", "d"], "a", explanation),
            QuizQuestion::new("Second?", ["a", "b", "c", "d"], "b", explanation),
        ];
        let mut app = App::with_questions(questions, "notes.txt").unwrap();
        app.choose_highlighted();
        app.next_question();
        app.choose_highlighted();
        app.submit();
        app
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| crate::ui::render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_wrapped_breakdown_scrolls_to_the_end() {
        let explanation = "Long explanation text wraps over many rows. ".repeat(6) + "FINAL";
        let mut app = graded_app(&explanation);

        assert!(!draw(&app, 30, 20).contains("FINAL"));
        for _ in 0..200 {
            app.scroll_results_down();
        }
        let narrow_limit = app.result_scroll();
        assert!(narrow_limit > 0);
        assert!(draw(&app, 30, 20).contains("FINAL"));

        // Wider rows wrap less, so the limit shrinks and the offset follows.
        draw(&app, 200, 20);
        assert!(app.result_scroll() < narrow_limit);
        assert!(draw(&app, 200, 20).contains("FINAL"));
    }

    #[test]
    fn test_grade_colors() {
        assert_eq!(get_grade_color(100.0), Color::Green);
        assert_eq!(get_grade_color(75.0), Color::Cyan);
        assert_eq!(get_grade_color(66.7), Color::Yellow);
        assert_eq!(get_grade_color(20.0), Color::Red);
    }

    #[test]
    fn test_mark_glyphs() {
        assert_eq!(mark_style(OptionMark::Correct).0, "✓");
        assert_eq!(mark_style(OptionMark::IncorrectSelected).0, "✗");
        assert_eq!(mark_style(OptionMark::Neutral).0, " ");
    }
}
