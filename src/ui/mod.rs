use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, Popup};
use crate::state::RequestState;
use crate::theme::Palette;

pub const TITLE: &str = "Product Recommendation System";
pub const INPUT_LABEL: &str = "Enter User ID";
pub const BUTTON_LABEL: &str = "Get Recommendations";
pub const LIST_HEADING: &str = "Recommended Products:";
pub const EMPTY_LIST_MESSAGE: &str = "No recommendations found.";

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Everything that is conditionally shown, decided from state alone
#[derive(Debug, PartialEq, Eq)]
pub struct View<'a> {
    pub show_progress: bool,
    pub error: Option<&'a str>,
    pub items: &'a [String],
    pub show_empty_message: bool,
}

impl<'a> View<'a> {
    pub fn from_state(state: &'a RequestState) -> Self {
        let loading = state.is_loading();
        let items = state.recommendations();

        Self {
            show_progress: loading,
            error: state.error().filter(|e| !e.is_empty()),
            items,
            show_empty_message: items.is_empty() && !loading,
        }
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let palette = &app.palette;
    let view = View::from_state(app.state());

    // Paint the whole screen in the current mode first
    f.render_widget(Block::default().style(palette.base()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // App bar
            Constraint::Length(1),
            Constraint::Length(3), // Input
            Constraint::Length(3), // Button
            Constraint::Length(1), // Progress
            Constraint::Length(1), // Error
            Constraint::Length(1), // Heading
            Constraint::Min(1),    // List
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_app_bar(f, app, chunks[0]);
    draw_input(f, app, centered_columns(40, chunks[2]));
    draw_button(f, app, centered_columns(40, chunks[3]));

    if view.show_progress {
        let frame = SPINNER[app.spinner_frame % SPINNER.len()];
        let progress = Paragraph::new(Line::from(vec![
            Span::styled(frame, Style::default().fg(palette.primary)),
            Span::styled(" Loading…", Style::default().fg(palette.text)),
        ]))
        .alignment(Alignment::Center);
        f.render_widget(progress, chunks[4]);
    }

    if let Some(error) = view.error {
        let error = Paragraph::new(Span::styled(error, Style::default().fg(palette.error)))
            .alignment(Alignment::Center);
        f.render_widget(error, chunks[5]);
    }

    let heading = Paragraph::new(Span::styled(
        LIST_HEADING,
        Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    f.render_widget(heading, chunks[6]);

    draw_list(f, &view, palette, chunks[7]);
    draw_footer(f, app, chunks[8]);

    if app.popup == Popup::Help {
        draw_help_popup(f, palette);
    }
}

fn focused(app: &App, focus: Focus) -> Modifier {
    if app.focus == focus {
        Modifier::REVERSED
    } else {
        Modifier::empty()
    }
}

fn draw_app_bar(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let bar = palette.app_bar();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(4), // Icon button
            Constraint::Length(6), // Switch
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        format!(" {}", TITLE),
        bar.add_modifier(Modifier::BOLD),
    ))
    .style(bar);
    f.render_widget(title, chunks[0]);

    // Icon shows the mode a press switches to
    let icon = if app.theme_mode.is_dark() { "☀" } else { "☾" };
    let icon = Paragraph::new(Span::styled(
        format!(" {} ", icon),
        bar.add_modifier(focused(app, Focus::ThemeIcon)),
    ))
    .style(bar)
    .alignment(Alignment::Center);
    f.render_widget(icon, chunks[1]);

    let knob = if app.theme_mode.is_dark() { "━━●" } else { "○━━" };
    let switch = Paragraph::new(Span::styled(
        format!(" {} ", knob),
        bar.add_modifier(focused(app, Focus::ThemeSwitch)),
    ))
    .style(bar)
    .alignment(Alignment::Center);
    f.render_widget(switch, chunks[2]);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let is_active = app.focus == Focus::Input;
    let border_color = if is_active { palette.secondary } else { palette.primary };
    let cursor = if is_active { "_" } else { "" };

    let input = Paragraph::new(format!("{}{}", app.input_buffer, cursor))
        .style(Style::default().fg(palette.text))
        .block(
            Block::default()
                .title(Span::styled(format!(" {} ", INPUT_LABEL), Style::default().fg(palette.primary)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    f.render_widget(input, area);
}

fn draw_button(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let is_active = app.focus == Focus::Button;

    let label_style = if is_active {
        palette.app_bar().add_modifier(Modifier::BOLD)
    } else {
        palette.app_bar()
    };
    let border_color = if is_active { palette.secondary } else { palette.primary };

    let button = Paragraph::new(Span::styled(BUTTON_LABEL.to_uppercase(), label_style))
        .style(palette.app_bar())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    f.render_widget(button, area);
}

fn draw_list(f: &mut Frame, view: &View, palette: &Palette, area: Rect) {
    let lines: Vec<Line> = if !view.items.is_empty() {
        view.items
            .iter()
            .map(|item| Line::styled(item.as_str(), Style::default().fg(palette.text)))
            .collect()
    } else if view.show_empty_message {
        vec![Line::styled(EMPTY_LIST_MESSAGE, Style::default().fg(palette.text))]
    } else {
        Vec::new()
    };

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let dim = Style::default().fg(palette.primary);

    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(palette.secondary)))
    } else {
        Line::from(vec![
            Span::styled("Tab", Style::default().fg(palette.text)),
            Span::styled(" focus  ", dim),
            Span::styled("Enter", Style::default().fg(palette.text)),
            Span::styled(" press  ", dim),
            Span::styled("^T", Style::default().fg(palette.text)),
            Span::styled(" theme  ", dim),
            Span::styled("?", Style::default().fg(palette.text)),
            Span::styled(" help  ", dim),
            Span::styled("Esc", Style::default().fg(palette.text)),
            Span::styled(" quit", dim),
        ])
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_help_popup(f: &mut Frame, palette: &Palette) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", k), Style::default().fg(palette.primary)),
            Span::styled(what, Style::default().fg(palette.text)),
        ])
    };
    let heading = |h: &'static str| {
        Line::from(Span::styled(
            h,
            Style::default().fg(palette.secondary).add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = vec![
        heading("═══ Navigation ═══"),
        key("Tab", "Next control (input → button → icon → switch)"),
        key("Shift+Tab", "Previous control"),
        Line::from(""),
        heading("═══ Actions ═══"),
        key("0-9", "Type a user id"),
        key("Enter", "Get recommendations / press focused control"),
        key("Space", "Press focused button or switch"),
        key("Ctrl+T", "Toggle light/dark"),
        Line::from(""),
        heading("═══ Quit ═══"),
        key("Esc", "Quit (or close this help)"),
        key("Ctrl+C", "Quit"),
    ];

    let help = Paragraph::new(help_text)
        .style(palette.base())
        .block(
            Block::default()
                .title(Span::styled(" Help ", Style::default().fg(palette.primary)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.primary)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

/// A column of `width` cells centered in `r` (whole row if narrower)
fn centered_columns(width: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    Rect {
        x: r.x + (r.width - width) / 2,
        width,
        ..r
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchError, RecommendationSource};
    use crate::state::{FetchOutcome, EMPTY_ID_MESSAGE};
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    struct NoSource;

    #[async_trait]
    impl RecommendationSource for NoSource {
        async fn recommend(&self, _user_id: &str) -> Result<Vec<String>, FetchError> {
            Ok(Vec::new())
        }
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().to_string()
    }

    fn resolve(app: &mut App, items: &[&str]) {
        let request = app.controller.submit("1").unwrap();
        app.controller.resolve(FetchOutcome {
            seq: request.seq,
            result: Ok(items.iter().map(|s| s.to_string()).collect()),
        });
    }

    #[test]
    fn test_view_idle() {
        let state = RequestState::Idle;
        let view = View::from_state(&state);
        assert!(!view.show_progress);
        assert_eq!(view.error, None);
        assert!(view.show_empty_message);
    }

    #[test]
    fn test_view_loading_hides_empty_message() {
        let state = RequestState::Loading {
            shown: Vec::new(),
            error: None,
        };
        let view = View::from_state(&state);
        assert!(view.show_progress);
        assert!(!view.show_empty_message);
    }

    #[test]
    fn test_view_loading_with_validation_error() {
        let state = RequestState::Loading {
            shown: vec!["A".to_string()],
            error: Some("bad id".to_string()),
        };
        let view = View::from_state(&state);
        assert!(view.show_progress);
        assert_eq!(view.error, Some("bad id"));
        assert_eq!(view.items, ["A"]);
    }

    #[test]
    fn test_view_error_with_previous_items() {
        let state = RequestState::Failed {
            message: "boom".to_string(),
            shown: vec!["A".to_string()],
        };
        let view = View::from_state(&state);
        assert_eq!(view.error, Some("boom"));
        assert_eq!(view.items, ["A"]);
        assert!(!view.show_empty_message);
        assert!(!view.show_progress);
    }

    #[test]
    fn test_render_always_shows_controls() {
        let app = App::new(Arc::new(NoSource));
        let screen = render(&app);

        assert!(screen.contains(TITLE));
        assert!(screen.contains(INPUT_LABEL));
        assert!(screen.contains("GET RECOMMENDATIONS"));
        assert!(screen.contains(LIST_HEADING));
        assert!(screen.contains(EMPTY_LIST_MESSAGE));
        assert!(!screen.contains("Loading"));
    }

    #[test]
    fn test_render_results_in_order() {
        let mut app = App::new(Arc::new(NoSource));
        resolve(&mut app, &["Kettle", "Toaster"]);
        let screen = render(&app);

        let kettle = screen.find("Kettle").unwrap();
        let toaster = screen.find("Toaster").unwrap();
        assert!(kettle < toaster);
        assert!(!screen.contains(EMPTY_LIST_MESSAGE));
    }

    #[test]
    fn test_render_loading_and_error() {
        let mut app = App::new(Arc::new(NoSource));
        app.controller.submit("5");
        let screen = render(&app);
        assert!(screen.contains("Loading"));
        assert!(!screen.contains(EMPTY_LIST_MESSAGE));

        let mut app = App::new(Arc::new(NoSource));
        app.controller.submit("");
        let screen = render(&app);
        assert!(screen.contains(EMPTY_ID_MESSAGE));
        assert!(screen.contains(EMPTY_LIST_MESSAGE));
    }

    #[test]
    fn test_render_help_popup() {
        let mut app = App::new(Arc::new(NoSource));
        app.popup = Popup::Help;
        assert!(render(&app).contains("Toggle light/dark"));
    }

    #[test]
    fn test_centered_columns_clamps() {
        let r = Rect::new(0, 0, 20, 3);
        assert_eq!(centered_columns(40, r), r);
        assert_eq!(centered_columns(10, r), Rect::new(5, 0, 10, 3));
    }
}
