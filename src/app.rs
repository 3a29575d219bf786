use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::RecommendationSource;
use crate::state::{FetchOutcome, FetchRequest, RecommendationController, RequestState};
use crate::theme::{Palette, ThemeMode};

/// How long a status message stays in the footer
const STATUS_SECONDS: u64 = 3;

/// The four interactive elements, in Tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Button,
    ThemeIcon,
    ThemeSwitch,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Input => Focus::Button,
            Focus::Button => Focus::ThemeIcon,
            Focus::ThemeIcon => Focus::ThemeSwitch,
            Focus::ThemeSwitch => Focus::Input,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Input => Focus::ThemeSwitch,
            Focus::Button => Focus::Input,
            Focus::ThemeIcon => Focus::Button,
            Focus::ThemeSwitch => Focus::ThemeIcon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub focus: Focus,
    pub popup: Popup,

    // User id being typed
    pub input_buffer: String,

    // Theme flag shared by the icon button and the switch
    pub theme_mode: ThemeMode,
    pub palette: Palette,

    pub controller: RecommendationController,

    // Advances once per tick while loading
    pub spinner_frame: usize,

    // Status message (shown in footer, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    source: Arc<dyn RecommendationSource>,
    outcome_tx: UnboundedSender<FetchOutcome>,
    outcome_rx: UnboundedReceiver<FetchOutcome>,
}

impl App {
    pub fn new(source: Arc<dyn RecommendationSource>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let theme_mode = ThemeMode::default();

        Self {
            focus: Focus::Input,
            popup: Popup::None,
            input_buffer: String::new(),
            theme_mode,
            palette: Palette::for_mode(theme_mode),
            controller: RecommendationController::new(),
            spinner_frame: 0,
            status_message: None,
            status_message_time: None,
            source,
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn state(&self) -> &RequestState {
        self.controller.state()
    }

    /// Set a status message (auto-clears after a few seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Theme shortcut works everywhere, popups included
        if key.code == KeyCode::Char('t') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.toggle_theme();
            return;
        }

        if self.popup == Popup::Help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::F(1)
            ) {
                self.popup = Popup::None;
            }
            return;
        }

        match key.code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Char('?') | KeyCode::F(1) => self.popup = Popup::Help,

            KeyCode::Enter => self.activate(),
            KeyCode::Char(' ') if self.focus != Focus::Input => self.activate(),

            KeyCode::Backspace if self.focus == Focus::Input => {
                self.input_buffer.pop();
            }
            // Numeric field: digits only
            KeyCode::Char(c) if self.focus == Focus::Input && c.is_ascii_digit() => {
                self.input_buffer.push(c);
            }

            _ => {}
        }
    }

    /// Press the focused element
    fn activate(&mut self) {
        match self.focus {
            Focus::Input | Focus::Button => self.request_recommendations(),
            Focus::ThemeIcon | Focus::ThemeSwitch => self.toggle_theme(),
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggle();
        self.palette = Palette::for_mode(self.theme_mode);
        tracing::debug!(scope = self.theme_mode.scope_class(), "theme toggled");
        self.set_status(if self.theme_mode.is_dark() { "Dark mode" } else { "Light mode" });
    }

    /// Validate the typed id and start a fetch for it
    pub fn request_recommendations(&mut self) {
        if let Some(request) = self.controller.submit(&self.input_buffer) {
            self.dispatch(request);
        }
    }

    /// Pre-fill the input and fetch right away
    pub fn request_for(&mut self, user_id: &str) {
        self.input_buffer = user_id.to_string();
        self.request_recommendations();
    }

    fn dispatch(&mut self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let result = source.recommend(&request.user_id).await;
            // Receiver only goes away on shutdown
            let _ = tx.send(FetchOutcome {
                seq: request.seq,
                result,
            });
        });
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        self.controller.resolve(outcome);
    }

    /// Apply finished fetches and advance timers. Called once per loop.
    pub fn tick(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }

        if self.state().is_loading() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }

        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_SECONDS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}
