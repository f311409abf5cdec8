use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::{
    config::DEFAULT_CONFIRMATION_CODE,
    error::NavError,
    palette::MAX_INTENSITY,
    runtime::AppEvent,
    sequencer::{Action, Page, Sequencer, Transition},
    submission::SubmissionSink,
    tasks::TaskCatalog,
};

/// Whether the event loop keeps going after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The single owned session value. All input is routed through here, one
/// event at a time.
#[derive(Debug)]
pub struct App<K> {
    pub sequencer: Sequencer<K>,
    confirmation_code: String,
    notice: Option<String>,
    last_transition: Option<Transition>,
}

impl<K: SubmissionSink> App<K> {
    pub fn new(catalog: TaskCatalog, sink: K) -> Self {
        Self::with_confirmation_code(catalog, sink, DEFAULT_CONFIRMATION_CODE)
    }

    pub fn with_confirmation_code(
        catalog: TaskCatalog,
        sink: K,
        confirmation_code: impl Into<String>,
    ) -> Self {
        Self {
            sequencer: Sequencer::new(catalog, sink),
            confirmation_code: confirmation_code.into(),
            notice: None,
            last_transition: None,
        }
    }

    pub fn page(&self) -> Page {
        self.sequencer.page()
    }

    pub fn confirmation_code(&self) -> &str {
        &self.confirmation_code
    }

    /// Message the participant must acknowledge with a key press
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn last_transition(&self) -> Option<&Transition> {
        self.last_transition.as_ref()
    }

    /// The confirm control only becomes usable once the timer reveals it
    pub fn confirm_available(&self) -> bool {
        self.page() == Page::Main && self.sequencer.timer().confirm_revealed()
    }

    pub fn on_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Tick(dt) => {
                self.on_tick(dt);
                Flow::Continue
            }
            AppEvent::Resize => Flow::Continue,
        }
    }

    pub fn on_tick(&mut self, dt: Duration) {
        for tick in self.sequencer.timer_mut().advance(dt) {
            if tick.elapsed_secs == 1 && tick.reveal_confirm {
                debug!(task = self.sequencer.current_task(), "confirm control revealed");
            }
        }
        self.sequencer
            .selection_mut()
            .display_mut()
            .advance(dt.as_secs_f64());
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            info!(page = %self.page(), task = self.sequencer.current_task(), "quit requested");
            return Flow::Quit;
        }

        // a pending notice swallows the next key
        if self.notice.take().is_some() {
            return Flow::Continue;
        }

        match self.page() {
            Page::Main => self.on_main_key(key),
            Page::Results => match key.code {
                KeyCode::Char('n') | KeyCode::Enter => self.navigate(Action::Next),
                KeyCode::Char('b') | KeyCode::Backspace => self.navigate(Action::Back),
                _ => {}
            },
            Page::Final => {
                if matches!(key.code, KeyCode::Char('b') | KeyCode::Backspace) {
                    self.navigate(Action::Back);
                }
            }
        }
        Flow::Continue
    }

    fn on_main_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if self.confirm_available() {
                    self.navigate(Action::ConfirmEnd);
                }
                return;
            }
            KeyCode::Char('b') | KeyCode::Backspace => {
                self.navigate(Action::Back);
                return;
            }
            _ => {}
        }

        let selection = self.sequencer.selection_mut();
        match key.code {
            KeyCode::Left => selection.cycle_color(false),
            KeyCode::Right => selection.cycle_color(true),
            KeyCode::Up => selection.cycle_pattern(false),
            KeyCode::Down => selection.cycle_pattern(true),
            KeyCode::Char('+') | KeyCode::Char('=') => selection.nudge_intensity(true),
            KeyCode::Char('-') => selection.nudge_intensity(false),
            KeyCode::Char('0') => selection.set_intensity(MAX_INTENSITY),
            KeyCode::Char(c @ '1'..='9') => selection.set_intensity(c as u8 - b'0'),
            _ => {}
        }
    }

    fn navigate(&mut self, action: Action) {
        match self.sequencer.apply(action) {
            Ok(transition) => self.last_transition = Some(transition),
            Err(NavError::NoEarlierTask) => {
                self.notice = Some(NavError::NoEarlierTask.to_string());
            }
            // keys are page-scoped, so this only happens if bindings drift
            Err(err) => debug!(%err, "navigation ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        selection::Selection,
        sequencer::NavState,
        submission::{LogSink, Responses},
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App<LogSink> {
        App::new(TaskCatalog::default(), LogSink::default())
    }

    fn reveal(app: &mut App<LogSink>) {
        app.on_tick(Duration::from_secs(1));
    }

    #[test]
    fn selection_keys_edit_live_selection() {
        let mut app = app();
        app.on_key(key(KeyCode::Right));
        app.on_key(key(KeyCode::Right));
        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Char('7')));
        assert_eq!(
            app.sequencer.selection().current(),
            Selection::new(3, 2, 7)
        );

        app.on_key(key(KeyCode::Char('0')));
        assert_eq!(app.sequencer.selection().current().intensity, 10);
        app.on_key(key(KeyCode::Char('-')));
        assert_eq!(app.sequencer.selection().current().intensity, 9);
    }

    #[test]
    fn enter_waits_for_confirm_reveal() {
        let mut app = app();
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.page(), Page::Main);

        reveal(&mut app);
        assert!(app.confirm_available());
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.sequencer.nav(), NavState::results(1));
        assert_eq!(
            app.last_transition().map(|t| t.action),
            Some(Action::ConfirmEnd)
        );
    }

    #[test]
    fn back_on_first_task_raises_blocking_notice() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('b')));
        assert_eq!(app.notice(), Some("no earlier task to go back to"));
        assert_eq!(app.sequencer.nav(), NavState::main(1));

        // the next key only dismisses the notice
        app.on_key(key(KeyCode::Right));
        assert!(app.notice().is_none());
        assert_eq!(app.sequencer.selection().current().color_index, 1);
    }

    #[test]
    fn results_keys_navigate() {
        let mut app = app();
        reveal(&mut app);
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Backspace));
        assert_eq!(app.sequencer.nav(), NavState::main(1));

        reveal(&mut app);
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(app.sequencer.nav(), NavState::main(2));
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut app = app();
        assert_eq!(app.on_key(key(KeyCode::Esc)), Flow::Quit);
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Quit
        );
        assert_eq!(app.on_key(key(KeyCode::Char('c'))), Flow::Continue);
    }

    #[test]
    fn ticks_drive_timer_and_animation() {
        let mut app = app();
        app.on_event(AppEvent::Tick(Duration::from_millis(2500)));
        assert_eq!(app.sequencer.timer().elapsed_secs(), 2);
        assert!(app.sequencer.selection().display().clock_secs() > 2.0);
    }

    #[test]
    fn full_run_reaches_final_and_submits_once() {
        let mut app = app();
        for _ in 0..10 {
            reveal(&mut app);
            app.on_key(key(KeyCode::Enter));
            app.on_key(key(KeyCode::Enter));
        }
        assert_eq!(app.page(), Page::Final);
        assert_eq!(app.sequencer.sink().submissions(), 1);

        app.on_key(key(KeyCode::Char('b')));
        assert_eq!(app.sequencer.nav(), NavState::results(10));
        let responses: Responses = app.sequencer.responses();
        assert_eq!(responses.len(), 10);
    }
}
