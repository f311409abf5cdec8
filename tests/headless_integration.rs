use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eyelab::{
    app::{App, Flow},
    runtime::{AppEvent, FixedTicker, Runner, TestEventSource},
    selection::Selection,
    sequencer::{NavState, Page},
    submission::{Responses, SubmissionSink},
    tasks::TaskCatalog,
};

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<Responses>,
}

impl SubmissionSink for Recorder {
    fn submit(&mut self, responses: &Responses) {
        self.calls.push(responses.clone());
    }
}

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Pump the runner until the app quits or the step budget runs out
fn drive(app: &mut App<Recorder>, runner: &Runner<TestEventSource, FixedTicker>, steps: u32) -> bool {
    for _ in 0..steps {
        if app.on_event(runner.step()) == Flow::Quit {
            return true;
        }
    }
    false
}

// Headless integration using the internal runtime without a TTY.
// A whole session is scripted over the channel and must reach the final page.
#[test]
fn headless_full_session_submits_once() {
    let mut app = App::new(TaskCatalog::default(), Recorder::default());

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // task 1: yellow, fade-blink, intensity 7
    tx.send(key(KeyCode::Right)).unwrap();
    tx.send(key(KeyCode::Right)).unwrap();
    tx.send(key(KeyCode::Down)).unwrap();
    tx.send(key(KeyCode::Char('7'))).unwrap();
    for _ in 0..10 {
        tx.send(AppEvent::Tick(Duration::from_secs(1))).unwrap();
        tx.send(key(KeyCode::Enter)).unwrap();
        tx.send(key(KeyCode::Char('n'))).unwrap();
    }
    tx.send(key(KeyCode::Esc)).unwrap();

    assert!(drive(&mut app, &runner, 200), "session should quit on esc");

    assert_eq!(app.page(), Page::Final);
    let calls = &app.sequencer.sink().calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 10);
    assert_eq!(calls[0].entries[0].selection, Selection::new(3, 2, 7));
    assert!(calls[0].entries[1..]
        .iter()
        .all(|r| r.selection == Selection::default()));
}

#[test]
fn headless_confirm_waits_for_timer() {
    let mut app = App::new(TaskCatalog::default(), Recorder::default());

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // too early: enter is ignored
    tx.send(key(KeyCode::Enter)).unwrap();
    drive(&mut app, &runner, 1);
    assert_eq!(app.sequencer.nav(), NavState::main(1));

    tx.send(AppEvent::Tick(Duration::from_millis(1200))).unwrap();
    tx.send(key(KeyCode::Enter)).unwrap();
    drive(&mut app, &runner, 2);
    assert_eq!(app.sequencer.nav(), NavState::results(1));
    assert_eq!(app.sequencer.timer().display(), "00:01");
}

#[test]
fn headless_real_ticks_advance_timer() {
    let mut app = App::new(TaskCatalog::default(), Recorder::default());

    let (_tx, rx) = mpsc::channel::<AppEvent>();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(20)),
    );

    // ~1.2s of idle ticking
    for _ in 0..150u32 {
        app.on_event(runner.step());
        if app.confirm_available() {
            break;
        }
    }
    assert!(app.confirm_available(), "confirm should be revealed after a second");
    assert!(app.sequencer.timer().elapsed_secs() >= 1);
}

#[test]
fn headless_back_from_first_task_needs_acknowledgement() {
    let mut app = App::new(TaskCatalog::default(), Recorder::default());

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key(KeyCode::Backspace)).unwrap();
    drive(&mut app, &runner, 1);
    assert!(app.notice().is_some());

    tx.send(key(KeyCode::Char('5'))).unwrap();
    tx.send(key(KeyCode::Char('9'))).unwrap();
    drive(&mut app, &runner, 2);
    assert!(app.notice().is_none());
    // first key only dismissed the notice
    assert_eq!(app.sequencer.selection().current().intensity, 9);
}
