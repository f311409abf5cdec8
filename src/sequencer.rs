// Which screen is up, which task it belongs to, and what has been confirmed.
//
//   Main(i)    --confirm-end--> Results(i)
//   Results(i) --next-->        Main(i+1) | Final (i == total)
//   Results(i) --back-->        Main(i)
//   Main(i)    --back-->        Results(i-1) (i > 1)
//   Final      --back-->        Results(total)
//
// The store is only written on confirm-end and next; edits abandoned with
// back from a main screen are dropped.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::NavError,
    selection::{Selection, SelectionState},
    submission::{Response, Responses, SubmissionSink},
    tasks::TaskCatalog,
    timer::Timer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Page {
    Main,
    Results,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    ConfirmEnd,
    Next,
    Back,
}

/// Current screen and the 1-based task it belongs to.
/// On the final screen `task` stays at the last task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub task: usize,
    pub page: Page,
}

impl NavState {
    pub fn main(task: usize) -> Self {
        Self {
            task,
            page: Page::Main,
        }
    }

    pub fn results(task: usize) -> Self {
        Self {
            task,
            page: Page::Results,
        }
    }
}

/// Confirmed selection per task. Always holds one entry per task; tasks not
/// yet confirmed keep the default selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSelections {
    entries: Vec<Selection>,
}

impl SavedSelections {
    pub fn new(total: usize) -> Self {
        Self {
            entries: vec![Selection::default(); total],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selection for a 1-based task
    pub fn get(&self, task: usize) -> Option<Selection> {
        task.checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Selection)> {
        self.entries.iter().enumerate().map(|(i, s)| (i + 1, s))
    }

    fn set(&mut self, task: usize, selection: Selection) {
        if let Some(slot) = task.checked_sub(1).and_then(|i| self.entries.get_mut(i)) {
            *slot = selection;
        }
    }
}

/// Outcome of a successful navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: Action,
    pub from: NavState,
    pub to: NavState,
    /// Task whose selection was written to the store, if any
    pub saved: Option<usize>,
    /// True when this step handed the session to the submission sink
    pub submitted: bool,
}

/// Owns the navigation state, the saved selections, the live selection and
/// the timer for one participant session.
#[derive(Debug)]
pub struct Sequencer<K> {
    catalog: TaskCatalog,
    session_id: String,
    nav: NavState,
    saved: SavedSelections,
    selection: SelectionState,
    timer: Timer,
    sink: K,
    /// Store contents as of the last hand-off to the sink
    last_sent: Option<SavedSelections>,
}

impl<K: SubmissionSink> Sequencer<K> {
    pub fn new(catalog: TaskCatalog, sink: K) -> Self {
        let saved = SavedSelections::new(catalog.total());
        let first = saved.get(1).unwrap_or_default();
        let mut timer = Timer::new();
        timer.restart();

        let session_id = Uuid::new_v4().to_string();
        info!(session = %session_id, tasks = catalog.total(), "session started");

        Self {
            catalog,
            session_id,
            nav: NavState::main(1),
            saved,
            selection: SelectionState::new(first),
            timer,
            sink,
            last_sent: None,
        }
    }

    pub fn nav(&self) -> NavState {
        self.nav
    }

    pub fn page(&self) -> Page {
        self.nav.page
    }

    pub fn current_task(&self) -> usize {
        self.nav.task
    }

    pub fn total_tasks(&self) -> usize {
        self.catalog.total()
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn current_label(&self) -> &str {
        self.catalog.label(self.nav.task).unwrap_or_default()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn saved(&self) -> &SavedSelections {
        &self.saved
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn has_submitted(&self) -> bool {
        self.last_sent.is_some()
    }

    /// All confirmed selections paired with their labels
    pub fn responses(&self) -> Responses {
        Responses {
            session_id: self.session_id.clone(),
            entries: self
                .saved
                .iter()
                .map(|(task, selection)| Response {
                    task,
                    label: self.catalog.label(task).unwrap_or_default().to_string(),
                    selection: *selection,
                })
                .collect(),
        }
    }

    pub fn apply(&mut self, action: Action) -> Result<Transition, NavError> {
        match action {
            Action::ConfirmEnd => self.confirm_end(),
            Action::Next => self.next(),
            Action::Back => self.back(),
        }
    }

    /// Main(i) -> Results(i): freeze the live selection and stop the clock
    pub fn confirm_end(&mut self) -> Result<Transition, NavError> {
        let from = self.nav;
        if from.page != Page::Main {
            return Err(self.unavailable(Action::ConfirmEnd));
        }

        self.snapshot();
        self.timer.stop();
        self.nav = NavState::results(from.task);

        Ok(self.transition(Action::ConfirmEnd, from, Some(from.task), false))
    }

    /// Results(i) -> Main(i+1), or Final after the last task
    pub fn next(&mut self) -> Result<Transition, NavError> {
        let from = self.nav;
        if from.page != Page::Results {
            return Err(self.unavailable(Action::Next));
        }

        self.snapshot();

        if from.task >= self.total_tasks() {
            let submitted = self.submit_if_changed();
            self.timer.stop();
            self.nav = NavState {
                task: from.task,
                page: Page::Final,
            };
            return Ok(self.transition(Action::Next, from, Some(from.task), submitted));
        }

        let task = from.task + 1;
        self.enter_main(task);
        Ok(self.transition(Action::Next, from, Some(from.task), false))
    }

    pub fn back(&mut self) -> Result<Transition, NavError> {
        let from = self.nav;
        match from.page {
            Page::Results => {
                // review the same task again
                self.enter_main(from.task);
            }
            Page::Main => {
                if from.task <= 1 {
                    warn!(task = from.task, "back requested on first task");
                    return Err(NavError::NoEarlierTask);
                }
                let task = from.task - 1;
                // in-progress edits on this task are dropped, not saved
                let previous = self.saved_or_default(task);
                self.selection.restore(previous);
                self.timer.stop();
                self.nav = NavState::results(task);
            }
            Page::Final => {
                self.nav = NavState::results(self.total_tasks());
            }
        }
        Ok(self.transition(Action::Back, from, None, false))
    }

    fn enter_main(&mut self, task: usize) {
        let selection = self.saved_or_default(task);
        self.selection.restore(selection);
        self.timer.restart();
        self.nav = NavState::main(task);
    }

    fn snapshot(&mut self) {
        self.saved.set(self.nav.task, self.selection.current());
    }

    fn saved_or_default(&self, task: usize) -> Selection {
        self.saved.get(task).unwrap_or_default()
    }

    /// Hand the store to the sink unless exactly this data already went out
    fn submit_if_changed(&mut self) -> bool {
        if self.last_sent.as_ref() == Some(&self.saved) {
            info!(session = %self.session_id, "store unchanged since last submission; skipping");
            return false;
        }
        let responses = self.responses();
        self.sink.submit(&responses);
        self.last_sent = Some(self.saved.clone());
        true
    }

    fn unavailable(&self, action: Action) -> NavError {
        warn!(%action, page = %self.nav.page, "navigation action ignored");
        NavError::Unavailable {
            action,
            page: self.nav.page,
        }
    }

    fn transition(
        &self,
        action: Action,
        from: NavState,
        saved: Option<usize>,
        submitted: bool,
    ) -> Transition {
        let t = Transition {
            action,
            from,
            to: self.nav,
            saved,
            submitted,
        };
        info!(
            %action,
            from_page = %t.from.page,
            from_task = t.from.task,
            to_page = %t.to.page,
            to_task = t.to.task,
            submitted,
            "transition"
        );
        t
    }
}
