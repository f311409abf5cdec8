use std::time::Duration;

/// Seconds on the clock after which the confirm control is shown.
/// Applies to every task.
pub const CONFIRM_REVEAL_SECS: u64 = 1;

const TICK: Duration = Duration::from_secs(1);

/// Emitted once per elapsed second while the timer runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerTick {
    pub elapsed_secs: u64,
    pub display: String,
    pub reveal_confirm: bool,
}

/// Elapsed-time counter for the task on screen.
///
/// Driven by [`advance`](Timer::advance) from the event loop; partial seconds
/// carry over between calls until [`start`](Timer::start) discards them.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    elapsed_secs: u64,
    running: bool,
    carry: Duration,
    confirm_revealed: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start ticking. Any pending partial second is dropped so only one
    /// tick schedule is ever live.
    pub fn start(&mut self) {
        self.carry = Duration::ZERO;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.carry = Duration::ZERO;
    }

    pub fn reset(&mut self) {
        self.elapsed_secs = 0;
        self.carry = Duration::ZERO;
        self.confirm_revealed = false;
    }

    /// Reset and start; used whenever the main screen is (re-)entered
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn confirm_revealed(&self) -> bool {
        self.confirm_revealed
    }

    pub fn display(&self) -> String {
        format_elapsed(self.elapsed_secs)
    }

    /// One whole-second tick
    pub fn on_tick(&mut self) -> TimerTick {
        self.elapsed_secs += 1;
        if self.elapsed_secs >= CONFIRM_REVEAL_SECS {
            self.confirm_revealed = true;
        }
        TimerTick {
            elapsed_secs: self.elapsed_secs,
            display: self.display(),
            reveal_confirm: self.confirm_revealed,
        }
    }

    /// Feed wall-clock time and collect the ticks that fall due. Stopped
    /// timers ignore the time entirely.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerTick> {
        if !self.running {
            return Vec::new();
        }
        self.carry += dt;
        let mut ticks = Vec::new();
        while self.carry >= TICK {
            self.carry -= TICK;
            ticks.push(self.on_tick());
        }
        ticks
    }
}

/// `MM:SS` with two-digit zero padding. Minutes keep growing past 99.
pub fn format_elapsed(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
