use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    display::EyeDisplay,
    palette::{COLOR_COUNT, MAX_INTENSITY, MIN_INTENSITY, PATTERN_COUNT},
};

pub const DEFAULT_INTENSITY: u8 = 5;

/// One task's LED configuration: 1-based color and pattern indices plus intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub color_index: u8,
    pub pattern_index: u8,
    pub intensity: u8,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            color_index: 1,
            pattern_index: 1,
            intensity: DEFAULT_INTENSITY,
        }
    }
}

impl Selection {
    pub fn new(color_index: u8, pattern_index: u8, intensity: u8) -> Self {
        Self {
            color_index,
            pattern_index,
            intensity,
        }
    }
}

/// The live, editable selection for the task on screen.
///
/// Every change re-renders the eye display with the full triple.
#[derive(Debug, Clone)]
pub struct SelectionState {
    current: Selection,
    display: EyeDisplay,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(Selection::default())
    }
}

impl SelectionState {
    pub fn new(initial: Selection) -> Self {
        let mut state = Self {
            current: initial,
            display: EyeDisplay::new(),
        };
        state.refresh();
        state
    }

    pub fn current(&self) -> Selection {
        self.current
    }

    pub fn display(&self) -> &EyeDisplay {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut EyeDisplay {
        &mut self.display
    }

    pub fn set_color(&mut self, index: u8) {
        self.current.color_index = index;
        self.refresh();
    }

    pub fn set_pattern(&mut self, index: u8) {
        self.current.pattern_index = index;
        self.refresh();
    }

    pub fn set_intensity(&mut self, value: u8) {
        self.current.intensity = value;
        self.refresh();
    }

    /// Replace the whole triple, e.g. when navigating to another task
    pub fn restore(&mut self, selection: Selection) {
        self.current = selection;
        self.refresh();
    }

    /// Step the color index, wrapping around the picker
    pub fn cycle_color(&mut self, forward: bool) {
        let next = cycle(self.current.color_index, COLOR_COUNT, forward);
        self.set_color(next);
    }

    pub fn cycle_pattern(&mut self, forward: bool) {
        let next = cycle(self.current.pattern_index, PATTERN_COUNT, forward);
        self.set_pattern(next);
    }

    /// Step intensity by one, saturating at the range ends
    pub fn nudge_intensity(&mut self, up: bool) {
        let value = if up {
            self.current.intensity.saturating_add(1).min(MAX_INTENSITY)
        } else {
            self.current.intensity.saturating_sub(1).max(MIN_INTENSITY)
        };
        self.set_intensity(value);
    }

    fn refresh(&mut self) {
        debug!(selection = ?self.current, "render eyes");
        if let Err(err) = self.display.apply(&self.current) {
            // fail closed: the eyes stay blank until a valid triple arrives
            debug!(%err, selection = ?self.current, "selection kept with blank eyes");
        }
    }
}

fn cycle(index: u8, count: u8, forward: bool) -> u8 {
    if count == 0 {
        return index;
    }
    let zero_based = index.clamp(1, count) - 1;
    let next = if forward {
        (zero_based + 1) % count
    } else {
        (zero_based + count - 1) % count
    };
    next + 1
}
