// Eye LED effects. `render` maps a selection onto an effect; `EyeDisplay`
// is the surface the front end samples frames from.

use tracing::warn;

use crate::{
    error::RenderError,
    palette::{duration_secs, EyeColor, Pattern, Rgba},
    selection::Selection,
};

/// Opening angle of the lit sector for the rotate patterns
const ROTATE_SWEEP_DEG: f64 = 130.0;
const ROTATE_FROM_DEG: f64 = -65.0;
/// Opening angle of each lit sector for the split patterns
const SPLIT_SWEEP_DEG: f64 = 45.0;
const SPLIT_DROP_FROM_DEG: f64 = -22.0;
const SPLIT_UP_FROM_DEG: f64 = 158.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Down,
    Up,
}

/// What a single eye does over one animation period
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EyeAnimation {
    /// Whole eye on for the first half of the period, off for the second
    StepBlink,
    /// Whole eye fades out and back in
    FadeBlink,
    /// A lit sector spinning around the eye
    RotateSector {
        from_deg: f64,
        sweep_deg: f64,
        rotation: Rotation,
    },
    /// Two mirrored sectors travelling along the left and right halves
    SplitSweep {
        from_deg: f64,
        sweep_deg: f64,
        flow: Flow,
    },
}

/// Complete visual description of both eyes for one selection
#[derive(Debug, Clone, PartialEq)]
pub struct EyeEffect {
    pub color: EyeColor,
    pub pattern: Pattern,
    pub intensity: u8,
    pub rgba: Rgba,
    pub duration_secs: f64,
    pub left: EyeAnimation,
    pub right: EyeAnimation,
}

/// Map a selection onto an effect. Fails for indices outside the palette.
pub fn render(selection: &Selection) -> Result<EyeEffect, RenderError> {
    let color = EyeColor::from_index(selection.color_index)
        .ok_or(RenderError::UnknownColor(selection.color_index))?;
    let pattern = Pattern::from_index(selection.pattern_index)
        .ok_or(RenderError::UnknownPattern(selection.pattern_index))?;

    let (left, right) = match pattern {
        Pattern::StepBlink => (EyeAnimation::StepBlink, EyeAnimation::StepBlink),
        Pattern::FadeBlink => (EyeAnimation::FadeBlink, EyeAnimation::FadeBlink),
        Pattern::Rotate => (
            rotate(Rotation::Clockwise),
            rotate(Rotation::Clockwise),
        ),
        Pattern::AsymmetricRotate => (
            rotate(Rotation::CounterClockwise),
            rotate(Rotation::Clockwise),
        ),
        Pattern::SplitDrop => {
            let sweep = split(SPLIT_DROP_FROM_DEG, Flow::Down);
            (sweep, sweep)
        }
        Pattern::SplitUp => {
            let sweep = split(SPLIT_UP_FROM_DEG, Flow::Up);
            (sweep, sweep)
        }
    };

    Ok(EyeEffect {
        color,
        pattern,
        intensity: selection.intensity,
        rgba: color.rgba(),
        duration_secs: duration_secs(selection.intensity),
        left,
        right,
    })
}

fn rotate(rotation: Rotation) -> EyeAnimation {
    EyeAnimation::RotateSector {
        from_deg: ROTATE_FROM_DEG,
        sweep_deg: ROTATE_SWEEP_DEG,
        rotation,
    }
}

fn split(from_deg: f64, flow: Flow) -> EyeAnimation {
    EyeAnimation::SplitSweep {
        from_deg,
        sweep_deg: SPLIT_SWEEP_DEG,
        flow,
    }
}

/// Lit level per cell of a round eye, row-major. `None` marks cells outside the eye.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeFrame {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Option<f64>>,
}

impl EyeFrame {
    pub fn get(&self, x: u16, y: u16) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn lit_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Some(level) if *level > 0.0))
            .count()
    }
}

impl EyeEffect {
    pub fn animation(&self, eye: Eye) -> EyeAnimation {
        match eye {
            Eye::Left => self.left,
            Eye::Right => self.right,
        }
    }

    /// Fraction of the current period elapsed at `t_secs`, in 0.0..1.0
    pub fn phase(&self, t_secs: f64) -> f64 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        (t_secs.max(0.0) / self.duration_secs).fract()
    }

    /// Sample one eye at `t_secs` into a `width` x `height` grid
    pub fn sample(&self, eye: Eye, t_secs: f64, width: u16, height: u16) -> EyeFrame {
        let phase = self.phase(t_secs);
        let animation = self.animation(eye);
        let mut cells = Vec::with_capacity(width as usize * height as usize);

        for y in 0..height {
            for x in 0..width {
                let nx = (x as f64 + 0.5) / width as f64 * 2.0 - 1.0;
                let ny = (y as f64 + 0.5) / height as f64 * 2.0 - 1.0;
                if nx * nx + ny * ny > 1.0 {
                    cells.push(None);
                    continue;
                }
                cells.push(Some(level_at(animation, phase, clock_angle(nx, ny))));
            }
        }

        EyeFrame {
            width,
            height,
            cells,
        }
    }
}

/// Angle in degrees measured clockwise from 12 o'clock, in 0.0..360.0
fn clock_angle(nx: f64, ny: f64) -> f64 {
    nx.atan2(-ny).to_degrees().rem_euclid(360.0)
}

fn in_sector(angle: f64, from_deg: f64, sweep_deg: f64) -> bool {
    (angle - from_deg).rem_euclid(360.0) < sweep_deg
}

fn level_at(animation: EyeAnimation, phase: f64, angle: f64) -> f64 {
    match animation {
        EyeAnimation::StepBlink => {
            if phase < 0.5 {
                1.0
            } else {
                0.0
            }
        }
        EyeAnimation::FadeBlink => ((2.0 * std::f64::consts::PI * phase).cos() + 1.0) / 2.0,
        EyeAnimation::RotateSector {
            from_deg,
            sweep_deg,
            rotation,
        } => {
            let turn = 360.0 * phase;
            let start = match rotation {
                Rotation::Clockwise => from_deg + turn,
                Rotation::CounterClockwise => from_deg - turn,
            };
            if in_sector(angle, start, sweep_deg) {
                1.0
            } else {
                0.0
            }
        }
        EyeAnimation::SplitSweep {
            from_deg,
            sweep_deg,
            flow,
        } => {
            // fold the left half onto the right so both halves move in mirror
            let folded = if angle > 180.0 { 360.0 - angle } else { angle };
            let travel = 180.0 * phase;
            let start = match flow {
                Flow::Down => from_deg + travel,
                Flow::Up => from_deg - travel,
            };
            if in_sector(folded, start, sweep_deg) {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// The visual surface both eyes are drawn from.
///
/// Every [`apply`](EyeDisplay::apply) first resets to the blank baseline, so the
/// result only depends on the latest selection.
#[derive(Debug, Default, Clone)]
pub struct EyeDisplay {
    effect: Option<EyeEffect>,
    clock_secs: f64,
}

impl EyeDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.effect = None;
        self.clock_secs = 0.0;
    }

    /// Replace the shown effect. On an unknown color or pattern the surface
    /// stays blank and the error is returned.
    pub fn apply(&mut self, selection: &Selection) -> Result<&EyeEffect, RenderError> {
        self.reset();
        match render(selection) {
            Ok(effect) => Ok(self.effect.insert(effect)),
            Err(err) => {
                warn!(%err, ?selection, "eye display left blank");
                Err(err)
            }
        }
    }

    pub fn effect(&self) -> Option<&EyeEffect> {
        self.effect.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        self.effect.is_none()
    }

    /// Advance the animation clock
    pub fn advance(&mut self, dt_secs: f64) {
        if self.effect.is_some() {
            self.clock_secs += dt_secs.max(0.0);
        }
    }

    pub fn clock_secs(&self) -> f64 {
        self.clock_secs
    }

    pub fn frame(&self, eye: Eye, width: u16, height: u16) -> Option<EyeFrame> {
        self.effect
            .as_ref()
            .map(|effect| effect.sample(eye, self.clock_secs, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(color: u8, pattern: u8, intensity: u8) -> Selection {
        Selection {
            color_index: color,
            pattern_index: pattern,
            intensity,
        }
    }

    #[test]
    fn render_maps_indices_to_palette() {
        let effect = render(&sel(3, 2, 7)).unwrap();
        assert_eq!(effect.color, EyeColor::Yellow);
        assert_eq!(effect.pattern, Pattern::FadeBlink);
        assert_eq!(effect.rgba, Rgba::opaque(255, 255, 0));
        assert!((effect.duration_secs - 0.8).abs() < 1e-9);
        assert_eq!(effect.left, EyeAnimation::FadeBlink);
    }

    #[test]
    fn asymmetric_rotate_spins_eyes_in_opposite_directions() {
        let effect = render(&sel(1, 4, 5)).unwrap();
        assert!(matches!(
            effect.left,
            EyeAnimation::RotateSector {
                rotation: Rotation::CounterClockwise,
                ..
            }
        ));
        assert!(matches!(
            effect.right,
            EyeAnimation::RotateSector {
                rotation: Rotation::Clockwise,
                ..
            }
        ));
    }

    #[test]
    fn split_patterns_flow_in_opposite_directions() {
        let drop = render(&sel(1, 5, 5)).unwrap();
        let up = render(&sel(1, 6, 5)).unwrap();
        assert!(matches!(
            drop.left,
            EyeAnimation::SplitSweep { flow: Flow::Down, from_deg, .. } if from_deg == SPLIT_DROP_FROM_DEG
        ));
        assert!(matches!(
            up.right,
            EyeAnimation::SplitSweep { flow: Flow::Up, from_deg, .. } if from_deg == SPLIT_UP_FROM_DEG
        ));
    }

    #[test]
    fn render_rejects_unknown_indices() {
        assert_eq!(render(&sel(0, 1, 5)), Err(RenderError::UnknownColor(0)));
        assert_eq!(render(&sel(9, 1, 5)), Err(RenderError::UnknownColor(9)));
        assert_eq!(render(&sel(1, 7, 5)), Err(RenderError::UnknownPattern(7)));
    }

    #[test]
    fn apply_is_idempotent() {
        let mut display = EyeDisplay::new();
        let first = display.apply(&sel(2, 3, 4)).unwrap().clone();
        display.advance(0.7);
        let second = display.apply(&sel(2, 3, 4)).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(display.clock_secs(), 0.0);
    }

    #[test]
    fn apply_fails_closed() {
        let mut display = EyeDisplay::new();
        display.apply(&sel(2, 3, 4)).unwrap();
        assert!(display.apply(&sel(2, 42, 4)).is_err());
        assert!(display.is_blank());
        assert!(display.frame(Eye::Left, 8, 4).is_none());
    }

    #[test]
    fn step_blink_toggles_each_half_period() {
        let effect = render(&sel(1, 1, 10)).unwrap(); // 0.2s period
        let on = effect.sample(Eye::Left, 0.05, 8, 4);
        let off = effect.sample(Eye::Left, 0.15, 8, 4);
        assert!(on.lit_count() > 0);
        assert_eq!(off.lit_count(), 0);
    }

    #[test]
    fn fade_blink_is_dimmest_mid_period() {
        let effect = render(&sel(1, 2, 6)).unwrap(); // 1.0s period
        let mid = effect.sample(Eye::Right, 0.5, 6, 6);
        let start = effect.sample(Eye::Right, 0.0, 6, 6);
        let level = |f: &EyeFrame| f.cells.iter().flatten().cloned().fold(0.0, f64::max);
        assert!(level(&mid) < 1e-9);
        assert!((level(&start) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rotate_sector_moves_over_time() {
        let effect = render(&sel(1, 3, 6)).unwrap();
        let a = effect.sample(Eye::Left, 0.0, 9, 9);
        let b = effect.sample(Eye::Left, 0.5, 9, 9);
        assert!(a.lit_count() > 0);
        assert_ne!(a, b);
        // top-center cell lit at the start, bottom-center after half a turn
        assert_eq!(a.get(4, 0), Some(1.0));
        assert_eq!(b.get(4, 8), Some(1.0));
    }

    #[test]
    fn frame_masks_corners() {
        let effect = render(&sel(1, 1, 5)).unwrap();
        let frame = effect.sample(Eye::Left, 0.0, 10, 10);
        assert_eq!(frame.get(0, 0), None);
        assert!(frame.get(5, 5).is_some());
        assert_eq!(frame.get(10, 0), None);
    }
}
