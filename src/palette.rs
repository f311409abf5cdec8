use std::f64::consts::PI;

/// Number of selectable eye colors
pub const COLOR_COUNT: u8 = 8;
/// Number of selectable blink/motion patterns
pub const PATTERN_COUNT: u8 = 6;
pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 10;

/// RGBA color with an alpha in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Scale the color channels towards black; `level` is clamped to 0.0..=1.0
    pub fn dimmed(&self, level: f64) -> Self {
        let level = level.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f64 * level).round() as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EyeColor {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Magenta,
}

impl EyeColor {
    /// All colors in picker order; position + 1 is the color index
    pub const ALL: [EyeColor; COLOR_COUNT as usize] = [
        EyeColor::Red,
        EyeColor::Orange,
        EyeColor::Yellow,
        EyeColor::Green,
        EyeColor::Cyan,
        EyeColor::Blue,
        EyeColor::Purple,
        EyeColor::Magenta,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize).copied())
    }

    pub fn index(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|c| c == self)
            .map(|p| p as u8 + 1)
            .unwrap_or(1)
    }

    pub fn rgba(&self) -> Rgba {
        match self {
            EyeColor::Red => Rgba::opaque(255, 0, 0),
            EyeColor::Orange => Rgba::opaque(255, 165, 0),
            EyeColor::Yellow => Rgba::opaque(255, 255, 0),
            EyeColor::Green => Rgba::opaque(0, 128, 0),
            EyeColor::Cyan => Rgba::opaque(0, 255, 255),
            EyeColor::Blue => Rgba::opaque(0, 0, 255),
            EyeColor::Purple => Rgba::opaque(128, 0, 128),
            EyeColor::Magenta => Rgba::opaque(255, 0, 255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Pattern {
    StepBlink,
    FadeBlink,
    Rotate,
    AsymmetricRotate,
    SplitDrop,
    SplitUp,
}

impl Pattern {
    pub const ALL: [Pattern; PATTERN_COUNT as usize] = [
        Pattern::StepBlink,
        Pattern::FadeBlink,
        Pattern::Rotate,
        Pattern::AsymmetricRotate,
        Pattern::SplitDrop,
        Pattern::SplitUp,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize).copied())
    }

    pub fn index(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|p| p == self)
            .map(|p| p as u8 + 1)
            .unwrap_or(1)
    }
}

/// Animation period in seconds for an intensity; higher intensity animates faster.
/// Intensities outside 1..=10 are clamped.
pub fn duration_secs(intensity: u8) -> f64 {
    let intensity = intensity.clamp(MIN_INTENSITY, MAX_INTENSITY);
    0.2 * (11 - intensity) as f64
}

/// Offset of color button `index` (0-based) on the radial picker, relative to its center.
/// The first button sits at the top and the rest follow clockwise.
pub fn radial_position(index: usize, total: usize, radius: f64) -> (f64, f64) {
    if total == 0 {
        return (0.0, 0.0);
    }
    let angle_increment = (2.0 * PI) / total as f64;
    let angle = index as f64 * angle_increment - PI / 2.0;
    (radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_indices_are_one_based() {
        assert_eq!(EyeColor::from_index(1), Some(EyeColor::Red));
        assert_eq!(EyeColor::from_index(3), Some(EyeColor::Yellow));
        assert_eq!(EyeColor::from_index(8), Some(EyeColor::Magenta));
        assert_eq!(EyeColor::from_index(0), None);
        assert_eq!(EyeColor::from_index(9), None);
        assert_eq!(EyeColor::Cyan.index(), 5);
    }

    #[test]
    fn pattern_indices_are_one_based() {
        assert_eq!(Pattern::from_index(1), Some(Pattern::StepBlink));
        assert_eq!(Pattern::from_index(6), Some(Pattern::SplitUp));
        assert_eq!(Pattern::from_index(7), None);
        assert_eq!(Pattern::AsymmetricRotate.index(), 4);
    }

    #[test]
    fn names_match_picker_labels() {
        assert_eq!(EyeColor::Magenta.to_string(), "magenta");
        assert_eq!(Pattern::AsymmetricRotate.to_string(), "asymmetric-rotate");
        assert_eq!(Pattern::SplitDrop.to_string(), "split-drop");
    }

    #[test]
    fn rgba_values() {
        assert_eq!(EyeColor::Orange.rgba(), Rgba::opaque(255, 165, 0));
        assert_eq!(EyeColor::Green.rgba(), Rgba::opaque(0, 128, 0));
        assert_eq!(
            EyeColor::Purple.rgba().to_string(),
            "rgba(128, 0, 128, 1)"
        );
    }

    #[test]
    fn duration_decreases_with_intensity() {
        assert!((duration_secs(1) - 2.0).abs() < 1e-9);
        assert!((duration_secs(5) - 1.2).abs() < 1e-9);
        assert!((duration_secs(10) - 0.2).abs() < 1e-9);
        for i in 1..10 {
            assert!(duration_secs(i) > duration_secs(i + 1));
        }
    }

    #[test]
    fn radial_layout_starts_at_top() {
        let (x, y) = radial_position(0, 8, 65.0);
        assert!(x.abs() < 1e-9);
        assert!((y + 65.0).abs() < 1e-9);

        // quarter turn clockwise lands on the right
        let (x, y) = radial_position(2, 8, 65.0);
        assert!((x - 65.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn dimmed_scales_channels() {
        let c = Rgba::opaque(200, 100, 0).dimmed(0.5);
        assert_eq!((c.r, c.g, c.b), (100, 50, 0));
        assert_eq!(Rgba::opaque(10, 10, 10).dimmed(2.0).r, 10);
    }
}
