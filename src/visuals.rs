//! Colors, palettes and particle shapes.
//!
//! A [`Palette`] is an ordered, never-empty list of RGB colors. Named
//! [`Scheme`]s provide the built-in palettes; custom palettes can be parsed
//! from hex strings.
//!
//! ```ignore
//! let palette = Scheme::Synthwave.palette();
//! let custom = Palette::from_hex(&["#ff0080", "#00ffff"])?;
//! ```

use std::str::FromStr;

use glam::Vec3;
use rand::Rng;
use tracing::warn;

use crate::error::ConfigError;

/// Named color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    /// Cyan Dream (default).
    #[default]
    Cyan,
    /// Magenta Pulse.
    Magenta,
    /// Classic seven-color rainbow.
    Rainbow,
    /// Purple Haze.
    Purple,
    Electric,
    Ocean,
    Fire,
    Aurora,
    Synthwave,
    Vaporwave,
    Cosmic,
    NeonCity,
    Toxic,
    Sunset,
    Matrix,
    Plasma,
    Rave,
    Festival,
    LaserShow,
}

impl Scheme {
    /// Every built-in scheme, in menu order.
    pub const ALL: [Scheme; 19] = [
        Scheme::Cyan,
        Scheme::Magenta,
        Scheme::Rainbow,
        Scheme::Purple,
        Scheme::Electric,
        Scheme::Ocean,
        Scheme::Fire,
        Scheme::Aurora,
        Scheme::Synthwave,
        Scheme::Vaporwave,
        Scheme::Cosmic,
        Scheme::NeonCity,
        Scheme::Toxic,
        Scheme::Sunset,
        Scheme::Matrix,
        Scheme::Plasma,
        Scheme::Rave,
        Scheme::Festival,
        Scheme::LaserShow,
    ];

    /// Kebab-case name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Cyan => "cyan",
            Scheme::Magenta => "magenta",
            Scheme::Rainbow => "rainbow",
            Scheme::Purple => "purple",
            Scheme::Electric => "electric",
            Scheme::Ocean => "ocean",
            Scheme::Fire => "fire",
            Scheme::Aurora => "aurora",
            Scheme::Synthwave => "synthwave",
            Scheme::Vaporwave => "vaporwave",
            Scheme::Cosmic => "cosmic",
            Scheme::NeonCity => "neon-city",
            Scheme::Toxic => "toxic",
            Scheme::Sunset => "sunset",
            Scheme::Matrix => "matrix",
            Scheme::Plasma => "plasma",
            Scheme::Rave => "rave",
            Scheme::Festival => "festival",
            Scheme::LaserShow => "laser-show",
        }
    }

    /// Hex color stops of this scheme.
    pub fn hex(&self) -> &'static [&'static str] {
        match self {
            Scheme::Cyan => &["#00FFFF", "#00D4FF", "#0099FF", "#00AAFF"],
            Scheme::Magenta => &["#FF00FF", "#FF0080", "#FF1493", "#FF69B4"],
            Scheme::Rainbow => &[
                "#FF0000", "#FF7F00", "#FFFF00", "#00FF00", "#0000FF", "#4B0082", "#9400D3",
            ],
            Scheme::Purple => &["#9D00FF", "#B347FF", "#8A2BE2", "#A020F0"],
            Scheme::Electric => &["#00FFFF", "#FFFF00", "#FF00FF", "#FFFFFF"],
            Scheme::Ocean => &["#006994", "#0099CC", "#33CCFF", "#66FFFF"],
            Scheme::Fire => &["#FF0000", "#FF4500", "#FF8C00", "#FFD700"],
            Scheme::Aurora => &["#00FF87", "#60EFFF", "#7B2FFF", "#FF2E93"],
            Scheme::Synthwave => &["#FF00C1", "#9600FF", "#4900FF", "#00B8FF", "#00FFF9"],
            Scheme::Vaporwave => &["#FF71CE", "#01CDFE", "#05FFA1", "#B967FF", "#FFFB96"],
            Scheme::Cosmic => &["#2E0854", "#7B2CBF", "#C77DFF", "#E0AAFF", "#FFFFFF"],
            Scheme::NeonCity => &["#FE019A", "#00FEFC", "#FFF700", "#39FF14"],
            Scheme::Toxic => &["#39FF14", "#CCFF00", "#7FFF00", "#00FF7F"],
            Scheme::Sunset => &["#FF4E50", "#FC913A", "#F9D423", "#FF6B6B"],
            Scheme::Matrix => &["#00FF41", "#008F11", "#003B00", "#0D0208"],
            Scheme::Plasma => &["#F72585", "#B5179E", "#7209B7", "#4361EE", "#4CC9F0"],
            Scheme::Rave => &["#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF"],
            Scheme::Festival => &["#FF6F00", "#FFD600", "#00E676", "#2979FF", "#D500F9"],
            Scheme::LaserShow => &["#FF0000", "#00FF00", "#0080FF", "#FF00FF"],
        }
    }

    /// Build the palette for this scheme.
    pub fn palette(&self) -> Palette {
        let colors = self
            .hex()
            .iter()
            .filter_map(|hex| parse_hex(hex).ok())
            .collect();
        Palette::new(colors)
    }
}

impl FromStr for Scheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Scheme::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownScheme(s.to_string()))
    }
}

/// An ordered, non-empty list of RGB colors (components in 0.0-1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Vec3>,
}

impl Palette {
    /// Create a palette from colors.
    ///
    /// An empty list is replaced by the default [`Scheme::Cyan`] palette.
    pub fn new(colors: Vec<Vec3>) -> Self {
        if colors.is_empty() {
            warn!("empty palette replaced by the default scheme");
            return Self::default();
        }
        Self { colors }
    }

    /// Parse a palette from hex strings such as `#FF00FF`.
    pub fn from_hex<S: AsRef<str>>(hex: &[S]) -> Result<Self, ConfigError> {
        let colors = hex
            .iter()
            .map(|h| parse_hex(h.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(colors))
    }

    /// A palette of `count` random fully saturated hues.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Self {
        let colors = (0..count.max(1))
            .map(|_| hsl_to_rgb(rng.gen::<f32>(), 1.0, 0.5))
            .collect();
        Self::new(colors)
    }

    /// The palette's colors.
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Number of colors (always at least one).
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, wrapping around.
    pub fn get(&self, index: usize) -> Vec3 {
        self.colors[index % self.colors.len()]
    }

    /// Uniformly random palette entry.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.colors[rng.gen_range(0..self.colors.len())]
    }

    /// Palette entry for a progress value in [0, 1], banded evenly.
    pub fn at_progress(&self, t: f32) -> Vec3 {
        let len = self.colors.len();
        let index = (t.clamp(0.0, 1.0) * len as f32) as usize;
        self.colors[index.min(len - 1)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Scheme::default().palette()
    }
}

/// Canvas background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    /// Black background; particles get a glow halo.
    #[default]
    Dark,
    /// White background.
    Light,
}

impl Background {
    /// Clear color for this background.
    pub fn color(&self) -> Vec3 {
        match self {
            Background::Dark => Vec3::ZERO,
            Background::Light => Vec3::ONE,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Background::Dark)
    }
}

/// Shape used to draw plain (non-fractal) particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Star,
    Diamond,
    Hexagon,
}

impl ParticleShape {
    /// Every shape, in menu order.
    pub const ALL: [ParticleShape; 6] = [
        ParticleShape::Circle,
        ParticleShape::Square,
        ParticleShape::Triangle,
        ParticleShape::Star,
        ParticleShape::Diamond,
        ParticleShape::Hexagon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ParticleShape::Circle => "circle",
            ParticleShape::Square => "square",
            ParticleShape::Triangle => "triangle",
            ParticleShape::Star => "star",
            ParticleShape::Diamond => "diamond",
            ParticleShape::Hexagon => "hexagon",
        }
    }
}

impl FromStr for ParticleShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ParticleShape::ALL
            .iter()
            .copied()
            .find(|shape| shape.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownShape(s.to_string()))
    }
}

/// Parse `#RRGGBB` / `#RGB` (leading `#` optional) into an RGB color.
pub fn parse_hex(value: &str) -> Result<Vec3, ConfigError> {
    let invalid = || ConfigError::InvalidColor(value.to_string());
    let digits = value.trim().trim_start_matches('#');
    if !digits.is_ascii() {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map(|v| v as f32 / 255.0);
    let rgb = match digits.len() {
        6 => (
            channel(&digits[0..2]),
            channel(&digits[2..4]),
            channel(&digits[4..6]),
        ),
        3 => {
            let expand = |c: &str| channel(&c.repeat(2));
            (
                expand(&digits[0..1]),
                expand(&digits[1..2]),
                expand(&digits[2..3]),
            )
        }
        _ => return Err(invalid()),
    };

    match rgb {
        (Ok(r), Ok(g), Ok(b)) => Ok(Vec3::new(r, g, b)),
        _ => Err(invalid()),
    }
}

/// Convert HSL (all components in 0.0-1.0, hue wraps) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);
    if s <= 0.0 {
        return Vec3::splat(l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Convert RGB to HSL. Returns `(hue, saturation, lightness)` packed in a Vec3.
pub fn rgb_to_hsl(color: Vec3) -> Vec3 {
    let max = color.max_element();
    let min = color.min_element();
    let l = (max + min) / 2.0;
    let d = max - min;
    if d <= f32::EPSILON {
        return Vec3::new(0.0, 0.0, l);
    }

    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == color.x {
        (color.y - color.z) / d + if color.y < color.z { 6.0 } else { 0.0 }
    } else if max == color.y {
        (color.z - color.x) / d + 2.0
    } else {
        (color.x - color.y) / d + 4.0
    };
    Vec3::new(h / 6.0, s, l)
}

/// Rotate a color's hue by `shift` turns.
pub fn shift_hue(color: Vec3, shift: f32) -> Vec3 {
    let hsl = rgb_to_hsl(color);
    hsl_to_rgb(hsl.x + shift, hsl.y, hsl.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-3
    }

    #[test]
    fn test_parse_hex() {
        assert!(close(parse_hex("#FF0000").unwrap(), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(parse_hex("00ff80").unwrap(), Vec3::new(0.0, 1.0, 128.0 / 255.0)));
        assert!(close(parse_hex("#0f0").unwrap(), Vec3::new(0.0, 1.0, 0.0)));
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_every_scheme_parses() {
        for scheme in Scheme::ALL {
            assert_eq!(scheme.palette().len(), scheme.hex().len(), "{:?}", scheme);
            assert_eq!(scheme.name().parse::<Scheme>().unwrap(), scheme);
        }
    }

    #[test]
    fn test_empty_palette_falls_back() {
        let palette = Palette::new(Vec::new());
        assert_eq!(palette, Scheme::Cyan.palette());
        assert!(!palette.is_empty());
    }

    #[test]
    fn test_palette_from_hex_rejects_bad_color() {
        let err = Palette::from_hex(&["#FFFFFF", "nope"]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidColor("nope".into()));
    }

    #[test]
    fn test_palette_at_progress_bands() {
        let palette = Scheme::Rainbow.palette();
        assert_eq!(palette.at_progress(0.0), palette.get(0));
        assert_eq!(palette.at_progress(1.0), palette.get(6));
        assert_eq!(palette.at_progress(0.5), palette.get(3));
    }

    #[test]
    fn test_random_palette_never_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(Palette::random(&mut rng, 0).len(), 1);
        assert_eq!(Palette::random(&mut rng, 5).len(), 5);
    }

    #[test]
    fn test_hsl_roundtrip_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), Vec3::new(0.0, 0.0, 1.0)));
        let hsl = rgb_to_hsl(Vec3::new(0.0, 0.0, 1.0));
        assert!((hsl.x - 2.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_shift_hue_full_turn_is_identity() {
        let color = Vec3::new(0.2, 0.6, 0.9);
        assert!(close(shift_hue(color, 1.0), color));
        assert!(!close(shift_hue(color, 0.5), color));
    }

    #[test]
    fn test_shape_names() {
        assert_eq!("Star".parse::<ParticleShape>().unwrap(), ParticleShape::Star);
        assert!("blob".parse::<ParticleShape>().is_err());
    }
}
