//! Engine configuration.
//!
//! [`EngineConfig`] holds everything the user can change live: background,
//! palette, pattern mode, particle shape and scale. Setters chain on
//! `&mut Self` so a whole change fits in one closure:
//!
//! ```ignore
//! sim.configure(|c| {
//!     c.mode(PatternMode::Fractals).scale(1.5);
//! });
//! ```
//!
//! [`LaunchOptions`] is the command-line view of the same settings.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::visuals::{Background, Palette, ParticleShape, Scheme};

/// Smallest accepted scale factor.
pub const MIN_SCALE: f32 = 0.5;
/// Largest accepted scale factor.
pub const MAX_SCALE: f32 = 3.0;

/// Selects the emission rules, motion rule and overlays of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternMode {
    /// Plain particles under gravity.
    #[default]
    Particles,
    /// Clicks spawn one of the fractal generators; particles orbit.
    Fractals,
    /// Particles ride a sine wave.
    Waves,
    /// Pointer trail drawn as a fading line.
    Streak,
    /// Pointer moves sometimes fire a laser beam.
    Laser,
    /// Pointer moves sometimes strike a lightning bolt.
    Lightning,
    /// Nearby particles are joined by fading edges.
    Constellation,
    /// Background grid; clicks spawn a radiating particle grid.
    Grid,
    Ribbon,
    /// Alpha flickers on a four-frame cycle.
    Strobe,
    /// Sizes oscillate over time.
    Pulse,
    /// Double-size click bursts.
    Firework,
}

impl PatternMode {
    /// Every mode, in menu order.
    pub const ALL: [PatternMode; 12] = [
        PatternMode::Particles,
        PatternMode::Fractals,
        PatternMode::Waves,
        PatternMode::Streak,
        PatternMode::Laser,
        PatternMode::Lightning,
        PatternMode::Constellation,
        PatternMode::Grid,
        PatternMode::Ribbon,
        PatternMode::Strobe,
        PatternMode::Pulse,
        PatternMode::Firework,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PatternMode::Particles => "particles",
            PatternMode::Fractals => "fractals",
            PatternMode::Waves => "waves",
            PatternMode::Streak => "streak",
            PatternMode::Laser => "laser",
            PatternMode::Lightning => "lightning",
            PatternMode::Constellation => "constellation",
            PatternMode::Grid => "grid",
            PatternMode::Ribbon => "ribbon",
            PatternMode::Strobe => "strobe",
            PatternMode::Pulse => "pulse",
            PatternMode::Firework => "firework",
        }
    }

    /// The mode after this one, wrapping around.
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl FromStr for PatternMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PatternMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

/// Live configuration of the canvas engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub(crate) background: Background,
    pub(crate) palette: Palette,
    pub(crate) mode: PatternMode,
    pub(crate) shape: ParticleShape,
    pub(crate) scale: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            background: Background::Dark,
            palette: Palette::default(),
            mode: PatternMode::Particles,
            shape: ParticleShape::Circle,
            scale: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background(&mut self, background: Background) -> &mut Self {
        self.background = background;
        self
    }

    pub fn palette(&mut self, palette: Palette) -> &mut Self {
        self.palette = palette;
        self
    }

    /// Shorthand for `palette(scheme.palette())`.
    pub fn scheme(&mut self, scheme: Scheme) -> &mut Self {
        self.palette = scheme.palette();
        self
    }

    pub fn mode(&mut self, mode: PatternMode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn shape(&mut self, shape: ParticleShape) -> &mut Self {
        self.shape = shape;
        self
    }

    /// Set the size multiplier, clamped to [`MIN_SCALE`]..=[`MAX_SCALE`].
    ///
    /// Non-finite values leave the scale unchanged.
    pub fn scale(&mut self, scale: f32) -> &mut Self {
        if scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
        self
    }

    pub fn get_background(&self) -> Background {
        self.background
    }

    pub fn get_palette(&self) -> &Palette {
        &self.palette
    }

    pub fn get_mode(&self) -> PatternMode {
        self.mode
    }

    pub fn get_shape(&self) -> ParticleShape {
        self.shape
    }

    pub fn get_scale(&self) -> f32 {
        self.scale
    }

    /// Compare this config with a newer one.
    pub fn diff(&self, other: &EngineConfig) -> ConfigDiff {
        ConfigDiff {
            mode_changed: self.mode != other.mode,
            palette_changed: self.palette != other.palette,
            appearance_changed: self.background != other.background
                || self.shape != other.shape
                || self.scale != other.scale,
        }
    }
}

/// Result of comparing two [`EngineConfig`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigDiff {
    /// Pattern mode differs; live particles must be dropped.
    pub mode_changed: bool,
    pub palette_changed: bool,
    /// Background, shape or scale differ. Applies to newly drawn frames.
    pub appearance_changed: bool,
}

impl ConfigDiff {
    /// Returns true if nothing changed.
    pub fn is_empty(&self) -> bool {
        !self.mode_changed && !self.palette_changed && !self.appearance_changed
    }

    /// Returns true if the canvas must be cleared.
    pub fn needs_clear(&self) -> bool {
        self.mode_changed
    }
}

/// Which scene the front end starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scene {
    /// 2D particle canvas.
    #[default]
    Canvas,
    /// 3D attractor point cloud.
    Attractor,
}

impl Scene {
    pub fn toggled(&self) -> Self {
        match self {
            Scene::Canvas => Scene::Attractor,
            Scene::Attractor => Scene::Canvas,
        }
    }
}

/// Settings collected from the command line.
///
/// ```text
/// kaleido [MODE] [--palette NAME] [--shape NAME] [--scale X] [--light] [--attractor] [--seed N]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub engine: EngineConfig,
    pub scene: Scene,
    pub seed: Option<u64>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            scene: Scene::Canvas,
            seed: None,
        }
    }
}

impl LaunchOptions {
    /// Parse arguments, excluding the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            let mut value_for = |flag: &str| -> Result<String, ConfigError> {
                args.next()
                    .map(|v| v.as_ref().to_string())
                    .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
            };

            match arg {
                "--palette" => {
                    let value = value_for(arg)?;
                    let palette = if value.contains('#') || value.contains(',') {
                        let stops: Vec<&str> = value.split(',').collect();
                        Palette::from_hex(&stops)?
                    } else {
                        value.parse::<Scheme>()?.palette()
                    };
                    options.engine.palette(palette);
                }
                "--shape" => {
                    let shape: ParticleShape = value_for(arg)?.parse()?;
                    options.engine.shape(shape);
                }
                "--scale" => {
                    let value = value_for(arg)?;
                    let scale = parse_number::<f32>(arg, &value)?;
                    options.engine.scale(scale);
                }
                "--seed" => {
                    let value = value_for(arg)?;
                    options.seed = Some(parse_number::<u64>(arg, &value)?);
                }
                "--light" => {
                    options.engine.background(Background::Light);
                }
                "--attractor" => options.scene = Scene::Attractor,
                flag if flag.starts_with("--") => {
                    return Err(ConfigError::UnknownArgument(flag.to_string()));
                }
                mode => {
                    let mode: PatternMode = mode.parse()?;
                    options.engine.mode(mode);
                }
            }
        }

        Ok(options)
    }
}

fn parse_number<T: FromStr>(flag: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_clamped() {
        let mut config = EngineConfig::new();
        config.scale(10.0);
        assert_eq!(config.get_scale(), MAX_SCALE);
        config.scale(0.1);
        assert_eq!(config.get_scale(), MIN_SCALE);
        config.scale(f32::NAN);
        assert_eq!(config.get_scale(), MIN_SCALE);
    }

    #[test]
    fn test_mode_names_parse() {
        for mode in PatternMode::ALL {
            assert_eq!(mode.name().parse::<PatternMode>().unwrap(), mode);
        }
        assert_eq!(
            "nope".parse::<PatternMode>().unwrap_err(),
            ConfigError::UnknownMode("nope".into())
        );
    }

    #[test]
    fn test_mode_next_wraps() {
        assert_eq!(PatternMode::Firework.next(), PatternMode::Particles);
        assert_eq!(PatternMode::Particles.next(), PatternMode::Fractals);
    }

    #[test]
    fn test_diff_detects_mode_change() {
        let old = EngineConfig::default();
        let mut new = old.clone();
        assert!(old.diff(&new).is_empty());

        new.scale(2.0);
        let diff = old.diff(&new);
        assert!(diff.appearance_changed);
        assert!(!diff.needs_clear());

        new.mode(PatternMode::Grid);
        assert!(old.diff(&new).needs_clear());
    }

    #[test]
    fn test_launch_options_full() {
        let options = LaunchOptions::from_args([
            "fractals",
            "--palette",
            "synthwave",
            "--shape",
            "star",
            "--scale",
            "2.5",
            "--light",
            "--seed",
            "42",
        ])
        .unwrap();

        assert_eq!(options.engine.get_mode(), PatternMode::Fractals);
        assert_eq!(options.engine.get_palette(), &Scheme::Synthwave.palette());
        assert_eq!(options.engine.get_shape(), ParticleShape::Star);
        assert_eq!(options.engine.get_scale(), 2.5);
        assert_eq!(options.engine.get_background(), Background::Light);
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.scene, Scene::Canvas);
    }

    #[test]
    fn test_launch_options_hex_palette() {
        let options = LaunchOptions::from_args(["--palette", "#ff0000,#00ff00"]).unwrap();
        assert_eq!(options.engine.get_palette().len(), 2);
    }

    #[test]
    fn test_launch_options_errors() {
        assert_eq!(
            LaunchOptions::from_args(["--scale"]).unwrap_err(),
            ConfigError::MissingValue("--scale".into())
        );
        assert!(matches!(
            LaunchOptions::from_args(["--seed", "x"]).unwrap_err(),
            ConfigError::InvalidNumber { .. }
        ));
        assert_eq!(
            LaunchOptions::from_args(["--fast"]).unwrap_err(),
            ConfigError::UnknownArgument("--fast".into())
        );
    }

    #[test]
    fn test_attractor_scene_flag() {
        let options = LaunchOptions::from_args(["--attractor"]).unwrap();
        assert_eq!(options.scene, Scene::Attractor);
        assert_eq!(options.scene.toggled(), Scene::Canvas);
    }
}
