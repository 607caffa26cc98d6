//! # kaleido
//!
//! Interactive generative art: pointer and keyboard input drive particle,
//! fractal and attractor effects on a 2D canvas or a 3D point cloud.
//!
//! ## Quick Start
//!
//! ```ignore
//! use kaleido::prelude::*;
//!
//! let mut sim = Simulation::new(1280.0, 720.0)
//!     .with_mode(PatternMode::Fractals)
//!     .with_scheme(Scheme::Aurora)
//!     .with_seed(42);
//!
//! sim.push_input(InputEvent::Click(Vec2::new(640.0, 360.0)));
//!
//! let mut list = DrawList::new();
//! sim.tick(0.0, &mut list);
//! ```
//!
//! ## Core Concepts
//!
//! ### Canvas engine
//!
//! A [`Simulation`] owns the live particles, beams and pointer trail. Input
//! handlers only queue [`InputEvent`]s; each tick drains the queue, runs the
//! resulting [`Emitter`]s, integrates every particle, applies the
//! [`MotionRule`] of the current [`PatternMode`] and draws on any
//! [`Surface2d`].
//!
//! Settings change live through [`Simulation::configure`]:
//!
//! ```ignore
//! sim.configure(|c| {
//!     c.mode(PatternMode::Waves).scale(1.5);
//! });
//! ```
//!
//! A mode change clears the canvas; everything else applies from the next
//! frame.
//!
//! ### Attractor scene
//!
//! A [`LayerScheduler`] stacks Hopalong orbits in depth and flies them past
//! the camera. New orbits are generated on a timer but only swapped into a
//! layer when that layer is recycled behind the camera.
//!
//! ## Feature Overview
//!
//! | Mode | Click | Motion |
//! |------|-------|--------|
//! | particles, strobe, pulse | radial burst | gravity |
//! | firework | larger burst | gravity |
//! | fractals | one random fractal | orbiting |
//! | waves | radial burst | sine wave |
//! | grid | 11×11 particle grid | drag |
//! | laser, lightning | radial burst | gravity, beams on pointer move |

pub mod attractor;
pub mod config;
pub mod effects;
pub mod emitter;
pub mod error;
pub mod gpu;
pub mod input;
pub mod layers;
pub mod particle;
pub mod pattern;
pub mod render;
pub mod rules;
pub mod simulation;
pub mod spawn;
pub mod time;
pub mod visuals;
pub mod window;

pub use attractor::{generate_orbit, HopalongParams, Orbit, OrbitColoring, OrbitSettings, Tier};
pub use config::{ConfigDiff, EngineConfig, LaunchOptions, PatternMode, Scene};
pub use effects::{Beam, BeamKind, GridOverlay, MouseTrail};
pub use emitter::Emitter;
pub use error::{ConfigError, GpuError, RunError};
pub use glam::{Vec2, Vec3, Vec4};
pub use input::{InputEvent, InputQueue, KeyCode};
pub use layers::{Layer, LayerConfig, LayerScheduler};
pub use particle::{Particle, Pattern};
pub use pattern::FractalKind;
pub use render::{DrawCommand, DrawList, PointCloudSink, Surface2d};
pub use rules::MotionRule;
pub use simulation::Simulation;
pub use spawn::SpawnContext;
pub use time::{FrameClock, Interval};
pub use visuals::{Background, Palette, ParticleShape, Scheme};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use kaleido::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attractor::{HopalongParams, Orbit, OrbitColoring, OrbitSettings, Tier};
    pub use crate::config::{EngineConfig, PatternMode, Scene};
    pub use crate::input::{InputEvent, KeyCode};
    pub use crate::layers::{LayerConfig, LayerScheduler};
    pub use crate::render::{DrawList, NullSurface, PointCloudSink, Surface2d};
    pub use crate::simulation::Simulation;
    pub use crate::visuals::{Background, Palette, ParticleShape, Scheme};
    pub use crate::{Vec2, Vec3, Vec4};
}
