//! The canvas engine: live particles, beams and overlays.
//!
//! A [`Simulation`] is built once, fed [`InputEvent`]s as they arrive, and
//! ticked once per frame with a [`Surface2d`] to draw on. The tick is the
//! only place live buffers change:
//!
//! 1. drain the input queue and run the resulting emitters
//! 2. clear the surface and draw the background grid (grid mode)
//! 3. per particle: integrate, decay, apply the motion rule, draw, retain
//! 4. constellation edges, beams, pointer trail
//!
//! ```ignore
//! let mut sim = Simulation::new(1280.0, 720.0)
//!     .with_mode(PatternMode::Fractals)
//!     .with_scheme(Scheme::Synthwave)
//!     .with_seed(7);
//!
//! sim.push_input(InputEvent::Click(Vec2::new(640.0, 360.0)));
//! sim.tick(clock.elapsed(), &mut surface);
//! ```

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::config::{ConfigDiff, EngineConfig, PatternMode};
use crate::effects::{constellation_edges, Beam, GridOverlay, MouseTrail};
use crate::emitter::{Emitter, BURST_COUNT, FIREWORK_COUNT, SCATTER_COUNT};
use crate::input::{InputEvent, InputQueue};
use crate::particle::Particle;
use crate::pattern::FractalKind;
use crate::render::{draw_beam, draw_edges, draw_grid, draw_particle, draw_trail, ParticleStyle, Surface2d};
use crate::rules::MotionRule;
use crate::spawn::{SizeRange, SpawnContext};
use crate::visuals::{Background, Palette, ParticleShape, Scheme};

/// Chance that a pointer move fires a laser in laser mode.
pub const LASER_CHANCE: f64 = 0.3;
/// Chance that a pointer move strikes lightning in lightning mode.
pub const LIGHTNING_CHANCE: f64 = 0.1;

/// Alpha of the dim half of the strobe cycle.
const STROBE_DIM: f32 = 0.2;
/// Frames per strobe cycle.
const STROBE_FRAMES: u64 = 4;
const PULSE_RATE: f32 = 6.0;
const PULSE_DEPTH: f32 = 0.4;

/// The 2D particle engine.
pub struct Simulation {
    config: EngineConfig,
    rule: MotionRule,
    viewport: Vec2,
    particles: Vec<Particle>,
    beams: Vec<Beam>,
    trail: MouseTrail,
    grid: GridOverlay,
    input: InputQueue,
    rng: StdRng,
    frame: u64,
}

impl Simulation {
    /// Create an engine for a `width × height` viewport with default settings.
    pub fn new(width: f32, height: f32) -> Self {
        let config = EngineConfig::default();
        Self {
            rule: MotionRule::for_mode(config.mode),
            config,
            viewport: sanitize_viewport(Vec2::new(width, height)),
            particles: Vec::new(),
            beams: Vec::new(),
            trail: MouseTrail::new(),
            grid: GridOverlay::default(),
            input: InputQueue::new(),
            rng: StdRng::from_entropy(),
            frame: 0,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.rule = MotionRule::for_mode(config.mode);
        self.config = config;
        self
    }

    pub fn with_mode(mut self, mode: PatternMode) -> Self {
        self.config.mode(mode);
        self.rule = MotionRule::for_mode(mode);
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.config.palette(palette);
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.config.scheme(scheme);
        self
    }

    pub fn with_shape(mut self, shape: ParticleShape) -> Self {
        self.config.shape(shape);
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.config.background(background);
        self
    }

    /// Set the size multiplier (clamped to 0.5–3.0).
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.config.scale(scale);
        self
    }

    /// Seed the random source for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Change settings live.
    ///
    /// A mode change resolves the new motion rule and clears the canvas.
    /// Other changes apply from the next frame on.
    pub fn configure<F>(&mut self, f: F) -> ConfigDiff
    where
        F: FnOnce(&mut EngineConfig),
    {
        let mut next = self.config.clone();
        f(&mut next);
        let diff = self.config.diff(&next);
        self.config = next;

        if diff.mode_changed {
            self.rule = MotionRule::for_mode(self.config.mode);
            debug!(mode = self.config.mode.name(), "pattern mode changed");
        }
        if diff.needs_clear() {
            self.clear();
        }
        if diff.palette_changed || diff.appearance_changed {
            debug!(
                colors = self.config.palette.len(),
                scale = self.config.scale,
                shape = self.config.shape.name(),
                "appearance changed"
            );
        }
        diff
    }

    /// Queue an input event for the next tick.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Drop every particle, beam, trail point and queued event.
    pub fn clear(&mut self) {
        debug!(
            particles = self.particles.len(),
            beams = self.beams.len(),
            "canvas cleared"
        );
        self.particles.clear();
        self.beams.clear();
        self.trail.clear();
        self.input.clear();
    }

    /// Resize the viewport immediately.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = sanitize_viewport(Vec2::new(width, height));
    }

    /// Advance one frame and draw it.
    ///
    /// `elapsed` is the engine time in seconds; it drives the waves and
    /// pulse modes.
    pub fn tick<S: Surface2d + ?Sized>(&mut self, elapsed: f32, surface: &mut S) {
        let events: Vec<InputEvent> = self.input.drain().collect();
        for event in events {
            self.handle_event(event);
        }

        let mode = self.config.mode;
        let background = self.config.background;
        surface.clear(background.color());

        if mode == PatternMode::Grid {
            draw_grid(surface, &self.grid, self.viewport, background);
        }

        let style = self.particle_style(elapsed);
        let rule = self.rule;
        let viewport = self.viewport;
        self.particles.retain_mut(|p| {
            p.advance();
            rule.apply(p, elapsed);
            if p.is_alive() {
                draw_particle(surface, p, &style);
            }
            p.should_keep(viewport)
        });

        if mode == PatternMode::Constellation {
            let edges = constellation_edges(&self.particles);
            draw_edges(surface, &edges);
        }

        let glow = background.is_dark();
        self.beams.retain_mut(|beam| {
            beam.advance();
            if beam.is_alive() {
                draw_beam(surface, beam, glow);
            }
            beam.is_alive()
        });

        if mode == PatternMode::Streak {
            let color = self.config.palette.get(0);
            draw_trail(surface, &self.trail, color, 2.0 * self.config.scale);
        }

        self.frame += 1;
        trace!(
            frame = self.frame,
            particles = self.particles.len(),
            beams = self.beams.len(),
            "tick"
        );
    }

    fn particle_style(&self, elapsed: f32) -> ParticleStyle {
        let mut style = ParticleStyle::new(self.config.shape, self.config.background);
        match self.config.mode {
            PatternMode::Fractals => style.pentagons = true,
            PatternMode::Strobe => {
                if self.frame % STROBE_FRAMES >= STROBE_FRAMES / 2 {
                    style.alpha = STROBE_DIM;
                }
            }
            PatternMode::Pulse => {
                style.size = 1.0 + PULSE_DEPTH * (elapsed * PULSE_RATE).sin();
            }
            _ => {}
        }
        style
    }

    fn handle_event(&mut self, event: InputEvent) {
        let mode = self.config.mode;
        let sizes = if mode == PatternMode::Fractals {
            SizeRange::FRACTAL
        } else {
            SizeRange::STANDARD
        };

        if let InputEvent::Resize(size) = event {
            self.viewport = sanitize_viewport(size);
            debug!(width = self.viewport.x, height = self.viewport.y, "viewport resized");
            return;
        }
        if let InputEvent::PointerMove(position) = event {
            self.trail.push(position);
        }

        let mut ctx = SpawnContext::new(
            &mut self.rng,
            &self.config.palette,
            self.viewport,
            self.config.scale,
            sizes,
        );

        let emitter = match event {
            InputEvent::PointerMove(position) => match mode {
                PatternMode::Laser if ctx.chance(LASER_CHANCE) => Emitter::Laser { origin: position },
                PatternMode::Lightning if ctx.chance(LIGHTNING_CHANCE) => {
                    Emitter::Lightning { origin: position }
                }
                _ => Emitter::Trail { position },
            },
            InputEvent::Click(position) => match mode {
                PatternMode::Fractals => Emitter::Fractal {
                    center: position,
                    kind: FractalKind::random(ctx.rng()),
                },
                PatternMode::Grid => Emitter::Grid { center: position },
                PatternMode::Firework => Emitter::Burst {
                    position,
                    count: FIREWORK_COUNT,
                },
                _ => Emitter::Burst {
                    position,
                    count: BURST_COUNT,
                },
            },
            InputEvent::KeyPress(_) => Emitter::Scatter {
                count: SCATTER_COUNT,
            },
            InputEvent::Resize(_) => return,
        };

        emitter.emit(&mut ctx, &mut self.particles, &mut self.beams);
        if let Emitter::Fractal { kind, .. } = emitter {
            debug!(?kind, "fractal burst");
        }
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> PatternMode {
        self.config.mode
    }

    /// Motion rule resolved from the current mode.
    pub fn rule(&self) -> MotionRule {
        self.rule
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    pub fn trail(&self) -> &MouseTrail {
        &self.trail
    }

    /// Events waiting for the next tick.
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

fn sanitize_viewport(size: Vec2) -> Vec2 {
    let fix = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
    Vec2::new(fix(size.x), fix(size.y))
}
