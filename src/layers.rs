//! Depth-stacked attractor layers.
//!
//! The attractor scene is a grid of `levels × subsets` layers flying toward
//! the camera. Every layer of a subset shares that subset's current
//! [`Orbit`]. When a layer passes the camera it is recycled to the far end
//! of the stack; that is the only moment its orbit may change.
//!
//! Regeneration runs on an engine-owned [`Interval`]. Each period a worker
//! thread builds a fresh orbit per subset; once they arrive the subset's
//! layers are marked dirty and each layer picks the new orbit up at its own
//! next recycle, so nothing ever pops mid-flight.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::attractor::{generate_orbit, HopalongParams, Orbit, OrbitColoring, OrbitSettings};
use crate::input::KeyCode;
use crate::render::PointCloudSink;
use crate::time::Interval;

/// Fastest layer speed reachable with the arrow keys.
pub const MAX_SPEED: f32 = 20.0;
/// Speed change per Up/Down press.
pub const SPEED_STEP: f32 = 0.5;
/// Largest rotation speed reachable with the arrow keys, either direction.
pub const MAX_ROTATION_SPEED: f32 = 0.05;
/// Rotation speed change per Left/Right press.
pub const ROTATION_STEP: f32 = 0.001;

/// Layout and motion of the layer stack.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    /// Number of depth levels.
    pub levels: usize,
    /// Orbits per level.
    pub subsets: usize,
    /// Depth distance between consecutive levels.
    pub level_depth: f32,
    /// Layers deeper than this (closer to the viewer) are recycled.
    pub camera_depth: f32,
    /// Depth advance per tick.
    pub speed: f32,
    /// Rotation advance per tick, in radians.
    pub rotation_speed: f32,
    /// Time between orbit regenerations.
    pub regen_period: Duration,
    pub orbit: OrbitSettings,
    pub coloring: OrbitColoring,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            levels: 5,
            subsets: 7,
            level_depth: 600.0,
            camera_depth: 750.0,
            speed: 8.0,
            rotation_speed: 0.005,
            regen_period: Duration::from_secs(3),
            orbit: OrbitSettings::default(),
            coloring: OrbitColoring::default(),
        }
    }
}

impl LayerConfig {
    pub fn levels(&mut self, levels: usize) -> &mut Self {
        self.levels = levels;
        self
    }

    pub fn subsets(&mut self, subsets: usize) -> &mut Self {
        self.subsets = subsets;
        self
    }

    pub fn level_depth(&mut self, depth: f32) -> &mut Self {
        self.level_depth = depth;
        self
    }

    pub fn camera_depth(&mut self, depth: f32) -> &mut Self {
        self.camera_depth = depth;
        self
    }

    pub fn speed(&mut self, speed: f32) -> &mut Self {
        self.speed = speed;
        self
    }

    pub fn rotation_speed(&mut self, speed: f32) -> &mut Self {
        self.rotation_speed = speed;
        self
    }

    pub fn regen_period(&mut self, period: Duration) -> &mut Self {
        self.regen_period = period;
        self
    }

    pub fn orbit(&mut self, settings: OrbitSettings) -> &mut Self {
        self.orbit = settings;
        self
    }

    pub fn coloring(&mut self, coloring: OrbitColoring) -> &mut Self {
        self.coloring = coloring;
        self
    }

    /// Total depth span of the stack.
    pub fn span(&self) -> f32 {
        self.levels as f32 * self.level_depth
    }

    fn sanitized(mut self) -> Self {
        self.levels = self.levels.max(1);
        self.subsets = self.subsets.max(1);
        if !(self.level_depth.is_finite() && self.level_depth > 0.0) {
            self.level_depth = LayerConfig::default().level_depth;
        }
        if !self.camera_depth.is_finite() {
            self.camera_depth = LayerConfig::default().camera_depth;
        }
        self.speed = if self.speed.is_finite() { self.speed.clamp(0.0, MAX_SPEED) } else { 0.0 };
        self.rotation_speed = if self.rotation_speed.is_finite() {
            self.rotation_speed.clamp(-MAX_ROTATION_SPEED, MAX_ROTATION_SPEED)
        } else {
            0.0
        };
        self
    }

    /// Whether going from `self` to `other` changes the layer layout or the
    /// orbit geometry.
    fn needs_rebuild(&self, other: &LayerConfig) -> bool {
        self.levels != other.levels
            || self.subsets != other.subsets
            || self.level_depth != other.level_depth
            || self.orbit != other.orbit
            || self.coloring != other.coloring
    }
}

/// One positioned instance of a subset's orbit.
#[derive(Debug, Clone)]
pub struct Layer {
    pub level: usize,
    pub subset: usize,
    /// Position along the view axis; grows toward the camera.
    pub depth: f32,
    /// Accumulated rotation about the view axis, in radians.
    pub rotation: f32,
    pub orbit: Arc<Orbit>,
    /// A newer orbit is waiting for this layer's next recycle.
    pub dirty: bool,
}

impl Layer {
    /// Model transform: rotate about z, then move to `depth`.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, self.depth)) * Mat4::from_rotation_z(self.rotation)
    }
}

/// Orbits built off the render thread, one per subset.
#[derive(Debug)]
struct Generation {
    params: HopalongParams,
    orbits: Vec<Arc<Orbit>>,
}

/// Owns the layer stack, the newest orbit per subset, and the regeneration
/// timer.
#[derive(Debug)]
pub struct LayerScheduler {
    config: LayerConfig,
    layers: Vec<Layer>,
    /// Newest orbit per subset.
    latest: Vec<Arc<Orbit>>,
    params: HopalongParams,
    interval: Interval,
    /// Worker output not yet applied.
    pending: Option<Receiver<Generation>>,
    rng: StdRng,
    swaps: u64,
}

impl LayerScheduler {
    /// Build a scheduler seeded from OS entropy.
    pub fn new(config: LayerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Build a scheduler with a deterministic seed.
    pub fn with_seed(config: LayerConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: LayerConfig, mut rng: StdRng) -> Self {
        let config = config.sanitized();
        let params = HopalongParams::random(&mut rng);
        let latest = generate_all(&params, &config, &mut rng);
        let layers = build_layers(&config, &latest);
        let interval = Interval::new(config.regen_period);

        debug!(
            levels = config.levels,
            subsets = config.subsets,
            points = config.orbit.points,
            "layer scheduler ready"
        );

        Self {
            config,
            layers,
            latest,
            params,
            interval,
            pending: None,
            rng,
            swaps: 0,
        }
    }

    /// Advance every layer one step and run the regeneration timer.
    pub fn tick(&mut self, delta: Duration) {
        let span = self.config.span();
        let camera = self.config.camera_depth;
        let speed = self.config.speed;
        let rotation = self.config.rotation_speed;

        for layer in &mut self.layers {
            layer.depth += speed;
            layer.rotation += rotation;

            if layer.depth > camera {
                // back into (camera - span, camera] however far the step overshot
                let laps = ((layer.depth - camera) / span).ceil().max(1.0);
                layer.depth -= laps * span;
                if layer.dirty {
                    layer.orbit = Arc::clone(&self.latest[layer.subset]);
                    layer.dirty = false;
                    self.swaps += 1;
                    trace!(level = layer.level, subset = layer.subset, orbit = layer.orbit.id, "layer swapped");
                }
            }
        }

        self.poll_regeneration();
        if self.interval.tick(delta) {
            self.spawn_regeneration();
        }
    }

    /// Generate a new orbit for every subset on the calling thread and mark
    /// all layers dirty. Any in-flight background generation is discarded.
    ///
    /// Layers keep drawing their current orbit until they next recycle.
    pub fn regenerate(&mut self) {
        self.pending = None;
        let params = HopalongParams::random(&mut self.rng);
        let orbits = generate_all(&params, &self.config, &mut self.rng);
        self.apply(Generation { params, orbits });
    }

    /// Start building the next orbits on a worker thread.
    ///
    /// Does nothing while a previous generation is still running. The result
    /// is applied by a later [`tick`](Self::tick).
    pub fn spawn_regeneration(&mut self) {
        if self.pending.is_some() {
            trace!("regeneration still running, skipping");
            return;
        }

        let params = HopalongParams::random(&mut self.rng);
        let config = self.config.clone();
        let mut rng = StdRng::seed_from_u64(self.rng.gen());
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new().name("kaleido-orbits".into()).spawn(move || {
            let orbits = generate_all(&params, &config, &mut rng);
            // the scheduler may have been rebuilt or dropped meanwhile
            let _ = tx.send(Generation { params, orbits });
        });

        match spawned {
            Ok(_) => self.pending = Some(rx),
            Err(e) => {
                warn!(error = %e, "orbit worker unavailable, regenerating inline");
                self.regenerate();
            }
        }
    }

    /// Whether a background generation has not been applied yet.
    pub fn regeneration_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Block until the in-flight generation, if any, is applied.
    pub fn wait_for_regeneration(&mut self) {
        if let Some(rx) = self.pending.take() {
            match rx.recv() {
                Ok(generation) => self.apply(generation),
                Err(_) => warn!("orbit worker exited without a result"),
            }
        }
    }

    fn poll_regeneration(&mut self) {
        let received = match &self.pending {
            Some(rx) => rx.try_recv(),
            None => return,
        };
        match received {
            Ok(generation) => {
                self.pending = None;
                self.apply(generation);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                warn!("orbit worker exited without a result");
            }
        }
    }

    fn apply(&mut self, generation: Generation) {
        if generation.orbits.len() != self.config.subsets {
            debug!("dropping orbits built for a stale layout");
            return;
        }
        self.params = generation.params;
        self.latest = generation.orbits;
        for layer in &mut self.layers {
            layer.dirty = true;
        }
        debug!(formula = ?self.params.formula, a = self.params.a, "orbits regenerated");
    }

    /// Arrow keys: Up/Down change speed, Left/Right change rotation.
    /// Returns true if the key was used.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        let config = &mut self.config;
        match key {
            KeyCode::Up => config.speed = (config.speed + SPEED_STEP).clamp(0.0, MAX_SPEED),
            KeyCode::Down => config.speed = (config.speed - SPEED_STEP).clamp(0.0, MAX_SPEED),
            KeyCode::Left => {
                config.rotation_speed =
                    (config.rotation_speed - ROTATION_STEP).clamp(-MAX_ROTATION_SPEED, MAX_ROTATION_SPEED)
            }
            KeyCode::Right => {
                config.rotation_speed =
                    (config.rotation_speed + ROTATION_STEP).clamp(-MAX_ROTATION_SPEED, MAX_ROTATION_SPEED)
            }
            _ => return false,
        }
        trace!(speed = config.speed, rotation = config.rotation_speed, "layer motion changed");
        true
    }

    /// Change the configuration.
    ///
    /// Layout or orbit changes rebuild the stack with fresh orbits. The
    /// regeneration timer is always restarted.
    pub fn reconfigure<F>(&mut self, f: F)
    where
        F: FnOnce(&mut LayerConfig),
    {
        let mut next = self.config.clone();
        f(&mut next);
        let next = next.sanitized();

        if self.config.needs_rebuild(&next) {
            self.pending = None;
            self.latest = generate_all(&self.params, &next, &mut self.rng);
            self.layers = build_layers(&next, &self.latest);
            debug!(levels = next.levels, subsets = next.subsets, "layer stack rebuilt");
        }
        self.interval.restart(Some(next.regen_period));
        self.config = next;
    }

    /// Stop periodic regeneration and discard any in-flight generation.
    pub fn pause_regeneration(&mut self) {
        self.interval.cancel();
        self.pending = None;
    }

    pub fn resume_regeneration(&mut self) {
        self.interval.restart(None);
    }

    /// Draw every layer.
    pub fn render<S: PointCloudSink + ?Sized>(&self, sink: &mut S) {
        for layer in &self.layers {
            sink.draw_layer(layer.model_matrix(), &layer.orbit);
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn speed(&self) -> f32 {
        self.config.speed
    }

    pub fn rotation_speed(&self) -> f32 {
        self.config.rotation_speed
    }

    /// Parameters of the newest orbits.
    pub fn params(&self) -> &HopalongParams {
        &self.params
    }

    /// Newest orbit of `subset`.
    pub fn latest(&self, subset: usize) -> Option<&Arc<Orbit>> {
        self.latest.get(subset)
    }

    /// Number of orbit swaps performed so far.
    pub fn swaps(&self) -> u64 {
        self.swaps
    }
}

fn generate_all(params: &HopalongParams, config: &LayerConfig, rng: &mut StdRng) -> Vec<Arc<Orbit>> {
    (0..config.subsets)
        .map(|subset| Arc::new(generate_orbit(params, subset, &config.orbit, &config.coloring, rng)))
        .collect()
}

fn build_layers(config: &LayerConfig, orbits: &[Arc<Orbit>]) -> Vec<Layer> {
    let step = config.level_depth / config.subsets as f32;
    let mut layers = Vec::with_capacity(config.levels * config.subsets);
    for level in 0..config.levels {
        for (subset, orbit) in orbits.iter().enumerate() {
            layers.push(Layer {
                level,
                subset,
                depth: -(level as f32 * config.level_depth + subset as f32 * step),
                rotation: 0.0,
                orbit: Arc::clone(orbit),
                dirty: false,
            });
        }
    }
    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CloudRecorder;

    fn small_config() -> LayerConfig {
        let mut config = LayerConfig::default();
        config
            .levels(2)
            .subsets(2)
            .level_depth(100.0)
            .camera_depth(50.0)
            .speed(10.0)
            .rotation_speed(0.01)
            .orbit(OrbitSettings::default().with_points(64));
        config
    }

    #[test]
    fn test_initial_layout() {
        let scheduler = LayerScheduler::with_seed(small_config(), 1);
        let depths: Vec<f32> = scheduler.layers().iter().map(|l| l.depth).collect();
        assert_eq!(depths, vec![0.0, -50.0, -100.0, -150.0]);
        assert!(scheduler.layers().iter().all(|l| !l.dirty));
        assert!(Arc::ptr_eq(&scheduler.layers()[0].orbit, &scheduler.layers()[2].orbit));
    }

    #[test]
    fn test_swap_only_after_crossing_camera() {
        let mut scheduler = LayerScheduler::with_seed(small_config(), 2);
        let original = Arc::clone(&scheduler.layers()[0].orbit);
        scheduler.regenerate();
        let fresh = Arc::clone(scheduler.latest(0).unwrap());
        assert!(!Arc::ptr_eq(&original, &fresh));

        // layer 0 starts at depth 0; five ticks bring it to exactly 50
        for _ in 0..5 {
            scheduler.tick(Duration::ZERO);
            let layer = &scheduler.layers()[0];
            assert!(layer.depth <= 50.0);
            assert!(layer.dirty);
            assert!(Arc::ptr_eq(&layer.orbit, &original));
        }

        scheduler.tick(Duration::ZERO);
        let layer = &scheduler.layers()[0];
        assert!(!layer.dirty);
        assert!(Arc::ptr_eq(&layer.orbit, &fresh));
        assert!((layer.depth - (60.0 - 200.0)).abs() < 1e-4);
    }

    #[test]
    fn test_recycle_without_pending_keeps_orbit() {
        let mut scheduler = LayerScheduler::with_seed(small_config(), 3);
        let original = Arc::clone(&scheduler.layers()[0].orbit);
        for _ in 0..6 {
            scheduler.tick(Duration::ZERO);
        }
        assert!(scheduler.layers()[0].depth < 0.0);
        assert!(Arc::ptr_eq(&scheduler.layers()[0].orbit, &original));
        assert_eq!(scheduler.swaps(), 0);
    }

    #[test]
    fn test_interval_triggers_regeneration() {
        let mut scheduler = LayerScheduler::with_seed(small_config(), 4);
        let before = scheduler.latest(0).unwrap().id;
        scheduler.tick(Duration::from_secs(1));
        assert!(!scheduler.regeneration_pending());
        scheduler.tick(Duration::from_secs(2));
        assert!(scheduler.regeneration_pending());

        scheduler.wait_for_regeneration();
        assert!(!scheduler.regeneration_pending());
        assert!(scheduler.latest(0).unwrap().id > before);
        assert!(scheduler.layers().iter().all(|l| l.dirty));
    }

    #[test]
    fn test_background_orbits_arrive_through_tick() {
        let mut scheduler = LayerScheduler::with_seed(small_config(), 10);
        let before = scheduler.latest(1).unwrap().id;
        scheduler.spawn_regeneration();
        // a second request while one is running is ignored
        scheduler.spawn_regeneration();

        while scheduler.regeneration_pending() {
            scheduler.tick(Duration::ZERO);
            std::thread::yield_now();
        }
        assert!(scheduler.latest(1).unwrap().id > before);
        assert_eq!(scheduler.latest(1).unwrap().len(), 64);
    }

    #[test]
    fn test_rebuild_discards_stale_generation() {
        let mut scheduler = LayerScheduler::with_seed(small_config(), 11);
        scheduler.spawn_regeneration();
        scheduler.reconfigure(|c| {
            c.subsets(3);
        });
        assert!(!scheduler.regeneration_pending());
        assert_eq!(scheduler.layers().len(), 6);
        assert!(scheduler.layers().iter().all(|l| !l.dirty));
    }

    #[test]
    fn test_fast_layers_stay_behind_camera() {
        // one level 5 deep moving 10 per tick: every step overshoots the span
        let mut config = small_config();
        config.levels(1).subsets(1).level_depth(5.0).camera_depth(50.0).speed(10.0);
        let mut scheduler = LayerScheduler::with_seed(config, 12);
        scheduler.pause_regeneration();

        for i in 0..40 {
            scheduler.tick(Duration::ZERO);
            let depth = scheduler.layers()[0].depth;
            assert!(depth <= 50.0, "tick {}: depth {}", i, depth);
            if i >= 4 {
                assert!(depth > 45.0 - 1e-4, "tick {}: depth {}", i, depth);
            }
        }
    }

    #[test]
    fn test_recycle_at_full_speed_keeps_stack_in_range() {
        let mut scheduler = LayerScheduler::with_seed(small_config(), 13);
        scheduler.reconfigure(|c| {
            c.level_depth(8.0).speed(MAX_SPEED);
        });
        scheduler.pause_regeneration();
        let span = scheduler.config().span();

        // every layer has crossed the camera once after four steps
        for _ in 0..4 {
            scheduler.tick(Duration::ZERO);
        }
        for _ in 0..100 {
            scheduler.tick(Duration::ZERO);
            for layer in scheduler.layers() {
                assert!(layer.depth <= 50.0 && layer.depth > 50.0 - span - 1e-4);
            }
        }
    }

    #[test]
    fn test_arrow_keys_clamp() {
        let mut scheduler = LayerScheduler::with_seed(small_config(), 5);
        for _ in 0..100 {
            scheduler.handle_key(KeyCode::Up);
        }
        assert_eq!(scheduler.speed(), MAX_SPEED);
        for _ in 0..100 {
            scheduler.handle_key(KeyCode::Down);
        }
        assert_eq!(scheduler.speed(), 0.0);

        for _ in 0..200 {
            scheduler.handle_key(KeyCode::Right);
        }
        assert_eq!(scheduler.rotation_speed(), MAX_ROTATION_SPEED);
        for _ in 0..200 {
            scheduler.handle_key(KeyCode::Left);
        }
        assert_eq!(scheduler.rotation_speed(), -MAX_ROTATION_SPEED);

        assert!(!scheduler.handle_key(KeyCode::Space));
    }

    #[test]
    fn test_reconfigure_rebuilds_layout() {
        let mut scheduler = LayerScheduler::with_seed(small_config(), 6);
        scheduler.reconfigure(|c| {
            c.levels(3).subsets(4);
        });
        assert_eq!(scheduler.layers().len(), 12);
        assert!(scheduler.latest(3).is_some());

        scheduler.reconfigure(|c| {
            c.speed(99.0);
        });
        assert_eq!(scheduler.speed(), MAX_SPEED);
        assert_eq!(scheduler.layers().len(), 12);
    }

    #[test]
    fn test_render_draws_every_layer() {
        let scheduler = LayerScheduler::with_seed(small_config(), 7);
        let mut sink = CloudRecorder::default();
        scheduler.render(&mut sink);
        assert_eq!(sink.draws.len(), 4);
        assert!(sink.draws.iter().all(|d| d.points == 64));
    }

    #[test]
    fn test_model_matrix_places_layer() {
        let scheduler = LayerScheduler::with_seed(small_config(), 8);
        let layer = &scheduler.layers()[1];
        let origin = layer.model_matrix().transform_point3(Vec3::ZERO);
        assert!((origin.z - layer.depth).abs() < 1e-5);
    }
}
