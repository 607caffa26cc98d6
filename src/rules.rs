//! Per-mode motion rules.
//!
//! Exactly one [`MotionRule`] is active at a time. It is resolved from the
//! pattern mode when the configuration changes, then applied to every live
//! particle after integration and decay.
//!
//! | Rule | Modes | Effect per tick |
//! |------|-------|-----------------|
//! | `Gravity` | particles, laser, lightning, strobe, pulse, firework | `vx *= 0.99`, `vy += 0.02` |
//! | `Waves` | waves | `vx *= 0.99`, `vy = 2·sin(0.01·x + t)` |
//! | `Orbit` | fractals, ribbon | `v *= 0.98`, angle += 0.05, `v += 0.1·dir(angle)` |
//! | `Drag` | streak, constellation, grid | `v *= 0.99` |

use glam::Vec2;

use crate::config::PatternMode;
use crate::particle::Particle;

/// Motion rule applied to every particle once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionRule {
    /// Horizontal friction plus a slight downward pull.
    Gravity {
        /// Horizontal velocity multiplier per tick.
        friction: f32,
        /// Added to `vy` each tick (y grows downward).
        pull: f32,
    },

    /// Vertical velocity follows a travelling sine wave.
    ///
    /// `vy = amplitude · sin(frequency · x + t)` where `t` is elapsed seconds.
    Waves {
        friction: f32,
        amplitude: f32,
        frequency: f32,
    },

    /// Particles curl around by steering along a rotating heading.
    Orbit {
        /// Velocity multiplier per tick.
        damping: f32,
        /// Heading increment per tick, in radians.
        turn: f32,
        /// Velocity added along the heading each tick.
        thrust: f32,
    },

    /// Uniform velocity damping.
    Drag(f32),
}

impl Default for MotionRule {
    fn default() -> Self {
        MotionRule::Gravity {
            friction: 0.99,
            pull: 0.02,
        }
    }
}

impl MotionRule {
    /// The rule used by a pattern mode.
    pub fn for_mode(mode: PatternMode) -> Self {
        match mode {
            PatternMode::Waves => MotionRule::Waves {
                friction: 0.99,
                amplitude: 2.0,
                frequency: 0.01,
            },
            PatternMode::Fractals | PatternMode::Ribbon => MotionRule::Orbit {
                damping: 0.98,
                turn: 0.05,
                thrust: 0.1,
            },
            PatternMode::Streak | PatternMode::Constellation | PatternMode::Grid => {
                MotionRule::Drag(0.99)
            }
            PatternMode::Particles
            | PatternMode::Laser
            | PatternMode::Lightning
            | PatternMode::Strobe
            | PatternMode::Pulse
            | PatternMode::Firework => MotionRule::default(),
        }
    }

    /// Apply to one particle. `elapsed` is the engine time in seconds.
    #[inline]
    pub fn apply(&self, particle: &mut Particle, elapsed: f32) {
        match *self {
            MotionRule::Gravity { friction, pull } => {
                particle.velocity.x *= friction;
                particle.velocity.y += pull;
            }
            MotionRule::Waves {
                friction,
                amplitude,
                frequency,
            } => {
                particle.velocity.x *= friction;
                particle.velocity.y = amplitude * (frequency * particle.position.x + elapsed).sin();
            }
            MotionRule::Orbit {
                damping,
                turn,
                thrust,
            } => {
                particle.velocity *= damping;
                particle.angle += turn;
                particle.velocity += Vec2::from_angle(particle.angle) * thrust;
            }
            MotionRule::Drag(factor) => {
                particle.velocity *= factor;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn particle(velocity: Vec2) -> Particle {
        Particle::new(Vec2::new(100.0, 100.0), velocity, 3.0, Vec3::ONE)
    }

    #[test]
    fn test_mode_mapping() {
        assert_eq!(MotionRule::for_mode(PatternMode::Particles), MotionRule::default());
        assert_eq!(MotionRule::for_mode(PatternMode::Firework), MotionRule::default());
        assert!(matches!(MotionRule::for_mode(PatternMode::Waves), MotionRule::Waves { .. }));
        assert!(matches!(MotionRule::for_mode(PatternMode::Ribbon), MotionRule::Orbit { .. }));
        assert_eq!(MotionRule::for_mode(PatternMode::Grid), MotionRule::Drag(0.99));
    }

    #[test]
    fn test_gravity() {
        let mut p = particle(Vec2::new(1.0, 0.0));
        MotionRule::default().apply(&mut p, 0.0);
        assert!((p.velocity.x - 0.99).abs() < 1e-6);
        assert!((p.velocity.y - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_waves_overwrites_vy() {
        let mut p = particle(Vec2::new(1.0, 50.0));
        p.position.x = 0.0;
        MotionRule::for_mode(PatternMode::Waves).apply(&mut p, std::f32::consts::FRAC_PI_2);
        assert!((p.velocity.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_orbit_turns_heading() {
        let mut p = particle(Vec2::ZERO);
        p.angle = 0.0;
        MotionRule::for_mode(PatternMode::Fractals).apply(&mut p, 0.0);
        assert!((p.angle - 0.05).abs() < 1e-6);
        let expected = Vec2::from_angle(0.05) * 0.1;
        assert!(p.velocity.distance(expected) < 1e-6);
    }

    #[test]
    fn test_drag() {
        let mut p = particle(Vec2::new(10.0, -10.0));
        MotionRule::Drag(0.5).apply(&mut p, 0.0);
        assert_eq!(p.velocity, Vec2::new(5.0, -5.0));
    }
}
