//! Celebration confetti
//!
//! Emits one particle per interval during a fixed window, then lets the
//! remaining particles fall off the overlay. The population is a bounded
//! queue: when full, the oldest particle goes first.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::ConfettiConfig;

/// Confetti palette
pub const COLORS: [&str; 6] = ["#f00", "#0f0", "#00f", "#ff0", "#f0f", "#0ff"];

/// One falling, spinning square
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    /// Side length
    pub size: f32,
    pub angle: f32,
    /// Radians per frame
    pub spin: f32,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Emission {
    next_at_ms: f64,
    stop_at_ms: f64,
}

/// Confetti effect for an overlay of the given size
#[derive(Debug, Clone)]
pub struct ConfettiEngine {
    config: ConfettiConfig,
    width: f32,
    height: f32,
    particles: VecDeque<Particle>,
    emission: Option<Emission>,
    rng: Pcg32,
}

impl ConfettiEngine {
    pub fn new(config: ConfettiConfig, width: f32, height: f32, seed: u64) -> Self {
        Self {
            config,
            width,
            height,
            particles: VecDeque::with_capacity(config.max_particles),
            emission: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Start (or restart) the emission window at `now_ms`.
    ///
    /// Live particles are kept; only the window timing is reset.
    pub fn trigger(&mut self, now_ms: f64) {
        if self.emission.is_some() {
            log::debug!("Confetti re-triggered, restarting emission window");
        }
        self.emission = Some(Emission {
            next_at_ms: now_ms,
            stop_at_ms: now_ms + self.config.duration_ms,
        });
    }

    /// Emit whatever is due by `now_ms`, then advance every particle one frame
    pub fn step(&mut self, now_ms: f64) {
        if let Some(mut emission) = self.emission {
            while emission.next_at_ms <= now_ms && emission.next_at_ms < emission.stop_at_ms {
                self.spawn();
                emission.next_at_ms += self.config.interval_ms.max(1.0);
            }
            self.emission = (now_ms < emission.stop_at_ms).then_some(emission);
        }

        for p in self.particles.iter_mut() {
            p.pos += p.vel;
            p.angle += p.spin;
        }
        let height = self.height;
        self.particles.retain(|p| p.pos.y <= height);
    }

    /// Drop every particle and cancel emission
    pub fn clear(&mut self) {
        self.particles.clear();
        self.emission = None;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Still emitting or still has particles on screen
    pub fn is_active(&self) -> bool {
        self.is_emitting() || !self.particles.is_empty()
    }

    pub fn is_emitting(&self) -> bool {
        self.emission.is_some()
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    fn spawn(&mut self) {
        if self.config.max_particles == 0 {
            return;
        }
        let particle = Particle {
            pos: Vec2::new(self.rng.random_range(0.0..self.width.max(1.0)), -10.0),
            vel: Vec2::new(0.0, self.rng.random_range(2.0..5.0)),
            size: self.rng.random_range(5.0..15.0),
            angle: self.rng.random_range(0.0..std::f32::consts::TAU),
            spin: self.rng.random_range(-0.1..0.1),
            color: COLORS[self.rng.random_range(0..COLORS.len())],
        };
        self.particles.push_back(particle);
        while self.particles.len() > self.config.max_particles {
            self.particles.pop_front();
        }
    }
}
