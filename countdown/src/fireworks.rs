//! Particle fireworks.
//!
//! Simulation runs in fixed 60 Hz frames regardless of the caller's step size, so the tuning
//! values in [`FireworksConfig`] are per-frame quantities in pixels. Rockets rise from the bottom
//! edge and explode at their apex; [`Fireworks::burst_at`] explodes a shell immediately at a given
//! point without a rocket.

use std::path::PathBuf;
use std::time::Duration;

use engine::graphics::{Color, Renderer2d};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};

pub const FRAME: Duration = Duration::from_nanos(1_000_000_000 / 60);
/// Frames simulated per `step` at most; longer gaps are dropped.
const MAX_FRAMES_PER_STEP: u32 = 10;
const MAX_PARTICLES: usize = 3_000;
const TRAIL_LEN: usize = 5;
const ROCKET_GRAVITY: f32 = 0.12;
const GRAVITY_SCALE: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksConfig {
    /// Hue range in degrees.
    pub hue_min: f32,
    pub hue_max: f32,
    /// Particles per explosion.
    pub particle_count: u32,
    /// Initial particle speed in pixels per frame.
    pub explosion: f32,
    pub gravity: f32,
    /// Velocity multiplier applied every frame.
    pub friction: f32,
    #[serde(rename = "launch_interval_ms", with = "crate::serde_duration::millis")]
    pub launch_interval: Duration,
    /// Audio clips played on explosions, one picked at random each time.
    pub sounds: Vec<PathBuf>,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            hue_min: 0.0,
            hue_max: 360.0,
            particle_count: 90,
            explosion: 5.0,
            gravity: 1.5,
            friction: 0.95,
            launch_interval: Duration::from_millis(450),
            sounds: Vec::new(),
        }
    }
}

impl FireworksConfig {
    pub fn sanitized(mut self) -> Self {
        self.hue_min = self.hue_min.clamp(0.0, 360.0);
        self.hue_max = self.hue_max.clamp(0.0, 360.0);
        if self.hue_min > self.hue_max {
            std::mem::swap(&mut self.hue_min, &mut self.hue_max);
        }
        self.particle_count = self.particle_count.clamp(1, 500);
        self.explosion = self.explosion.clamp(0.5, 20.0);
        self.gravity = self.gravity.clamp(0.0, 10.0);
        self.friction = self.friction.clamp(0.5, 1.0);
        self.launch_interval = self
            .launch_interval
            .clamp(Duration::from_millis(50), Duration::from_secs(10));
        self
    }
}

#[derive(Debug, Clone)]
struct Rocket {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    hue: f32,
    trail: Vec<(f32, f32)>,
}

#[derive(Debug, Clone)]
struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    hue: f32,
    brightness: f32,
    life: f32,
    decay: f32,
    trail: Vec<(f32, f32)>,
}

fn push_trail(trail: &mut Vec<(f32, f32)>, point: (f32, f32)) {
    if trail.len() == TRAIL_LEN {
        trail.remove(0);
    }
    trail.push(point);
}

/// One fireworks surface. Continuous launching is toggled with [`start`](Self::start) and
/// [`stop`](Self::stop); bursts and existing particles keep animating either way.
#[derive(Debug)]
pub struct Fireworks {
    config: FireworksConfig,
    rng: StdRng,
    running: bool,
    rockets: Vec<Rocket>,
    particles: Vec<Particle>,
    launch_elapsed: Duration,
    pending: Duration,
    explosions: Vec<(f32, f32)>,
    total_explosions: u64,
}

impl Fireworks {
    pub fn new(config: FireworksConfig, seed: u64) -> Self {
        Self {
            config: config.sanitized(),
            rng: StdRng::seed_from_u64(seed),
            running: false,
            rockets: Vec::new(),
            particles: Vec::new(),
            launch_elapsed: Duration::ZERO,
            pending: Duration::ZERO,
            explosions: Vec::new(),
            total_explosions: 0,
        }
    }

    pub fn config(&self) -> &FireworksConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: FireworksConfig) {
        self.config = config.sanitized();
    }

    /// Starts launching rockets. The first one goes up on the next frame.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.launch_elapsed = self.config.launch_interval;
        }
    }

    /// Stops launching; rockets and particles already in flight finish.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn clear(&mut self) {
        self.rockets.clear();
        self.particles.clear();
        self.explosions.clear();
        self.pending = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Nothing launching and nothing left on screen.
    pub fn is_idle(&self) -> bool {
        !self.running && self.rockets.is_empty() && self.particles.is_empty()
    }

    pub fn rocket_count(&self) -> usize {
        self.rockets.len()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn total_explosions(&self) -> u64 {
        self.total_explosions
    }

    /// Explodes one shell at `(x, y)` right now.
    pub fn burst_at(&mut self, x: f32, y: f32) {
        let hue = self.random_hue();
        self.explode(x, y, hue);
    }

    /// Explosion positions since the last call, oldest first.
    pub fn take_explosions(&mut self) -> Vec<(f32, f32)> {
        std::mem::take(&mut self.explosions)
    }

    /// Advances the simulation by `dt` inside a `width` x `height` sky.
    pub fn step(&mut self, dt: Duration, width: f32, height: f32) {
        self.pending += dt;
        let mut frames = 0;
        while self.pending >= FRAME {
            self.pending -= FRAME;
            if frames < MAX_FRAMES_PER_STEP {
                self.frame(width, height);
                frames += 1;
            }
        }
    }

    fn frame(&mut self, width: f32, height: f32) {
        if self.running {
            self.launch_elapsed += FRAME;
            if self.launch_elapsed >= self.config.launch_interval {
                self.launch_elapsed = Duration::ZERO;
                self.launch(width, height);
            }
        }

        let mut apexes = Vec::new();
        self.rockets.retain_mut(|rocket| {
            push_trail(&mut rocket.trail, (rocket.x, rocket.y));
            rocket.x += rocket.vx;
            rocket.y += rocket.vy;
            rocket.vy += ROCKET_GRAVITY;
            if rocket.vy >= 0.0 {
                apexes.push((rocket.x, rocket.y, rocket.hue));
                return false;
            }
            true
        });
        for (x, y, hue) in apexes {
            self.explode(x, y, hue);
        }

        let gravity = self.config.gravity * GRAVITY_SCALE;
        let friction = self.config.friction;
        self.particles.retain_mut(|p| {
            push_trail(&mut p.trail, (p.x, p.y));
            p.vx *= friction;
            p.vy = p.vy * friction + gravity;
            p.x += p.vx;
            p.y += p.vy;
            p.life -= p.decay;
            p.life > 0.0 && p.y < height + 50.0 && p.x > -50.0 && p.x < width + 50.0
        });
    }

    fn launch(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let x = width * self.rng.random_range(0.2..=0.8);
        let apex_y = height * self.rng.random_range(0.1..=0.45);
        let rise = (height - apex_y).max(1.0);
        // v² = 2·g·h puts the apex at `apex_y`.
        let vy = -(2.0 * ROCKET_GRAVITY * rise).sqrt();
        let vx = self.rng.random_range(-1.0..=1.0);
        let hue = self.random_hue();
        self.rockets.push(Rocket {
            x,
            y: height,
            vx,
            vy,
            hue,
            trail: Vec::with_capacity(TRAIL_LEN),
        });
    }

    fn explode(&mut self, x: f32, y: f32, hue: f32) {
        let spread = (self.config.hue_max - self.config.hue_min) * 0.05;
        for _ in 0..self.config.particle_count {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.config.explosion * self.rng.random_range(0.3..=1.0);
            let jitter = if spread > 0.0 {
                self.rng.random_range(-spread..=spread)
            } else {
                0.0
            };
            self.particles.push(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                hue: (hue + jitter).rem_euclid(360.0),
                brightness: self.rng.random_range(0.5..=0.8),
                life: 1.0,
                decay: self.rng.random_range(0.012..=0.03),
                trail: Vec::with_capacity(TRAIL_LEN),
            });
        }
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(0..excess);
        }
        self.explosions.push((x, y));
        self.total_explosions += 1;
    }

    fn random_hue(&mut self) -> f32 {
        if self.config.hue_max > self.config.hue_min {
            self.rng
                .random_range(self.config.hue_min..=self.config.hue_max)
        } else {
            self.config.hue_min
        }
    }

    pub fn draw(&self, r: &mut dyn Renderer2d) {
        for rocket in &self.rockets {
            let color = hsl_to_rgb(rocket.hue, 0.3, 0.8);
            for (i, (tx, ty)) in rocket.trail.iter().enumerate() {
                let alpha = (255 * (i + 1) / (TRAIL_LEN + 1)) as u8;
                r.blend_pixel(*tx as i32, *ty as i32, color, alpha);
            }
            draw_dot(r, rocket.x, rocket.y, color, 255);
        }

        for p in &self.particles {
            let color = hsl_to_rgb(p.hue, 1.0, p.brightness);
            let alpha = (p.life.clamp(0.0, 1.0) * 255.0) as u8;
            for (i, (tx, ty)) in p.trail.iter().enumerate() {
                let fade = (i + 1) as f32 / (TRAIL_LEN + 1) as f32;
                r.blend_pixel(*tx as i32, *ty as i32, color, (f32::from(alpha) * fade * 0.5) as u8);
            }
            draw_dot(r, p.x, p.y, color, alpha);
        }
    }
}

fn draw_dot(r: &mut dyn Renderer2d, x: f32, y: f32, color: Color, alpha: u8) {
    let (x, y) = (x as i32, y as i32);
    for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        r.blend_pixel(x + dx, y + dy, color, alpha);
    }
}

/// `h` in degrees, `s` and `l` in `0.0..=1.0`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());
    let (r1, g1, b1) = if h_prime < 1.0 {
        (c, x, 0.0)
    } else if h_prime < 2.0 {
        (x, c, 0.0)
    } else if h_prime < 3.0 {
        (0.0, c, x)
    } else if h_prime < 4.0 {
        (0.0, x, c)
    } else if h_prime < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_u8(r1), to_u8(g1), to_u8(b1), 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0, 255]);
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), [0, 255, 0, 255]);
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), [0, 0, 255, 255]);
        assert_eq!(hsl_to_rgb(360.0, 0.0, 1.0), [255, 255, 255, 255]);
    }

    #[test]
    fn burst_spawns_configured_particles_and_reports_explosion() {
        let config = FireworksConfig {
            particle_count: 40,
            ..FireworksConfig::default()
        };
        let mut fw = Fireworks::new(config, 7);
        fw.burst_at(100.0, 50.0);
        assert_eq!(fw.particle_count(), 40);
        assert_eq!(fw.take_explosions(), vec![(100.0, 50.0)]);
        assert!(fw.take_explosions().is_empty());
        assert!(!fw.is_running());
    }

    #[test]
    fn particles_fade_out_without_launching() {
        let mut fw = Fireworks::new(FireworksConfig::default(), 1);
        fw.burst_at(200.0, 100.0);
        for _ in 0..30 {
            fw.step(Duration::from_millis(200), 400.0, 300.0);
        }
        assert!(fw.is_idle());
        assert_eq!(fw.total_explosions(), 1);
    }

    #[test]
    fn running_surface_launches_rockets_that_explode() {
        let mut fw = Fireworks::new(FireworksConfig::default(), 3);
        fw.start();
        fw.step(FRAME, 800.0, 600.0);
        assert_eq!(fw.rocket_count(), 1);

        // Apex of the highest possible rocket is reached in well under 4 s.
        for _ in 0..240 {
            fw.step(FRAME, 800.0, 600.0);
        }
        assert!(fw.total_explosions() >= 1);

        fw.stop();
        fw.clear();
        assert!(fw.is_idle());
    }

    #[test]
    fn update_config_sanitizes_and_applies_to_later_bursts() {
        let mut fw = Fireworks::new(FireworksConfig::default(), 11);
        fw.burst_at(10.0, 10.0);
        assert_eq!(fw.particle_count(), 90);
        fw.clear();

        fw.update_config(FireworksConfig {
            hue_min: 200.0,
            hue_max: 100.0,
            particle_count: 0,
            ..FireworksConfig::default()
        });
        assert_eq!((fw.config().hue_min, fw.config().hue_max), (100.0, 200.0));
        assert_eq!(fw.config().particle_count, 1);
        fw.burst_at(10.0, 10.0);
        assert_eq!(fw.particle_count(), 1);

        fw.update_config(FireworksConfig {
            particle_count: 25,
            ..FireworksConfig::default()
        });
        fw.burst_at(20.0, 20.0);
        assert_eq!(fw.particle_count(), 26);
    }

    #[test]
    fn sanitized_orders_hue_range_and_clamps() {
        let config = FireworksConfig {
            hue_min: 300.0,
            hue_max: 20.0,
            friction: 3.0,
            particle_count: 0,
            launch_interval: Duration::ZERO,
            ..FireworksConfig::default()
        }
        .sanitized();
        assert_eq!((config.hue_min, config.hue_max), (20.0, 300.0));
        assert_eq!(config.friction, 1.0);
        assert_eq!(config.particle_count, 1);
        assert_eq!(config.launch_interval, Duration::from_millis(50));
    }
}
