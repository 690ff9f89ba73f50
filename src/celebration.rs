use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::SystemTime;

/// Particles in one full celebration, split across the bursts below
const PARTICLE_BUDGET: f64 = 120.0;

/// (share of particles, spread in degrees, launch speed, per-step decay)
const BURSTS: [(f64, f64, f64, f64); 5] = [
    (0.25, 26.0, 11.0, 0.90),
    (0.20, 60.0, 9.0, 0.90),
    (0.35, 100.0, 9.0, 0.91),
    (0.10, 120.0, 5.0, 0.92),
    (0.10, 120.0, 9.0, 0.90),
];

const GRAVITY: f64 = 6.0;

/// Particle for celebration animation
#[derive(Debug, Clone)]
pub struct CelebrationParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub decay: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    pub is_text: bool,
    pub target_x: f64,
    pub target_y: f64,
}

impl CelebrationParticle {
    /// Confetti piece launched upward within `spread` degrees of vertical
    fn confetti<R: Rng>(x: f64, y: f64, spread: f64, speed: f64, decay: f64, rng: &mut R) -> Self {
        let half = spread.to_radians() / 2.0;
        let angle = std::f64::consts::FRAC_PI_2 + rng.gen_range(-half..=half);
        let speed = speed * rng.gen_range(0.6..1.0);

        Self {
            x,
            y,
            // terminal cells are about twice as tall as wide
            vel_x: angle.cos() * speed * 2.0,
            vel_y: -angle.sin() * speed,
            decay,
            symbol: *['*', '+', '•', '✦', '✧', '·', '★']
                .choose(rng)
                .unwrap_or(&'*'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
            is_text: false,
            target_x: x,
            target_y: y,
        }
    }

    fn text(x: f64, y: f64, target_x: f64, target_y: f64, symbol: char, color: usize) -> Self {
        Self {
            x,
            y,
            vel_x: target_x - x,
            vel_y: target_y - y,
            decay: 0.95,
            symbol,
            color_index: color,
            age: 0.0,
            max_age: 4.0,
            is_text: true,
            target_x,
            target_y,
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        if self.is_text {
            let dist_to_target =
                ((self.target_x - self.x).powi(2) + (self.target_y - self.y).powi(2)).sqrt();
            if dist_to_target > 1.0 {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_x *= self.decay;
                self.vel_y *= self.decay;
            } else {
                self.x = self.target_x;
                self.y = self.target_y;
                self.vel_x = 0.0;
                self.vel_y = 0.0;
            }
        } else {
            self.x += self.vel_x * dt;
            self.y += self.vel_y * dt;
            self.vel_x *= self.decay;
            self.vel_y = self.vel_y * self.decay + GRAVITY * dt;
        }

        self.age += dt;
        self.age < self.max_age
    }
}

/// Confetti burst shown over the results screen
#[derive(Debug)]
pub struct CelebrationAnimation {
    pub particles: Vec<CelebrationParticle>,
    pub start_time: SystemTime,
    pub duration: f64,
    pub is_active: bool,
    pub terminal_width: f64,
    pub terminal_height: f64,
    rng: StdRng,
}

impl CelebrationAnimation {
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            start_time: SystemTime::now(),
            duration: 3.0,
            is_active: false,
            terminal_width: 80.0,
            terminal_height: 24.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Launch the bursts from 70% down the screen and spell a banner above
    /// them. Three stars get "PERFECT!", two get "GREAT!".
    pub fn start(&mut self, width: u16, height: u16, stars: u8) {
        self.particles.clear();
        self.start_time = SystemTime::now();
        self.is_active = true;
        self.terminal_width = width as f64;
        self.terminal_height = height as f64;

        let origin_x = width as f64 / 2.0;
        let origin_y = height as f64 * 0.7;

        for (share, spread, speed, decay) in BURSTS {
            let count = (PARTICLE_BUDGET * share).round() as usize;
            for _ in 0..count {
                let particle = CelebrationParticle::confetti(
                    origin_x,
                    origin_y,
                    spread,
                    speed,
                    decay,
                    &mut self.rng,
                );
                self.particles.push(particle);
            }
        }

        let banner = if stars >= 3 { "PERFECT!" } else { "GREAT!" };
        self.create_text_particles(banner, origin_x, height as f64 * 0.25);
    }

    fn create_text_particles(&mut self, text: &str, center_x: f64, center_y: f64) {
        let char_width = 2.0;
        let text_width = (text.chars().count() as f64 - 1.0) * char_width;
        let start_x = center_x - text_width / 2.0;

        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let target_x = start_x + (i as f64 * char_width);
            let from_x = center_x + self.rng.gen_range(-10.0..10.0);
            let from_y = center_y + self.rng.gen_range(-5.0..5.0);
            let color = self.rng.gen_range(0..7);

            self.particles.push(CelebrationParticle::text(
                from_x, from_y, target_x, center_y, ch, color,
            ));
        }
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.particles.clear();
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        let elapsed = self.start_time.elapsed().unwrap_or_default().as_secs_f64();
        if elapsed >= self.duration {
            self.stop();
            return;
        }

        let dt = 0.1;
        let (width, height) = (self.terminal_width, self.terminal_height);
        self.particles.retain_mut(|particle| {
            let still_alive = particle.update(dt);
            if particle.is_text {
                return still_alive;
            }
            let buffer = 5.0;
            let off_screen = particle.y > height + buffer
                || particle.x < -buffer
                || particle.x > width + buffer;
            still_alive && !off_screen
        });
    }
}

impl Default for CelebrationAnimation {
    fn default() -> Self {
        Self::new()
    }
}
