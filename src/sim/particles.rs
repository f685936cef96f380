//! Particle fields: spawning, pointer attraction, collection
//!
//! A `ParticleField` owns every particle of one category and all of their
//! physics. Velocities are in screen units per tick; the timestep is implicit
//! in the fixed tick rate. Collected particles are frozen in place until a
//! retention window expires, then removed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::Viewport;
use crate::config::SimulationConfig;
use crate::consts::SIM_DT;

/// The two collectible categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleCategory {
    Fuel,
    Debris,
}

impl ParticleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleCategory::Fuel => "fuel",
            ParticleCategory::Debris => "debris",
        }
    }
}

/// Debris composition, drawn uniformly at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebrisKind {
    Iron,
    Silicate,
    Nickel,
    Carbon,
}

impl DebrisKind {
    pub const ALL: [DebrisKind; 4] = [
        DebrisKind::Iron,
        DebrisKind::Silicate,
        DebrisKind::Nickel,
        DebrisKind::Carbon,
    ];

    /// Chemical symbol rendered on the particle
    pub fn symbol(&self) -> &'static str {
        match self {
            DebrisKind::Iron => "Fe",
            DebrisKind::Silicate => "Si",
            DebrisKind::Nickel => "Ni",
            DebrisKind::Carbon => "C",
        }
    }
}

/// Pointer position and activity for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    pub pos: Vec2,
    /// False while the pointer is outside the play area
    pub active: bool,
}

impl PointerSample {
    pub fn at(pos: Vec2) -> Self {
        Self { pos, active: true }
    }
}

/// A drifting particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub category: ParticleCategory,
    /// `Some` iff category is `Debris`
    pub debris: Option<DebrisKind>,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub collected: bool,
    /// Tick at which the particle was collected
    pub collected_tick: Option<u64>,
}

/// Emitted once when a particle is collected; drained in batches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionEvent {
    pub category: ParticleCategory,
    pub debris: Option<DebrisKind>,
    /// Always 1; summed per batch by the consumer
    pub amount: u32,
    pub tick: u64,
}

/// Bounded, continuously-regenerating population of one particle category
#[derive(Debug, Clone)]
pub struct ParticleField {
    category: ParticleCategory,
    config: SimulationConfig,
    viewport: Viewport,
    seed: u64,
    rng: Pcg32,
    particles: Vec<Particle>,
    pending: Vec<CollectionEvent>,
    next_id: u32,
    tick_count: u64,
}

impl ParticleField {
    pub fn new(category: ParticleCategory, config: SimulationConfig, viewport: Viewport, seed: u64) -> Self {
        let mut field = Self {
            category,
            config,
            viewport,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            particles: Vec::new(),
            pending: Vec::new(),
            next_id: 1,
            tick_count: 0,
        };
        for _ in 0..field.config.target_population {
            field.spawn();
        }
        field
    }

    pub fn category(&self) -> ParticleCategory {
        self.category
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Snapshot of all particles for the renderer boundary
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn uncollected_count(&self) -> usize {
        self.particles.iter().filter(|p| !p.collected).count()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Reset to the freshly-constructed state: same seed, new initial population
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.particles.clear();
        self.pending.clear();
        self.next_id = 1;
        self.tick_count = 0;
        for _ in 0..self.config.target_population {
            self.spawn();
        }
    }

    /// Create one particle at a uniformly chosen screen edge, drifting inward
    /// or along it with a small random velocity. Always succeeds.
    pub fn spawn(&mut self) {
        let id = self.next_id;
        self.next_id += 1;

        let margin = self.config.spawn_margin;
        let (w, h) = (self.viewport.width, self.viewport.height);
        // 0: top, 1: right, 2: bottom, 3: left
        let pos = match self.rng.random_range(0u8..4) {
            0 => Vec2::new(self.rng.random_range(0.0..w), -margin),
            1 => Vec2::new(w + margin, self.rng.random_range(0.0..h)),
            2 => Vec2::new(self.rng.random_range(0.0..w), h + margin),
            _ => Vec2::new(-margin, self.rng.random_range(0.0..h)),
        };
        let vel = Vec2::new(
            self.rng.random_range(-1.0..1.0),
            self.rng.random_range(-1.0..1.0),
        );
        let radius = self
            .rng
            .random_range(self.config.radius_min..self.config.radius_max);
        let debris = match self.category {
            ParticleCategory::Fuel => None,
            ParticleCategory::Debris => {
                Some(DebrisKind::ALL[self.rng.random_range(0..DebrisKind::ALL.len())])
            }
        };

        self.particles.push(Particle {
            id,
            category: self.category,
            debris,
            pos,
            vel,
            radius,
            collected: false,
            collected_tick: None,
        });
    }

    /// The periodic spawn cadence: skipped while the uncollected population
    /// is at or above the ceiling, so the cap is never exceeded.
    pub fn maybe_spawn(&mut self) {
        if self.uncollected_count() < self.config.max_population() {
            self.spawn();
        }
    }

    /// Advance all uncollected particles one simulation step
    pub fn tick(&mut self, pointer: PointerSample) {
        self.tick_count += 1;
        let tick = self.tick_count;

        self.cull();

        let attraction_radius = self.config.attraction_radius;
        let collection_radius = self.config.collection_radius;
        let force = self.config.attraction_force;
        let damping = self.config.damping;
        let wrap_margin = self.config.wrap_margin;
        let viewport = self.viewport;
        let (w, h) = (viewport.width, viewport.height);

        for particle in &mut self.particles {
            if particle.collected {
                continue;
            }

            let delta = pointer.pos - particle.pos;
            let distance = delta.length();

            if pointer.active && distance < collection_radius {
                particle.collected = true;
                particle.collected_tick = Some(tick);
                self.pending.push(CollectionEvent {
                    category: particle.category,
                    debris: particle.debris,
                    amount: 1,
                    tick,
                });
                // Frozen from here on: velocity retained, physics skipped
                continue;
            }

            // Zero distance would blow up the unit vector; skip this tick
            if pointer.active && distance < attraction_radius && distance > 0.0 {
                let impulse = (1.0 - distance / attraction_radius) * force;
                particle.vel += delta / distance * impulse;
            }

            particle.vel *= damping;
            particle.pos += particle.vel;

            // Two-tier edge policy: wrap while near the viewport, otherwise
            // drift until the off-screen cull removes it. Avoids snapping a
            // fast particle back across the screen.
            if viewport.contains_with_margin(particle.pos, wrap_margin) {
                if particle.pos.x < 0.0 {
                    particle.pos.x = w;
                } else if particle.pos.x > w {
                    particle.pos.x = 0.0;
                }
                if particle.pos.y < 0.0 {
                    particle.pos.y = h;
                } else if particle.pos.y > h {
                    particle.pos.y = 0.0;
                }
            }
        }
    }

    /// Drain every collection event accumulated since the last call.
    ///
    /// This is the state machine's batch sampling point; events are never
    /// applied one at a time.
    pub fn drain_collected(&mut self) -> Vec<CollectionEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Remove far-off-screen strays and expired collected particles
    fn cull(&mut self) {
        let viewport = self.viewport;
        let buffer = self.config.cull_buffer;
        let retention_ticks = (self.config.retention_secs / SIM_DT).round() as u64;
        let tick = self.tick_count;
        let before = self.particles.len();

        self.particles.retain(|p| match p.collected_tick {
            Some(collected_at) => tick.saturating_sub(collected_at) < retention_ticks,
            None => viewport.contains_with_margin(p.pos, buffer),
        });

        let removed = before - self.particles.len();
        if removed > 0 {
            log::trace!(
                "{}: culled {removed} particle(s), {} remain",
                self.category.as_str(),
                self.particles.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn field(seed: u64) -> ParticleField {
        ParticleField::new(
            ParticleCategory::Fuel,
            SimulationConfig::fuel(),
            Viewport::new(800.0, 600.0),
            seed,
        )
    }

    /// Park a particle at a known spot with no velocity
    fn pin(field: &mut ParticleField, index: usize, pos: Vec2) {
        field.particles[index].pos = pos;
        field.particles[index].vel = Vec2::ZERO;
    }

    #[test]
    fn test_spawn_on_edges() {
        let field = field(7);
        assert_eq!(field.particles().len(), 15);
        for p in field.particles() {
            let on_edge = p.pos.x == -20.0
                || p.pos.x == 820.0
                || p.pos.y == -20.0
                || p.pos.y == 620.0;
            assert!(on_edge, "spawned off-edge at {:?}", p.pos);
            assert!(p.vel.x.abs() <= 1.0 && p.vel.y.abs() <= 1.0);
            assert!(p.debris.is_none());
        }
    }

    #[test]
    fn test_debris_field_assigns_subtype() {
        let field = ParticleField::new(
            ParticleCategory::Debris,
            SimulationConfig::debris(),
            Viewport::new(800.0, 600.0),
            3,
        );
        assert!(field.particles().iter().all(|p| p.debris.is_some()));
    }

    #[test]
    fn test_collection_emits_exactly_one_event() {
        let mut field = field(1);
        let target = Vec2::new(400.0, 300.0);
        pin(&mut field, 0, target + Vec2::new(10.0, 0.0));

        field.tick(PointerSample::at(target));
        let events = field.drain_collected();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, ParticleCategory::Fuel);
        assert_eq!(events[0].amount, 1);
        assert!(field.particles()[0].collected);

        // Collected particles never re-enter collection physics
        for _ in 0..30 {
            field.tick(PointerSample::at(target));
        }
        assert!(field.drain_collected().is_empty());
    }

    #[test]
    fn test_collected_particle_is_frozen() {
        let mut field = field(1);
        let target = Vec2::new(400.0, 300.0);
        pin(&mut field, 0, target + Vec2::new(5.0, 0.0));

        field.tick(PointerSample::at(target));
        let frozen = field.particles()[0].pos;
        field.tick(PointerSample::at(Vec2::new(0.0, 0.0)));
        assert_eq!(field.particles()[0].pos, frozen);
    }

    #[test]
    fn test_inactive_pointer_never_collects() {
        let mut field = field(1);
        let target = Vec2::new(400.0, 300.0);
        pin(&mut field, 0, target + Vec2::new(5.0, 0.0));

        field.tick(PointerSample {
            pos: target,
            active: false,
        });
        assert!(field.drain_collected().is_empty());
        assert!(!field.particles()[0].collected);
    }

    #[test]
    fn test_attraction_pulls_toward_pointer() {
        let mut field = field(1);
        let target = Vec2::new(400.0, 300.0);
        pin(&mut field, 0, target + Vec2::new(100.0, 0.0));

        field.tick(PointerSample::at(target));
        // Impulse points in -x; after damping and integration it moved closer
        assert!(field.particles()[0].vel.x < 0.0);
        assert!(field.particles()[0].pos.x < 500.0);
    }

    #[test]
    fn test_zero_distance_skips_attraction() {
        // Exact overlap with collection disabled exercises the unit-vector
        // guard: the particle must stay finite, not NaN out.
        let mut cfg = SimulationConfig::fuel();
        cfg.collection_radius = 0.0;
        let mut field =
            ParticleField::new(ParticleCategory::Fuel, cfg, Viewport::new(800.0, 600.0), 1);
        let target = Vec2::new(400.0, 300.0);
        pin(&mut field, 0, target);
        field.tick(PointerSample::at(target));
        let p = &field.particles()[0];
        assert!(p.vel.is_finite());
        assert!(p.pos.is_finite());
        assert!(!p.collected);
    }

    #[test]
    fn test_damping_decelerates_free_particles() {
        let mut field = field(1);
        field.particles[0].vel = Vec2::new(2.0, 0.0);
        let before = field.particles()[0].vel.length();
        field.tick(PointerSample::default());
        assert!(field.particles()[0].vel.length() < before);
    }

    #[test]
    fn test_wrap_near_edge() {
        let mut field = field(1);
        pin(&mut field, 0, Vec2::new(-0.5, 300.0));
        field.particles[0].vel = Vec2::new(-1.0, 0.0);
        field.tick(PointerSample::default());
        // Crossed x=0 while inside the wrap margin: wraps to the far side
        assert!((field.particles()[0].pos.x - 800.0).abs() < 1.0);
    }

    #[test]
    fn test_far_stray_is_culled_not_wrapped() {
        let mut field = field(1);
        pin(&mut field, 0, Vec2::new(-60.0, 300.0));
        field.particles[0].vel = Vec2::new(-1.0, 0.0);
        let id = field.particles()[0].id;

        // Past the wrap margin: keeps drifting
        field.tick(PointerSample::default());
        let p = field.particles().iter().find(|p| p.id == id).unwrap();
        assert!(p.pos.x < -60.0);

        // Push beyond the cull buffer and it disappears
        field.particles[0].pos.x = -150.0;
        field.tick(PointerSample::default());
        assert!(field.particles().iter().all(|p| p.id != id));
    }

    #[test]
    fn test_collected_retention_window() {
        let mut field = field(1);
        let target = Vec2::new(400.0, 300.0);
        pin(&mut field, 0, target + Vec2::new(5.0, 0.0));
        field.tick(PointerSample::at(target));
        let id = field.particles()[0].id;
        assert!(field.particles()[0].collected);

        // 5 s retention at 60 Hz
        for _ in 0..301 {
            field.tick(PointerSample::default());
        }
        assert!(field.particles().iter().all(|p| p.id != id));
    }

    #[test]
    fn test_maybe_spawn_respects_ceiling() {
        let mut field = field(1);
        for _ in 0..100 {
            field.maybe_spawn();
        }
        // 27 = 15 * 1.8
        assert_eq!(field.uncollected_count(), field.config().max_population());
    }

    #[test]
    fn test_reset_matches_fresh_field() {
        let mut a = field(42);
        let b = field(42);
        for _ in 0..120 {
            a.tick(PointerSample::at(Vec2::new(400.0, 300.0)));
        }
        a.reset();
        assert_eq!(a.particles().len(), b.particles().len());
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.id, pb.id);
            assert_eq!(pa.pos, pb.pos);
            assert_eq!(pa.vel, pb.vel);
        }
        assert!(a.drain_collected().is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut a = field(99999);
        let mut b = field(99999);
        let pointer = PointerSample::at(Vec2::new(200.0, 200.0));
        for _ in 0..240 {
            a.tick(pointer);
            b.tick(pointer);
        }
        assert_eq!(a.particles().len(), b.particles().len());
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.pos, pb.pos);
        }
        assert_eq!(a.drain_collected(), b.drain_collected());
    }

    proptest! {
        /// Uncollected population never exceeds the ceiling at any sampled
        /// tick, no matter how spawn cadence and ticks interleave.
        #[test]
        fn prop_population_never_exceeds_ceiling(
            seed in 0u64..1000,
            steps in prop::collection::vec(any::<bool>(), 1..200),
        ) {
            let mut field = field(seed);
            let cap = field.config().max_population();
            for spawn in steps {
                if spawn {
                    field.maybe_spawn();
                } else {
                    field.tick(PointerSample::default());
                }
                prop_assert!(field.uncollected_count() <= cap);
            }
        }
    }
}
