//! Session progression: stage transitions, ignition, star classification
//!
//! `Session` owns the session state, both particle fields and the scheduler,
//! and is the single consumer of collection batches. Hosts drive it at the
//! fixed tick rate and drain `StageChange` events after each tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::Viewport;
use crate::config::{SessionConfig, SimulationConfig};
use crate::consts::SIM_DT;

use super::particles::{
    CollectionEvent, Particle, ParticleCategory, ParticleField, PointerSample,
};
use super::scheduler::Scheduler;
use super::state::{
    ControlFeedback, SessionStage, SessionState, StageChange, StarType, WarningLevel,
};

/// Everything the scheduler can fire back at the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionAction {
    /// Batch-sample both fields' collection events (1 s cadence)
    SampleCollection,
    /// Spawn cadence, one per field
    SpawnFuel,
    SpawnDebris,
    /// Delayed collecting -> collapsing transition
    BeginCollapse,
    /// Delayed results of a resolved ignition attempt
    EnterIgniting,
    EnterFailed,
    /// Automatic igniting -> complete transition
    EnterComplete,
    /// Hide the collect hint
    DismissHint,
}

/// Base chance of a successful ignition
const BASE_CHANCE: f32 = 0.85;
/// Penalty per control outside the comfortable band
const OFF_BAND_PENALTY: f32 = 0.30;
/// Band within which a control draws no penalty
const COMFORT_BAND: std::ops::RangeInclusive<f32> = 0.8..=1.2;
/// Past this ratio on either control the chance collapses outright
const EXTREME_RATIO: f32 = 1.7;
const EXTREME_CHANCE: f32 = 0.20;

/// Ignition success chance from the two control ratios.
///
/// The extreme-value override takes precedence over the additive penalties.
pub fn success_chance(temp_ratio: f32, grav_ratio: f32) -> f32 {
    if temp_ratio > EXTREME_RATIO || grav_ratio > EXTREME_RATIO {
        return EXTREME_CHANCE;
    }
    let mut chance = BASE_CHANCE;
    if !COMFORT_BAND.contains(&temp_ratio) {
        chance -= OFF_BAND_PENALTY;
    }
    if !COMFORT_BAND.contains(&grav_ratio) {
        chance -= OFF_BAND_PENALTY;
    }
    chance
}

/// Classify a successful ignition.
///
/// A priority cascade, first match wins. The order is load-bearing: the blue
/// giant rule consumes every high-temperature outcome with gravity below 1.2,
/// so the neutron star rule only ever sees gravity at or above it. Do not
/// rewrite these as independent range checks.
pub fn classify_star(temp_ratio: f32, grav_ratio: f32) -> StarType {
    // Red dwarf: low temperature, gravity pushed past its target
    if temp_ratio < 1.1 && grav_ratio > 1.0 {
        return StarType::RedDwarf;
    }
    // Blue giant: high temperature, low-to-moderate gravity
    if temp_ratio >= 1.3 && grav_ratio < 1.2 {
        return StarType::BlueGiant;
    }
    // Neutron star: high temperature, high gravity
    if temp_ratio >= 1.3 && grav_ratio >= 1.2 {
        return StarType::NeutronStar;
    }
    // Balanced, like our Sun
    StarType::YellowDwarf
}

/// Read-only aggregate for the renderer boundary
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub stage: SessionStage,
    pub banner: &'static str,
    pub fuel: f32,
    pub fuel_target: f32,
    pub debris: f32,
    pub debris_target: f32,
    pub temperature: f32,
    pub temperature_target: f32,
    pub temperature_max: f32,
    pub gravity: f32,
    pub gravity_target: f32,
    pub gravity_max: f32,
    pub star_type: Option<StarType>,
    pub star_description: Option<&'static str>,
    pub fuel_rate: f32,
    pub debris_rate: f32,
    pub temperature_feedback: ControlFeedback,
    pub gravity_feedback: ControlFeedback,
    pub warning: WarningLevel,
    pub hint_visible: bool,
    pub particles: Vec<Particle>,
}

/// The session state machine and its collaborator fields
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    fuel_field: ParticleField,
    debris_field: ParticleField,
    scheduler: Scheduler<SessionAction>,
    rng: Pcg32,
    events: Vec<StageChange>,
    /// A collecting -> collapsing transition is already scheduled
    collapse_pending: bool,
    /// An ignition attempt has been rolled and its transition is in flight
    ignition_resolved: bool,
    seed: u64,
}

impl Session {
    /// New session with canonical tuning
    pub fn new(seed: u64) -> Self {
        Self::with_config(
            SessionConfig::default(),
            SimulationConfig::fuel(),
            SimulationConfig::debris(),
            Viewport::default(),
            seed,
        )
    }

    pub fn with_config(
        config: SessionConfig,
        fuel_config: SimulationConfig,
        debris_config: SimulationConfig,
        viewport: Viewport,
        seed: u64,
    ) -> Self {
        let mut session = Self {
            fuel_field: ParticleField::new(
                ParticleCategory::Fuel,
                fuel_config,
                viewport,
                seed.wrapping_add(1),
            ),
            debris_field: ParticleField::new(
                ParticleCategory::Debris,
                debris_config,
                viewport,
                seed.wrapping_add(2),
            ),
            config,
            state: SessionState::default(),
            scheduler: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            collapse_pending: false,
            ignition_resolved: false,
            seed,
        };
        session.arm_baseline_timers();
        session
    }

    /// Periodic cadences and the hint timer, armed at start and after restart
    fn arm_baseline_timers(&mut self) {
        self.scheduler
            .every(self.config.sample_interval, SessionAction::SampleCollection);
        self.scheduler.every(
            self.fuel_field.config().spawn_interval,
            SessionAction::SpawnFuel,
        );
        self.scheduler.every(
            self.debris_field.config().spawn_interval,
            SessionAction::SpawnDebris,
        );
        self.scheduler
            .once(self.config.hint_timeout, SessionAction::DismissHint);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stage(&self) -> SessionStage {
        self.state.stage
    }

    pub fn fuel_particles(&self) -> &[Particle] {
        self.fuel_field.particles()
    }

    pub fn debris_particles(&self) -> &[Particle] {
        self.debris_field.particles()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.fuel_field.set_viewport(viewport);
        self.debris_field.set_viewport(viewport);
    }

    pub fn temp_ratio(&self) -> f32 {
        self.state.temperature / self.config.temperature_target
    }

    pub fn grav_ratio(&self) -> f32 {
        self.state.gravity / self.config.gravity_target
    }

    /// Stage-change notifications accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<StageChange> {
        std::mem::take(&mut self.events)
    }

    /// Advance one fixed timestep: particle physics, then scheduled actions
    pub fn tick(&mut self, pointer: PointerSample) {
        self.fuel_field.tick(pointer);
        self.debris_field.tick(pointer);
        for action in self.scheduler.tick(SIM_DT) {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::SampleCollection => self.sample_collection(),
            SessionAction::SpawnFuel => self.fuel_field.maybe_spawn(),
            SessionAction::SpawnDebris => self.debris_field.maybe_spawn(),
            SessionAction::BeginCollapse => {
                if self.state.stage == SessionStage::Collecting {
                    self.collapse_pending = false;
                    self.set_stage(SessionStage::Collapsing);
                }
            }
            SessionAction::EnterIgniting => {
                if self.state.stage == SessionStage::Collapsing {
                    self.set_stage(SessionStage::Igniting);
                    self.scheduler
                        .once(self.config.completion_delay, SessionAction::EnterComplete);
                }
            }
            SessionAction::EnterFailed => {
                if self.state.stage == SessionStage::Collapsing {
                    self.set_stage(SessionStage::Failed);
                }
            }
            SessionAction::EnterComplete => {
                if self.state.stage == SessionStage::Igniting {
                    self.set_stage(SessionStage::Complete);
                }
            }
            SessionAction::DismissHint => self.state.hint_visible = false,
        }
    }

    /// The fixed-interval batch sampling point: drain both fields, fold the
    /// amounts into the resource totals while collecting, discard otherwise.
    fn sample_collection(&mut self) {
        let fuel_events = self.fuel_field.drain_collected();
        let debris_events = self.debris_field.drain_collected();

        if self.state.stage != SessionStage::Collecting {
            self.state.fuel_rate = 0.0;
            self.state.debris_rate = 0.0;
            return;
        }

        self.absorb(&fuel_events, &debris_events);
    }

    fn absorb(&mut self, fuel_events: &[CollectionEvent], debris_events: &[CollectionEvent]) {
        let fuel_amount: u32 = fuel_events.iter().map(|e| e.amount).sum();
        let debris_amount: u32 = debris_events.iter().map(|e| e.amount).sum();

        self.state.fuel =
            (self.state.fuel + fuel_amount as f32).clamp(0.0, self.config.fuel_cap());
        self.state.debris =
            (self.state.debris + debris_amount as f32).clamp(0.0, self.config.debris_cap());
        self.state.fuel_rate = fuel_amount as f32 / self.config.sample_interval;
        self.state.debris_rate = debris_amount as f32 / self.config.sample_interval;

        if !self.collapse_pending
            && self.state.fuel >= self.config.fuel_target
            && self.state.debris >= self.config.debris_target
        {
            // Targets met; the stage itself changes only after the
            // presentation delay so the collapse indicator can play.
            self.collapse_pending = true;
            self.scheduler
                .once(self.config.collapse_delay, SessionAction::BeginCollapse);
            log::info!("resource targets met, collapse in {:.1}s", self.config.collapse_delay);
        }
    }

    /// Set the temperature control. Accepted only while collapsing; clamped.
    pub fn adjust_temperature(&mut self, value: f32) {
        if self.state.stage == SessionStage::Collapsing {
            self.state.temperature = value.clamp(0.0, self.config.temperature_max);
        }
    }

    /// Set the gravity control. Accepted only while collapsing; clamped.
    pub fn adjust_gravity(&mut self, value: f32) {
        if self.state.stage == SessionStage::Collapsing {
            self.state.gravity = value.clamp(0.0, self.config.gravity_max);
        }
    }

    /// The explicit, user-triggered ignition attempt.
    ///
    /// Valid only while collapsing and only once per collapse; anywhere else
    /// it is a silent no-op. Draws a single uniform roll against the chance
    /// model and schedules the matching transition.
    pub fn attempt_ignite(&mut self) {
        if self.state.stage != SessionStage::Collapsing || self.ignition_resolved {
            return;
        }
        let roll = self.rng.random::<f32>();
        self.resolve_ignition(roll);
    }

    fn resolve_ignition(&mut self, roll: f32) {
        let temp_ratio = self.temp_ratio();
        let grav_ratio = self.grav_ratio();
        let chance = success_chance(temp_ratio, grav_ratio);
        self.ignition_resolved = true;

        if roll < chance {
            let star = classify_star(temp_ratio, grav_ratio);
            self.state.star_type = Some(star);
            self.scheduler
                .once(self.config.ignition_delay, SessionAction::EnterIgniting);
            log::info!(
                "ignition succeeded (roll {roll:.2} < {chance:.2}): {}",
                star.as_str()
            );
        } else {
            self.state.star_type = Some(StarType::Failed);
            self.scheduler
                .once(self.config.failure_delay, SessionAction::EnterFailed);
            log::info!("ignition failed (roll {roll:.2} >= {chance:.2})");
        }
    }

    /// Back to a fresh collecting session from any stage.
    ///
    /// Cancels every outstanding scheduled action before touching state, so a
    /// timer queued by the previous session can never fire into this one.
    pub fn restart(&mut self) {
        self.scheduler.cancel_all();
        self.state = SessionState::default();
        self.collapse_pending = false;
        self.ignition_resolved = false;
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.fuel_field.reset();
        self.debris_field.reset();
        self.arm_baseline_timers();
        self.events.push(StageChange {
            stage: SessionStage::Collecting,
            star_type: None,
        });
        log::info!("session restarted");
    }

    fn set_stage(&mut self, stage: SessionStage) {
        self.state.stage = stage;
        self.events.push(StageChange {
            stage,
            star_type: self.state.star_type,
        });
        log::info!("stage -> {}", stage.banner());
    }

    /// Read-only aggregate for the renderer boundary
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut particles =
            Vec::with_capacity(self.fuel_field.particles().len() + self.debris_field.particles().len());
        particles.extend_from_slice(self.fuel_field.particles());
        particles.extend_from_slice(self.debris_field.particles());

        SessionSnapshot {
            stage: self.state.stage,
            banner: self.state.stage.banner(),
            fuel: self.state.fuel,
            fuel_target: self.config.fuel_target,
            debris: self.state.debris,
            debris_target: self.config.debris_target,
            temperature: self.state.temperature,
            temperature_target: self.config.temperature_target,
            temperature_max: self.config.temperature_max,
            gravity: self.state.gravity,
            gravity_target: self.config.gravity_target,
            gravity_max: self.config.gravity_max,
            star_type: self.state.star_type,
            star_description: self.state.star_type.map(|s| s.description()),
            fuel_rate: self.state.fuel_rate,
            debris_rate: self.state.debris_rate,
            temperature_feedback: ControlFeedback::for_ratio(self.temp_ratio()),
            gravity_feedback: ControlFeedback::for_ratio(self.grav_ratio()),
            warning: WarningLevel::for_ratios(self.temp_ratio(), self.grav_ratio()),
            hint_visible: self.state.hint_visible,
            particles,
        }
    }
}
