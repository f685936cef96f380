//! Data-driven tuning for the simulation and session
//!
//! Defaults carry the canonical game balance; hosts may deserialize their own.

use serde::{Deserialize, Serialize};

/// Tuning for one particle field (one category)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Population the field regenerates toward
    pub target_population: usize,
    /// Distance at which particles start being attracted to the pointer
    pub attraction_radius: f32,
    /// Distance at which an active pointer collects a particle
    pub collection_radius: f32,
    /// Attraction impulse at zero distance (falls off linearly to the radius)
    pub attraction_force: f32,
    /// Per-tick velocity multiplier, < 1
    pub damping: f32,
    /// Seconds between spawn attempts
    pub spawn_interval: f32,
    /// Uncollected population ceiling, as a multiplier over the target
    pub population_ceiling: f32,
    /// How far outside the viewport new particles spawn
    pub spawn_margin: f32,
    /// Toroidal wrap applies only within this distance of the viewport edge
    pub wrap_margin: f32,
    /// Uncollected particles beyond viewport + this buffer are culled
    pub cull_buffer: f32,
    /// Seconds a collected particle is retained before removal
    pub retention_secs: f32,
    /// Particle radius range, inclusive low / exclusive high
    pub radius_min: f32,
    pub radius_max: f32,
}

impl SimulationConfig {
    /// Tuning for the fuel (hydrogen) field
    pub fn fuel() -> Self {
        Self {
            target_population: 15,
            radius_min: 15.0,
            radius_max: 25.0,
            ..Self::base()
        }
    }

    /// Tuning for the debris (dust) field
    pub fn debris() -> Self {
        Self {
            target_population: 10,
            radius_min: 18.0,
            radius_max: 30.0,
            ..Self::base()
        }
    }

    fn base() -> Self {
        Self {
            target_population: 15,
            attraction_radius: 150.0,
            collection_radius: 30.0,
            attraction_force: 0.5,
            damping: 0.98,
            spawn_interval: 0.5,
            population_ceiling: 1.8,
            spawn_margin: 20.0,
            wrap_margin: 50.0,
            cull_buffer: 100.0,
            retention_secs: 5.0,
            radius_min: 15.0,
            radius_max: 25.0,
        }
    }

    /// Hard cap on uncollected particles
    pub fn max_population(&self) -> usize {
        (self.target_population as f32 * self.population_ceiling) as usize
    }
}

/// Tuning for session progression: targets, control ranges, delays, cadences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fuel total needed to leave the collecting stage
    pub fuel_target: f32,
    /// Debris total needed to leave the collecting stage
    pub debris_target: f32,
    /// Resource totals clamp at target * this
    pub resource_overfill: f32,

    /// Optimal temperature the player aims for
    pub temperature_target: f32,
    /// Optimal gravity the player aims for
    pub gravity_target: f32,
    /// Slider maxima (minima are 0)
    pub temperature_max: f32,
    pub gravity_max: f32,

    /// Seconds between collection-batch samples (also the rate window)
    pub sample_interval: f32,
    /// Presentation delay before collecting -> collapsing lands
    pub collapse_delay: f32,
    /// Delay between a successful ignition roll and the igniting stage
    pub ignition_delay: f32,
    /// How long the igniting stage runs before completing
    pub completion_delay: f32,
    /// Delay between a failed ignition roll and the failed stage
    pub failure_delay: f32,
    /// Seconds before the collect hint is dismissed
    pub hint_timeout: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fuel_target: 100.0,
            debris_target: 50.0,
            resource_overfill: 1.2,

            temperature_target: 80.0,
            gravity_target: 70.0,
            temperature_max: 150.0,
            gravity_max: 140.0,

            sample_interval: 1.0,
            collapse_delay: 1.5,
            ignition_delay: 1.0,
            completion_delay: 5.0,
            failure_delay: 2.0,
            hint_timeout: 6.0,
        }
    }
}

impl SessionConfig {
    /// Ceiling for the fuel total
    pub fn fuel_cap(&self) -> f32 {
        self.fuel_target * self.resource_overfill
    }

    /// Ceiling for the debris total
    pub fn debris_cap(&self) -> f32 {
        self.debris_target * self.resource_overfill
    }
}
