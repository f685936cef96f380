//! Protostar - deterministic core for a star-formation game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (particle fields, session state machine, scheduler)
//! - `config`: Data-driven tuning for the simulation and session
//!
//! Rendering, audio and widgets are external collaborators: they consume the
//! snapshot/event surface exposed by `sim` and never reach into it.

pub mod config;
pub mod sim;

pub use config::{SessionConfig, SimulationConfig};
pub use sim::{Session, SessionStage, StageChange, StarType};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fixed simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default viewport used when the host has not reported one yet
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;
}

/// Viewport extents in screen-relative units, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: consts::DEFAULT_VIEWPORT_WIDTH,
            height: consts::DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True if `pos` lies inside the viewport grown by `margin` on every side
    #[inline]
    pub fn contains_with_margin(&self, pos: Vec2, margin: f32) -> bool {
        pos.x >= -margin
            && pos.x <= self.width + margin
            && pos.y >= -margin
            && pos.y <= self.height + margin
    }
}
