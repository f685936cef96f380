//! Deterministic simulation module
//!
//! All game logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by particle ID)
//! - No rendering or platform dependencies

pub mod particles;
pub mod scheduler;
pub mod session;
pub mod state;

pub use particles::{
    CollectionEvent, DebrisKind, Particle, ParticleCategory, ParticleField, PointerSample,
};
pub use scheduler::{ActionHandle, Scheduler};
pub use session::{Session, SessionSnapshot};
pub use state::{ControlFeedback, SessionStage, SessionState, StageChange, StarType, WarningLevel};
