//! Protostar entry point
//!
//! Headless scripted demo: an autoplayer chases particles with the pointer,
//! balances the controls, and attempts ignition, logging every stage change.
//! Seed comes from the first CLI argument (default 42).

use glam::Vec2;

use protostar::consts::SIM_DT;
use protostar::sim::{PointerSample, Session, SessionStage};

/// Pointer travel per tick while chasing particles
const POINTER_SPEED: f32 = 12.0;
/// Slider travel per tick while balancing
const CONTROL_SPEED: f32 = 0.8;
/// Hard stop so a pathological seed cannot spin forever
const MAX_SIM_SECS: f32 = 600.0;
/// Give up after this many failed ignitions
const MAX_RESTARTS: u32 = 5;

/// Nearest uncollected particle across both fields
fn nearest_uncollected(session: &Session, from: Vec2) -> Option<Vec2> {
    session
        .fuel_particles()
        .iter()
        .chain(session.debris_particles())
        .filter(|p| !p.collected)
        .min_by(|a, b| {
            (a.pos - from)
                .length()
                .partial_cmp(&(b.pos - from).length())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|p| p.pos)
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42u64);
    log::info!("starting session with seed {seed}");

    let mut session = Session::new(seed);
    let mut pointer = Vec2::new(640.0, 360.0);
    let mut restarts = 0;
    let max_ticks = (MAX_SIM_SECS / SIM_DT) as u64;

    for _ in 0..max_ticks {
        let sample = match session.stage() {
            SessionStage::Collecting => {
                if let Some(target) = nearest_uncollected(&session, pointer) {
                    let delta = target - pointer;
                    let step = delta.length().min(POINTER_SPEED);
                    if step > 0.0 {
                        pointer += delta.normalize_or_zero() * step;
                    }
                }
                PointerSample::at(pointer)
            }
            SessionStage::Collapsing => {
                let temp_target = session.config().temperature_target;
                let grav_target = session.config().gravity_target;

                let next_temp =
                    (session.state().temperature + CONTROL_SPEED).min(temp_target);
                session.adjust_temperature(next_temp);
                let next_grav = (session.state().gravity + CONTROL_SPEED).min(grav_target);
                session.adjust_gravity(next_grav);

                if session.state().temperature >= temp_target
                    && session.state().gravity >= grav_target
                {
                    session.attempt_ignite();
                }
                PointerSample::default()
            }
            _ => PointerSample::default(),
        };

        session.tick(sample);

        for change in session.drain_events() {
            match change.star_type {
                Some(star) => log::info!(
                    "stage change: {} ({} - {})",
                    change.stage.banner(),
                    star.as_str(),
                    star.description()
                ),
                None => log::info!("stage change: {}", change.stage.banner()),
            }
        }

        match session.stage() {
            SessionStage::Complete => break,
            SessionStage::Failed => {
                restarts += 1;
                if restarts > MAX_RESTARTS {
                    log::warn!("giving up after {MAX_RESTARTS} failed ignitions");
                    break;
                }
                log::info!("ignition failed, restarting (attempt {restarts})");
                session.restart();
                pointer = Vec2::new(640.0, 360.0);
            }
            _ => {}
        }
    }

    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("snapshot serialization failed: {err}"),
    }
}
