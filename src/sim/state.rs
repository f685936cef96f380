//! Session state and narrative types

use serde::{Deserialize, Serialize};

/// Current stage of the session
///
/// Exactly one stage is active. `Complete` and `Failed` are terminal until an
/// explicit restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStage {
    /// Gathering fuel and debris toward the pointer
    Collecting,
    /// Targets met; the player balances temperature and gravity
    Collapsing,
    /// Ignition roll succeeded; fusion animation window, no input accepted
    Igniting,
    /// A star was formed
    Complete,
    /// The ignition attempt failed
    Failed,
}

impl SessionStage {
    /// Banner text for the stage display
    pub fn banner(&self) -> &'static str {
        match self {
            SessionStage::Collecting => "Stage 1: Cosmic Cloud Formation",
            SessionStage::Collapsing => "Stage 2: Gravitational Collapse",
            SessionStage::Igniting => "Stage 3: Protostar Ignition",
            SessionStage::Complete => "Star Formation Complete",
            SessionStage::Failed => "Star Formation Failed!",
        }
    }

    /// True for `Complete` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStage::Complete | SessionStage::Failed)
    }
}

/// Classification of a resolved ignition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarType {
    RedDwarf,
    YellowDwarf,
    BlueGiant,
    NeutronStar,
    Failed,
}

impl StarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StarType::RedDwarf => "red dwarf",
            StarType::YellowDwarf => "yellow dwarf",
            StarType::BlueGiant => "blue giant",
            StarType::NeutronStar => "neutron star",
            StarType::Failed => "failed",
        }
    }

    /// Narrative description shown in the outcome modal
    pub fn description(&self) -> &'static str {
        match self {
            StarType::RedDwarf => {
                "A small, relatively cool, low-mass star that can live for trillions of years."
            }
            StarType::YellowDwarf => {
                "A medium-sized star like our Sun with balanced temperature and gravity."
            }
            StarType::BlueGiant => {
                "A massive, hot, luminous star that will live fast and die spectacularly."
            }
            StarType::NeutronStar => {
                "An incredibly dense remnant of a massive star that collapsed under gravity."
            }
            StarType::Failed => "The star formation process became unstable and collapsed.",
        }
    }
}

/// Slider feedback band for a control, from its ratio to target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlFeedback {
    TooLow,
    GettingCloser,
    Perfect,
    TooHigh,
    Unstable,
}

impl ControlFeedback {
    pub fn for_ratio(ratio: f32) -> Self {
        if ratio < 0.5 {
            ControlFeedback::TooLow
        } else if ratio < 0.8 {
            ControlFeedback::GettingCloser
        } else if ratio <= 1.2 {
            ControlFeedback::Perfect
        } else if ratio <= 1.5 {
            ControlFeedback::TooHigh
        } else {
            ControlFeedback::Unstable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlFeedback::TooLow => "Too low!",
            ControlFeedback::GettingCloser => "Getting closer...",
            ControlFeedback::Perfect => "Perfect!",
            ControlFeedback::TooHigh => "Careful, too high!",
            ControlFeedback::Unstable => "DANGER: Unstable!",
        }
    }
}

/// Danger level driving the warning-flash collaborator during collapse
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarningLevel {
    None,
    /// Either control ratio above 1.5
    Warning,
    /// Either control ratio above 1.7 (the chance-override zone)
    Critical,
}

impl WarningLevel {
    pub fn for_ratios(temp_ratio: f32, grav_ratio: f32) -> Self {
        let worst = temp_ratio.max(grav_ratio);
        if worst > 1.7 {
            WarningLevel::Critical
        } else if worst > 1.5 {
            WarningLevel::Warning
        } else {
            WarningLevel::None
        }
    }
}

/// Outbound notification emitted whenever the stage changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageChange {
    pub stage: SessionStage,
    /// Set once an ignition attempt has resolved
    pub star_type: Option<StarType>,
}

/// The session's complete mutable state, owned exclusively by the state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub stage: SessionStage,
    /// Fuel total, clamped to [0, fuel_target * overfill]
    pub fuel: f32,
    /// Debris total, clamped to [0, debris_target * overfill]
    pub debris: f32,
    /// Mutable only while collapsing
    pub temperature: f32,
    /// Mutable only while collapsing
    pub gravity: f32,
    /// Meaningful only once stage is Igniting, Complete or Failed
    pub star_type: Option<StarType>,
    /// Collection rate over the last sample window, per second
    pub fuel_rate: f32,
    pub debris_rate: f32,
    /// Collect hint, shown at session start until its timer dismisses it
    pub hint_visible: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            stage: SessionStage::Collecting,
            fuel: 0.0,
            debris: 0.0,
            temperature: 0.0,
            gravity: 0.0,
            star_type: None,
            fuel_rate: 0.0,
            debris_rate: 0.0,
            hint_visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_bands() {
        assert_eq!(ControlFeedback::for_ratio(0.2), ControlFeedback::TooLow);
        assert_eq!(
            ControlFeedback::for_ratio(0.7),
            ControlFeedback::GettingCloser
        );
        assert_eq!(ControlFeedback::for_ratio(1.0), ControlFeedback::Perfect);
        assert_eq!(ControlFeedback::for_ratio(1.2), ControlFeedback::Perfect);
        assert_eq!(ControlFeedback::for_ratio(1.4), ControlFeedback::TooHigh);
        assert_eq!(ControlFeedback::for_ratio(1.6), ControlFeedback::Unstable);
    }

    #[test]
    fn test_warning_levels() {
        assert_eq!(WarningLevel::for_ratios(1.0, 1.0), WarningLevel::None);
        assert_eq!(WarningLevel::for_ratios(1.6, 0.9), WarningLevel::Warning);
        assert_eq!(WarningLevel::for_ratios(0.9, 1.8), WarningLevel::Critical);
    }

    #[test]
    fn test_terminal_stages() {
        assert!(SessionStage::Complete.is_terminal());
        assert!(SessionStage::Failed.is_terminal());
        assert!(!SessionStage::Collapsing.is_terminal());
    }
}
