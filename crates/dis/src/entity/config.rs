use serde::{Deserialize, Serialize};

use crate::dead_reckoning::Thresholds;
use crate::pdu::{DeadReckoningAlgorithm, EntityType, ForceId};

pub const DEFAULT_TIMEOUT_SECONDS: f64 = 30.0;
pub const DEFAULT_SMOOTHING_PERIOD_SECONDS: f64 = 0.5;

/// Identifies this simulation on the exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub exercise_id: u8,
    pub site_id: u16,
    pub application_id: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exercise_id: 1,
            site_id: 1,
            application_id: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CullingMode {
    #[default]
    None,
    CullDeadReckoning,
    /// Currently culls the same work as `CullDeadReckoning`.
    CullAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiveConfig {
    /// Entities silent for longer than this are dropped. Zero disables.
    pub timeout_seconds: f64,
    pub dead_reckoning: bool,
    pub smoothing: bool,
    pub smoothing_period_seconds: f64,
    pub culling_mode: CullingMode,
    pub culling_distance_m: f64,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            dead_reckoning: true,
            smoothing: true,
            smoothing_period_seconds: DEFAULT_SMOOTHING_PERIOD_SECONDS,
            culling_mode: CullingMode::None,
            culling_distance_m: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SendingMode {
    None,
    #[default]
    EntityState,
    EntityStateUpdate,
}

/// Everything a publisher stamps onto the PDUs it forms for one local entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendConfig {
    pub thresholds: Thresholds,
    pub algorithm: DeadReckoningAlgorithm,
    pub sending_mode: SendingMode,
    pub entity_type: EntityType,
    pub force_id: ForceId,
    pub marking: String,
    pub appearance: u32,
    pub capabilities: u32,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            algorithm: DeadReckoningAlgorithm::Static,
            sending_mode: SendingMode::EntityState,
            entity_type: EntityType::default(),
            force_id: ForceId::FRIENDLY,
            marking: String::new(),
            appearance: 1,
            capabilities: 1,
        }
    }
}
