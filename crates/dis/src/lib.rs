pub mod dead_reckoning;
pub mod dispatch;
pub mod entity;
pub mod math;
pub mod pdu;

pub use dead_reckoning::{Prediction, Thresholds, dead_reckon, exceeds_threshold};
pub use dispatch::{DispatchOutcome, DispatchStats, PduDispatcher, PduHandler, PduQueue};
pub use entity::{
    CullingMode, EntityEvent, EntityPublisher, EntityRegistry, KinematicsEstimator, LocalPose,
    ReceiveConfig, RemoteEntity, RemovalReason, SendConfig, SendingMode, SessionConfig,
};
pub use math::{HeadingPitchRoll, LatLonHeight, PsiThetaPhi};
pub use pdu::{
    DetonationPdu, EntityId, EntityStatePdu, EntityStateUpdatePdu, EntityType, FirePdu, Pdu,
    PduError, PduHeader, PduType, RemoveEntityPdu, StartResumePdu, StopFreezePdu,
};

pub const DEFAULT_PORT: u16 = 3000;
