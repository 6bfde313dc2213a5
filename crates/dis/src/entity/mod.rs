mod config;
mod estimator;
mod publisher;
mod registry;

pub use config::{
    CullingMode, DEFAULT_SMOOTHING_PERIOD_SECONDS, DEFAULT_TIMEOUT_SECONDS, ReceiveConfig,
    SendConfig, SendingMode, SessionConfig,
};
pub use estimator::KinematicsEstimator;
pub use publisher::{EntityPublisher, LocalPose};
pub use registry::{EntityEvent, EntityRegistry, RemoteEntity, RemovalReason};
