mod appearance;
mod codec;
mod detonation;
mod entity_state;
mod entity_state_update;
mod enums;
mod error;
mod fire;
mod header;
mod records;
mod simulation_management;
mod wire;

pub use appearance::*;
pub use codec::{Pdu, WireSize};
pub use detonation::DetonationPdu;
pub use entity_state::EntityStatePdu;
pub use entity_state_update::EntityStateUpdatePdu;
pub use enums::*;
pub use error::PduError;
pub use fire::FirePdu;
pub use header::{HEADER_SIZE, PDU_TYPE_OFFSET, PROTOCOL_VERSION, PduHeader, peek_pdu_type};
pub use records::{
    ArticulationParameter, ArticulationValue, BurstDescriptor, ClockTime, DeadReckoningParameters,
    EntityId, EntityType, EventId, MARKING_LENGTH, OTHER_PARAMETERS_LENGTH,
};
pub use simulation_management::{RemoveEntityPdu, StartResumePdu, StopFreezePdu};
