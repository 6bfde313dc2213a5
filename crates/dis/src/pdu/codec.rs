use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use super::detonation::DetonationPdu;
use super::entity_state::EntityStatePdu;
use super::entity_state_update::EntityStateUpdatePdu;
use super::enums::PduType;
use super::error::PduError;
use super::fire::FirePdu;
use super::header::{HEADER_SIZE, PduHeader, peek_pdu_type};
use super::records::ArticulationParameter;
use super::simulation_management::{RemoveEntityPdu, StartResumePdu, StopFreezePdu};
use super::wire::WireRecord;

/// Accepted buffer lengths for a PDU type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireSize {
    Exact(usize),
    /// Fixed part followed by any number of 16-byte articulation parameters.
    WithArticulation(usize),
}

impl WireSize {
    pub fn for_type(pdu_type: PduType) -> Option<WireSize> {
        match pdu_type {
            PduType::EntityState => Some(WireSize::WithArticulation(EntityStatePdu::FIXED_SIZE)),
            PduType::EntityStateUpdate => {
                Some(WireSize::WithArticulation(EntityStateUpdatePdu::FIXED_SIZE))
            }
            PduType::Detonation => Some(WireSize::WithArticulation(DetonationPdu::FIXED_SIZE)),
            PduType::Fire => Some(WireSize::Exact(FirePdu::SIZE)),
            PduType::RemoveEntity => Some(WireSize::Exact(RemoveEntityPdu::SIZE)),
            PduType::StartResume => Some(WireSize::Exact(StartResumePdu::SIZE)),
            PduType::StopFreeze => Some(WireSize::Exact(StopFreezePdu::SIZE)),
            _ => None,
        }
    }

    pub fn minimum(self) -> usize {
        match self {
            WireSize::Exact(size) | WireSize::WithArticulation(size) => size,
        }
    }

    pub fn validate(self, pdu_type: PduType, length: usize) -> Result<(), PduError> {
        let minimum = self.minimum();
        if length < minimum {
            return Err(PduError::Truncated {
                needed: minimum,
                available: length,
            });
        }

        let valid = match self {
            WireSize::Exact(size) => length == size,
            WireSize::WithArticulation(size) => (length - size) % ArticulationParameter::SIZE == 0,
        };
        if !valid {
            return Err(PduError::InvalidLength { pdu_type, length });
        }
        Ok(())
    }
}

/// Any PDU this crate understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pdu {
    EntityState(EntityStatePdu),
    EntityStateUpdate(EntityStateUpdatePdu),
    Fire(FirePdu),
    Detonation(DetonationPdu),
    RemoveEntity(RemoveEntityPdu),
    StartResume(StartResumePdu),
    StopFreeze(StopFreezePdu),
}

impl Pdu {
    /// Validates the buffer length for the type byte, then decodes.
    pub fn decode(data: &[u8]) -> Result<Pdu, PduError> {
        let pdu_type = peek_pdu_type(data).ok_or(PduError::Truncated {
            needed: HEADER_SIZE,
            available: data.len(),
        })?;
        let rule = WireSize::for_type(pdu_type).ok_or(PduError::Unhandled(pdu_type.into()))?;
        rule.validate(pdu_type, data.len())?;

        let pdu = match pdu_type {
            PduType::EntityState => Pdu::EntityState(EntityStatePdu::decode(data)?),
            PduType::EntityStateUpdate => {
                Pdu::EntityStateUpdate(EntityStateUpdatePdu::decode(data)?)
            }
            PduType::Fire => Pdu::Fire(FirePdu::decode(data)?),
            PduType::Detonation => Pdu::Detonation(DetonationPdu::decode(data)?),
            PduType::RemoveEntity => Pdu::RemoveEntity(RemoveEntityPdu::decode(data)?),
            PduType::StartResume => Pdu::StartResume(StartResumePdu::decode(data)?),
            PduType::StopFreeze => Pdu::StopFreeze(StopFreezePdu::decode(data)?),
            other => return Err(PduError::Unhandled(other.into())),
        };
        Ok(pdu)
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        match self {
            Pdu::EntityState(pdu) => pdu.encode_into(buf),
            Pdu::EntityStateUpdate(pdu) => pdu.encode_into(buf),
            Pdu::Fire(pdu) => pdu.encode_into(buf),
            Pdu::Detonation(pdu) => pdu.encode_into(buf),
            Pdu::RemoveEntity(pdu) => pdu.encode_into(buf),
            Pdu::StartResume(pdu) => pdu.encode_into(buf),
            Pdu::StopFreeze(pdu) => pdu.encode_into(buf),
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf);
        buf.freeze()
    }

    pub fn header(&self) -> &PduHeader {
        match self {
            Pdu::EntityState(pdu) => &pdu.header,
            Pdu::EntityStateUpdate(pdu) => &pdu.header,
            Pdu::Fire(pdu) => &pdu.header,
            Pdu::Detonation(pdu) => &pdu.header,
            Pdu::RemoveEntity(pdu) => &pdu.header,
            Pdu::StartResume(pdu) => &pdu.header,
            Pdu::StopFreeze(pdu) => &pdu.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut PduHeader {
        match self {
            Pdu::EntityState(pdu) => &mut pdu.header,
            Pdu::EntityStateUpdate(pdu) => &mut pdu.header,
            Pdu::Fire(pdu) => &mut pdu.header,
            Pdu::Detonation(pdu) => &mut pdu.header,
            Pdu::RemoveEntity(pdu) => &mut pdu.header,
            Pdu::StartResume(pdu) => &mut pdu.header,
            Pdu::StopFreeze(pdu) => &mut pdu.header,
        }
    }

    pub fn pdu_type(&self) -> PduType {
        self.header().pdu_type
    }

    pub fn exercise_id(&self) -> u8 {
        self.header().exercise_id
    }
}

impl From<EntityStatePdu> for Pdu {
    fn from(pdu: EntityStatePdu) -> Self {
        Pdu::EntityState(pdu)
    }
}

impl From<EntityStateUpdatePdu> for Pdu {
    fn from(pdu: EntityStateUpdatePdu) -> Self {
        Pdu::EntityStateUpdate(pdu)
    }
}

impl From<FirePdu> for Pdu {
    fn from(pdu: FirePdu) -> Self {
        Pdu::Fire(pdu)
    }
}

impl From<DetonationPdu> for Pdu {
    fn from(pdu: DetonationPdu) -> Self {
        Pdu::Detonation(pdu)
    }
}

impl From<RemoveEntityPdu> for Pdu {
    fn from(pdu: RemoveEntityPdu) -> Self {
        Pdu::RemoveEntity(pdu)
    }
}

impl From<StartResumePdu> for Pdu {
    fn from(pdu: StartResumePdu) -> Self {
        Pdu::StartResume(pdu)
    }
}

impl From<StopFreezePdu> for Pdu {
    fn from(pdu: StopFreezePdu) -> Self {
        Pdu::StopFreeze(pdu)
    }
}
