use bytes::{Buf, BufMut, Bytes, BytesMut};
use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::enums::{ForceId, PduType};
use super::error::PduError;
use super::header::PduHeader;
use super::records::{
    ArticulationParameter, DeadReckoningParameters, EntityId, EntityType, read_marking,
    write_marking,
};
use super::entity_state_update::EntityStateUpdatePdu;
use super::wire::{
    WireRecord, articulation_count, ensure_remaining, expect_type, read_articulation_parameters,
    read_dvec3, read_vec3, reconcile_location, write_dvec3, write_vec3,
};

/// Full entity snapshot. Location is held in both f64 and f32 form; the two are
/// reconciled when encoding (see [`EntityStatePdu::wire_location`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStatePdu {
    pub header: PduHeader,
    pub entity_id: EntityId,
    pub force_id: ForceId,
    pub entity_type: EntityType,
    pub alternative_entity_type: EntityType,
    pub linear_velocity: Vec3,
    pub location: DVec3,
    pub location_f32: Vec3,
    /// Psi, theta, phi in radians.
    pub orientation: Vec3,
    pub appearance: u32,
    pub dead_reckoning: DeadReckoningParameters,
    pub marking: String,
    pub capabilities: u32,
    pub articulation_parameters: Vec<ArticulationParameter>,
}

impl Default for EntityStatePdu {
    fn default() -> Self {
        Self::new(EntityId::default())
    }
}

impl EntityStatePdu {
    pub const FIXED_SIZE: usize = 144;

    pub fn new(entity_id: EntityId) -> Self {
        Self {
            header: PduHeader::new(PduType::EntityState, 0),
            entity_id,
            force_id: ForceId::OTHER,
            entity_type: EntityType::WILDCARD,
            alternative_entity_type: EntityType::WILDCARD,
            linear_velocity: Vec3::ZERO,
            location: DVec3::ZERO,
            location_f32: Vec3::ZERO,
            orientation: Vec3::ZERO,
            appearance: 0,
            dead_reckoning: DeadReckoningParameters::default(),
            marking: String::new(),
            capabilities: 0,
            articulation_parameters: Vec::new(),
        }
    }

    /// Sets both location forms.
    pub fn set_location(&mut self, location: DVec3) {
        self.location = location;
        self.location_f32 = location.as_vec3();
    }

    pub fn wire_size(&self) -> usize {
        Self::FIXED_SIZE
            + articulation_count(&self.articulation_parameters) * ArticulationParameter::SIZE
    }

    /// The f64 location if it agrees with the f32 copy to f32 precision, otherwise
    /// the f32 copy widened. A caller that only touched the f32 field wins.
    pub fn wire_location(&self) -> DVec3 {
        reconcile_location(self.location, self.location_f32)
    }

    pub fn decode(data: &[u8]) -> Result<Self, PduError> {
        let mut buf = data;
        ensure_remaining(&buf, Self::FIXED_SIZE)?;

        let header = PduHeader::read(&mut buf);
        expect_type(&header, PduType::EntityState)?;

        let entity_id = EntityId::read(&mut buf);
        let force_id = ForceId(buf.get_u8());
        let articulation_count = buf.get_u8() as usize;
        let entity_type = EntityType::read(&mut buf);
        let alternative_entity_type = EntityType::read(&mut buf);
        let linear_velocity = read_vec3(&mut buf);
        let location = read_dvec3(&mut buf);
        let orientation = read_vec3(&mut buf);
        let appearance = buf.get_u32();
        let dead_reckoning = DeadReckoningParameters::read(&mut buf);
        let marking = read_marking(&mut buf);
        let capabilities = buf.get_u32();
        let articulation_parameters = read_articulation_parameters(&mut buf, articulation_count)?;

        Ok(Self {
            header,
            entity_id,
            force_id,
            entity_type,
            alternative_entity_type,
            linear_velocity,
            location,
            location_f32: location.as_vec3(),
            orientation,
            appearance,
            dead_reckoning,
            marking,
            capabilities,
            articulation_parameters,
        })
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        let count = articulation_count(&self.articulation_parameters);
        let size = Self::FIXED_SIZE + count * ArticulationParameter::SIZE;
        buf.reserve(size);

        self.header.write_with_length(buf, size);
        self.entity_id.write(buf);
        buf.put_u8(self.force_id.0);
        buf.put_u8(count as u8);
        self.entity_type.write(buf);
        self.alternative_entity_type.write(buf);
        write_vec3(buf, self.linear_velocity);
        write_dvec3(buf, self.wire_location());
        write_vec3(buf, self.orientation);
        buf.put_u32(self.appearance);
        self.dead_reckoning.write(buf);
        write_marking(buf, &self.marking);
        buf.put_u32(self.capabilities);
        for param in &self.articulation_parameters[..count] {
            param.write(buf);
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.encode_into(&mut buf);
        buf.freeze()
    }

    /// Reduced form carrying only the fields that change from tick to tick.
    pub fn to_update(&self) -> EntityStateUpdatePdu {
        EntityStateUpdatePdu {
            header: PduHeader {
                pdu_type: PduType::EntityStateUpdate,
                protocol_family: PduType::EntityStateUpdate.family(),
                ..self.header
            },
            entity_id: self.entity_id,
            linear_velocity: self.linear_velocity,
            location: self.location,
            location_f32: self.location_f32,
            orientation: self.orientation,
            appearance: self.appearance,
            articulation_parameters: self.articulation_parameters.clone(),
        }
    }

    /// Folds an update into a prior snapshot. Fields the update does not carry
    /// (type, force, marking, dead reckoning, capabilities) come from `prior`.
    pub fn from_update(prior: &EntityStatePdu, update: &EntityStateUpdatePdu) -> EntityStatePdu {
        EntityStatePdu {
            header: PduHeader {
                pdu_type: PduType::EntityState,
                protocol_family: PduType::EntityState.family(),
                ..update.header
            },
            entity_id: update.entity_id,
            linear_velocity: update.linear_velocity,
            location: update.location,
            location_f32: update.location_f32,
            orientation: update.orientation,
            appearance: update.appearance,
            articulation_parameters: update.articulation_parameters.clone(),
            ..prior.clone()
        }
    }

    pub fn is_frozen(&self) -> bool {
        super::appearance::is_frozen(self.appearance)
    }

    pub fn is_deactivated(&self) -> bool {
        super::appearance::is_deactivated(self.appearance)
    }
}
