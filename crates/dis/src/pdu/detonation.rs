use bytes::{Buf, BufMut, Bytes, BytesMut};
use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::enums::{DetonationResult, PduType};
use super::error::PduError;
use super::header::PduHeader;
use super::records::{ArticulationParameter, BurstDescriptor, EntityId, EventId};
use super::wire::{
    WireRecord, articulation_count, ensure_remaining, expect_type, read_articulation_parameters,
    read_dvec3, read_vec3, write_dvec3, write_vec3,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetonationPdu {
    pub header: PduHeader,
    pub firing_entity_id: EntityId,
    pub target_entity_id: EntityId,
    pub munition_entity_id: EntityId,
    pub event_id: EventId,
    pub velocity: Vec3,
    /// Detonation point in ECEF metres.
    pub location: DVec3,
    pub burst_descriptor: BurstDescriptor,
    /// Detonation point relative to the target's body frame.
    pub location_in_entity_coordinates: Vec3,
    pub detonation_result: DetonationResult,
    pub articulation_parameters: Vec<ArticulationParameter>,
}

impl DetonationPdu {
    pub const FIXED_SIZE: usize = 104;

    pub fn new(firing_entity_id: EntityId, event_id: EventId) -> Self {
        Self {
            header: PduHeader::new(PduType::Detonation, 0),
            firing_entity_id,
            target_entity_id: EntityId::default(),
            munition_entity_id: EntityId::default(),
            event_id,
            velocity: Vec3::ZERO,
            location: DVec3::ZERO,
            burst_descriptor: BurstDescriptor::default(),
            location_in_entity_coordinates: Vec3::ZERO,
            detonation_result: DetonationResult::Other,
            articulation_parameters: Vec::new(),
        }
    }

    pub fn wire_size(&self) -> usize {
        Self::FIXED_SIZE
            + articulation_count(&self.articulation_parameters) * ArticulationParameter::SIZE
    }

    pub fn decode(data: &[u8]) -> Result<Self, PduError> {
        let mut buf = data;
        ensure_remaining(&buf, Self::FIXED_SIZE)?;

        let header = PduHeader::read(&mut buf);
        expect_type(&header, PduType::Detonation)?;

        let firing_entity_id = EntityId::read(&mut buf);
        let target_entity_id = EntityId::read(&mut buf);
        let munition_entity_id = EntityId::read(&mut buf);
        let event_id = EventId::read(&mut buf);
        let velocity = read_vec3(&mut buf);
        let location = read_dvec3(&mut buf);
        let burst_descriptor = BurstDescriptor::read(&mut buf);
        let location_in_entity_coordinates = read_vec3(&mut buf);
        let detonation_result = DetonationResult::from(buf.get_u8());
        let articulation_count = buf.get_u8() as usize;
        let _padding = buf.get_u16();
        let articulation_parameters = read_articulation_parameters(&mut buf, articulation_count)?;

        Ok(Self {
            header,
            firing_entity_id,
            target_entity_id,
            munition_entity_id,
            event_id,
            velocity,
            location,
            burst_descriptor,
            location_in_entity_coordinates,
            detonation_result,
            articulation_parameters,
        })
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        let count = articulation_count(&self.articulation_parameters);
        let size = Self::FIXED_SIZE + count * ArticulationParameter::SIZE;
        buf.reserve(size);

        self.header.write_with_length(buf, size);
        self.firing_entity_id.write(buf);
        self.target_entity_id.write(buf);
        self.munition_entity_id.write(buf);
        self.event_id.write(buf);
        write_vec3(buf, self.velocity);
        write_dvec3(buf, self.location);
        self.burst_descriptor.write(buf);
        write_vec3(buf, self.location_in_entity_coordinates);
        buf.put_u8(self.detonation_result.into());
        buf.put_u8(count as u8);
        buf.put_u16(0);
        for param in &self.articulation_parameters[..count] {
            param.write(buf);
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.encode_into(&mut buf);
        buf.freeze()
    }
}
