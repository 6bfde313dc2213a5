use bytes::{Buf, BufMut, Bytes, BytesMut};
use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::enums::PduType;
use super::error::PduError;
use super::header::PduHeader;
use super::records::{ArticulationParameter, EntityId};
use super::wire::{
    WireRecord, articulation_count, ensure_remaining, expect_type, read_articulation_parameters,
    read_dvec3, read_vec3, reconcile_location, write_dvec3, write_vec3,
};

/// Lightweight entity update. Only meaningful against a previously received
/// [`EntityStatePdu`](super::EntityStatePdu) for the same entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStateUpdatePdu {
    pub header: PduHeader,
    pub entity_id: EntityId,
    pub linear_velocity: Vec3,
    pub location: DVec3,
    pub location_f32: Vec3,
    pub orientation: Vec3,
    pub appearance: u32,
    pub articulation_parameters: Vec<ArticulationParameter>,
}

impl EntityStateUpdatePdu {
    pub const FIXED_SIZE: usize = 72;

    pub fn new(entity_id: EntityId) -> Self {
        Self {
            header: PduHeader::new(PduType::EntityStateUpdate, 0),
            entity_id,
            linear_velocity: Vec3::ZERO,
            location: DVec3::ZERO,
            location_f32: Vec3::ZERO,
            orientation: Vec3::ZERO,
            appearance: 0,
            articulation_parameters: Vec::new(),
        }
    }

    pub fn set_location(&mut self, location: DVec3) {
        self.location = location;
        self.location_f32 = location.as_vec3();
    }

    pub fn wire_size(&self) -> usize {
        Self::FIXED_SIZE
            + articulation_count(&self.articulation_parameters) * ArticulationParameter::SIZE
    }

    /// See [`EntityStatePdu::wire_location`](super::EntityStatePdu::wire_location).
    pub fn wire_location(&self) -> DVec3 {
        reconcile_location(self.location, self.location_f32)
    }

    pub fn decode(data: &[u8]) -> Result<Self, PduError> {
        let mut buf = data;
        ensure_remaining(&buf, Self::FIXED_SIZE)?;

        let header = PduHeader::read(&mut buf);
        expect_type(&header, PduType::EntityStateUpdate)?;

        let entity_id = EntityId::read(&mut buf);
        let _padding = buf.get_u8();
        let articulation_count = buf.get_u8() as usize;
        let linear_velocity = read_vec3(&mut buf);
        let location = read_dvec3(&mut buf);
        let orientation = read_vec3(&mut buf);
        let appearance = buf.get_u32();
        let articulation_parameters = read_articulation_parameters(&mut buf, articulation_count)?;

        Ok(Self {
            header,
            entity_id,
            linear_velocity,
            location,
            location_f32: location.as_vec3(),
            orientation,
            appearance,
            articulation_parameters,
        })
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        let count = articulation_count(&self.articulation_parameters);
        let size = Self::FIXED_SIZE + count * ArticulationParameter::SIZE;
        buf.reserve(size);

        self.header.write_with_length(buf, size);
        self.entity_id.write(buf);
        buf.put_u8(0);
        buf.put_u8(count as u8);
        write_vec3(buf, self.linear_velocity);
        write_dvec3(buf, self.wire_location());
        write_vec3(buf, self.orientation);
        buf.put_u32(self.appearance);
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
