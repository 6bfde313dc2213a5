use bytes::{Buf, BufMut, Bytes, BytesMut};
use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::enums::PduType;
use super::error::PduError;
use super::header::PduHeader;
use super::records::{BurstDescriptor, EntityId, EventId};
use super::wire::{
    WireRecord, ensure_remaining, expect_type, read_dvec3, read_vec3, write_dvec3, write_vec3,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirePdu {
    pub header: PduHeader,
    pub firing_entity_id: EntityId,
    pub target_entity_id: EntityId,
    pub munition_entity_id: EntityId,
    pub event_id: EventId,
    pub fire_mission_index: u32,
    /// Launch point in ECEF metres.
    pub location: DVec3,
    pub burst_descriptor: BurstDescriptor,
    pub velocity: Vec3,
    pub range: f32,
}

impl FirePdu {
    pub const SIZE: usize = 96;

    pub fn new(firing_entity_id: EntityId, event_id: EventId) -> Self {
        Self {
            header: PduHeader::new(PduType::Fire, 0),
            firing_entity_id,
            target_entity_id: EntityId::default(),
            munition_entity_id: EntityId::default(),
            event_id,
            fire_mission_index: 0,
            location: DVec3::ZERO,
            burst_descriptor: BurstDescriptor::default(),
            velocity: Vec3::ZERO,
            range: 0.0,
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, PduError> {
        let mut buf = data;
        ensure_remaining(&buf, Self::SIZE)?;

        let header = PduHeader::read(&mut buf);
        expect_type(&header, PduType::Fire)?;

        Ok(Self {
            header,
            firing_entity_id: EntityId::read(&mut buf),
            target_entity_id: EntityId::read(&mut buf),
            munition_entity_id: EntityId::read(&mut buf),
            event_id: EventId::read(&mut buf),
            fire_mission_index: buf.get_u32(),
            location: read_dvec3(&mut buf),
            burst_descriptor: BurstDescriptor::read(&mut buf),
            velocity: read_vec3(&mut buf),
            range: buf.get_f32(),
        })
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(Self::SIZE);
        self.header.write_with_length(buf, Self::SIZE);
        self.firing_entity_id.write(buf);
        self.target_entity_id.write(buf);
        self.munition_entity_id.write(buf);
        self.event_id.write(buf);
        buf.put_u32(self.fire_mission_index);
        write_dvec3(buf, self.location);
        self.burst_descriptor.write(buf);
        write_vec3(buf, self.velocity);
        buf.put_f32(self.range);
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        self.encode_into(&mut buf);
        buf.freeze()
    }
}
