use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use super::enums::{FrozenBehavior, PduType, StopFreezeReason};
use super::error::PduError;
use super::header::PduHeader;
use super::records::{ClockTime, EntityId};
use super::wire::{WireRecord, ensure_remaining, expect_type};

/// Asks the receiving application to drop an entity it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveEntityPdu {
    pub header: PduHeader,
    pub originating_entity_id: EntityId,
    pub receiving_entity_id: EntityId,
    pub request_id: u32,
}

impl RemoveEntityPdu {
    pub const SIZE: usize = 28;

    pub fn new(originating: EntityId, receiving: EntityId, request_id: u32) -> Self {
        Self {
            header: PduHeader::new(PduType::RemoveEntity, 0),
            originating_entity_id: originating,
            receiving_entity_id: receiving,
            request_id,
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, PduError> {
        let mut buf = data;
        ensure_remaining(&buf, Self::SIZE)?;

        let header = PduHeader::read(&mut buf);
        expect_type(&header, PduType::RemoveEntity)?;

        Ok(Self {
            header,
            originating_entity_id: EntityId::read(&mut buf),
            receiving_entity_id: EntityId::read(&mut buf),
            request_id: buf.get_u32(),
        })
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(Self::SIZE);
        self.header.write_with_length(buf, Self::SIZE);
        self.originating_entity_id.write(buf);
        self.receiving_entity_id.write(buf);
        buf.put_u32(self.request_id);
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        self.encode_into(&mut buf);
        buf.freeze()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResumePdu {
    pub header: PduHeader,
    pub originating_entity_id: EntityId,
    pub receiving_entity_id: EntityId,
    pub real_world_time: ClockTime,
    pub simulation_time: ClockTime,
    pub request_id: u32,
}

impl StartResumePdu {
    pub const SIZE: usize = 44;

    pub fn new(originating: EntityId, receiving: EntityId, request_id: u32) -> Self {
        Self {
            header: PduHeader::new(PduType::StartResume, 0),
            originating_entity_id: originating,
            receiving_entity_id: receiving,
            real_world_time: ClockTime::default(),
            simulation_time: ClockTime::default(),
            request_id,
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, PduError> {
        let mut buf = data;
        ensure_remaining(&buf, Self::SIZE)?;

        let header = PduHeader::read(&mut buf);
        expect_type(&header, PduType::StartResume)?;

        Ok(Self {
            header,
            originating_entity_id: EntityId::read(&mut buf),
            receiving_entity_id: EntityId::read(&mut buf),
            real_world_time: ClockTime::read(&mut buf),
            simulation_time: ClockTime::read(&mut buf),
            request_id: buf.get_u32(),
        })
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(Self::SIZE);
        self.header.write_with_length(buf, Self::SIZE);
        self.originating_entity_id.write(buf);
        self.receiving_entity_id.write(buf);
        self.real_world_time.write(buf);
        self.simulation_time.write(buf);
        buf.put_u32(self.request_id);
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        self.encode_into(&mut buf);
        buf.freeze()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopFreezePdu {
    pub header: PduHeader,
    pub originating_entity_id: EntityId,
    pub receiving_entity_id: EntityId,
    pub real_world_time: ClockTime,
    pub reason: StopFreezeReason,
    pub frozen_behavior: FrozenBehavior,
    pub request_id: u32,
}

impl StopFreezePdu {
    pub const SIZE: usize = 40;

    pub fn new(originating: EntityId, receiving: EntityId, request_id: u32) -> Self {
        Self {
            header: PduHeader::new(PduType::StopFreeze, 0),
            originating_entity_id: originating,
            receiving_entity_id: receiving,
            real_world_time: ClockTime::default(),
            reason: StopFreezeReason::Other,
            frozen_behavior: FrozenBehavior::empty(),
            request_id,
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, PduError> {
        let mut buf = data;
        ensure_remaining(&buf, Self::SIZE)?;

        let header = PduHeader::read(&mut buf);
        expect_type(&header, PduType::StopFreeze)?;

        let originating_entity_id = EntityId::read(&mut buf);
        let receiving_entity_id = EntityId::read(&mut buf);
        let real_world_time = ClockTime::read(&mut buf);
        let reason = StopFreezeReason::from(buf.get_u8());
        let frozen_behavior = FrozenBehavior::from_bits_retain(buf.get_u8());
        let _padding = buf.get_i16();
        let request_id = buf.get_u32();

        Ok(Self {
            header,
            originating_entity_id,
            receiving_entity_id,
            real_world_time,
            reason,
            frozen_behavior,
            request_id,
        })
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(Self::SIZE);
        self.header.write_with_length(buf, Self::SIZE);
        self.originating_entity_id.write(buf);
        self.receiving_entity_id.write(buf);
        self.real_world_time.write(buf);
        buf.put_u8(self.reason.into());
        buf.put_u8(self.frozen_behavior.bits());
        buf.put_i16(0);
        buf.put_u32(self.request_id);
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        self.encode_into(&mut buf);
        buf.freeze()
    }
}
