use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use super::enums::{ProtocolFamily, PduType};
use super::wire::WireRecord;

/// IEEE 1278.1-1995
pub const PROTOCOL_VERSION: u8 = 6;
pub const HEADER_SIZE: usize = 12;
/// Byte offset of the PDU type discriminator.
pub const PDU_TYPE_OFFSET: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduHeader {
    pub protocol_version: u8,
    pub exercise_id: u8,
    pub pdu_type: PduType,
    pub protocol_family: ProtocolFamily,
    pub timestamp: u32,
    /// Total PDU length in bytes. Recomputed on encode.
    pub length: u16,
}

impl PduHeader {
    pub fn new(pdu_type: PduType, exercise_id: u8) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            exercise_id,
            pdu_type,
            protocol_family: pdu_type.family(),
            timestamp: 0,
            length: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Writes the header with `length` in place of the stored one.
    pub(crate) fn write_with_length<B: BufMut>(&self, buf: &mut B, length: usize) {
        buf.put_u8(self.protocol_version);
        buf.put_u8(self.exercise_id);
        buf.put_u8(self.pdu_type.into());
        buf.put_u8(self.protocol_family.into());
        buf.put_u32(self.timestamp);
        buf.put_u16(length.min(u16::MAX as usize) as u16);
        buf.put_u16(0);
    }
}

impl WireRecord for PduHeader {
    const SIZE: usize = HEADER_SIZE;

    fn read<B: Buf>(buf: &mut B) -> Self {
        let protocol_version = buf.get_u8();
        let exercise_id = buf.get_u8();
        let pdu_type = PduType::from(buf.get_u8());
        let protocol_family = ProtocolFamily::from(buf.get_u8());
        let timestamp = buf.get_u32();
        let length = buf.get_u16();
        let _padding = buf.get_u16();

        Self {
            protocol_version,
            exercise_id,
            pdu_type,
            protocol_family,
            timestamp,
            length,
        }
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        self.write_with_length(buf, self.length as usize);
    }
}

/// Reads the PDU type byte without parsing anything else.
pub fn peek_pdu_type(data: &[u8]) -> Option<PduType> {
    data.get(PDU_TYPE_OFFSET).copied().map(PduType::from)
}
