use std::cmp::Ordering;
use std::fmt;

use bytes::{Buf, BufMut};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::enums::{DeadReckoningAlgorithm, MARKING_CHARACTER_SET_ASCII};
use super::wire::{WireRecord, read_vec3, write_vec3};

pub const MARKING_LENGTH: usize = 11;
pub const OTHER_PARAMETERS_LENGTH: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EntityId {
    pub site: u16,
    pub application: u16,
    pub entity: u16,
}

impl EntityId {
    pub fn new(site: u16, application: u16, entity: u16) -> Self {
        Self {
            site,
            application,
            entity,
        }
    }

    pub fn to_u64(self) -> u64 {
        ((self.site as u64) << 32) | ((self.application as u64) << 16) | self.entity as u64
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_u64().cmp(&other.to_u64())
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.site, self.application, self.entity)
    }
}

impl WireRecord for EntityId {
    const SIZE: usize = 6;

    fn read<B: Buf>(buf: &mut B) -> Self {
        Self {
            site: buf.get_u16(),
            application: buf.get_u16(),
            entity: buf.get_u16(),
        }
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.site);
        buf.put_u16(self.application);
        buf.put_u16(self.entity);
    }
}

/// Event ids share the entity id layout; the third field is a running event number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EventId {
    pub site: u16,
    pub application: u16,
    pub event_number: u16,
}

impl EventId {
    pub fn new(site: u16, application: u16, event_number: u16) -> Self {
        Self {
            site,
            application,
            event_number,
        }
    }
}

impl WireRecord for EventId {
    const SIZE: usize = 6;

    fn read<B: Buf>(buf: &mut B) -> Self {
        Self {
            site: buf.get_u16(),
            application: buf.get_u16(),
            event_number: buf.get_u16(),
        }
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.site);
        buf.put_u16(self.application);
        buf.put_u16(self.event_number);
    }
}

/// Entity type enumeration. Fields equal to the `ANY_*` sentinels are wildcards
/// used when matching a received type against a partial mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityType {
    pub kind: u8,
    pub domain: u8,
    pub country: u16,
    pub category: u8,
    pub subcategory: u8,
    pub specific: u8,
    pub extra: u8,
}

impl Default for EntityType {
    fn default() -> Self {
        Self::WILDCARD
    }
}

impl EntityType {
    pub const ANY: u8 = u8::MAX;
    pub const ANY_COUNTRY: u16 = u16::MAX;

    pub const WILDCARD: EntityType = EntityType {
        kind: Self::ANY,
        domain: Self::ANY,
        country: Self::ANY_COUNTRY,
        category: Self::ANY,
        subcategory: Self::ANY,
        specific: Self::ANY,
        extra: Self::ANY,
    };

    pub fn new(
        kind: u8,
        domain: u8,
        country: u16,
        category: u8,
        subcategory: u8,
        specific: u8,
        extra: u8,
    ) -> Self {
        Self {
            kind,
            domain,
            country,
            category,
            subcategory,
            specific,
            extra,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Self::WILDCARD
    }

    /// Replaces every wildcard field with the matching field of `other`.
    pub fn fill_wildcards(&self, other: &EntityType) -> EntityType {
        fn pick<T: PartialEq + Copy>(mine: T, theirs: T, any: T) -> T {
            if mine == any { theirs } else { mine }
        }

        EntityType {
            kind: pick(self.kind, other.kind, Self::ANY),
            domain: pick(self.domain, other.domain, Self::ANY),
            country: pick(self.country, other.country, Self::ANY_COUNTRY),
            category: pick(self.category, other.category, Self::ANY),
            subcategory: pick(self.subcategory, other.subcategory, Self::ANY),
            specific: pick(self.specific, other.specific, Self::ANY),
            extra: pick(self.extra, other.extra, Self::ANY),
        }
    }

    /// True when every non-wildcard field of `self` equals the field in `other`.
    pub fn matches(&self, other: &EntityType) -> bool {
        self.fill_wildcards(other) == *other
    }

    pub fn to_u64(self) -> u64 {
        ((self.kind as u64) << 56)
            | ((self.domain as u64) << 48)
            | ((self.country as u64) << 32)
            | ((self.category as u64) << 24)
            | ((self.subcategory as u64) << 16)
            | ((self.specific as u64) << 8)
            | self.extra as u64
    }

    pub fn from_u64(value: u64) -> Self {
        Self {
            kind: (value >> 56) as u8,
            domain: (value >> 48) as u8,
            country: (value >> 32) as u16,
            category: (value >> 24) as u8,
            subcategory: (value >> 16) as u8,
            specific: (value >> 8) as u8,
            extra: value as u8,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}.{}.{}",
            self.kind,
            self.domain,
            self.country,
            self.category,
            self.subcategory,
            self.specific,
            self.extra
        )
    }
}

impl WireRecord for EntityType {
    const SIZE: usize = 8;

    fn read<B: Buf>(buf: &mut B) -> Self {
        Self {
            kind: buf.get_u8(),
            domain: buf.get_u8(),
            country: buf.get_u16(),
            category: buf.get_u8(),
            subcategory: buf.get_u8(),
            specific: buf.get_u8(),
            extra: buf.get_u8(),
        }
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        // A fully unset type goes out as zeros rather than sentinels.
        let value = if self.is_wildcard() { 0 } else { self.to_u64() };
        buf.put_u64(value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: i32,
    pub time_past_hour: u32,
}

impl ClockTime {
    pub fn new(hour: i32, time_past_hour: u32) -> Self {
        Self {
            hour,
            time_past_hour,
        }
    }
}

impl WireRecord for ClockTime {
    const SIZE: usize = 8;

    fn read<B: Buf>(buf: &mut B) -> Self {
        Self {
            hour: buf.get_i32(),
            time_past_hour: buf.get_u32(),
        }
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32(self.hour);
        buf.put_u32(self.time_past_hour);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BurstDescriptor {
    pub munition: EntityType,
    pub warhead: u16,
    pub fuse: u16,
    pub quantity: u16,
    pub rate: u16,
}

impl WireRecord for BurstDescriptor {
    const SIZE: usize = 16;

    fn read<B: Buf>(buf: &mut B) -> Self {
        Self {
            munition: EntityType::read(buf),
            warhead: buf.get_u16(),
            fuse: buf.get_u16(),
            quantity: buf.get_u16(),
            rate: buf.get_u16(),
        }
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        self.munition.write(buf);
        buf.put_u16(self.warhead);
        buf.put_u16(self.fuse);
        buf.put_u16(self.quantity);
        buf.put_u16(self.rate);
    }
}

/// Value carried by an articulation parameter, selected by its type designator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArticulationValue {
    /// Designator 0: position or angle of a movable part.
    Articulated(f64),
    /// Designator 1: the entity type of a part hanging off a station.
    Attached(EntityType),
    Other { designator: u8, raw: u64 },
}

impl ArticulationValue {
    pub const ARTICULATED_PART: u8 = 0;
    pub const ATTACHED_PART: u8 = 1;

    pub fn designator(&self) -> u8 {
        match self {
            ArticulationValue::Articulated(_) => Self::ARTICULATED_PART,
            ArticulationValue::Attached(_) => Self::ATTACHED_PART,
            ArticulationValue::Other { designator, .. } => *designator,
        }
    }

    fn from_wire(designator: u8, raw: u64) -> Self {
        match designator {
            Self::ARTICULATED_PART => ArticulationValue::Articulated(f64::from_bits(raw)),
            Self::ATTACHED_PART => ArticulationValue::Attached(EntityType::from_u64(raw)),
            designator => ArticulationValue::Other { designator, raw },
        }
    }

    fn to_wire(self) -> u64 {
        match self {
            ArticulationValue::Articulated(value) => value.to_bits(),
            ArticulationValue::Attached(entity_type) => entity_type.to_u64(),
            ArticulationValue::Other { raw, .. } => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArticulationParameter {
    pub change_indicator: u8,
    pub part_attached_to: u16,
    pub parameter_type: u32,
    pub value: ArticulationValue,
}

impl ArticulationParameter {
    pub fn articulated(part_attached_to: u16, parameter_type: u32, value: f64) -> Self {
        Self {
            change_indicator: 0,
            part_attached_to,
            parameter_type,
            value: ArticulationValue::Articulated(value),
        }
    }

    pub fn attached(part_attached_to: u16, parameter_type: u32, entity_type: EntityType) -> Self {
        Self {
            change_indicator: 0,
            part_attached_to,
            parameter_type,
            value: ArticulationValue::Attached(entity_type),
        }
    }
}

impl WireRecord for ArticulationParameter {
    const SIZE: usize = 16;

    fn read<B: Buf>(buf: &mut B) -> Self {
        let designator = buf.get_u8();
        let change_indicator = buf.get_u8();
        let part_attached_to = buf.get_u16();
        let parameter_type = buf.get_u32();
        let raw = buf.get_u64();

        Self {
            change_indicator,
            part_attached_to,
            parameter_type,
            value: ArticulationValue::from_wire(designator, raw),
        }
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.value.designator());
        buf.put_u8(self.change_indicator);
        buf.put_u16(self.part_attached_to);
        buf.put_u32(self.parameter_type);
        buf.put_u64(self.value.to_wire());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeadReckoningParameters {
    pub algorithm: DeadReckoningAlgorithm,
    pub other_parameters: [u8; OTHER_PARAMETERS_LENGTH],
    pub linear_acceleration: Vec3,
    pub angular_velocity: Vec3,
}

impl WireRecord for DeadReckoningParameters {
    const SIZE: usize = 40;

    fn read<B: Buf>(buf: &mut B) -> Self {
        let algorithm = DeadReckoningAlgorithm::from(buf.get_u8());
        let mut other_parameters = [0u8; OTHER_PARAMETERS_LENGTH];
        buf.copy_to_slice(&mut other_parameters);

        Self {
            algorithm,
            other_parameters,
            linear_acceleration: read_vec3(buf),
            angular_velocity: read_vec3(buf),
        }
    }

    fn write<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.algorithm.into());
        buf.put_slice(&self.other_parameters);
        write_vec3(buf, self.linear_acceleration);
        write_vec3(buf, self.angular_velocity);
    }
}

/// Reads the character set byte and up to 11 characters, stopping at the first NUL.
pub(crate) fn read_marking<B: Buf>(buf: &mut B) -> String {
    let _character_set = buf.get_u8();
    let mut raw = [0u8; MARKING_LENGTH];
    buf.copy_to_slice(&mut raw);

    let end = raw.iter().position(|&b| b == 0).unwrap_or(MARKING_LENGTH);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Writes an ASCII marking, truncated to 11 bytes and NUL padded.
pub(crate) fn write_marking<B: BufMut>(buf: &mut B, marking: &str) {
    let bytes = marking.as_bytes();
    if bytes.len() > MARKING_LENGTH {
        log::warn!(
            "Marking '{}' longer than {} characters, truncating",
            marking,
            MARKING_LENGTH
        );
    }

    let mut raw = [0u8; MARKING_LENGTH];
    let len = bytes.len().min(MARKING_LENGTH);
    raw[..len].copy_from_slice(&bytes[..len]);

    buf.put_u8(MARKING_CHARACTER_SET_ASCII);
    buf.put_slice(&raw);
}
