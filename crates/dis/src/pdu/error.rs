use super::enums::PduType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PduError {
    #[error("buffer too short: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("invalid length {length} for {pdu_type:?} PDU")]
    InvalidLength { pdu_type: PduType, length: usize },
    #[error("declared {count} articulation parameters but only {available} bytes remain")]
    ArticulationOverrun { count: usize, available: usize },
    #[error("expected {expected:?} PDU, found type {found}")]
    WrongType { expected: PduType, found: u8 },
    #[error("unhandled PDU type {0}")]
    Unhandled(u8),
}
