use std::collections::HashMap;

use super::handler::PduHandler;
use crate::pdu::{
    DetonationPdu, EntityStatePdu, EntityStateUpdatePdu, FirePdu, Pdu, PduError, PduType,
    RemoveEntityPdu, StartResumePdu, StopFreezePdu, WireSize, peek_pdu_type,
};

type DecodeFn = fn(&[u8]) -> Result<Pdu, PduError>;

#[derive(Debug, Clone, Copy)]
struct Route {
    size: WireSize,
    decode: DecodeFn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub received: u64,
    pub dispatched: u64,
    pub dropped_unknown: u64,
    pub dropped_malformed: u64,
}

/// What happened to one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched(PduType),
    /// No type byte, or a type with no registered route.
    Ignored,
    Malformed(PduError),
}

/// Routes raw datagrams to a [`PduHandler`] by their PDU type byte.
///
/// Buffers whose length does not fit the type's wire size are dropped before
/// decoding, so a handler never sees a partially decoded PDU.
#[derive(Debug)]
pub struct PduDispatcher {
    routes: HashMap<PduType, Route>,
    stats: DispatchStats,
}

impl Default for PduDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PduDispatcher {
    pub fn new() -> Self {
        let mut dispatcher = Self {
            routes: HashMap::new(),
            stats: DispatchStats::default(),
        };

        dispatcher.register(PduType::EntityState, |data| {
            EntityStatePdu::decode(data).map(Pdu::EntityState)
        });
        dispatcher.register(PduType::EntityStateUpdate, |data| {
            EntityStateUpdatePdu::decode(data).map(Pdu::EntityStateUpdate)
        });
        dispatcher.register(PduType::Fire, |data| FirePdu::decode(data).map(Pdu::Fire));
        dispatcher.register(PduType::Detonation, |data| {
            DetonationPdu::decode(data).map(Pdu::Detonation)
        });
        dispatcher.register(PduType::RemoveEntity, |data| {
            RemoveEntityPdu::decode(data).map(Pdu::RemoveEntity)
        });
        dispatcher.register(PduType::StartResume, |data| {
            StartResumePdu::decode(data).map(Pdu::StartResume)
        });
        dispatcher.register(PduType::StopFreeze, |data| {
            StopFreezePdu::decode(data).map(Pdu::StopFreeze)
        });

        dispatcher
    }

    fn register(&mut self, pdu_type: PduType, decode: DecodeFn) {
        if let Some(size) = WireSize::for_type(pdu_type) {
            self.routes.insert(pdu_type, Route { size, decode });
        }
    }

    /// Stops routing `pdu_type`; such buffers are then ignored like unknown types.
    pub fn disable(&mut self, pdu_type: PduType) {
        self.routes.remove(&pdu_type);
    }

    pub fn handles(&self, pdu_type: PduType) -> bool {
        self.routes.contains_key(&pdu_type)
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DispatchStats::default();
    }

    pub fn dispatch<H: PduHandler + ?Sized>(
        &mut self,
        data: &[u8],
        handler: &mut H,
    ) -> DispatchOutcome {
        self.stats.received += 1;

        let Some(pdu_type) = peek_pdu_type(data) else {
            log::debug!("Dropping {} byte buffer without a PDU type", data.len());
            self.stats.dropped_unknown += 1;
            return DispatchOutcome::Ignored;
        };

        let Some(route) = self.routes.get(&pdu_type) else {
            log::debug!("Ignoring unhandled PDU type {}", u8::from(pdu_type));
            self.stats.dropped_unknown += 1;
            return DispatchOutcome::Ignored;
        };

        let decoded = route
            .size
            .validate(pdu_type, data.len())
            .and_then(|_| (route.decode)(data));

        match decoded {
            Ok(pdu) => {
                self.stats.dispatched += 1;
                handler.on_pdu(pdu);
                DispatchOutcome::Dispatched(pdu_type)
            }
            Err(e) => {
                log::error!("Dropping malformed {:?} PDU: {}", pdu_type, e);
                self.stats.dropped_malformed += 1;
                DispatchOutcome::Malformed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::PduQueue;
    use crate::pdu::{EntityId, EventId};

    #[test]
    fn test_dispatches_known_types() {
        let mut dispatcher = PduDispatcher::new();
        let mut queue = PduQueue::new();

        let fire = FirePdu::new(EntityId::new(1, 2, 3), EventId::new(1, 2, 4)).encode();
        assert_eq!(
            dispatcher.dispatch(&fire, &mut queue),
            DispatchOutcome::Dispatched(PduType::Fire)
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(dispatcher.stats().dispatched, 1);
    }

    #[test]
    fn test_short_and_unknown_buffers_are_ignored() {
        let mut dispatcher = PduDispatcher::new();
        let mut queue = PduQueue::new();

        assert_eq!(dispatcher.dispatch(&[], &mut queue), DispatchOutcome::Ignored);
        assert_eq!(dispatcher.dispatch(&[6, 1], &mut queue), DispatchOutcome::Ignored);

        let mut collision = vec![0u8; 60];
        collision[2] = u8::from(PduType::Collision);
        assert_eq!(dispatcher.dispatch(&collision, &mut queue), DispatchOutcome::Ignored);

        assert!(queue.is_empty());
        assert_eq!(dispatcher.stats().dropped_unknown, 3);
        assert_eq!(dispatcher.stats().dropped_malformed, 0);
    }

    #[test]
    fn test_malformed_buffer_never_reaches_handler() {
        let mut dispatcher = PduDispatcher::new();
        let mut queue = PduQueue::new();

        let fire = FirePdu::new(EntityId::new(1, 2, 3), EventId::new(1, 2, 4)).encode();
        let outcome = dispatcher.dispatch(&fire[..90], &mut queue);
        assert!(matches!(outcome, DispatchOutcome::Malformed(PduError::Truncated { .. })));
        assert!(queue.is_empty());
        assert_eq!(dispatcher.stats().dropped_malformed, 1);
    }

    #[test]
    fn test_disabled_type_is_ignored() {
        let mut dispatcher = PduDispatcher::new();
        let mut queue = PduQueue::new();
        dispatcher.disable(PduType::Fire);
        assert!(!dispatcher.handles(PduType::Fire));

        let fire = FirePdu::new(EntityId::new(1, 2, 3), EventId::new(1, 2, 4)).encode();
        assert_eq!(dispatcher.dispatch(&fire, &mut queue), DispatchOutcome::Ignored);
        assert!(queue.is_empty());
    }
}
