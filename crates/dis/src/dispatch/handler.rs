use std::collections::VecDeque;

use crate::pdu::{
    DetonationPdu, EntityStatePdu, EntityStateUpdatePdu, FirePdu, Pdu, RemoveEntityPdu,
    StartResumePdu, StopFreezePdu,
};

/// Receives decoded PDUs from a [`PduDispatcher`](super::PduDispatcher).
///
/// Every method defaults to a no-op so implementors only override the kinds
/// they care about. Overriding [`PduHandler::on_pdu`] takes every PDU through
/// one entry point instead.
pub trait PduHandler {
    fn on_entity_state(&mut self, _pdu: EntityStatePdu) {}

    fn on_entity_state_update(&mut self, _pdu: EntityStateUpdatePdu) {}

    fn on_fire(&mut self, _pdu: FirePdu) {}

    fn on_detonation(&mut self, _pdu: DetonationPdu) {}

    fn on_remove_entity(&mut self, _pdu: RemoveEntityPdu) {}

    fn on_start_resume(&mut self, _pdu: StartResumePdu) {}

    fn on_stop_freeze(&mut self, _pdu: StopFreezePdu) {}

    fn on_pdu(&mut self, pdu: Pdu) {
        match pdu {
            Pdu::EntityState(pdu) => self.on_entity_state(pdu),
            Pdu::EntityStateUpdate(pdu) => self.on_entity_state_update(pdu),
            Pdu::Fire(pdu) => self.on_fire(pdu),
            Pdu::Detonation(pdu) => self.on_detonation(pdu),
            Pdu::RemoveEntity(pdu) => self.on_remove_entity(pdu),
            Pdu::StartResume(pdu) => self.on_start_resume(pdu),
            Pdu::StopFreeze(pdu) => self.on_stop_freeze(pdu),
        }
    }
}

/// Buffers decoded PDUs for a consumer that polls.
#[derive(Debug, Default)]
pub struct PduQueue {
    pending: VecDeque<Pdu>,
    max_pending: Option<usize>,
}

impl PduQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest PDUs are dropped once `max_pending` are queued.
    pub fn bounded(max_pending: usize) -> Self {
        let max_pending = max_pending.max(1);
        Self {
            pending: VecDeque::with_capacity(max_pending),
            max_pending: Some(max_pending),
        }
    }

    pub fn push(&mut self, pdu: Pdu) {
        if let Some(max) = self.max_pending {
            while self.pending.len() >= max {
                let Some(dropped) = self.pending.pop_front() else {
                    break;
                };
                log::warn!("PDU queue full, dropping {:?}", dropped.pdu_type());
            }
        }
        self.pending.push_back(pdu);
    }

    pub fn pop(&mut self) -> Option<Pdu> {
        self.pending.pop_front()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Pdu> + '_ {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl PduHandler for PduQueue {
    fn on_pdu(&mut self, pdu: Pdu) {
        self.push(pdu);
    }
}
