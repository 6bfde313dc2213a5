use std::collections::{HashMap, VecDeque};
use std::f64::consts::{PI, TAU};

use glam::DVec3;

use super::config::{CullingMode, ReceiveConfig, SessionConfig};
use crate::dead_reckoning::dead_reckon;
use crate::dispatch::PduHandler;
use crate::math::PsiThetaPhi;
use crate::pdu::{
    DetonationPdu, EntityId, EntityStatePdu, EntityStateUpdatePdu, FirePdu, RemoveEntityPdu,
    StartResumePdu, StopFreezePdu,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    Deactivated,
    TimedOut,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    Created(EntityId),
    Removed {
        entity_id: EntityId,
        reason: RemovalReason,
    },
    Fire(FirePdu),
    Detonation(DetonationPdu),
    RemoveRequested(RemoveEntityPdu),
    StartResume(StartResumePdu),
    StopFreeze(StopFreezePdu),
}

/// A remote entity as seen through its state PDUs.
#[derive(Debug, Clone)]
pub struct RemoteEntity {
    pub entity_id: EntityId,
    /// Last full snapshot received, with any updates merged in.
    pub most_recent: EntityStatePdu,
    /// What this tick reports: the dead reckoned and smoothed state.
    pub predicted: EntityStatePdu,
    pub time_since_last_pdu: f64,
    pub pdu_count: u64,
    location_error: DVec3,
    orientation_error: PsiThetaPhi,
}

impl RemoteEntity {
    fn new(pdu: EntityStatePdu) -> Self {
        Self {
            entity_id: pdu.entity_id,
            predicted: pdu.clone(),
            most_recent: pdu,
            time_since_last_pdu: 0.0,
            pdu_count: 1,
            location_error: DVec3::ZERO,
            orientation_error: PsiThetaPhi::default(),
        }
    }

    pub fn location(&self) -> DVec3 {
        self.predicted.wire_location()
    }

    pub fn orientation(&self) -> PsiThetaPhi {
        PsiThetaPhi::from_wire(self.predicted.orientation)
    }

    /// Records the jump between what was being shown and the new snapshot so
    /// smoothing can blend it out.
    fn refresh(&mut self, pdu: EntityStatePdu) {
        self.location_error = pdu.wire_location() - self.predicted.wire_location();

        let shown = PsiThetaPhi::from_wire(self.predicted.orientation);
        let received = PsiThetaPhi::from_wire(pdu.orientation);
        self.orientation_error = PsiThetaPhi::new(
            wrap_angle(received.psi - shown.psi),
            wrap_angle(received.theta - shown.theta),
            wrap_angle(received.phi - shown.phi),
        );

        self.predicted = pdu.clone();
        self.most_recent = pdu;
        self.time_since_last_pdu = 0.0;
        self.pdu_count += 1;
    }

    fn should_cull(&self, config: &ReceiveConfig, observer: Option<DVec3>) -> bool {
        if config.culling_mode == CullingMode::None {
            return false;
        }
        observer.is_some_and(|observer| {
            observer.distance(self.predicted.wire_location()) > config.culling_distance_m
        })
    }

    fn advance(&mut self, config: &ReceiveConfig) {
        let prediction = dead_reckon(&self.most_recent, self.time_since_last_pdu as f32);
        let mut state = prediction.pdu;

        let period = config.smoothing_period_seconds;
        let smoothing = prediction.supported
            && config.smoothing
            && self.pdu_count > 1
            && period > 0.0
            && self.time_since_last_pdu <= period;

        if smoothing {
            let remaining = 1.0 - (self.time_since_last_pdu / period).clamp(0.0, 1.0);
            state.set_location(state.wire_location() - self.location_error * remaining);

            let orientation = PsiThetaPhi::from_wire(state.orientation);
            state.orientation = PsiThetaPhi::new(
                orientation.psi - self.orientation_error.psi * remaining,
                orientation.theta - self.orientation_error.theta * remaining,
                orientation.phi - self.orientation_error.phi * remaining,
            )
            .to_wire();
        }

        self.predicted = state;
    }
}

fn wrap_angle(radians: f64) -> f64 {
    (radians + PI).rem_euclid(TAU) - PI
}

/// Receive side view of every remote entity on the exercise.
///
/// Feed it PDUs through [`PduHandler`], call [`EntityRegistry::tick`] once per
/// simulation step and drain [`EntityEvent`]s afterwards.
#[derive(Debug)]
pub struct EntityRegistry {
    session: SessionConfig,
    config: ReceiveConfig,
    slots: Vec<Option<RemoteEntity>>,
    free_slots: Vec<usize>,
    index: HashMap<EntityId, usize>,
    events: VecDeque<EntityEvent>,
}

impl EntityRegistry {
    pub fn new(session: SessionConfig, config: ReceiveConfig) -> Self {
        Self {
            session,
            config,
            slots: Vec::new(),
            free_slots: Vec::new(),
            index: HashMap::new(),
            events: VecDeque::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SessionConfig::default(), ReceiveConfig::default())
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    pub fn config(&self) -> &ReceiveConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, entity_id: EntityId) -> bool {
        self.index.contains_key(&entity_id)
    }

    pub fn get(&self, entity_id: EntityId) -> Option<&RemoteEntity> {
        let slot = *self.index.get(&entity_id)?;
        self.slots.get(slot)?.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteEntity> {
        self.slots.iter().flatten()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = EntityEvent> + '_ {
        self.events.drain(..)
    }

    pub fn remove(&mut self, entity_id: EntityId) -> Option<RemoteEntity> {
        self.remove_with_reason(entity_id, RemovalReason::Local)
    }

    fn get_mut(&mut self, entity_id: EntityId) -> Option<&mut RemoteEntity> {
        let slot = *self.index.get(&entity_id)?;
        self.slots.get_mut(slot)?.as_mut()
    }

    fn insert(&mut self, pdu: EntityStatePdu) {
        let entity_id = pdu.entity_id;
        log::info!("Entity {} ({}) joined", entity_id, pdu.marking);

        let entity = RemoteEntity::new(pdu);
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entity);
                slot
            }
            None => {
                self.slots.push(Some(entity));
                self.slots.len() - 1
            }
        };

        self.index.insert(entity_id, slot);
        self.events.push_back(EntityEvent::Created(entity_id));
    }

    fn remove_with_reason(
        &mut self,
        entity_id: EntityId,
        reason: RemovalReason,
    ) -> Option<RemoteEntity> {
        let slot = self.index.remove(&entity_id)?;
        let entity = self.slots.get_mut(slot)?.take()?;
        self.free_slots.push(slot);

        log::info!("Entity {} removed: {:?}", entity_id, reason);
        self.events
            .push_back(EntityEvent::Removed { entity_id, reason });
        Some(entity)
    }

    fn in_exercise(&self, exercise_id: u8) -> bool {
        exercise_id == self.session.exercise_id
    }

    fn addressed_to_us(&self, exercise_id: u8, receiving: EntityId) -> bool {
        self.in_exercise(exercise_id)
            && receiving.site == self.session.site_id
            && receiving.application == self.session.application_id
    }

    /// Advances every entity by `dt` seconds. `observer` is the ECEF position
    /// culling distances are measured from.
    pub fn tick(&mut self, dt: f64, observer: Option<DVec3>) {
        let mut expired = Vec::new();

        for entity in self.slots.iter_mut().flatten() {
            entity.time_since_last_pdu += dt;

            if self.config.timeout_seconds > 0.0
                && entity.time_since_last_pdu > self.config.timeout_seconds
            {
                expired.push(entity.entity_id);
                continue;
            }

            if !self.config.dead_reckoning || entity.should_cull(&self.config, observer) {
                continue;
            }

            entity.advance(&self.config);
        }

        for entity_id in expired {
            self.remove_with_reason(entity_id, RemovalReason::TimedOut);
        }
    }
}

impl PduHandler for EntityRegistry {
    fn on_entity_state(&mut self, pdu: EntityStatePdu) {
        if !self.in_exercise(pdu.header.exercise_id) {
            return;
        }

        let entity_id = pdu.entity_id;
        let deactivated = pdu.is_deactivated();

        match (self.contains(entity_id), deactivated) {
            (true, true) => {
                self.remove_with_reason(entity_id, RemovalReason::Deactivated);
            }
            (true, false) => {
                if let Some(entity) = self.get_mut(entity_id) {
                    entity.refresh(pdu);
                }
            }
            (false, true) => {
                log::debug!("Ignoring deactivated state for unknown entity {}", entity_id);
            }
            (false, false) => self.insert(pdu),
        }
    }

    fn on_entity_state_update(&mut self, pdu: EntityStateUpdatePdu) {
        if !self.in_exercise(pdu.header.exercise_id) {
            return;
        }

        let entity_id = pdu.entity_id;
        let Some(prior) = self.get(entity_id) else {
            log::debug!("Ignoring update for unknown entity {}", entity_id);
            return;
        };

        let merged = EntityStatePdu::from_update(&prior.most_recent, &pdu);
        if merged.is_deactivated() {
            self.remove_with_reason(entity_id, RemovalReason::Deactivated);
        } else if let Some(entity) = self.get_mut(entity_id) {
            entity.refresh(merged);
        }
    }

    fn on_fire(&mut self, pdu: FirePdu) {
        if self.in_exercise(pdu.header.exercise_id) {
            self.events.push_back(EntityEvent::Fire(pdu));
        }
    }

    fn on_detonation(&mut self, pdu: DetonationPdu) {
        if self.in_exercise(pdu.header.exercise_id) {
            self.events.push_back(EntityEvent::Detonation(pdu));
        }
    }

    fn on_remove_entity(&mut self, pdu: RemoveEntityPdu) {
        if self.addressed_to_us(pdu.header.exercise_id, pdu.receiving_entity_id) {
            self.events.push_back(EntityEvent::RemoveRequested(pdu));
        }
    }

    fn on_start_resume(&mut self, pdu: StartResumePdu) {
        if self.addressed_to_us(pdu.header.exercise_id, pdu.receiving_entity_id) {
            self.events.push_back(EntityEvent::StartResume(pdu));
        }
    }

    fn on_stop_freeze(&mut self, pdu: StopFreezePdu) {
        if self.addressed_to_us(pdu.header.exercise_id, pdu.receiving_entity_id) {
            self.events.push_back(EntityEvent::StopFreeze(pdu));
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::pdu::{AppearanceFlags, DeadReckoningAlgorithm, EventId};

    fn moving_entity(entity: u16, location: DVec3, velocity: Vec3) -> EntityStatePdu {
        let mut pdu = EntityStatePdu::new(EntityId::new(2, 3, entity));
        pdu.header.exercise_id = 1;
        pdu.set_location(location);
        pdu.linear_velocity = velocity;
        pdu.dead_reckoning.algorithm = DeadReckoningAlgorithm::Fpw;
        pdu
    }

    fn assert_close(a: DVec3, b: DVec3) {
        assert!((a - b).length() < 1e-6, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_state_creates_and_deactivation_removes() {
        let mut registry = EntityRegistry::with_defaults();
        let pdu = moving_entity(1, DVec3::ZERO, Vec3::ZERO);
        let id = pdu.entity_id;

        registry.on_entity_state(pdu.clone());
        assert!(registry.contains(id));

        let mut deactivated = pdu;
        deactivated.appearance |= AppearanceFlags::DEACTIVATED.bits();
        registry.on_entity_state(deactivated);
        assert!(registry.is_empty());

        let events: Vec<EntityEvent> = registry.drain_events().collect();
        assert_eq!(
            events,
            vec![
                EntityEvent::Created(id),
                EntityEvent::Removed {
                    entity_id: id,
                    reason: RemovalReason::Deactivated
                },
            ]
        );
    }

    #[test]
    fn test_deactivated_unknown_entity_is_not_created() {
        let mut registry = EntityRegistry::with_defaults();
        let mut pdu = moving_entity(1, DVec3::ZERO, Vec3::ZERO);
        pdu.appearance |= AppearanceFlags::DEACTIVATED.bits();

        registry.on_entity_state(pdu);
        assert!(registry.is_empty());
        assert_eq!(registry.drain_events().count(), 0);
    }

    #[test]
    fn test_other_exercise_is_ignored() {
        let mut registry = EntityRegistry::with_defaults();
        let mut pdu = moving_entity(1, DVec3::ZERO, Vec3::ZERO);
        pdu.header.exercise_id = 9;

        registry.on_entity_state(pdu);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_update_for_unknown_entity_is_ignored() {
        let mut registry = EntityRegistry::with_defaults();
        let mut update = EntityStateUpdatePdu::new(EntityId::new(2, 3, 1));
        update.header.exercise_id = 1;

        registry.on_entity_state_update(update);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_update_merges_into_known_entity() {
        let mut registry = EntityRegistry::with_defaults();
        let mut pdu = moving_entity(1, DVec3::ZERO, Vec3::ZERO);
        pdu.marking = "TANK".to_string();
        let id = pdu.entity_id;
        registry.on_entity_state(pdu);

        let mut update = EntityStateUpdatePdu::new(id);
        update.header.exercise_id = 1;
        update.set_location(DVec3::new(5.0, 6.0, 7.0));
        registry.on_entity_state_update(update);

        let entity = registry.get(id).unwrap();
        assert_eq!(entity.pdu_count, 2);
        assert_eq!(entity.most_recent.marking, "TANK");
        assert_close(entity.location(), DVec3::new(5.0, 6.0, 7.0));
    }

    #[test]
    fn test_tick_dead_reckons_from_last_snapshot() {
        let mut registry = EntityRegistry::with_defaults();
        let pdu = moving_entity(1, DVec3::new(100.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let id = pdu.entity_id;
        registry.on_entity_state(pdu);

        registry.tick(1.0, None);
        registry.tick(1.0, None);

        let entity = registry.get(id).unwrap();
        assert_close(entity.location(), DVec3::new(102.0, 0.0, 0.0));
        assert_eq!(entity.time_since_last_pdu, 2.0);
    }

    #[test]
    fn test_smoothing_blends_out_correction() {
        let mut registry = EntityRegistry::with_defaults();
        let id = EntityId::new(2, 3, 1);
        registry.on_entity_state(moving_entity(1, DVec3::ZERO, Vec3::new(10.0, 0.0, 0.0)));
        registry.tick(1.0, None);
        assert_close(registry.get(id).unwrap().location(), DVec3::new(10.0, 0.0, 0.0));

        // Snapshot lands 2 m ahead of where the entity was being shown.
        registry.on_entity_state(moving_entity(
            1,
            DVec3::new(12.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
        ));

        registry.tick(0.25, None);
        assert_close(registry.get(id).unwrap().location(), DVec3::new(13.5, 0.0, 0.0));

        registry.tick(0.5, None);
        assert_close(registry.get(id).unwrap().location(), DVec3::new(19.5, 0.0, 0.0));
    }

    #[test]
    fn test_first_snapshot_is_not_smoothed() {
        let mut config = ReceiveConfig::default();
        config.smoothing_period_seconds = 10.0;
        let mut registry = EntityRegistry::new(SessionConfig::default(), config);
        let id = EntityId::new(2, 3, 1);
        registry.on_entity_state(moving_entity(1, DVec3::ZERO, Vec3::new(4.0, 0.0, 0.0)));

        registry.tick(0.5, None);
        assert_close(registry.get(id).unwrap().location(), DVec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_culled_entity_keeps_last_prediction() {
        let mut config = ReceiveConfig::default();
        config.culling_mode = CullingMode::CullDeadReckoning;
        config.culling_distance_m = 1000.0;
        let mut registry = EntityRegistry::new(SessionConfig::default(), config);
        let id = EntityId::new(2, 3, 1);
        registry.on_entity_state(moving_entity(1, DVec3::ZERO, Vec3::new(1.0, 0.0, 0.0)));

        registry.tick(1.0, Some(DVec3::new(0.0, 5000.0, 0.0)));
        assert_close(registry.get(id).unwrap().location(), DVec3::ZERO);

        registry.tick(1.0, Some(DVec3::ZERO));
        assert_close(registry.get(id).unwrap().location(), DVec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_silent_entity_times_out() {
        let mut registry = EntityRegistry::with_defaults();
        let id = EntityId::new(2, 3, 1);
        registry.on_entity_state(moving_entity(1, DVec3::ZERO, Vec3::ZERO));
        registry.drain_events().for_each(drop);

        registry.tick(29.0, None);
        assert!(registry.contains(id));
        registry.tick(2.0, None);
        assert!(!registry.contains(id));

        let events: Vec<EntityEvent> = registry.drain_events().collect();
        assert_eq!(
            events,
            vec![EntityEvent::Removed {
                entity_id: id,
                reason: RemovalReason::TimedOut
            }]
        );
    }

    #[test]
    fn test_freed_slot_is_reused() {
        let mut registry = EntityRegistry::with_defaults();
        registry.on_entity_state(moving_entity(1, DVec3::ZERO, Vec3::ZERO));
        registry.on_entity_state(moving_entity(2, DVec3::ZERO, Vec3::ZERO));
        registry.remove(EntityId::new(2, 3, 1));
        registry.on_entity_state(moving_entity(3, DVec3::ZERO, Vec3::ZERO));

        assert_eq!(registry.slots.len(), 2);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(EntityId::new(2, 3, 3)).is_some());
    }

    #[test]
    fn test_management_pdus_need_our_site_and_application() {
        let mut registry = EntityRegistry::with_defaults();
        let originator = EntityId::new(7, 7, 0);

        let mut ours = StopFreezePdu::new(originator, EntityId::new(1, 1, 5), 1);
        ours.header.exercise_id = 1;
        let mut theirs = StopFreezePdu::new(originator, EntityId::new(4, 1, 5), 2);
        theirs.header.exercise_id = 1;

        registry.on_stop_freeze(ours);
        registry.on_stop_freeze(theirs);

        let events: Vec<EntityEvent> = registry.drain_events().collect();
        assert_eq!(events, vec![EntityEvent::StopFreeze(ours)]);
    }

    #[test]
    fn test_fire_is_surfaced() {
        let mut registry = EntityRegistry::with_defaults();
        let mut fire = FirePdu::new(EntityId::new(2, 3, 1), EventId::new(2, 3, 9));
        fire.header.exercise_id = 1;

        registry.on_fire(fire.clone());
        assert_eq!(registry.drain_events().collect::<Vec<_>>(), vec![EntityEvent::Fire(fire)]);
    }
}
