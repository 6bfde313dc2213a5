use glam::DVec3;

use super::config::{SendConfig, SendingMode, SessionConfig};
use super::estimator::KinematicsEstimator;
use crate::dead_reckoning::{dead_reckon, exceeds_threshold, form_other_parameters};
use crate::math::PsiThetaPhi;
use crate::pdu::{AppearanceFlags, DeadReckoningAlgorithm, EntityId, EntityStatePdu, Pdu};

/// Where the local entity actually is: ECEF metres and world referenced
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalPose {
    pub location: DVec3,
    pub orientation: PsiThetaPhi,
}

impl LocalPose {
    pub fn new(location: DVec3, orientation: PsiThetaPhi) -> Self {
        Self {
            location,
            orientation,
        }
    }
}

/// Sender side of one local entity. Decides when receivers' dead reckoning
/// has drifted far enough, or the heartbeat has lapsed, to warrant a new PDU.
#[derive(Debug)]
pub struct EntityPublisher {
    session: SessionConfig,
    config: SendConfig,
    entity_id: EntityId,
    pose: LocalPose,
    estimator: KinematicsEstimator,
    last_sent: EntityStatePdu,
    time_since_last_send: f64,
}

impl EntityPublisher {
    pub fn new(session: SessionConfig, config: SendConfig, entity: u16, pose: LocalPose) -> Self {
        let entity_id = EntityId::new(session.site_id, session.application_id, entity);
        let mut estimator = KinematicsEstimator::new();
        estimator.sample(pose.location, pose.orientation, 0.0);

        let mut publisher = Self {
            session,
            config,
            entity_id,
            pose,
            estimator,
            last_sent: EntityStatePdu::new(entity_id),
            time_since_last_send: 0.0,
        };
        publisher.last_sent = publisher.form_entity_state();
        publisher
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn config(&self) -> &SendConfig {
        &self.config
    }

    pub fn last_sent(&self) -> &EntityStatePdu {
        &self.last_sent
    }

    pub fn time_since_last_send(&self) -> f64 {
        self.time_since_last_send
    }

    pub fn estimator(&self) -> &KinematicsEstimator {
        &self.estimator
    }

    /// The announcement made when the entity appears.
    pub fn start(&mut self) -> Option<Pdu> {
        self.send_current()
    }

    /// Samples the new pose and emits a PDU when the heartbeat has lapsed or
    /// the receivers' prediction exceeds the thresholds.
    pub fn tick(&mut self, dt: f64, pose: LocalPose) -> Option<Pdu> {
        self.pose = pose;
        self.estimator.sample(pose.location, pose.orientation, dt);
        self.time_since_last_send += dt;

        if self.config.sending_mode == SendingMode::None {
            return None;
        }

        let heartbeat = self.config.thresholds.heartbeat_due(self.time_since_last_send);
        if heartbeat || self.outside_threshold() {
            self.send_current()
        } else {
            None
        }
    }

    fn outside_threshold(&self) -> bool {
        let prediction = dead_reckon(&self.last_sent, self.time_since_last_send as f32);
        if !prediction.supported {
            return false;
        }

        let mut actual = prediction.pdu.clone();
        actual.set_location(self.pose.location);
        actual.orientation = self.pose.orientation.to_wire();

        let thresholds = &self.config.thresholds;
        exceeds_threshold(
            thresholds.position_m,
            thresholds.orientation_deg,
            &prediction.pdu,
            &actual,
        )
    }

    pub fn set_appearance(&mut self, appearance: u32) -> Option<Pdu> {
        if appearance == self.config.appearance {
            return None;
        }
        self.config.appearance = appearance;
        self.send_current()
    }

    /// Only announced when sending full entity state; updates do not carry
    /// capabilities.
    pub fn set_capabilities(&mut self, capabilities: u32) -> Option<Pdu> {
        if capabilities == self.config.capabilities {
            return None;
        }
        self.config.capabilities = capabilities;
        self.send_current_full_state()
    }

    pub fn set_algorithm(&mut self, algorithm: DeadReckoningAlgorithm) -> Option<Pdu> {
        if algorithm == self.config.algorithm {
            return None;
        }
        self.config.algorithm = algorithm;
        self.send_current_full_state()
    }

    /// Final PDU telling receivers to drop the entity.
    pub fn deactivate(&mut self) -> Option<Pdu> {
        let mut pdu = self.form_entity_state();
        pdu.appearance |= AppearanceFlags::DEACTIVATED.bits();
        log::info!("Deactivating local entity {}", self.entity_id);
        self.emit(pdu)
    }

    fn send_current_full_state(&mut self) -> Option<Pdu> {
        if self.config.sending_mode == SendingMode::EntityState {
            self.send_current()
        } else {
            self.last_sent = self.form_entity_state();
            None
        }
    }

    fn send_current(&mut self) -> Option<Pdu> {
        self.last_sent = self.form_entity_state();
        self.time_since_last_send = 0.0;
        self.emit(self.last_sent.clone())
    }

    fn emit(&self, pdu: EntityStatePdu) -> Option<Pdu> {
        match self.config.sending_mode {
            SendingMode::None => None,
            SendingMode::EntityState => Some(Pdu::EntityState(pdu)),
            SendingMode::EntityStateUpdate => Some(Pdu::EntityStateUpdate(pdu.to_update())),
        }
    }

    fn form_entity_state(&self) -> EntityStatePdu {
        let algorithm = self.config.algorithm;
        let mut pdu = EntityStatePdu::new(self.entity_id);

        pdu.header.exercise_id = self.session.exercise_id;
        pdu.entity_type = self.config.entity_type;
        pdu.force_id = self.config.force_id;
        pdu.marking = self.config.marking.clone();
        pdu.appearance = self.config.appearance;
        pdu.capabilities = self.config.capabilities;

        pdu.set_location(self.pose.location);
        pdu.orientation = self.pose.orientation.to_wire();

        let (velocity, acceleration) = if algorithm.is_body_frame() {
            (self.estimator.body_velocity(), self.estimator.body_acceleration())
        } else {
            (self.estimator.world_velocity(), self.estimator.world_acceleration())
        };
        pdu.linear_velocity = velocity.as_vec3();

        let parameters = &mut pdu.dead_reckoning;
        parameters.algorithm = algorithm;
        parameters.linear_acceleration = acceleration.as_vec3();
        parameters.angular_velocity = self.estimator.angular_velocity().as_vec3();
        parameters.other_parameters =
            form_other_parameters(algorithm, self.pose.orientation, self.pose.location);

        pdu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{HeadingPitchRoll, SEMI_MAJOR_AXIS, psi_theta_phi_at_ecef};

    /// On the equator at the prime meridian, level and facing east (+Y).
    fn origin() -> LocalPose {
        let location = DVec3::new(SEMI_MAJOR_AXIS, 0.0, 0.0);
        let facing_east = HeadingPitchRoll::from_degrees(90.0, 0.0, 0.0);
        LocalPose::new(location, psi_theta_phi_at_ecef(facing_east, location))
    }

    fn publisher(sending_mode: SendingMode, algorithm: DeadReckoningAlgorithm) -> EntityPublisher {
        let config = SendConfig {
            algorithm,
            sending_mode,
            marking: "ALPHA".to_string(),
            ..SendConfig::default()
        };
        EntityPublisher::new(SessionConfig::default(), config, 42, origin())
    }

    #[test]
    fn test_start_announces_entity() {
        let mut publisher = publisher(SendingMode::EntityState, DeadReckoningAlgorithm::Fpw);
        let Some(Pdu::EntityState(pdu)) = publisher.start() else {
            panic!("expected an entity state PDU");
        };
        assert_eq!(pdu.entity_id, EntityId::new(1, 1, 42));
        assert_eq!(pdu.header.exercise_id, 1);
        assert_eq!(pdu.marking, "ALPHA");
        assert_eq!(pdu.dead_reckoning.other_parameters[0], 1);

        let mut silent = self::publisher(SendingMode::None, DeadReckoningAlgorithm::Fpw);
        assert!(silent.start().is_none());
    }

    #[test]
    fn test_threshold_then_quiet_until_heartbeat() {
        let mut publisher = publisher(SendingMode::EntityState, DeadReckoningAlgorithm::Fpw);
        publisher.start();

        // 10 m/s east. The announcement carried no velocity, so the third
        // step (1.5 m off) trips the 1 m threshold.
        let mut pose = origin();
        let mut sent = Vec::new();
        for step in 1..=60 {
            pose.location.y += 0.5;
            if publisher.tick(0.05, pose).is_some() {
                sent.push(step);
            }
        }
        assert_eq!(sent, vec![3]);

        let velocity = publisher.last_sent().linear_velocity;
        assert!((velocity.y - 10.0).abs() < 1e-3, "{:?}", velocity);
    }

    #[test]
    fn test_heartbeat() {
        let mut publisher = publisher(SendingMode::EntityState, DeadReckoningAlgorithm::Static);
        publisher.start();

        assert!(publisher.tick(4.0, origin()).is_none());
        assert!(publisher.tick(1.5, origin()).is_some());
        assert_eq!(publisher.time_since_last_send(), 0.0);
    }

    #[test]
    fn test_appearance_change_sends_immediately() {
        let mut publisher = publisher(SendingMode::EntityStateUpdate, DeadReckoningAlgorithm::Fpw);
        publisher.start();

        assert!(publisher.set_appearance(1).is_none());
        let Some(Pdu::EntityStateUpdate(update)) = publisher.set_appearance(1 << 15) else {
            panic!("expected an entity state update PDU");
        };
        assert_eq!(update.appearance, 1 << 15);
    }

    #[test]
    fn test_capabilities_only_announced_in_full_state_mode() {
        let mut updates = publisher(SendingMode::EntityStateUpdate, DeadReckoningAlgorithm::Fpw);
        assert!(updates.set_capabilities(7).is_none());
        assert_eq!(updates.last_sent().capabilities, 7);

        let mut full = publisher(SendingMode::EntityState, DeadReckoningAlgorithm::Fpw);
        assert!(full.set_capabilities(7).is_some());
        assert!(full.set_algorithm(DeadReckoningAlgorithm::Rvw).is_some());
        assert_eq!(full.last_sent().dead_reckoning.other_parameters[0], 2);
    }

    #[test]
    fn test_deactivate_sets_bit() {
        let mut publisher = publisher(SendingMode::EntityState, DeadReckoningAlgorithm::Fpw);
        let Some(Pdu::EntityState(pdu)) = publisher.deactivate() else {
            panic!("expected an entity state PDU");
        };
        assert!(pdu.is_deactivated());
    }
}
