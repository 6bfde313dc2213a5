use dis::pdu::{
    ArticulationParameter, BurstDescriptor, ClockTime, DeadReckoningAlgorithm, DetonationPdu,
    DetonationResult, EntityId, EntityStatePdu, EntityType, EventId, FirePdu, ForceId,
    FrozenBehavior, Pdu, PduError, PduType, RemoveEntityPdu, StartResumePdu, StopFreezePdu,
    StopFreezeReason,
};
use dis::{DispatchOutcome, PduDispatcher, PduHandler};
use glam::{DVec3, Vec3};

fn round_trip(pdu: Pdu) {
    let bytes = pdu.encode();
    let decoded = Pdu::decode(&bytes).unwrap();

    let mut expected = pdu;
    expected.header_mut().length = bytes.len() as u16;
    assert_eq!(decoded, expected);
    assert_eq!(decoded.encode(), bytes);
}

fn munition() -> BurstDescriptor {
    BurstDescriptor {
        munition: EntityType::new(2, 2, 225, 2, 2, 0, 0),
        warhead: 1000,
        fuse: 1000,
        quantity: 1,
        rate: 0,
    }
}

#[test]
fn test_every_pdu_type_round_trips() {
    let mut entity_state = EntityStatePdu::new(EntityId::new(1, 3101, 7));
    entity_state.header.exercise_id = 1;
    entity_state.force_id = ForceId::OPPOSING;
    entity_state.entity_type = EntityType::new(1, 1, 222, 2, 2, 1, 0);
    entity_state.linear_velocity = Vec3::new(3.0, 4.0, 0.0);
    entity_state.set_location(DVec3::new(-2142319.25, -4589392.96, 3876650.35));
    entity_state.orientation = Vec3::new(1.5, 0.0, -0.125);
    entity_state.dead_reckoning.algorithm = DeadReckoningAlgorithm::Fvw;
    entity_state.marking = "T72".to_string();
    entity_state.articulation_parameters = vec![ArticulationParameter::articulated(0, 4107, 0.5)];

    let update = entity_state.to_update();

    let mut fire = FirePdu::new(EntityId::new(1, 3101, 7), EventId::new(1, 3101, 12));
    fire.target_entity_id = EntityId::new(2, 1, 1);
    fire.munition_entity_id = EntityId::new(1, 3101, 99);
    fire.fire_mission_index = 3;
    fire.location = DVec3::new(-2142300.5, -4589380.0, 3876640.25);
    fire.burst_descriptor = munition();
    fire.velocity = Vec3::new(0.0, 800.0, 10.0);
    fire.range = 2500.0;

    let mut detonation = DetonationPdu::new(EntityId::new(1, 3101, 7), EventId::new(1, 3101, 12));
    detonation.munition_entity_id = EntityId::new(1, 3101, 99);
    detonation.location = DVec3::new(-2141000.0, -4589000.0, 3876000.0);
    detonation.burst_descriptor = munition();
    detonation.location_in_entity_coordinates = Vec3::new(1.0, 0.5, -0.25);
    detonation.detonation_result = DetonationResult::GroundImpact;
    detonation.articulation_parameters = vec![
        ArticulationParameter::articulated(0, 4096, 2.0),
        ArticulationParameter::attached(0, 944, EntityType::new(2, 2, 225, 2, 2, 0, 0)),
    ];

    let remove = RemoveEntityPdu::new(EntityId::new(1, 1, 0), EntityId::new(1, 3101, 0), 17);

    let mut start = StartResumePdu::new(EntityId::new(1, 1, 0), EntityId::new(1, 3101, 0), 18);
    start.real_world_time = ClockTime::new(12, 36000);
    start.simulation_time = ClockTime::new(-1, 5);

    let mut stop = StopFreezePdu::new(EntityId::new(1, 1, 0), EntityId::new(1, 3101, 0), 19);
    stop.reason = StopFreezeReason::Recess;
    stop.frozen_behavior = FrozenBehavior::RUN_SIMULATION_CLOCK | FrozenBehavior::PROCESS_UPDATES;

    for pdu in [
        Pdu::from(entity_state),
        Pdu::from(update),
        Pdu::from(fire),
        Pdu::from(detonation),
        Pdu::from(remove),
        Pdu::from(start),
        Pdu::from(stop),
    ] {
        round_trip(pdu);
    }
}

#[test]
fn test_declared_length_matches_encoded_size() {
    let mut pdu = DetonationPdu::new(EntityId::new(1, 1, 1), EventId::new(1, 1, 1));
    pdu.articulation_parameters = vec![ArticulationParameter::articulated(0, 1, 0.0); 3];

    let bytes = pdu.encode();
    assert_eq!(bytes.len(), DetonationPdu::FIXED_SIZE + 3 * 16);
    assert_eq!(u16::from_be_bytes([bytes[8], bytes[9]]) as usize, bytes.len());
}

#[derive(Default)]
struct DetonationCounter {
    detonations: usize,
}

impl PduHandler for DetonationCounter {
    fn on_detonation(&mut self, _pdu: DetonationPdu) {
        self.detonations += 1;
    }
}

#[test]
fn test_short_detonation_never_reaches_handler() {
    let mut dispatcher = PduDispatcher::new();
    let mut counter = DetonationCounter::default();

    let full = DetonationPdu::new(EntityId::new(1, 1, 1), EventId::new(1, 1, 1)).encode();
    for length in [3, 12, 60, DetonationPdu::FIXED_SIZE - 1] {
        let outcome = dispatcher.dispatch(&full[..length], &mut counter);
        assert!(
            matches!(outcome, DispatchOutcome::Malformed(PduError::Truncated { .. })),
            "length {} gave {:?}",
            length,
            outcome
        );
    }
    assert_eq!(counter.detonations, 0);

    assert_eq!(
        dispatcher.dispatch(&full, &mut counter),
        DispatchOutcome::Dispatched(PduType::Detonation)
    );
    assert_eq!(counter.detonations, 1);
}

#[test]
fn test_articulation_count_beyond_buffer_is_rejected() {
    let mut dispatcher = PduDispatcher::new();
    let mut counter = DetonationCounter::default();

    let mut bytes = DetonationPdu::new(EntityId::new(1, 1, 1), EventId::new(1, 1, 1))
        .encode()
        .to_vec();
    bytes[101] = 2;

    assert!(matches!(
        dispatcher.dispatch(&bytes, &mut counter),
        DispatchOutcome::Malformed(_)
    ));
    assert_eq!(counter.detonations, 0);
    assert_eq!(dispatcher.stats().dropped_malformed, 1);
}

#[test]
fn test_one_bad_datagram_does_not_stop_the_rest() {
    let mut dispatcher = PduDispatcher::new();
    let mut queue = dis::PduQueue::new();

    let good = FirePdu::new(EntityId::new(1, 1, 1), EventId::new(1, 1, 1)).encode();
    let datagrams: [&[u8]; 4] = [&good[..], &good[..40], &[0xff; 4], &good[..]];
    for datagram in datagrams {
        dispatcher.dispatch(datagram, &mut queue);
    }

    assert_eq!(queue.len(), 2);
    let stats = dispatcher.stats();
    assert_eq!(stats.received, 4);
    assert_eq!(stats.dispatched, 2);
    assert_eq!(stats.dropped_malformed, 1);
    assert_eq!(stats.dropped_unknown, 1);
}
