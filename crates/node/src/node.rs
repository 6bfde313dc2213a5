use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use dis::{
    DispatchOutcome, DispatchStats, EntityEvent, EntityPublisher, EntityRegistry, Pdu,
    PduDispatcher,
};

use crate::config::NodeConfig;
use crate::demo::CirclingFlight;
use crate::endpoint::DisEndpoint;
use crate::events::NodeEvent;

struct DemoEntity {
    flight: CirclingFlight,
    publisher: EntityPublisher,
}

/// One DIS participant: tracks every remote entity heard on the socket and
/// optionally publishes a demo entity of its own.
pub struct DisNode {
    endpoint: DisEndpoint,
    dispatcher: PduDispatcher,
    registry: EntityRegistry,
    demo: Option<DemoEntity>,
    config: NodeConfig,
    tick_duration: Duration,
    last_tick_time: Instant,
    accumulator: Duration,
    running: Arc<AtomicBool>,
    pending_events: VecDeque<NodeEvent>,
}

impl DisNode {
    pub fn new(bind_addr: &str, config: NodeConfig) -> io::Result<Self> {
        let endpoint = DisEndpoint::bind(bind_addr)?;
        let tick_duration = Duration::from_secs_f64(1.0 / config.tick_rate.max(1) as f64);

        let demo = config.demo.as_ref().map(|demo| {
            let flight = CirclingFlight::new(demo);
            let publisher = EntityPublisher::new(
                config.session,
                config.send.clone(),
                demo.entity,
                flight.pose(),
            );
            DemoEntity { flight, publisher }
        });

        let mut pending_events = VecDeque::new();
        pending_events.push_back(NodeEvent::Listening {
            addr: endpoint.local_addr(),
        });

        let mut node = Self {
            endpoint,
            dispatcher: PduDispatcher::new(),
            registry: EntityRegistry::new(config.session, config.receive.clone()),
            demo,
            tick_duration,
            last_tick_time: Instant::now(),
            accumulator: Duration::ZERO,
            running: Arc::new(AtomicBool::new(true)),
            pending_events,
            config,
        };

        let announcement = node.demo.as_mut().and_then(|demo| demo.publisher.start());
        node.publish(announcement);

        Ok(node)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn dispatch_stats(&self) -> &DispatchStats {
        self.dispatcher.stats()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = NodeEvent> + '_ {
        self.pending_events.drain(..)
    }

    pub fn run(&mut self) {
        let status_interval = Duration::from_secs_f64(self.config.status_interval_secs.max(0.1));
        let mut last_status = Instant::now();

        while self.running.load(Ordering::SeqCst) {
            self.tick_once();
            for event in self.pending_events.drain(..) {
                log_event(&event);
            }

            if last_status.elapsed() >= status_interval {
                last_status = Instant::now();
                self.log_status();
            }

            std::thread::sleep(Duration::from_millis(1));
        }
        self.shutdown();
    }

    /// Sends the demo entity's deactivation so receivers drop it immediately
    /// instead of waiting for their timeout.
    pub fn shutdown(&mut self) {
        let farewell = self.demo.as_mut().and_then(|demo| demo.publisher.deactivate());
        self.publish(farewell);
        for event in self.pending_events.drain(..) {
            log_event(&event);
        }
    }

    pub fn tick_once(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_tick_time;
        self.last_tick_time = now;
        self.accumulator += delta;

        if let Err(e) = self.process_network() {
            self.pending_events.push_back(NodeEvent::Error {
                message: format!("Network error: {}", e),
            });
        }

        while self.accumulator >= self.tick_duration {
            self.accumulator -= self.tick_duration;
            self.tick();
        }
    }

    fn tick(&mut self) {
        let dt = self.tick_duration.as_secs_f64();

        let observer = self.demo.as_ref().map(|demo| demo.flight.pose().location);
        self.registry.tick(dt, observer);
        self.pending_events
            .extend(self.registry.drain_events().map(NodeEvent::Entity));

        let update = self.demo.as_mut().and_then(|demo| {
            let pose = demo.flight.advance(dt);
            demo.publisher.tick(dt, pose)
        });
        self.publish(update);
    }

    fn process_network(&mut self) -> io::Result<()> {
        let dispatcher = &mut self.dispatcher;
        let registry = &mut self.registry;

        self.endpoint.receive(|data, addr| {
            if let DispatchOutcome::Malformed(e) = dispatcher.dispatch(data, &mut *registry) {
                log::debug!("Dropped malformed PDU from {}: {}", addr, e);
            }
        })?;

        self.pending_events
            .extend(self.registry.drain_events().map(NodeEvent::Entity));
        Ok(())
    }

    fn publish(&mut self, pdu: Option<Pdu>) {
        let Some(pdu) = pdu else {
            return;
        };

        let entity_id = match &pdu {
            Pdu::EntityState(pdu) => pdu.entity_id,
            Pdu::EntityStateUpdate(pdu) => pdu.entity_id,
            _ => return,
        };

        let data = pdu.encode();
        match self.endpoint.send_to(&data, self.config.broadcast_addr) {
            Ok(bytes) => self
                .pending_events
                .push_back(NodeEvent::Published { entity_id, bytes }),
            Err(e) => self.pending_events.push_back(NodeEvent::Error {
                message: format!(
                    "Failed to send PDU to {}: {}",
                    self.config.broadcast_addr, e
                ),
            }),
        }
    }

    fn log_status(&self) {
        let stats = self.dispatch_stats();
        log::info!(
            "{} remote entities | {} PDUs received, {} dispatched, {} unknown, {} malformed | {} sent",
            self.registry().len(),
            stats.received,
            stats.dispatched,
            stats.dropped_unknown,
            stats.dropped_malformed,
            self.endpoint.stats().datagrams_sent,
        );
    }
}

fn log_event(event: &NodeEvent) {
    match event {
        NodeEvent::Listening { addr } => log::info!("Listening for DIS on {}", addr),
        NodeEvent::Entity(EntityEvent::Created(entity_id)) => {
            log::debug!("Tracking entity {}", entity_id)
        }
        NodeEvent::Entity(EntityEvent::Removed { entity_id, reason }) => {
            log::debug!("Entity {} removed ({:?})", entity_id, reason)
        }
        NodeEvent::Entity(EntityEvent::Fire(fire)) => log::info!(
            "Fire from {} at {} (event {})",
            fire.firing_entity_id,
            fire.target_entity_id,
            fire.event_id.event_number
        ),
        NodeEvent::Entity(EntityEvent::Detonation(detonation)) => log::info!(
            "Detonation from {}: {:?}",
            detonation.firing_entity_id,
            detonation.detonation_result
        ),
        NodeEvent::Entity(EntityEvent::RemoveRequested(remove)) => {
            log::info!("Remove entity requested by {}", remove.originating_entity_id)
        }
        NodeEvent::Entity(EntityEvent::StartResume(start)) => {
            log::info!("Start/resume requested by {}", start.originating_entity_id)
        }
        NodeEvent::Entity(EntityEvent::StopFreeze(stop)) => log::info!(
            "Stop/freeze requested by {}: {:?}",
            stop.originating_entity_id,
            stop.reason
        ),
        NodeEvent::Published { entity_id, bytes } => {
            log::trace!("Published {} ({} bytes)", entity_id, bytes)
        }
        NodeEvent::Error { message } => log::warn!("{}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoEntityConfig;
    use dis::EntityId;

    fn wait_for<F: FnMut(&mut DisNode) -> bool>(node: &mut DisNode, mut done: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            node.tick_once();
            if done(node) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_nodes_track_each_other_over_loopback() {
        let mut listener = DisNode::new("127.0.0.1:0", NodeConfig::default()).unwrap();

        let config = NodeConfig {
            broadcast_addr: listener.local_addr(),
            demo: Some(DemoEntityConfig {
                entity: 9,
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut publisher = DisNode::new("127.0.0.1:0", config).unwrap();
        assert!(matches!(
            publisher.drain_events().last(),
            Some(NodeEvent::Published { .. })
        ));

        let id = EntityId::new(1, 1, 9);
        assert!(wait_for(&mut listener, |node| node.registry().contains(id)));
        assert_eq!(listener.dispatch_stats().dispatched, 1);

        publisher.shutdown();
        assert!(wait_for(&mut listener, |node| !node.registry().contains(id)));
    }

    #[test]
    fn test_garbage_is_counted_not_fatal() {
        let mut node = DisNode::new("127.0.0.1:0", NodeConfig::default()).unwrap();
        let mut sender = DisEndpoint::bind("127.0.0.1:0").unwrap();
        sender.send_to(&[7, 1, 1, 5, 0, 0], node.local_addr()).unwrap();

        assert!(wait_for(&mut node, |node| node.dispatch_stats().received == 1));
        assert_eq!(node.dispatch_stats().dropped_malformed, 1);
        assert!(node.registry().is_empty());
    }
}
