use std::net::SocketAddr;

use dis::{EntityEvent, EntityId};

#[derive(Debug, Clone)]
pub enum NodeEvent {
    Listening {
        addr: SocketAddr,
    },
    Entity(EntityEvent),
    Published {
        entity_id: EntityId,
        bytes: usize,
    },
    Error {
        message: String,
    },
}
