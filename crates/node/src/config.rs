use std::net::SocketAddr;

use dis::pdu::DeadReckoningAlgorithm;
use dis::{ReceiveConfig, SendConfig, SessionConfig};

/// A local entity flying a circle, published so other nodes have something
/// to track.
#[derive(Debug, Clone)]
pub struct DemoEntityConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
    pub radius_m: f64,
    pub speed_mps: f64,
    pub entity: u16,
}

impl Default for DemoEntityConfig {
    fn default() -> Self {
        Self {
            latitude: -34.95,
            longitude: 138.53,
            height: 300.0,
            radius_m: 500.0,
            speed_mps: 40.0,
            entity: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub tick_rate: u32,
    pub session: SessionConfig,
    pub receive: ReceiveConfig,
    pub send: SendConfig,
    pub broadcast_addr: SocketAddr,
    pub demo: Option<DemoEntityConfig>,
    pub status_interval_secs: f64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            session: SessionConfig::default(),
            receive: ReceiveConfig::default(),
            send: SendConfig {
                algorithm: DeadReckoningAlgorithm::Rvw,
                marking: "DISNODE".to_string(),
                ..SendConfig::default()
            },
            broadcast_addr: SocketAddr::from(([255, 255, 255, 255], dis::DEFAULT_PORT)),
            demo: None,
            status_interval_secs: 10.0,
        }
    }
}
