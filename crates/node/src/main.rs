mod config;
mod demo;
mod endpoint;
mod events;
mod node;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use dis::pdu::DeadReckoningAlgorithm;
use dis::{CullingMode, ReceiveConfig, SendConfig, SendingMode, SessionConfig};

use config::{DemoEntityConfig, NodeConfig};
use node::DisNode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    None,
    EntityState,
    EntityStateUpdate,
}

impl From<Mode> for SendingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::None => SendingMode::None,
            Mode::EntityState => SendingMode::EntityState,
            Mode::EntityStateUpdate => SendingMode::EntityStateUpdate,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Culling {
    None,
    DeadReckoning,
    All,
}

impl From<Culling> for CullingMode {
    fn from(culling: Culling) -> Self {
        match culling {
            Culling::None => CullingMode::None,
            Culling::DeadReckoning => CullingMode::CullDeadReckoning,
            Culling::All => CullingMode::CullAll,
        }
    }
}

#[derive(Parser)]
#[command(name = "dis-node")]
#[command(about = "DIS entity tracker and publisher")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = dis::DEFAULT_PORT)]
    port: u16,

    #[arg(short, long, default_value_t = 30)]
    tick_rate: u32,

    #[arg(short, long, default_value_t = 1)]
    exercise: u8,

    #[arg(long, default_value_t = 1)]
    site: u16,

    #[arg(long, default_value_t = 1)]
    application: u16,

    #[arg(long, default_value = "255.255.255.255", help = "Address PDUs are sent to")]
    broadcast: String,

    #[arg(long, help = "Publish a demo entity flying a circle")]
    publish: bool,

    #[arg(long, value_enum, default_value_t = Mode::EntityState)]
    sending_mode: Mode,

    #[arg(long, default_value_t = 4, help = "Dead reckoning algorithm id (1-9)")]
    algorithm: u8,

    #[arg(long, default_value_t = 30.0, help = "Seconds of silence before a remote entity is dropped, 0 to disable")]
    timeout: f64,

    #[arg(long, help = "Disable smoothing of remote entity corrections")]
    no_smoothing: bool,

    #[arg(long, value_enum, default_value_t = Culling::None)]
    culling: Culling,

    #[arg(long, default_value_t = 10_000.0, help = "Culling distance in metres")]
    culling_distance: f64,

    #[arg(long, help = "Stop after this many seconds")]
    duration: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.bind, args.port);
    let broadcast_addr: SocketAddr = format!("{}:{}", args.broadcast, args.port)
        .parse()
        .with_context(|| format!("Invalid broadcast address {}", args.broadcast))?;

    let config = NodeConfig {
        tick_rate: args.tick_rate,
        session: SessionConfig {
            exercise_id: args.exercise,
            site_id: args.site,
            application_id: args.application,
        },
        receive: ReceiveConfig {
            timeout_seconds: args.timeout,
            smoothing: !args.no_smoothing,
            culling_mode: args.culling.into(),
            culling_distance_m: args.culling_distance,
            ..Default::default()
        },
        send: SendConfig {
            algorithm: DeadReckoningAlgorithm::from(args.algorithm),
            sending_mode: args.sending_mode.into(),
            ..NodeConfig::default().send
        },
        broadcast_addr,
        demo: args.publish.then(DemoEntityConfig::default),
        ..Default::default()
    };

    let mut node = DisNode::new(&bind_addr, config)
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    if let Some(seconds) = args.duration {
        let running = node.running();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs_f64(seconds.max(0.0)));
            running.store(false, Ordering::SeqCst);
        });
    }

    node.run();
    log::info!("Node shutting down");

    Ok(())
}
