use std::time::Duration;

use clap::{App, Arg};
use pivotsim::{broker, BrokerConfig, DeviceAgent, FarmTopics, FaultInjector, SimConfig};
use rumqttc::{Event, Packet};
use tokio::time;
use tracing::{error, info, warn};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: &str = "8883";
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

fn numeric_validator(value: String) -> Result<(), String> {
    value
        .parse::<f64>()
        .map(|_| ())
        .map_err(|_| "value must be a number".to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = App::new("pivotsim")
        .version("0.1.0")
        .author("Field Systems Engineering Team")
        .about("🌱 Center-pivot irrigation controller simulator speaking MQTT")
        .arg(
            Arg::with_name("host")
                .long("host")
                .value_name("HOST")
                .help("Broker host")
                .takes_value(true)
                .default_value(DEFAULT_HOST),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .value_name("PORT")
                .help("Broker TLS port")
                .takes_value(true)
                .default_value(DEFAULT_PORT)
                .validator(|v| {
                    v.parse::<u16>()
                        .map(|_| ())
                        .map_err(|_| "port must be a number in 0..65536".to_string())
                }),
        )
        .arg(
            Arg::with_name("farm-id")
                .long("farm-id")
                .value_name("ID")
                .help("Farm/tower identity, e.g. FARM-XXXX")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("user")
                .long("user")
                .value_name("USER")
                .help("Broker username")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("password")
                .long("password")
                .value_name("PASSWORD")
                .help("Broker password")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("latency")
                .long("latency")
                .value_name("SECONDS")
                .help("Base processing latency before each reply")
                .takes_value(true)
                .default_value("1.0")
                .validator(numeric_validator),
        )
        .arg(
            Arg::with_name("random-lag")
                .long("random-lag")
                .value_name("SECONDS")
                .help("Extra uniform random delay up to N seconds")
                .takes_value(true)
                .default_value("0.0")
                .validator(numeric_validator),
        )
        .arg(
            Arg::with_name("drop-rate")
                .long("drop-rate")
                .value_name("PROBABILITY")
                .help("Probability (0..1) of dropping a reply")
                .takes_value(true)
                .default_value("0.0")
                .validator(numeric_validator),
        )
        .arg(
            Arg::with_name("motor-fail")
                .long("motor-fail")
                .help("Answer START_MOTOR commands with an error"),
        )
        .arg(
            Arg::with_name("cafile")
                .long("cafile")
                .value_name("FILE")
                .help("CA bundle (PEM); platform trust store if omitted")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("client-id")
                .long("client-id")
                .value_name("ID")
                .help("Custom MQTT client id")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("SEED")
                .help("Seed the fault-injection RNG for reproducible runs")
                .takes_value(true)
                .validator(|v| {
                    v.parse::<u64>()
                        .map(|_| ())
                        .map_err(|_| "seed must be an unsigned integer".to_string())
                }),
        )
        .get_matches();

    let broker_config = BrokerConfig {
        host: matches.value_of("host").unwrap_or(DEFAULT_HOST).to_string(),
        port: matches.value_of("port").unwrap_or(DEFAULT_PORT).parse()?,
        farm_id: matches.value_of("farm-id").unwrap_or_default().to_string(),
        username: matches.value_of("user").unwrap_or_default().to_string(),
        password: matches.value_of("password").unwrap_or_default().to_string(),
        cafile: matches.value_of("cafile").map(Into::into),
        client_id: matches.value_of("client-id").map(String::from),
    };

    let sim_config = SimConfig::new(
        matches.value_of("latency").unwrap_or("1.0").parse()?,
        matches.value_of("random-lag").unwrap_or("0.0").parse()?,
        matches.value_of("drop-rate").unwrap_or("0.0").parse()?,
        matches.is_present("motor-fail"),
    );

    let topics = FarmTopics::new(&broker_config.farm_id);
    let fault = match matches.value_of("seed") {
        Some(seed) => FaultInjector::with_seed(&sim_config, seed.parse()?),
        None => FaultInjector::new(&sim_config),
    };

    println!("🌱 Center-Pivot Device Simulator");
    println!("================================");

    let (bus, mut event_loop) = broker::connect(&broker_config, &topics)?;
    let mut agent = DeviceAgent::new(sim_config, topics, fault, bus.clone());

    let mut connected = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, closing session");
                if let Err(e) = bus.disconnect().await {
                    warn!("disconnect failed: {e}");
                }
                break;
            }
            event = event_loop.poll() => {
                match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("✅ connected");
                        connected = true;
                        if let Err(e) = agent.announce().await {
                            warn!("presence announcement failed: {e}");
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        info!(topic = %publish.topic, "📥 message received");
                        if let Err(e) = agent.dispatch(&publish.topic, &publish.payload).await {
                            warn!("dispatch failed: {e}");
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        // Transport setup failures are fatal; once a session
                        // was established the client reconnects on its own.
                        if !connected {
                            error!("❌ connection failed: {e}");
                            return Err(e.into());
                        }
                        warn!("connection error: {e}, retrying");
                        time::sleep(RECONNECT_BACKOFF).await;
                    }
                }
            }
        }
    }

    println!("🛑 Simulator stopped");
    Ok(())
}
