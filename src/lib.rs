//! # Center-Pivot Device Simulator
//!
//! Emulates a remote irrigation/pivot controller over MQTT so a supervisory
//! control system can be exercised without physical hardware. The device
//! answers control messages with plausible, correlation-tagged
//! acknowledgments; it does not model pivot physics or motor electrics.
//!
//! ## Features
//!
//! - **Topic routing**: fixed control/device topics plus per-motor wildcard
//!   topics, with motor-id extraction from the topic path
//! - **Command handling**: pivot, device and motor commands with ACK/ERR
//!   semantics and verbatim correlation-id echo
//! - **Fault injection**: configurable processing latency, jitter and
//!   probabilistic ACK drop, driven by a seedable RNG
//! - **Presence signaling**: retained Online status on connect, Offline via
//!   a pre-registered last will
//!
//! ## Architecture
//!
//! - [`agent`] - Main orchestrator composing drop / delay / handle / publish
//! - [`router`] - Inbound (topic, payload) classification
//! - [`handlers`] - Pure per-command decision logic
//! - [`fault_injection`] - Latency and drop engine
//! - [`presence`] - Last-will construction and the online announcement
//! - [`broker`] - Publish/subscribe seam and the rumqttc-backed session
//! - [`topics`] - Deterministic topic derivation from the farm identity
//! - [`protocol`] - Wire payload types

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod broker;
pub mod config;
pub mod fault_injection;
pub mod handlers;
pub mod presence;
pub mod protocol;
pub mod router;
pub mod topics;

// Re-export main public types for convenience
pub use agent::DeviceAgent;
pub use broker::{BrokerError, MessageBus, MqttBus, QosLevel};
pub use config::{BrokerConfig, SimConfig};
pub use fault_injection::FaultInjector;
pub use protocol::{InboundCommand, OutboundResult};
pub use router::TopicRouter;
pub use topics::FarmTopics;
