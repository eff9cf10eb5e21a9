//! Device orchestrator: composes the router, the fault injector and the
//! handlers over one [`MessageBus`].
//!
//! A single agent instance dispatches commands synchronously, so messages
//! arriving during an in-progress simulated delay queue behind it. Response
//! ordering across commands is not guaranteed by the protocol and callers
//! must not rely on it.

use tokio::time;
use tracing::{debug, info};

use crate::broker::{BrokerError, MessageBus, QosLevel};
use crate::config::SimConfig;
use crate::fault_injection::FaultInjector;
use crate::handlers;
use crate::presence;
use crate::protocol::InboundCommand;
use crate::router::TopicRouter;
use crate::topics::FarmTopics;

pub struct DeviceAgent<B: MessageBus> {
    config: SimConfig,
    topics: FarmTopics,
    router: TopicRouter,
    fault: FaultInjector,
    bus: B,
}

impl<B: MessageBus> DeviceAgent<B> {
    pub fn new(config: SimConfig, topics: FarmTopics, fault: FaultInjector, bus: B) -> Self {
        let router = TopicRouter::new(topics.clone());
        Self {
            config,
            topics,
            router,
            fault,
            bus,
        }
    }

    /// Publish the presence sequence and activate subscriptions. Called
    /// after every successful connection, including reconnects.
    pub async fn announce(&self) -> Result<(), BrokerError> {
        presence::announce(&self.bus, &self.topics).await
    }

    /// Handle one inbound message end to end: classify, apply the drop
    /// decision, incur the simulated delay, then publish exactly one ACK or
    /// ERR. Unclassifiable messages produce nothing.
    pub async fn dispatch(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let Some(command) = self.router.classify(topic, payload) else {
            return Ok(());
        };

        // Drop check comes first: a dropped command waits for nothing.
        if self.fault.should_drop() {
            info!(kind = ?command.kind(), corr = command.corr(), "dropping reply");
            return Ok(());
        }

        // The delay is uninterruptible once started.
        let delay = self.fault.delay();
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "simulating processing latency");
            time::sleep(delay).await;
        }

        let (reply, ack_topic, err_topic) = match &command {
            InboundCommand::Pivot(cmd) => (
                handlers::handle_pivot(cmd),
                self.topics.ack().to_string(),
                self.topics.err().to_string(),
            ),
            InboundCommand::Device(cmd) => (
                handlers::handle_device(cmd),
                self.topics.ack().to_string(),
                self.topics.err().to_string(),
            ),
            InboundCommand::Motor(cmd) => (
                handlers::handle_motor(cmd, self.config.motor_fail()),
                self.topics.motor_ack(&cmd.motor_id),
                self.topics.motor_err(&cmd.motor_id),
            ),
        };

        let reply_topic = if reply.ok { ack_topic } else { err_topic };
        let payload = reply.to_bytes()?;
        info!(
            topic = %reply_topic,
            corr = reply.corr.as_str(),
            ok = reply.ok,
            detail = reply.detail.as_str(),
            "publishing reply"
        );
        self.bus
            .publish(&reply_topic, QosLevel::BestEffort, false, payload)
            .await
    }
}
