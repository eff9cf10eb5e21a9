//! Availability signaling.
//!
//! Offline is announced only through the last will registered before the
//! session opens; the device never publishes it explicitly, not even on a
//! graceful shutdown. On every successful connection the device publishes
//! Online (retained), then Running, then activates its subscriptions, in
//! that order.

use rumqttc::LastWill;
use tracing::info;

use crate::broker::{BrokerError, MessageBus, QosLevel};
use crate::protocol::{ConnectionStatus, StatusPayload};
use crate::topics::FarmTopics;

/// Retained, at-least-once Offline notification delivered by the transport
/// if the device disconnects without a clean shutdown.
pub fn last_will(topics: &FarmTopics) -> Result<LastWill, BrokerError> {
    let payload = ConnectionStatus::Offline.payload().to_bytes()?;
    Ok(LastWill::new(
        topics.status(),
        payload,
        QosLevel::AtLeastOnce.into(),
        true,
    ))
}

/// Announce availability and activate subscriptions after a successful
/// connection.
pub async fn announce<B: MessageBus>(bus: &B, topics: &FarmTopics) -> Result<(), BrokerError> {
    bus.publish(
        topics.status(),
        QosLevel::AtLeastOnce,
        true,
        ConnectionStatus::Online.payload().to_bytes()?,
    )
    .await?;

    bus.publish(
        topics.device_status(),
        QosLevel::BestEffort,
        false,
        StatusPayload::running().to_bytes()?,
    )
    .await?;

    bus.subscribe(topics.control(), QosLevel::BestEffort).await?;
    bus.subscribe(topics.device(), QosLevel::BestEffort).await?;
    bus.subscribe(topics.motor_control_filter(), QosLevel::BestEffort)
        .await?;

    info!(
        control = topics.control(),
        device = topics.device(),
        motor = topics.motor_control_filter(),
        "presence announced, subscriptions active"
    );
    Ok(())
}
