//! Broker client surface. The core talks to the transport exclusively
//! through [`MessageBus`], which keeps rumqttc types out of the protocol
//! engine and lets tests substitute a recording double.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use rumqttc::tokio_rustls::rustls;
use rumqttc::{
    AsyncClient, ClientError, ConnectionError, EventLoop, MqttOptions, QoS, TlsConfiguration,
    Transport,
};
use thiserror::Error;
use tracing::info;

use crate::config::BrokerConfig;
use crate::presence;
use crate::topics::FarmTopics;

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const REQUEST_CHANNEL_CAPACITY: usize = 100;

/// Delivery guarantee requested for a publish or subscribe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QosLevel {
    BestEffort,
    AtLeastOnce,
}

impl From<QosLevel> for QoS {
    fn from(level: QosLevel) -> Self {
        match level {
            QosLevel::BestEffort => QoS::AtMostOnce,
            QosLevel::AtLeastOnce => QoS::AtLeastOnce,
        }
    }
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TLS setup failed: {0}")]
    Tls(#[from] rustls::Error),
    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("client request failed: {0}")]
    Client(#[from] ClientError),
    #[error("connection failed: {0}")]
    Connection(#[from] ConnectionError),
}

/// Publish/subscribe operations the protocol engine calls into.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        qos: QosLevel,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<(), BrokerError>;

    async fn subscribe(&self, topic: &str, qos: QosLevel) -> Result<(), BrokerError>;
}

#[async_trait]
impl<T: MessageBus + ?Sized> MessageBus for Arc<T> {
    async fn publish(
        &self,
        topic: &str,
        qos: QosLevel,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<(), BrokerError> {
        (**self).publish(topic, qos, retain, payload).await
    }

    async fn subscribe(&self, topic: &str, qos: QosLevel) -> Result<(), BrokerError> {
        (**self).subscribe(topic, qos).await
    }
}

/// rumqttc-backed bus for live broker sessions.
#[derive(Clone)]
pub struct MqttBus {
    client: AsyncClient,
}

impl MqttBus {
    /// Close the session without sending further protocol messages.
    pub async fn disconnect(&self) -> Result<(), BrokerError> {
        self.client.disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl MessageBus for MqttBus {
    async fn publish(
        &self,
        topic: &str,
        qos: QosLevel,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<(), BrokerError> {
        self.client.publish(topic, qos.into(), retain, payload).await?;
        Ok(())
    }

    async fn subscribe(&self, topic: &str, qos: QosLevel) -> Result<(), BrokerError> {
        self.client.subscribe(topic, qos.into()).await?;
        Ok(())
    }
}

/// Prepare a broker session: credentials, keep-alive, TLS and the Offline
/// last will, registered before the connection is opened. The returned
/// [`EventLoop`] must be polled to drive the connection.
pub fn connect(
    config: &BrokerConfig,
    topics: &FarmTopics,
) -> Result<(MqttBus, EventLoop), BrokerError> {
    let client_id = config
        .client_id
        .clone()
        .unwrap_or_else(generate_client_id);

    let mut options = MqttOptions::new(client_id.clone(), config.host.clone(), config.port);
    options
        .set_credentials(config.username.clone(), config.password.clone())
        .set_keep_alive(KEEP_ALIVE);
    options.set_last_will(presence::last_will(topics)?);
    options.set_transport(tls_transport(config)?);

    info!(
        client_id = %client_id,
        host = %config.host,
        port = config.port,
        "opening broker session"
    );

    let (client, event_loop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);
    Ok((MqttBus { client }, event_loop))
}

fn tls_transport(config: &BrokerConfig) -> Result<Transport, BrokerError> {
    match &config.cafile {
        Some(path) => Ok(Transport::Tls(TlsConfiguration::Simple {
            ca: fs::read(path)?,
            alpn: None,
            client_auth: None,
        })),
        None => {
            let mut roots = rustls::RootCertStore::empty();
            for cert in rustls_native_certs::load_native_certs()? {
                roots.add(cert)?;
            }
            let tls = rustls::ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth();
            Ok(Transport::Tls(TlsConfiguration::Rustls(Arc::new(tls))))
        }
    }
}

fn generate_client_id() -> String {
    format!("device_sim_{}", rand::thread_rng().gen_range(1000..=999_999))
}
