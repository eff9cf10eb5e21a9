//! Classification of inbound (topic, payload) pairs into commands.
//!
//! Parse failures and topic/type mismatches are deliberate protocol gaps:
//! the message is discarded after a diagnostic log and no response is
//! produced.

use tracing::debug;

use crate::protocol::{
    CommandEnvelope, CommandKind, DeviceCommand, InboundCommand, MotorCommand, PivotCommand,
};
use crate::topics::FarmTopics;

pub struct TopicRouter {
    topics: FarmTopics,
}

impl TopicRouter {
    pub fn new(topics: FarmTopics) -> Self {
        Self { topics }
    }

    /// Classify one inbound message, returning at most one command.
    pub fn classify(&self, topic: &str, payload: &[u8]) -> Option<InboundCommand> {
        let envelope: CommandEnvelope = match serde_json::from_slice(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(topic, error = %e, "discarding unparseable payload");
                return None;
            }
        };

        let kind = match envelope.kind {
            Some(kind) => kind,
            None => {
                debug!(topic, "discarding payload without type discriminator");
                return None;
            }
        };

        let command = if topic == self.topics.control() {
            (kind == CommandKind::Pivot).then(|| {
                InboundCommand::Pivot(PivotCommand {
                    corr: envelope.corr,
                    run: envelope.run,
                })
            })
        } else if topic == self.topics.device() {
            (kind == CommandKind::Device).then(|| {
                InboundCommand::Device(DeviceCommand {
                    corr: envelope.corr,
                    action: envelope.action,
                    serial: envelope.serial,
                })
            })
        } else if let Some(motor_id) = self.topics.motor_id_from_topic(topic) {
            (kind == CommandKind::Motor).then(|| {
                InboundCommand::Motor(MotorCommand {
                    corr: envelope.corr,
                    motor_id: motor_id.to_string(),
                    command: envelope.command,
                })
            })
        } else {
            debug!(topic, "discarding message on unrecognized topic");
            return None;
        };

        if command.is_none() {
            debug!(topic, kind = ?kind, "discarding message with mismatched type");
        }
        command
    }
}
