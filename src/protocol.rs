//! Wire payload types shared by the router, the handlers and the presence
//! manager. Inbound payloads are read leniently: every field except the
//! `type` discriminator defaults to an empty string when absent, matching
//! what the supervisory side actually sends.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// The `type` discriminator carried by every inbound command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    #[serde(rename = "PIVOT_CMD")]
    Pivot,
    #[serde(rename = "DEVICE_CMD")]
    Device,
    #[serde(rename = "MOTOR_CMD")]
    Motor,
}

/// Raw serde view of an inbound payload before classification.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandEnvelope {
    #[serde(rename = "type", default)]
    pub kind: Option<CommandKind>,
    #[serde(default)]
    pub corr: String,
    #[serde(default)]
    pub run: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotCommand {
    pub corr: String,
    pub run: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCommand {
    pub corr: String,
    pub action: String,
    pub serial: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorCommand {
    pub corr: String,
    /// Always taken from the topic path, never from the payload.
    pub motor_id: String,
    pub command: String,
}

/// A classified inbound command. Instances are transient: built on message
/// arrival and consumed synchronously by exactly one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundCommand {
    Pivot(PivotCommand),
    Device(DeviceCommand),
    Motor(MotorCommand),
}

impl InboundCommand {
    /// Correlation token of the triggering command, possibly empty.
    pub fn corr(&self) -> &str {
        match self {
            InboundCommand::Pivot(cmd) => &cmd.corr,
            InboundCommand::Device(cmd) => &cmd.corr,
            InboundCommand::Motor(cmd) => &cmd.corr,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            InboundCommand::Pivot(_) => CommandKind::Pivot,
            InboundCommand::Device(_) => CommandKind::Device,
            InboundCommand::Motor(_) => CommandKind::Motor,
        }
    }
}

/// Acknowledgment or error reply for one command.
///
/// The correlation id is echoed verbatim. On the wire the detail field is
/// keyed `note` for an ACK and `reason` for an ERR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResult {
    pub corr: String,
    pub ok: bool,
    pub detail: String,
}

impl OutboundResult {
    pub fn ack(corr: &str, detail: impl Into<String>) -> Self {
        Self {
            corr: corr.to_string(),
            ok: true,
            detail: detail.into(),
        }
    }

    pub fn err(corr: &str, detail: impl Into<String>) -> Self {
        Self {
            corr: corr.to_string(),
            ok: false,
            detail: detail.into(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl Serialize for OutboundResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OutboundResult", 3)?;
        state.serialize_field("corr", &self.corr)?;
        state.serialize_field("ok", &self.ok)?;
        if self.ok {
            state.serialize_field("note", &self.detail)?;
        } else {
            state.serialize_field("reason", &self.detail)?;
        }
        state.end()
    }
}

/// Presence/status payload, `{"message":"..."}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub message: String,
}

impl StatusPayload {
    /// Device-status heartbeat published once after connecting.
    pub fn running() -> Self {
        Self {
            message: "Running".to_string(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Retained availability value on the status topic. The device publishes
/// `Online` itself; `Offline` is only ever delivered by the transport's
/// last-will mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Online,
    Offline,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Online => "Online",
            ConnectionStatus::Offline => "Offline",
        }
    }

    pub fn payload(&self) -> StatusPayload {
        StatusPayload {
            message: self.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_ack_serializes_with_note_key() {
        let result = OutboundResult::ack("abc123", "pivot start accepted");
        let value: Value = serde_json::from_slice(&result.to_bytes().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"corr": "abc123", "ok": true, "note": "pivot start accepted"})
        );
    }

    #[test]
    fn test_err_serializes_with_reason_key() {
        let result = OutboundResult::err("xyz", "missing action/serial");
        let value: Value = serde_json::from_slice(&result.to_bytes().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"corr": "xyz", "ok": false, "reason": "missing action/serial"})
        );
    }

    #[test]
    fn test_envelope_defaults_absent_fields_to_empty() {
        let envelope: CommandEnvelope =
            serde_json::from_str(r#"{"type":"PIVOT_CMD"}"#).unwrap();
        assert_eq!(envelope.kind, Some(CommandKind::Pivot));
        assert_eq!(envelope.corr, "");
        assert_eq!(envelope.run, "");
    }

    #[test]
    fn test_envelope_without_type() {
        let envelope: CommandEnvelope =
            serde_json::from_str(r#"{"corr":"c1","run":"START"}"#).unwrap();
        assert!(envelope.kind.is_none());
        assert_eq!(envelope.corr, "c1");
    }

    #[test]
    fn test_status_payloads() {
        let online = serde_json::to_string(&ConnectionStatus::Online.payload()).unwrap();
        assert_eq!(online, r#"{"message":"Online"}"#);
        let offline = serde_json::to_string(&ConnectionStatus::Offline.payload()).unwrap();
        assert_eq!(offline, r#"{"message":"Offline"}"#);
        let running = serde_json::to_string(&StatusPayload::running()).unwrap();
        assert_eq!(running, r#"{"message":"Running"}"#);
    }
}
