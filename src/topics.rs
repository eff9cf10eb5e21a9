//! Topic names for one farm identity, derived deterministically from the
//! farm id. The per-motor matcher lives here as an explicit path-segment
//! check, independent of whatever wildcard mechanism the broker implements.

const MOTOR_CONTROL_SUFFIX: &str = "/control";

#[derive(Debug, Clone)]
pub struct FarmTopics {
    status: String,
    device_status: String,
    control: String,
    device: String,
    motor_control_filter: String,
    ack: String,
    err: String,
    motor_prefix: String,
}

impl FarmTopics {
    pub fn new(farm_id: &str) -> Self {
        Self {
            status: format!("farm/{farm_id}/status"),
            device_status: format!("farm/{farm_id}/device/status"),
            control: format!("farm/{farm_id}/control"),
            device: format!("farm/{farm_id}/device"),
            motor_control_filter: format!("farm/{farm_id}/motor/+/control"),
            ack: format!("farm/{farm_id}/ack"),
            err: format!("farm/{farm_id}/err"),
            motor_prefix: format!("farm/{farm_id}/motor/"),
        }
    }

    /// Retained presence topic (`Online`/`Offline`).
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Non-retained device status topic (`Running`).
    pub fn device_status(&self) -> &str {
        &self.device_status
    }

    /// Pivot command topic.
    pub fn control(&self) -> &str {
        &self.control
    }

    /// Device command topic.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Single-level wildcard filter for per-motor control topics.
    pub fn motor_control_filter(&self) -> &str {
        &self.motor_control_filter
    }

    /// Global ACK topic for pivot and device replies.
    pub fn ack(&self) -> &str {
        &self.ack
    }

    /// Global ERR topic for pivot and device replies.
    pub fn err(&self) -> &str {
        &self.err
    }

    pub fn motor_ack(&self, motor_id: &str) -> String {
        format!("{}{motor_id}/ack", self.motor_prefix)
    }

    pub fn motor_err(&self, motor_id: &str) -> String {
        format!("{}{motor_id}/err", self.motor_prefix)
    }

    /// Extract the motor id from a per-motor control topic.
    ///
    /// The id is the single path segment between `farm/<F>/motor/` and
    /// `/control`; anything else, including an empty or multi-segment id,
    /// does not match.
    pub fn motor_id_from_topic<'a>(&self, topic: &'a str) -> Option<&'a str> {
        let rest = topic.strip_prefix(self.motor_prefix.as_str())?;
        let motor_id = rest.strip_suffix(MOTOR_CONTROL_SUFFIX)?;
        if motor_id.is_empty() || motor_id.contains('/') {
            return None;
        }
        Some(motor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_derivation_from_farm_id() {
        let topics = FarmTopics::new("FARM-0042");
        assert_eq!(topics.status(), "farm/FARM-0042/status");
        assert_eq!(topics.device_status(), "farm/FARM-0042/device/status");
        assert_eq!(topics.control(), "farm/FARM-0042/control");
        assert_eq!(topics.device(), "farm/FARM-0042/device");
        assert_eq!(
            topics.motor_control_filter(),
            "farm/FARM-0042/motor/+/control"
        );
        assert_eq!(topics.ack(), "farm/FARM-0042/ack");
        assert_eq!(topics.err(), "farm/FARM-0042/err");
    }

    #[test]
    fn test_motor_reply_topics_use_inbound_motor_id() {
        let topics = FarmTopics::new("F1");
        assert_eq!(topics.motor_ack("M7"), "farm/F1/motor/M7/ack");
        assert_eq!(topics.motor_err("M7"), "farm/F1/motor/M7/err");
    }

    #[test]
    fn test_motor_id_extraction() {
        let topics = FarmTopics::new("F1");
        assert_eq!(
            topics.motor_id_from_topic("farm/F1/motor/M7/control"),
            Some("M7")
        );
        assert_eq!(
            topics.motor_id_from_topic("farm/F1/motor/pump-3/control"),
            Some("pump-3")
        );
    }

    #[test]
    fn test_motor_id_extraction_rejects_malformed_topics() {
        let topics = FarmTopics::new("F1");
        // Wrong farm, missing suffix, empty id, nested segments
        assert_eq!(topics.motor_id_from_topic("farm/F2/motor/M7/control"), None);
        assert_eq!(topics.motor_id_from_topic("farm/F1/motor/M7/status"), None);
        assert_eq!(topics.motor_id_from_topic("farm/F1/motor//control"), None);
        assert_eq!(
            topics.motor_id_from_topic("farm/F1/motor/M7/extra/control"),
            None
        );
        assert_eq!(topics.motor_id_from_topic("farm/F1/control"), None);
    }
}
