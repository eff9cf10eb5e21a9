//! Per-command decision logic. Each handler is a pure function of the
//! command (and, for motors, the failure toggle); the drop/delay/publish
//! composition lives in [`crate::agent`].

use crate::protocol::{DeviceCommand, MotorCommand, OutboundResult, PivotCommand};

/// Pivot run requests are always accepted.
pub fn handle_pivot(cmd: &PivotCommand) -> OutboundResult {
    let note = format!("pivot {} accepted", cmd.run.to_lowercase());
    OutboundResult::ack(&cmd.corr, note)
}

/// Device commands require a non-empty action and serial number.
pub fn handle_device(cmd: &DeviceCommand) -> OutboundResult {
    let action = cmd.action.to_uppercase();
    let serial = cmd.serial.trim();
    if action.is_empty() || serial.is_empty() {
        return OutboundResult::err(&cmd.corr, "missing action/serial");
    }
    OutboundResult::ack(&cmd.corr, format!("{action} ok"))
}

/// Motor commands succeed unless the failure toggle is on and the motor is
/// being started.
pub fn handle_motor(cmd: &MotorCommand, motor_fail: bool) -> OutboundResult {
    if motor_fail && cmd.command.to_uppercase() == "START_MOTOR" {
        return OutboundResult::err(&cmd.corr, "sim motor fault");
    }
    OutboundResult::ack(&cmd.corr, "sim motor ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_lowercases_run_in_note() {
        let cmd = PivotCommand {
            corr: "abc123".to_string(),
            run: "START".to_string(),
        };
        let result = handle_pivot(&cmd);
        assert!(result.ok);
        assert_eq!(result.corr, "abc123");
        assert_eq!(result.detail, "pivot start accepted");
    }

    #[test]
    fn test_pivot_with_empty_run() {
        let cmd = PivotCommand {
            corr: String::new(),
            run: String::new(),
        };
        let result = handle_pivot(&cmd);
        assert!(result.ok);
        assert_eq!(result.detail, "pivot  accepted");
    }

    #[test]
    fn test_device_uppercases_action_in_note() {
        let cmd = DeviceCommand {
            corr: "c1".to_string(),
            action: "reboot".to_string(),
            serial: "SN-1".to_string(),
        };
        let result = handle_device(&cmd);
        assert!(result.ok);
        assert_eq!(result.detail, "REBOOT ok");
    }

    #[test]
    fn test_device_rejects_missing_action_or_serial() {
        let missing_serial = DeviceCommand {
            corr: "c2".to_string(),
            action: "REBOOT".to_string(),
            serial: "   ".to_string(),
        };
        let result = handle_device(&missing_serial);
        assert!(!result.ok);
        assert_eq!(result.detail, "missing action/serial");

        let missing_action = DeviceCommand {
            corr: "c3".to_string(),
            action: String::new(),
            serial: "SN-1".to_string(),
        };
        let result = handle_device(&missing_action);
        assert!(!result.ok);
        assert_eq!(result.detail, "missing action/serial");
    }

    #[test]
    fn test_motor_fault_only_for_start_with_toggle() {
        let start = MotorCommand {
            corr: "c4".to_string(),
            motor_id: "M7".to_string(),
            command: "start_motor".to_string(),
        };

        let result = handle_motor(&start, true);
        assert!(!result.ok);
        assert_eq!(result.detail, "sim motor fault");

        let result = handle_motor(&start, false);
        assert!(result.ok);
        assert_eq!(result.detail, "sim motor ok");

        let stop = MotorCommand {
            corr: "c5".to_string(),
            motor_id: "M7".to_string(),
            command: "STOP_MOTOR".to_string(),
        };
        let result = handle_motor(&stop, true);
        assert!(result.ok);
        assert_eq!(result.detail, "sim motor ok");
    }
}
