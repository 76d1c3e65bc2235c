use crate::codec::{ControlRequest, DeviceResponse};

/// Setpoints and output flag of the emulated power supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PowerSupplyState {
    pub output_on: bool,
    pub current_setpoint_micro: i64,
    pub voltage_setpoint_micro: i64,
}

impl PowerSupplyState {
    pub fn new(output_on: bool) -> Self {
        PowerSupplyState { output_on, ..Default::default() }
    }

    /// Store the setpoints of `request` unless its set flag is zero.
    /// Returns whether anything was applied.
    pub fn apply(&mut self, request: &ControlRequest) -> bool {
        if !request.applies_setpoints() {
            return false;
        }
        self.current_setpoint_micro = request.current_setpoint_micro;
        self.voltage_setpoint_micro = request.voltage_setpoint_micro;
        true
    }

    /// The record the device would report right now. An ideal supply: the
    /// readbacks follow the setpoints while the output is on and are zero
    /// otherwise.
    pub fn snapshot(&self) -> DeviceResponse {
        let (current, voltage) = if self.output_on {
            (self.current_setpoint_micro, self.voltage_setpoint_micro)
        } else {
            (0, 0)
        };
        DeviceResponse {
            status: if self.output_on { DeviceResponse::STATUS_OUTPUT_ON } else { 0 },
            current_setpoint_micro: self.current_setpoint_micro,
            voltage_setpoint_micro: self.voltage_setpoint_micro,
            current_readback_micro: current,
            voltage_readback_micro: voltage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_flag_controls_update() {
        let mut state = PowerSupplyState::new(true);
        assert!(state.apply(&ControlRequest::new(1, 2.5, 48.0).unwrap()));
        assert!(!state.apply(&ControlRequest::new(0, 9.0, 9.0).unwrap()));

        assert_eq!(state.current_setpoint_micro, 2_500_000);
        assert_eq!(state.voltage_setpoint_micro, 48_000_000);
    }

    #[test]
    fn test_snapshot_follows_output_flag() {
        let mut state = PowerSupplyState::new(true);
        state.apply(&ControlRequest::new(1, 1.0, 5.0).unwrap());

        let on = state.snapshot();
        assert!(on.output_on());
        assert_eq!(on.current_readback_micro, 1_000_000);
        assert_eq!(on.voltage_readback_micro, 5_000_000);

        state.output_on = false;
        let off = state.snapshot();
        assert_eq!(off.status, 0);
        assert_eq!(off.current_setpoint_micro, 1_000_000);
        assert_eq!(off.current_readback_micro, 0);
        assert_eq!(off.voltage_readback_micro, 0);
    }
}
