//! Console rendering of a decoded reply.

use crate::codec::DeviceResponse;
use serde::Serialize;
use std::fmt::Write;

/// Decoded reply in SI units, plus the raw record
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub status: u32,
    pub output_on: bool,
    pub current_setpoint: f64,
    pub voltage_setpoint: f64,
    pub current_readback: f64,
    pub voltage_readback: f64,
    pub raw: DeviceResponse,
}

impl From<&DeviceResponse> for Report {
    fn from(resp: &DeviceResponse) -> Self {
        Report {
            status: resp.status,
            output_on: resp.output_on(),
            current_setpoint: resp.current_setpoint(),
            voltage_setpoint: resp.voltage_setpoint(),
            current_readback: resp.current_readback(),
            voltage_readback: resp.voltage_readback(),
            raw: *resp,
        }
    }
}

/// Raw record on one line, then one line per field.
pub fn render_text(resp: &DeviceResponse) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(
        out,
        "[({}, {}, {}, {}, {})]",
        resp.status,
        resp.current_setpoint_micro,
        resp.voltage_setpoint_micro,
        resp.current_readback_micro,
        resp.voltage_readback_micro
    );
    let _ = writeln!(out, "status = {}", resp.status);
    let _ = writeln!(out, "current setpoint = {:.6} A", resp.current_setpoint());
    let _ = writeln!(out, "voltage setpoint = {:.6} V", resp.voltage_setpoint());
    let _ = writeln!(out, "current readback = {:.6} A", resp.current_readback());
    let _ = writeln!(out, "voltage readback = {:.6} V", resp.voltage_readback());
    out
}

pub fn render_json(resp: &DeviceResponse) -> serde_json::Result<String> {
    serde_json::to_string(&Report::from(resp))
}
