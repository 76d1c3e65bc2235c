//! Error types for the control client and the device emulator

use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Result type for control operations
pub type ControlResult<T> = Result<T, ControlError>;

/// Broad failure class, used to pick the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    Network,
    Decode,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Argument => 2,
            ErrorKind::Network => 3,
            ErrorKind::Decode => 4,
        }
    }
}

/// Errors that can occur while talking to the device
#[derive(Error, Debug)]
pub enum ControlError {
    /// Setpoint cannot be expressed as an integer count of microunits
    #[error("Invalid {name} setpoint: {value}")]
    InvalidSetpoint { name: &'static str, value: f64 },

    /// Local socket could not be created or bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Datagram could not be sent
    #[error("Failed to send to {addr}: {source}")]
    Send {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Only part of the datagram left the socket
    #[error("Short send: {sent} of {expected} bytes")]
    ShortSend { sent: usize, expected: usize },

    /// Receive failed for a reason other than the timeout
    #[error("Failed to receive reply: {0}")]
    Receive(#[source] io::Error),

    /// No reply arrived within the configured timeout
    #[error("No reply within {0:?}")]
    Timeout(Duration),

    /// Reply too short to hold the prefix and the response record
    #[error("Reply too short: expected at least {expected} bytes, got {actual}")]
    ShortReply { expected: usize, actual: usize },

    /// Control packet with the wrong size
    #[error("Control packet has {actual} bytes, expected {expected}")]
    BadRequestLength { expected: usize, actual: usize },

    /// Control packet with the wrong signature word
    #[error("Wrong magic 0x{found:08x}, expected 0x{expected:08x}")]
    BadMagic { found: u32, expected: u32 },

    /// Record could not be read from an in-memory buffer
    #[error("Codec error: {0}")]
    Codec(#[source] io::Error),

    /// Decoded reply could not be rendered as JSON
    #[error("Failed to render reply: {0}")]
    Render(#[from] serde_json::Error),
}

impl ControlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControlError::InvalidSetpoint { .. } => ErrorKind::Argument,
            ControlError::Bind { .. }
            | ControlError::Send { .. }
            | ControlError::ShortSend { .. }
            | ControlError::Receive(_)
            | ControlError::Timeout(_) => ErrorKind::Network,
            ControlError::ShortReply { .. }
            | ControlError::BadRequestLength { .. }
            | ControlError::BadMagic { .. }
            | ControlError::Codec(_)
            | ControlError::Render(_) => ErrorKind::Decode,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_map_to_distinct_exit_codes() {
        let arg = ControlError::InvalidSetpoint { name: "current", value: f64::NAN };
        let net = ControlError::Timeout(Duration::from_millis(250));
        let dec = ControlError::ShortReply { expected: 64, actual: 40 };

        assert_eq!(arg.kind(), ErrorKind::Argument);
        assert_eq!(net.kind(), ErrorKind::Network);
        assert_eq!(dec.kind(), ErrorKind::Decode);
        assert_eq!(arg.exit_code(), 2);
        assert_eq!(net.exit_code(), 3);
        assert_eq!(dec.exit_code(), 4);
    }

    #[test]
    fn test_short_reply_message() {
        let err = ControlError::ShortReply { expected: 64, actual: 12 };
        assert_eq!(err.to_string(), "Reply too short: expected at least 64 bytes, got 12");
    }
}
