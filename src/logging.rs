use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

pub trait DeviceLogger: Send + Sync {
    fn log(&self, level: LogLevel, component: &str, msg: &str);
}

/// Forwards to the `log` facade, using the component as the target.
pub struct ConsoleLogger;

impl ConsoleLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl DeviceLogger for ConsoleLogger {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        log::log!(target: component, log::Level::from(level), "{}", msg);
    }
}

/// Default filter of `fastps-control`: stdout carries the report
pub const CONTROL_DEFAULT_FILTER: &str = "warn";
/// Default filter of `fastps-emulator`
pub const EMULATOR_DEFAULT_FILTER: &str = "info";

/// Install env_logger on stderr. `RUST_LOG` overrides `default_filter`.
pub fn init(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    // a second init (tests, embedding) keeps the first logger
    let _ = env_logger::Builder::from_env(env)
        .format_target(true)
        .try_init();
}

/// Hex dump of a datagram, compiled in with the `packet-dump` feature.
#[cfg(feature = "packet-dump")]
pub fn dump_packet(logger: &dyn DeviceLogger, component: &str, label: &str, data: &[u8]) {
    let hex: Vec<String> = data.iter().map(|b| format!("{:02x}", b)).collect();
    logger.log(LogLevel::Debug, component, &format!("{} ({} bytes): {}", label, data.len(), hex.join(" ")));
}

#[cfg(not(feature = "packet-dump"))]
pub fn dump_packet(_logger: &dyn DeviceLogger, _component: &str, _label: &str, _data: &[u8]) {}
