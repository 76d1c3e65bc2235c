use clap::Parser;
use fastps_udp::config::{CONTROL_PORT, DEVICE_IP};
use fastps_udp::logging::{self, ConsoleLogger, DeviceLogger, LogLevel};
use fastps_udp::{report, ControlClient, ControlConfig, ControlRequest, ControlResult};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "fastps-control")]
#[command(about = "Send one control packet to a FAST-PS power supply and print its reply", long_about = None)]
struct Args {
    /// 0/1 set the output value
    #[arg(allow_negative_numbers = true)]
    set: i32,

    /// Current value [A]
    #[arg(short = 'i', value_name = "CURRENT", default_value_t = 0.0, allow_negative_numbers = true)]
    current: f64,

    /// Voltage value [V]
    #[arg(short = 'v', value_name = "VOLTAGE", default_value_t = 0.0, allow_negative_numbers = true)]
    voltage: f64,

    /// Device address
    #[arg(long, default_value_t = IpAddr::V4(DEVICE_IP))]
    device: IpAddr,

    /// Control port, used as destination and as local port
    #[arg(long, default_value_t = CONTROL_PORT)]
    port: u16,

    /// Local address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,

    /// Give up waiting for the reply after SECONDS (default: wait forever)
    #[arg(long, value_name = "SECONDS", value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Print the reply as JSON
    #[arg(long)]
    json: bool,
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got {}", s));
    }
    let timeout = Duration::try_from_secs_f64(secs).map_err(|e| format!("timeout {}: {}", s, e))?;
    // a zero read timeout is rejected by the socket
    if timeout.is_zero() {
        return Err(format!("timeout {} is below one nanosecond", s));
    }
    Ok(timeout)
}

/// The `--port` value is both the destination and the local port.
fn control_config(args: &Args) -> ControlConfig {
    ControlConfig {
        device: SocketAddr::new(args.device, args.port),
        bind: SocketAddr::new(args.bind, args.port),
        timeout: args.timeout,
        ..ControlConfig::default()
    }
}

fn run(args: &Args, logger: Arc<dyn DeviceLogger>) -> ControlResult<()> {
    if args.set != 0 && args.set != 1 {
        logger.log(LogLevel::Warn, "Main", &format!("set={} is neither 0 nor 1, sending it anyway", args.set));
    }
    let request = ControlRequest::new(args.set, args.current, args.voltage)?;

    let client = ControlClient::connect(&control_config(args), logger)?;
    let response = client.exchange(&request)?;

    if args.json {
        println!("{}", report::render_json(&response)?);
    } else {
        print!("{}", report::render_text(&response));
    }
    Ok(())
}

fn main() {
    logging::init(logging::CONTROL_DEFAULT_FILTER);
    let args = Args::parse();
    let logger = ConsoleLogger::new();

    if let Err(e) = run(&args, logger.clone()) {
        logger.log(LogLevel::Error, "Main", &e.to_string());
        process::exit(e.exit_code());
    }
}
