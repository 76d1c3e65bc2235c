use clap::Parser;
use fastps_udp::config::{EmulatorConfig, CONTROL_PORT};
use fastps_udp::logging::{self, ConsoleLogger, DeviceLogger, LogLevel};
use fastps_udp::DeviceEmulator;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process;

#[derive(Parser, Debug)]
#[command(name = "fastps-emulator")]
#[command(about = "Emulate the UDP control server of a FAST-PS power supply", long_about = None)]
struct Args {
    /// Address and port to listen on
    #[arg(long, default_value_t = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), CONTROL_PORT))]
    bind: SocketAddr,

    /// Start with the output stage disabled
    #[arg(long)]
    off: bool,
}

fn main() {
    logging::init(logging::EMULATOR_DEFAULT_FILTER);
    let args = Args::parse();
    let logger = ConsoleLogger::new();

    let config = EmulatorConfig {
        bind: args.bind,
        output_on: !args.off,
        ..EmulatorConfig::default()
    };
    let emulator = match DeviceEmulator::bind(&config, logger.clone()) {
        Ok(emulator) => emulator,
        Err(e) => {
            logger.log(LogLevel::Error, "Main", &e.to_string());
            process::exit(e.exit_code());
        }
    };

    let e = emulator.clone();
    let l = logger.clone();
    ctrlc::set_handler(move || {
        l.log(LogLevel::Info, "Main", "Shutting down...");
        e.stop();
    })
    .ok();

    emulator.run();
    logger.log(LogLevel::Info, "Main", &format!("{} packets handled", emulator.packets_received()));
}
