pub mod check;
pub mod watch;

use clap::{Args, Parser, Subcommand};
use hostmon_common::{Endpoint, EndpointError, Protocol};

#[derive(Parser)]
#[command(name = "hostmon")]
#[command(version)]
#[command(about = "Watch a host and report when it comes and goes.")]
pub struct CommandLine {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monitor an endpoint until interrupted
    #[command(alias = "w")]
    Watch {
        #[command(flatten)]
        target: TargetArgs,
        /// Seconds between probes
        #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
        /// Seconds before a single probe gives up
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,
    },
    /// Probe an endpoint once; exit status 0 if it answered
    #[command(alias = "c")]
    Check {
        #[command(flatten)]
        target: TargetArgs,
        /// Seconds before the probe gives up
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// icmp, icmp6 or tcp
    pub protocol: Protocol,
    /// Host name or IP address
    pub host: String,
    /// Port, required for tcp
    pub port: Option<String>,
}

impl TargetArgs {
    pub fn to_endpoint(&self) -> Result<Endpoint, EndpointError> {
        Endpoint::from_parts(self.protocol, self.host.as_str(), self.port.as_deref())
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
