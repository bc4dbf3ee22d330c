mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, check, watch};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    match commands.command {
        Commands::Watch { target, interval, timeout } => {
            watch::watch(&target, interval, timeout).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { target, timeout } => {
            if check::check(&target, timeout).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
