use anyhow::Result;
use clap::Parser;

mod cli;

use cli::commands::{self, MedicationsCommand, SchedulesCommand, SignupsCommand, StudentsCommand};
use cli::{Cli, Commands};
use school_health_confirm::{config, init_config, init_telemetry, shutdown_telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config()?;
    init_telemetry(&settings.observability)?;
    init_config()?;

    let result = match cli.command {
        None => commands::show_how_to_use(),
        Some(Commands::Signups { command }) => SignupsCommand::new(command).execute(settings).await,
        Some(Commands::Students { command }) => StudentsCommand::new(command).execute(settings).await,
        Some(Commands::Medications { command }) => MedicationsCommand::new(command).execute(settings).await,
        Some(Commands::Schedules { command }) => SchedulesCommand::new(command).execute(settings).await,
    };

    shutdown_telemetry();
    result
}
