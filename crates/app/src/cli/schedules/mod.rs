use clap::{Args, Subcommand};

mod sweep;

#[derive(Debug, Args)]
pub(crate) struct SchedulesCommand {
    #[command(subcommand)]
    command: SchedulesSubcommand,
}

#[derive(Debug, Subcommand)]
enum SchedulesSubcommand {
    /// Expire passed restock dates and send delay notices
    Sweep(sweep::SweepArgs),
}

pub(crate) async fn run(command: SchedulesCommand) -> Result<(), String> {
    match command.command {
        SchedulesSubcommand::Sweep(args) => sweep::run(args).await,
    }
}
