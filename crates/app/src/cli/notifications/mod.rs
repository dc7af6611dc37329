use clap::{Args, Subcommand};

mod analytics;

#[derive(Debug, Args)]
pub(crate) struct NotificationsCommand {
    #[command(subcommand)]
    command: NotificationsSubcommand,
}

#[derive(Debug, Subcommand)]
enum NotificationsSubcommand {
    /// Print open, click and conversion rates
    Analytics(analytics::AnalyticsArgs),
}

pub(crate) async fn run(command: NotificationsCommand) -> Result<(), String> {
    match command.command {
        NotificationsSubcommand::Analytics(args) => analytics::run(args).await,
    }
}
