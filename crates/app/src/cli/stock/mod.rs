use clap::{Args, Subcommand};

mod restock;
mod set;

#[derive(Debug, Args)]
pub(crate) struct StockCommand {
    #[command(subcommand)]
    command: StockSubcommand,
}

#[derive(Debug, Subcommand)]
enum StockSubcommand {
    Set(set::SetStockArgs),
    Restock(restock::RestockArgs),
}

pub(crate) async fn run(command: StockCommand) -> Result<(), String> {
    match command.command {
        StockSubcommand::Set(args) => set::run(args).await,
        StockSubcommand::Restock(args) => restock::run(args).await,
    }
}
