use clap::Args;
use restock_app::domain::reconciliation::ReconciliationService;

use crate::cli::{ContextArgs, KeyArgs};

#[derive(Debug, Args)]
pub(crate) struct SetStockArgs {
    #[command(flatten)]
    key: KeyArgs,

    /// New quantity available
    #[arg(long)]
    quantity: u64,

    #[command(flatten)]
    context: ContextArgs,
}

pub(crate) async fn run(args: SetStockArgs) -> Result<(), String> {
    let key = args.key.key();
    let context = args.context.connect().await?;

    let update = context
        .reconciliation
        .set_stock(key, args.quantity)
        .await
        .map_err(|error| format!("failed to set stock: {error}"))?;

    println!("key: {key}");
    println!("previous: {}", update.change.previous);
    println!("current: {}", update.change.current);
    println!(
        "backorders_fulfilled: {}",
        update.reconciliation.backorders_fulfilled
    );
    println!(
        "notifications_sent: {}",
        update.reconciliation.notifications_sent
    );
    println!(
        "remaining_quantity: {}",
        update.reconciliation.remaining_quantity
    );

    Ok(())
}
