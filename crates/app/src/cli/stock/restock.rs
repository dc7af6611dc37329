use clap::Args;
use restock_app::domain::{reconciliation::ReconciliationService, stock::data::StockRequest};

use crate::cli::{ContextArgs, KeyArgs};

#[derive(Debug, Args)]
pub(crate) struct RestockArgs {
    #[command(flatten)]
    key: KeyArgs,

    /// Units received
    #[arg(long)]
    quantity: u64,

    #[command(flatten)]
    context: ContextArgs,
}

pub(crate) async fn run(args: RestockArgs) -> Result<(), String> {
    let key = args.key.key();
    let context = args.context.connect().await?;

    let summary = context
        .reconciliation
        .restock(vec![StockRequest::new(key, args.quantity)])
        .await
        .map_err(|error| format!("failed to restock: {error}"))?;

    for change in &summary.changes {
        println!("key: {}", change.key);
        println!("previous: {}", change.previous);
        println!("current: {}", change.current);
    }

    println!(
        "backorders_fulfilled: {}",
        summary.reconciliation.backorders_fulfilled()
    );
    println!(
        "notifications_sent: {}",
        summary.reconciliation.notifications_sent()
    );

    Ok(())
}
