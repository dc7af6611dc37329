use clap::Args;
use restock_app::domain::notifications::NotificationsService;

use crate::cli::ContextArgs;

#[derive(Debug, Args)]
pub(crate) struct AnalyticsArgs {
    #[command(flatten)]
    context: ContextArgs,
}

pub(crate) async fn run(args: AnalyticsArgs) -> Result<(), String> {
    let context = args.context.connect().await?;

    let rates = context
        .notifications
        .analytics()
        .await
        .map_err(|error| format!("failed to load analytics: {error}"))?;

    println!("total_sent: {}", rates.total_sent);
    println!("open_rate: {}", rates.open_rate);
    println!("click_rate: {}", rates.click_rate);
    println!("conversion_rate: {}", rates.conversion_rate);

    Ok(())
}
