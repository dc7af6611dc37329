use clap::Args;
use restock_app::domain::reconciliation::ReconciliationService;

use crate::cli::ContextArgs;

#[derive(Debug, Args)]
pub(crate) struct SweepArgs {
    #[command(flatten)]
    context: ContextArgs,
}

pub(crate) async fn run(args: SweepArgs) -> Result<(), String> {
    let context = args.context.connect().await?;

    let summary = context
        .reconciliation
        .sweep_expired_schedules()
        .await
        .map_err(|error| format!("failed to sweep restock schedules: {error}"))?;

    for expired in &summary.expired {
        println!("expired: {} (was {})", expired.key, expired.expected_date);
    }

    println!("expired_count: {}", summary.expired_count());
    println!(
        "delay_notifications_sent: {}",
        summary.delay_notifications_sent
    );

    Ok(())
}
