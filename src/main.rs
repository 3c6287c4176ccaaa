#![allow(clippy::result_large_err)]

use dues_ledger::{
    config::{self, database},
    core::{
        export,
        query::PaymentQuery,
        summary::{format_currency, summarize},
    },
    errors::Result,
    store::{Collection, Snapshot, Store},
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!(
        "Configured {} level(s), currency {}",
        app_config.levels.len(),
        app_config.currency
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    let store = Store::new(db);

    // 5. Follow the roster and the payment table until interrupted
    let students = store.subscribe(
        Collection::Students,
        |snapshot| info!("Roster now has {} student(s)", snapshot.len()),
        |e| error!("{}", e),
    );

    let currency = app_config.currency.clone();
    let payments = store.subscribe(
        Collection::Payments,
        move |snapshot| {
            if let Snapshot::Payments(records) = snapshot {
                let records: Vec<_> = records.into_values().collect();
                let summary = summarize(&records, 0, 0);
                info!(
                    "{} payment(s): {} paid ({}), {} pending, {} failed",
                    records.len(),
                    summary.paid_count,
                    format_currency(summary.total_paid, &currency),
                    summary.pending_count,
                    summary.failed_count
                );
            }
        },
        |e| error!("{}", e),
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down.");

    students.close();
    payments.close();

    // 6. Leave a CSV snapshot of both tables behind
    export::export_students(store.db(), &app_config.export_dir).await?;
    export::export_payments(
        store.db(),
        &app_config.export_dir,
        &app_config.currency,
        &PaymentQuery::default(),
    )
    .await?;
    Ok(())
}
