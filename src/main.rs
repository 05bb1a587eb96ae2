use clap::Parser;
use donation_beacon::application::dispatcher::BeaconDispatcher;
use donation_beacon::application::events::{EventBus, HostEvent};
use donation_beacon::config::TrackingConfig;
use donation_beacon::domain::flag::BeaconFlag;
use donation_beacon::domain::ports::{AuditLogBox, BeaconTransportBox, FlagStore, FlagStoreBox};
use donation_beacon::infrastructure::http::ReqwestTransport;
use donation_beacon::infrastructure::in_memory::{
    InMemoryAuditLog, InMemoryFlagStore, InMemoryPaymentRepository, RecordingTransport,
};
#[cfg(feature = "storage-rocksdb")]
use donation_beacon::infrastructure::rocksdb::RocksDBStore;
use donation_beacon::interfaces::csv::event_reader::EventReader;
use donation_beacon::interfaces::csv::flag_writer::{FlagRow, FlagWriter};
use donation_beacon::interfaces::csv::payment_reader::PaymentReader;
use donation_beacon::logging;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Event log CSV (payment status changes and admin page renders)
    events: PathBuf,

    /// Payments CSV with the current state of every payment
    #[arg(long)]
    payments: PathBuf,

    /// JSON file with the analytics settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the tracking ID from the config file
    #[arg(long, env = "GA_TRACKING_ID")]
    tracking_id: Option<String>,

    /// Path to persistent database for flags and notes (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Record beacon URLs in the log instead of sending them
    #[arg(long)]
    dry_run: bool,
}

/// Returns the flag store handed to the dispatcher, a second handle for the
/// final report, and the audit log.
fn open_stores(db_path: Option<PathBuf>) -> Result<(FlagStoreBox, FlagStoreBox, AuditLogBox)> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        return Ok((
            Box::new(store.clone()),
            Box::new(store.clone()),
            Box::new(store),
        ));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    let flags = InMemoryFlagStore::new();
    Ok((
        Box::new(flags.clone()),
        Box::new(flags),
        Box::new(InMemoryAuditLog::new()),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TrackingConfig::from_json_file(path).into_diagnostic()?,
        None => TrackingConfig::default(),
    };
    if let Some(tracking_id) = cli.tracking_id {
        config.tracking_id = Some(tracking_id);
    }

    // Load the payment snapshot
    let payments = InMemoryPaymentRepository::new();
    let file = File::open(&cli.payments).into_diagnostic()?;
    for row in PaymentReader::new(file).payments() {
        match row {
            Ok(row) => {
                payments.insert_form(row.form.clone(), row.form_title).await;
                payments
                    .insert_payment(row.payment, row.form, row.status, row.amount)
                    .await;
            }
            Err(e) => {
                eprintln!("Error reading payment: {}", e);
            }
        }
    }

    let (flags, report_flags, audit) = open_stores(cli.db_path)?;
    let recorder = RecordingTransport::default();
    let transport: BeaconTransportBox = if cli.dry_run {
        Box::new(recorder.clone())
    } else {
        Box::new(ReqwestTransport::new())
    };

    let dispatcher = Arc::new(BeaconDispatcher::new(
        config,
        Box::new(payments.clone()),
        flags,
        audit,
        transport,
    ));
    let mut bus = EventBus::new();
    dispatcher.register(&mut bus);

    // Replay events in file order
    let file = File::open(&cli.events).into_diagnostic()?;
    for event in EventReader::new(file).events() {
        match event {
            Ok(event) => {
                // The platform stores the new status before notifying listeners.
                if let HostEvent::PaymentStatusChanged {
                    payment_id,
                    new_status,
                    ..
                } = &event
                    && !payments.set_status(payment_id, new_status.clone()).await
                {
                    tracing::warn!(%payment_id, "status change for unknown payment");
                }
                bus.publish(&event).await;
            }
            Err(e) => {
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    for url in recorder.urls() {
        eprintln!("DRY RUN: {}", url);
    }

    // Output final flag state
    let mut rows = Vec::new();
    for payment in payments.payment_ids().await {
        rows.push(FlagRow {
            completion_beacon_sent: report_flags
                .get_flag(&payment, BeaconFlag::CompletionBeaconSent)
                .await
                .into_diagnostic()?,
            refund_beacon_sent: report_flags
                .get_flag(&payment, BeaconFlag::RefundBeaconSent)
                .await
                .into_diagnostic()?,
            payment,
        });
    }

    let stdout = io::stdout();
    let mut writer = FlagWriter::new(stdout.lock());
    writer.write_flags(rows).into_diagnostic()?;

    Ok(())
}
