use chrono::Utc;
use clap::Parser;
use donation_intake::application::intake::DonationIntake;
use donation_intake::config::IntakeConfig;
use donation_intake::domain::ports::InvoiceStore;
use donation_intake::error::{IntakeError, Result as IntakeResult};
use donation_intake::infrastructure::in_memory::InMemoryBackend;
use donation_intake::infrastructure::seed::LedgerSeed;
use donation_intake::interfaces::csv::invoice_writer::InvoiceWriter;
use donation_intake::interfaces::json::command_reader::{Command, CommandReader};
use donation_intake::telemetry;
use miette::{IntoDiagnostic, Result};
use serde_json::{Value, json};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Commands to process, one JSON object per line
    input: PathBuf,

    /// JSON file seeding products, children, contracts and invoices
    #[arg(long, env = "INTAKE_LEDGER")]
    ledger: Option<PathBuf>,

    /// Write the final invoice lines to this CSV file
    #[arg(long)]
    invoices: Option<PathBuf>,

    /// Minutes before an unpaid merged donation is rolled back
    #[arg(long, env = "INTAKE_ROLLBACK_MINUTES", default_value_t = 15)]
    rollback_minutes: i64,

    /// Currency shown in donor notifications
    #[arg(long, env = "INTAKE_CURRENCY", default_value = "CHF")]
    currency: String,

    /// Log level or filter directive
    #[arg(long, env = "INTAKE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level).into_diagnostic()?;

    let seed = match &cli.ledger {
        Some(path) => LedgerSeed::load(path).into_diagnostic()?,
        None => LedgerSeed::default(),
    };
    let backend = InMemoryBackend::from_seed(seed);
    let config = IntakeConfig::default()
        .with_rollback_minutes(cli.rollback_minutes)
        .with_currency(cli.currency);
    let intake = DonationIntake::new(backend.ports(), config);

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for command in reader.commands() {
        let response = match command {
            Ok(command) => match execute(&intake, command).await {
                Ok(value) => value,
                Err(e) => {
                    error!("Error processing command: {}", e);
                    error_response(&e)
                }
            },
            Err(e) => {
                error!("Error reading command: {}", e);
                error_response(&e)
            }
        };
        writeln!(out, "{response}").into_diagnostic()?;
    }

    if let Some(path) = cli.invoices {
        let invoices = backend.ledger.all_invoices().await.into_diagnostic()?;
        let file = File::create(path).into_diagnostic()?;
        InvoiceWriter::new(file)
            .write_invoices(&invoices)
            .into_diagnostic()?;
    }

    Ok(())
}

async fn execute(intake: &DonationIntake, command: Command) -> IntakeResult<Value> {
    let value = match command {
        Command::Donate { payload } => serde_json::to_value(intake.post_invoice(payload).await?)?,
        Command::Pay { invoice_id } => {
            let notification = intake.confirm_payment(invoice_id).await?;
            json!({ "invoice": invoice_id, "paid": true, "notification": notification })
        }
        Command::Notify { invoice_id } => {
            let notification = intake.send_mobile_notification(invoice_id).await?;
            json!({ "invoice": invoice_id, "notification": notification })
        }
        Command::RunJobs { at } => {
            let executed = intake.run_due_jobs(at.unwrap_or_else(Utc::now)).await?;
            json!({ "jobs": executed })
        }
    };
    Ok(value)
}

fn error_response(e: &IntakeError) -> Value {
    json!({ "error": e.to_string(), "user_facing": e.is_user_facing() })
}
