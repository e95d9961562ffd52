use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use parkpay::application::checkout::{CheckoutOutcome, CheckoutService};
use parkpay::domain::card::{Field, PaymentInput, YearMonth, format_card_number};
use parkpay::domain::order::{Order, OrderForm};
use parkpay::domain::payment::CheckoutSession;
use parkpay::error::CheckoutError;
use parkpay::infrastructure::recording_notifier::RecordingNotifier;
use parkpay::infrastructure::simulated_gateway::SimulatedGateway;
use parkpay::interfaces::csv::outcome_writer::{OutcomeWriter, PaymentOutcome};
use parkpay::interfaces::csv::payment_reader::PaymentAttemptReader;
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Date to treat as today (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the fields of a card payment form
    Validate {
        /// Card number, spaces allowed
        #[arg(long)]
        number: String,
        /// Card holder name
        #[arg(long)]
        holder: String,
        /// Expiry month (1-12)
        #[arg(long)]
        month: u32,
        /// Expiry year, two digits
        #[arg(long)]
        year: u32,
        /// Security code
        #[arg(long)]
        cvv: String,
    },
    /// Validate an order JSON file and start its checkout
    Order {
        /// Order form as JSON
        input: PathBuf,
    },
    /// Run a CSV of card payment attempts through the simulated gateway
    Pay {
        /// Payment attempts CSV file
        input: PathBuf,

        /// Amount charged for rows without one
        #[arg(long, default_value = "10000")]
        total: Decimal,

        /// Simulated gateway latency per payment, in milliseconds
        #[arg(long, default_value_t = 0)]
        latency_ms: u64,
    },
}

const FORM_FIELDS: [Field; 4] = [Field::CardNumber, Field::Expiry, Field::Cvv, Field::HolderName];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let today = cli.today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let reference = YearMonth::from_date(today);

    match cli.command {
        Command::Validate {
            number,
            holder,
            month,
            year,
            cvv,
        } => {
            let input = PaymentInput {
                card_number: number,
                holder_name: holder,
                expiry_month: month,
                expiry_year: year,
                cvv,
            };
            validate(&input, reference)
        }
        Command::Order { input } => {
            let gateway = SimulatedGateway::new().with_reference(reference);
            let notifier = RecordingNotifier::new();
            let service = CheckoutService::new(Box::new(gateway), Box::new(notifier));
            place_order(&service, input, today).await
        }
        Command::Pay {
            input,
            total,
            latency_ms,
        } => {
            let gateway = SimulatedGateway::new()
                .with_reference(reference)
                .with_latency(Duration::from_millis(latency_ms));
            let notifier = RecordingNotifier::new();
            let service = CheckoutService::new(Box::new(gateway), Box::new(notifier));
            pay(&service, input, total, today).await
        }
    }
}

fn validate(input: &PaymentInput, reference: YearMonth) -> Result<()> {
    let result = input.validate_at(reference);

    println!("brand: {}", input.brand());
    println!("number: {}", format_card_number(&input.card_number));
    for field in FORM_FIELDS {
        match result.reason_for(field) {
            Some(reason) => println!("{}: {}", field, reason),
            None => println!("{}: ok", field),
        }
    }

    match result.first_failure() {
        Some(failure) => Err(miette!("payment input rejected ({})", failure)),
        None => Ok(()),
    }
}

async fn place_order(service: &CheckoutService, input: PathBuf, today: NaiveDate) -> Result<()> {
    let file = File::open(input).into_diagnostic()?;
    let form: OrderForm = serde_json::from_reader(file).into_diagnostic()?;
    let order = Order::try_from(form).into_diagnostic()?;

    let summary = match service.place_order(&order, today).await.into_diagnostic()? {
        CheckoutOutcome::Completed {
            order_id,
            total,
            quantity,
        } => serde_json::json!({
            "status": "exito",
            "id_compra": order_id,
            "total": total,
            "cantidad": quantity,
        }),
        CheckoutOutcome::Redirect {
            session,
            checkout_url,
        } => serde_json::json!({
            "status": "redireccion",
            "checkout_url": checkout_url,
            "preference_id": session.preference_id,
            "id_compra": session.order_id,
            "total": session.total,
            "cantidad": session.quantity,
        }),
    };

    println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?);
    Ok(())
}

async fn pay(
    service: &CheckoutService,
    input: PathBuf,
    default_total: Decimal,
    today: NaiveDate,
) -> Result<()> {
    let reference = YearMonth::from_date(today);
    let file = File::open(input).into_diagnostic()?;
    let reader = PaymentAttemptReader::new(file);

    let stdout = io::stdout();
    let mut writer = OutcomeWriter::new(stdout.lock());

    for (row, attempt_result) in (1u64..).zip(reader.attempts()) {
        let attempt = match attempt_result {
            Ok(attempt) => attempt,
            Err(e) => {
                eprintln!("Error reading payment attempt: {}", e);
                continue;
            }
        };

        let input = attempt.input();
        let session = CheckoutSession {
            order_id: row,
            preference_id: format!("BATCH-{}", row),
            visit_date: today,
            total: attempt.amount.unwrap_or(default_total),
            quantity: 1,
        };

        let outcome = match service.submit_payment(&session, &input, reference).await {
            Ok(response) => PaymentOutcome::from_response(&input, &response),
            Err(CheckoutError::InvalidPayment(failure)) => {
                eprintln!("Payment attempt {} rejected: {}", row, failure);
                PaymentOutcome::invalid(&input, failure)
            }
            Err(e) => {
                eprintln!("Error processing payment attempt {}: {}", row, e);
                continue;
            }
        };
        writer.write_outcome(&outcome).into_diagnostic()?;
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
