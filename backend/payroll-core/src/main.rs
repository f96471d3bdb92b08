// src/main.rs
use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use payroll_core::documents::{GeneralReport, PaymentReceipt, RecognitionCertificate};
use payroll_core::export::{export_records, export_weekly};
use payroll_core::ingest::ingest;
use payroll_core::{Config, Dashboard, FilterSelection, SourceLoader, WorkbookSource};

// --- CLI Structure ---
#[derive(Parser)]
#[command(name = "payroll")]
#[command(about = "Extract weekly service schedules and allocate employee payments", long_about = None)]
struct Cli {
    /// Local workbook (xlsx, xls, ods). Repeatable.
    #[arg(long = "file", global = true)]
    files: Vec<PathBuf>,
    /// Workbook to download. Repeatable.
    #[arg(long = "url", global = true)]
    urls: Vec<String>,
    #[arg(long = "week", global = true)]
    weeks: Vec<String>,
    #[arg(long = "employee", global = true)]
    employees: Vec<String>,
    #[arg(long = "category", global = true)]
    categories: Vec<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distinct weeks, employees and categories found in the sources
    Filters,
    /// Dashboard tables as JSON
    Summary,
    /// Write a table as CSV
    Export {
        #[arg(value_enum)]
        table: Table,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// General financial report
    Report {
        #[arg(long)]
        json: bool,
    },
    /// Payment receipt (needs exactly one --employee and one --week)
    Receipt {
        #[arg(long)]
        json: bool,
    },
    /// Employee of the week certificate (needs exactly one --employee and one --week)
    Certificate {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Records,
    Weekly,
}

fn sources(cli: &Cli) -> Result<Vec<WorkbookSource>> {
    let mut sources: Vec<WorkbookSource> = cli.files.iter().cloned().map(WorkbookSource::Path).collect();
    for url in &cli.urls {
        match WorkbookSource::parse(url).with_context(|| format!("Invalid source URL '{}'", url))? {
            source @ WorkbookSource::Url(_) => sources.push(source),
            _ => bail!("'{}' is not an http(s) URL; use --file for local workbooks", url),
        }
    }
    if sources.is_empty() {
        bail!("No sources given; pass at least one --file or --url");
    }
    Ok(sources)
}

fn employee_week(selection: &FilterSelection) -> Result<(String, String)> {
    match selection.single_employee_week() {
        Some((employee, week)) => Ok((employee.to_string(), week.to_string())),
        None => bail!("Select exactly one --employee and one --week"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Setting tracing subscriber failed")?;

    let cli = Cli::parse();
    let config = Config::from_env().context("Loading configuration failed")?;
    info!("Configuration loaded (week prefix '{}')", config.week_prefix);

    let sources = sources(&cli)?;
    let loader = SourceLoader::http(&config).context("Building HTTP client failed")?;
    let report = ingest(&loader, &config, &sources).await;
    if report.has_failures() {
        for failure in &report.failures {
            warn!("{}", failure);
        }
        if report.failures.len() == sources.len() {
            bail!("None of the {} sources could be loaded", sources.len());
        }
    }

    let selection = FilterSelection {
        weeks: cli.weeks.clone(),
        employees: cli.employees.clone(),
        categories: cli.categories.clone(),
    };
    let dashboard = Dashboard::compute(&report.records, &selection, &config);
    if dashboard.is_empty() {
        warn!("No rows left after filtering");
    }

    match cli.command {
        Commands::Filters => {
            let filters = serde_json::json!({
                "weeks": report.records.weeks(),
                "employees": report.records.employees(),
                "categories": report.records.categories(),
            });
            println!("{}", serde_json::to_string_pretty(&filters)?);
        }
        Commands::Summary => {
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        Commands::Export { table, output } => match table {
            Table::Records => export_records(dashboard.records.records(), &output)
                .with_context(|| format!("Writing {}", output.display()))?,
            Table::Weekly => export_weekly(&dashboard.weekly, &output)
                .with_context(|| format!("Writing {}", output.display()))?,
        },
        Commands::Report { json } => {
            let report = GeneralReport::compose(&dashboard, Local::now().naive_local());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.to_text());
            }
        }
        Commands::Receipt { json } => {
            let (employee, week) = employee_week(&selection)?;
            let Some(receipt) =
                PaymentReceipt::compose(&dashboard, &employee, &week, Local::now().date_naive())
            else {
                bail!("No completed appointments for {} in {}", employee, week);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            } else {
                print!("{}", receipt.to_text());
            }
        }
        Commands::Certificate { json } => {
            let (employee, week) = employee_week(&selection)?;
            let Some(certificate) =
                RecognitionCertificate::compose(&dashboard, &employee, &week, Local::now().date_naive())
            else {
                bail!("No completed appointments for {} in {}", employee, week);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&certificate)?);
            } else {
                print!("{}", certificate.to_text());
            }
        }
    }

    Ok(())
}
