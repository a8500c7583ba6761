//! Attrition CLI - build attrition KPI reports from HR CSV exports
//!
//! # Main Commands
//!
//! ```bash
//! attrition report --observations obs.csv --offices offices.csv --positions positions.csv
//! attrition serve                   # Start HTTP server (port 3000)
//! attrition kpis                    # List available KPIs
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! attrition normalize --observations obs.csv   # Typed rows and rejected rows
//! attrition snapshot --observations obs.csv    # Latest state per employee
//! ```

use attrition::{
    load_dimensions, normalize_batch, prepare, read_csv, report_from_files, Kpi, ReportOptions,
    TieBreak,
};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "attrition")]
#[command(about = "Compute employee attrition KPIs from yearly HR observations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input files shared by the pipeline commands.
#[derive(Args)]
struct Inputs {
    /// Observations CSV (one row per employee per year)
    #[arg(long)]
    observations: PathBuf,

    /// Offices dimension CSV
    #[arg(long)]
    offices: Option<PathBuf>,

    /// Job positions dimension CSV
    #[arg(long)]
    positions: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → snapshot → KPI report JSON
    Report {
        #[command(flatten)]
        inputs: Inputs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// KPIs to compute, repeatable (default: all)
        #[arg(long = "kpi", value_enum)]
        kpis: Vec<Kpi>,

        /// Winner when an employee has several rows for their latest year
        #[arg(long, value_enum, default_value_t = TieBreak::KeepFirst)]
        tie_break: TieBreak,

        /// Skip report schema validation
        #[arg(long)]
        no_validate: bool,

        /// Compute KPIs on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Reduce observations to the latest state per employee
    Snapshot {
        #[command(flatten)]
        inputs: Inputs,

        #[arg(long, value_enum, default_value_t = TieBreak::KeepFirst)]
        tie_break: TieBreak,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize observations and list rejected rows
    Normalize {
        /// Observations CSV
        #[arg(long)]
        observations: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available KPIs
    Kpis,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "ATTRITION_PORT", default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            inputs,
            output,
            kpis,
            tie_break,
            no_validate,
            sequential,
        } => {
            let options = ReportOptions {
                kpis: if kpis.is_empty() { Kpi::ALL.to_vec() } else { kpis },
                tie_break,
                validate_output: !no_validate,
                parallel: !sequential,
            };
            cmd_report(&inputs, &options, output.as_deref())
        }

        Commands::Snapshot {
            inputs,
            tie_break,
            output,
        } => cmd_snapshot(&inputs, tie_break, output.as_deref()),

        Commands::Normalize {
            observations,
            output,
        } => cmd_normalize(&observations, output.as_deref()),

        Commands::Kpis => cmd_kpis(),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_report(
    inputs: &Inputs,
    options: &ReportOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", inputs.observations.display());

    let report = report_from_files(
        &inputs.observations,
        inputs.offices.as_deref(),
        inputs.positions.as_deref(),
        options,
    )?;

    let stats = &report.stats;
    eprintln!("\n📊 Summary:");
    eprintln!("   Rows:         {}", stats.raw_rows);
    eprintln!("   Observations: {}", stats.observations);
    eprintln!("   Employees:    {}", stats.employees);
    if stats.parse_error_count > 0 || stats.integrity_warning_count > 0 {
        eprintln!(
            "   ⚠️  {} rejected rows, {} integrity warnings",
            stats.parse_error_count, stats.integrity_warning_count
        );
    }

    write_output(&report.to_json_pretty()?, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_snapshot(
    inputs: &Inputs,
    tie_break: TieBreak,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dims = load_dimensions(inputs.offices.as_deref(), inputs.positions.as_deref())?;
    let parsed = read_csv(&inputs.observations)?;
    let prepared = prepare(&parsed.records, &dims, tie_break);

    let json = serde_json::to_string_pretty(&json!({
        "employees": prepared.snapshot.records,
        "warnings": prepared.integrity_warnings(),
    }))?;
    write_output(&json, output)
}

fn cmd_normalize(
    observations: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = read_csv(observations)?;
    let normalized = normalize_batch(&parsed.records);

    eprintln!(
        "✅ {} observations, {} rejected",
        normalized.observations.len(),
        normalized.errors.len()
    );

    let errors: Vec<String> = normalized.errors.iter().map(|e| e.to_string()).collect();
    let json = serde_json::to_string_pretty(&json!({
        "observations": normalized.observations,
        "errors": errors,
    }))?;
    write_output(&json, output)
}

fn cmd_kpis() -> Result<(), Box<dyn std::error::Error>> {
    for kpi in Kpi::ALL {
        println!("{:<22} {}", kpi.name(), kpi.description());
    }
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    attrition::server::start_server(port).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
