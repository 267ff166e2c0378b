use std::env;
use std::process;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tour_search::{Dependencies, TourSearchError};
use tour_search_pipeline::BuildReport;
use tour_search_shared::ResultGroup;

#[derive(Parser)]
#[command(name = "tour-search")]
#[command(about = "Build and query the unified search catalog of a virtual tour", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the catalog and print a summary
    Build,
    /// Build the catalog and run one query against it
    Query {
        /// Query text; `*` lists the whole catalog
        text: String,
    },
    /// Remove the cached spreadsheet export
    ClearCache,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_report(report: &BuildReport) {
    println!("Catalog entities:   {}", report.entities);
    println!(
        "Source records:     tour {}, business {}, sheet {}",
        report.tour_records, report.business_records, report.sheet_records
    );
    println!(
        "Matched:            business {}, sheet {}",
        report.matched_business, report.matched_sheet
    );
    println!("Standalone entries: {}", report.standalone);
    println!(
        "Skipped:            {} dropped, {} filtered, {} malformed",
        report.dropped, report.filtered, report.malformed
    );
    if report.ambiguous > 0 {
        println!("Ambiguous matches:  {}", report.ambiguous);
    }
    for source in &report.unavailable_sources {
        println!("Unavailable source: {}", source);
    }
}

fn print_groups(groups: &[ResultGroup<'_>]) {
    if groups.is_empty() {
        println!("No results");
        return;
    }
    for group in groups {
        println!("{} ({})", group.label, group.count);
        for entry in &group.entries {
            let entity = entry.entity;
            let mut line = format!("  {}", entity.label);
            if !entity.subtitle.is_empty() && entity.subtitle != entity.label {
                line.push_str(&format!(" - {}", entity.subtitle));
            }
            if let Some(parent) = entry.parent_label {
                line.push_str(&format!(" [in {}]", parent));
            }
            if entry.score > 0.0 {
                line.push_str(&format!(" ({:.2})", entry.score));
            }
            println!("{}", line);
        }
    }
}

async fn run(cli: Cli) -> Result<(), TourSearchError> {
    let deps = Dependencies::new().await?;

    match cli.command {
        Commands::Build => {
            let report = deps.service.rebuild().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Query { text } => {
            deps.service.rebuild().await;
            let catalog = deps.service.current();
            let groups = deps.service.engine().search(&catalog, &text);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                print_groups(&groups);
            }
        }
        Commands::ClearCache => match &deps.sheet_cache {
            Some(cache) => {
                let removed = cache.clear().await?;
                info!(path = %cache.path().display(), removed, "Cleared sheet cache");
                if removed {
                    println!("Removed {}", cache.path().display());
                } else {
                    println!("No cache at {}", cache.path().display());
                }
            }
            None => println!("Sheet cache is disabled"),
        },
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
