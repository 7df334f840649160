// Command-line front end.
//
// Builds the working set once, then answers a single query per run:
// - `search`, `cities`, `regions` and `stats` mirror the dashboard's API,
// - `summary` prints the global stats with the weekly KPI table.
// Output is a markdown table by default or pretty JSON with `--json`.
use clap::{Parser, Subcommand};
use glp_report::output;
use glp_report::reports::kpi_summary;
use glp_report::util::format_int;
use glp_report::{Config, ErrorBody, GlpError, PipelineReport, PriceService, WorkingSet};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glp-report")]
#[command(about = "Latest GLP resale prices and weekly KPIs")]
struct Args {
    /// Semicolon-separated price survey file
    #[arg(long, env = "GLP_DATA_PATH", default_value = glp_report::config::DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Days kept before the newest collection date
    #[arg(long, env = "GLP_DAYS_BACK", default_value_t = glp_report::config::DEFAULT_DAYS_BACK)]
    days_back: u64,

    /// Weeks of KPI history
    #[arg(long, env = "GLP_WEEKS", default_value_t = glp_report::config::DEFAULT_WEEKS)]
    weeks: usize,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Newest prices, optionally for one region and city
    Search {
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Cities present in the working set
    Cities,
    /// Region codes present in the working set
    Regions,
    /// KPIs for a city, a region or the whole set
    Stats {
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    /// Global summary with the weekly KPI table
    Summary {
        /// Also write the summary as JSON to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn print_load_report(report: &PipelineReport) {
    let c = &report.clean;
    eprintln!(
        "Processing dataset... ({} rows loaded, {} kept after cleaning)",
        format_int(c.total_rows),
        format_int(c.kept)
    );
    eprintln!(
        "Note: {} rows skipped (date {}, price {}, city {}, other product {}, duplicate {}).",
        format_int(c.dropped()),
        format_int(c.invalid_date),
        format_int(c.invalid_price),
        format_int(c.missing_municipality),
        format_int(c.other_product),
        format_int(c.duplicates)
    );
    if let (Some(start), Some(end)) = (report.window_start, report.window_end) {
        eprintln!(
            "Window {} to {}: {} rows, {} latest prices.\n",
            start.format("%d/%m/%Y"),
            end.format("%d/%m/%Y"),
            format_int(report.windowed),
            format_int(report.reduced)
        );
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config {
        data_path: args.data,
        days_back: args.days_back,
        weeks: args.weeks,
        ..Config::default()
    };
    let (set, report) = WorkingSet::build(&config.data_path, config.days_back)?;
    print_load_report(&report);
    let service = PriceService::new(Arc::new(set), config);

    match args.command {
        Command::Search {
            region,
            city,
            limit,
        } => {
            let rows = service.search(region.as_deref(), city.as_deref(), limit)?;
            if args.json {
                output::print_json(&rows)?;
            } else {
                output::print_table(&rows);
                println!("({} results)", format_int(rows.len()));
            }
        }
        Command::Cities => {
            let cities = service.list_cities();
            if args.json {
                output::print_json(&cities)?;
            } else {
                output::print_list("Cities", &cities);
            }
        }
        Command::Regions => {
            let regions = service.list_regions();
            if args.json {
                output::print_json(&regions)?;
            } else {
                output::print_list("Regions", &regions);
            }
        }
        Command::Stats { region, city } => {
            let stats = service.stats(region.as_deref(), city.as_deref())?;
            if args.json {
                output::print_json(&stats)?;
            } else {
                output::print_table(&output::stats_lines(&stats));
            }
        }
        Command::Summary { out } => {
            let summary = kpi_summary(service.working_set().records(), service.config().weeks);
            if let Some(path) = out {
                output::write_json(&path, &summary)?;
                eprintln!("Summary written to {}", path.display());
            }
            if args.json {
                output::print_json(&summary)?;
            } else {
                println!("Summary Stats\n");
                output::print_table(&output::summary_lines(&summary));
                println!("Weekly KPIs\n");
                output::print_table(&output::week_rows(&summary));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let body = match e.downcast_ref::<GlpError>() {
                Some(glp) => ErrorBody::from(glp),
                None => ErrorBody {
                    category: "outputError".to_string(),
                    message: e.to_string(),
                },
            };
            error!("{}", body.message);
            eprintln!(
                "{}",
                serde_json::to_string(&body).unwrap_or_else(|_| body.message.clone())
            );
            ExitCode::FAILURE
        }
    }
}
