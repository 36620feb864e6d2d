use anyhow::Result;
use clap::Parser;

use revenue_aggregator::config::{Cli, Commands};
use revenue_aggregator::{
    filter_report, load_report, logging, render_table, Config, ReportSummary,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_feed_args(&cli.feeds)?;

    match cli.command {
        Some(Commands::Report { query, json }) => {
            logging::init_tracing("info");
            run_report(&config, &query, json)
        }
        Some(Commands::Tui) | None => {
            // stderr output would draw over the alternate screen
            logging::init_tracing("warn");
            run_ui_mode(&config)
        }
    }
}

fn run_report(config: &Config, query: &str, json: bool) -> Result<()> {
    let report = load_report(config)?;
    let displayed = filter_report(&report, query);
    let summary = ReportSummary::new(&displayed, Some(query));
    tracing::info!("{}", summary.summary());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_table(&displayed));
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    use revenue_aggregator::ui;

    let report = load_report(config)?;
    let mut app = ui::App::new(report);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print the report: revenue-aggregator report");
    std::process::exit(1);
}
