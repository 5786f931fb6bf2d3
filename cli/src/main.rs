use std::process;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use collection::{
    runner::{filter_scenarios, run_scenarios, SuiteReport},
    scenarios::catalog,
    ApiConfig,
};
use indicatif::{ProgressBar, ProgressDrawTarget};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code for a run that never started because configuration is missing.
const CONFIG_ERROR_EXIT_CODE: i32 = 2;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Only run scenarios whose name contains this (repeatable)
    #[arg(short, long)]
    scenario: Vec<String>,

    /// Number of scenarios to run at once
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,

    /// List scenario names and exit
    #[arg(short, long, default_value_t = false)]
    list: bool,

    /// Print the suite report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Per-request timeout, overriding RIJKSMUSEUM_TIMEOUT_SECS
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(suite: &SuiteReport) {
    for report in &suite.reports {
        let status = if report.passed() { "ok  " } else { "FAIL" };
        println!("{status} {} ({} ms)", report.name, report.duration_ms);
        for check in report.failed_checks() {
            match &check.detail {
                Some(detail) => println!("       - {}: {detail}", check.name),
                None => println!("       - {}", check.name),
            }
        }
        if let Some(error) = &report.error {
            println!("       ! {error}");
        }
    }
    println!(
        "{} passed, {} failed, {} total.",
        suite.passed,
        suite.failed,
        suite.reports.len()
    );
}

fn run(args: Args, config: ApiConfig) -> Result<bool> {
    let config = match args.timeout_secs {
        Some(secs) => config.with_timeout(Duration::from_secs(secs.max(1))),
        None => config,
    };
    let scenarios = filter_scenarios(catalog(), args.scenario.as_slice());
    if scenarios.is_empty() {
        println!("No scenarios match {:?}.", args.scenario);
        return Ok(false);
    }
    debug!(base_url = config.base_url(), "Loaded configuration.");

    let bar = ProgressBar::new(scenarios.len() as u64);
    if args.json {
        bar.set_draw_target(ProgressDrawTarget::hidden());
    }
    let suite = run_scenarios(&config, &scenarios, args.jobs, |report| {
        bar.set_message(report.name.clone());
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suite)?);
    } else {
        print_summary(&suite);
    }
    Ok(suite.all_passed())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list {
        for scenario in catalog() {
            println!("{}", scenario.name());
        }
        return;
    }

    // A missing .env file is fine; the variables may come from the shell.
    let _ = dotenv::dotenv();
    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(CONFIG_ERROR_EXIT_CODE);
        }
    };

    match run(args, config) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}
