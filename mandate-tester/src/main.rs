mod logic;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::str::FromStr;
use std::time::Instant;

use mandate_game::{Role, TokioClock};

use logic::{CampaignConfig, CampaignReport, generate_console_report, generate_json_report,
    run_campaign};

/// Scenario catalog: (key, description, fail rate, fallback streak).
const SCENARIOS: [(&str, &str, f64, u32); 3] = [
    ("smoke", "Single clean pass over every day of one campaign", 0.0, 0),
    (
        "flaky",
        "Mild injected outages; retries should absorb everything",
        0.15,
        1,
    ),
    (
        "degraded",
        "Generator stuck on placeholder scenarios; content arrives flagged",
        0.0,
        99,
    ),
];

#[derive(Debug, Parser)]
#[command(name = "mandate-tester", version = "0.1.0")]
#[command(about = "Automated QA harness for the Mandate turn pipeline - scripted generation, no network")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Role to govern (athens, north_america, mars_colony)
    #[arg(long, default_value = "athens")]
    role: String,

    /// Campaign length in days
    #[arg(long, default_value_t = 8)]
    days: u32,

    /// Retry base delay in milliseconds (kept small so injected outages
    /// back off quickly)
    #[arg(long, default_value_t = 25)]
    base_delay_ms: u64,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_scenarios {
        println!("Available scenarios:");
        for (key, description, ..) in SCENARIOS {
            println!("  {key:12} - {description}");
        }
        return Ok(());
    }

    println!("{}", "🏛️ Mandate Pipeline Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());

    let role = Role::from_str(&args.role)
        .map_err(|()| anyhow::anyhow!("unknown role: {}", args.role))?;
    let seeds = parse_seeds(&args.seeds)?;
    let scenarios = expand_scenarios(&args.scenarios)?;

    let start_time = Instant::now();
    let mut reports: Vec<CampaignReport> = Vec::new();
    for (key, _, fail_rate, fallback_streak) in scenarios {
        for &seed in &seeds {
            if args.verbose {
                println!("🧪 Running scenario {} with seed {seed}", key.bright_white());
            }
            let cfg = CampaignConfig {
                role,
                seed,
                days: args.days,
                fail_rate,
                fallback_streak,
                base_delay_ms: args.base_delay_ms,
                verbose: args.verbose,
            };
            reports.push(run_campaign(&cfg, TokioClock::new()).await);
        }
    }

    match args.report.as_str() {
        "json" => generate_json_report(&reports)?,
        _ => generate_console_report(&reports, start_time.elapsed()),
    }

    if reports.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }
    Ok(())
}

fn parse_seeds(input: &str) -> Result<Vec<u64>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| anyhow::anyhow!("invalid seed: {s}"))
        })
        .collect()
}

fn expand_scenarios(input: &str) -> Result<Vec<(&'static str, &'static str, f64, u32)>> {
    let mut selected = Vec::new();
    for token in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if token == "all" {
            selected.extend(SCENARIOS);
            continue;
        }
        match SCENARIOS.iter().find(|(key, ..)| *key == token) {
            Some(entry) => selected.push(*entry),
            None => anyhow::bail!("unknown scenario: {token}"),
        }
    }
    if selected.is_empty() {
        anyhow::bail!("no scenarios selected");
    }
    Ok(selected)
}
