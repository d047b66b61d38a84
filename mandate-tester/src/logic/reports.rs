//! Report rendering for campaign runs.

use anyhow::Result;
use colored::Colorize;
use std::time::Duration;

use super::campaign::CampaignReport;

pub fn generate_console_report(reports: &[CampaignReport], total_duration: Duration) {
    println!();
    println!("{}", "📊 Pipeline Campaign Results".bright_cyan().bold());
    println!("{}", "=============================".cyan());

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed()).count();
    let failed = total - passed;

    println!("Total campaigns: {total}");
    println!("Passed: {}", passed.to_string().green());
    println!("Failed: {}", failed.to_string().red());
    println!("Total time: {total_duration:?}");
    println!();

    for report in reports {
        let status = if report.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        println!(
            "{} {} seed {}",
            status,
            report.role.to_string().bold(),
            report.seed
        );
        println!(
            "   Days completed: {}  Service calls: {}",
            report.days.len(),
            report.service_calls
        );
        let degraded = report.days.iter().filter(|d| d.degraded).count();
        let skipped = report.days.iter().filter(|d| d.skipped).count();
        println!("   Degraded days: {degraded}  Skipped reveals: {skipped}");
        if let Some(headline) = &report.epilogue_headline {
            println!("   Epilogue: {headline}");
        }
        if !report.failures.is_empty() {
            println!("   Failures:");
            for failure in &report.failures {
                println!("     • {}", failure.red());
            }
        }
        println!();
    }
}

pub fn generate_json_report(reports: &[CampaignReport]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(reports)?;
    println!("{json_output}");
    Ok(())
}
