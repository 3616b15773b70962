use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::PolicyReport;

pub fn generate_console_report(
    out: &mut dyn Write,
    reports: &[PolicyReport],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Lifestyle Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed).count();
    let lives: usize = reports.iter().map(|r| r.lives_run).sum();

    writeln!(out, "Lifestyles: {total}")?;
    writeln!(out, "Lives simulated: {lives}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for report in reports {
        let status = if report.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, report.policy.label().bold())?;
        writeln!(
            out,
            "   Lives: {}/{} ended",
            report.lives_ended, report.lives_run
        )?;
        writeln!(
            out,
            "   Mean age: real {:.1}y, bio {:.1}y ({} lost)",
            report.mean_real_age_years,
            report.mean_bio_age_years,
            years_lost_label(report.mean_years_lost)
        )?;
        writeln!(
            out,
            "   Mean units: {:.0} | collapses: {:.1} | refusals: {:.1}",
            report.mean_units, report.mean_collapses, report.mean_refusals
        )?;
        writeln!(out, "   Average time: {:?}", report.average_duration)?;
        if !report.causes.is_empty() {
            let causes = report
                .causes
                .iter()
                .map(|(cause, count)| format!("{cause} ×{count}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "   Causes: {causes}")?;
        }
        if !report.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &report.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    if let (Some(longest), Some(shortest)) = (
        reports
            .iter()
            .max_by(|a, b| a.mean_real_age_years.total_cmp(&b.mean_real_age_years)),
        reports
            .iter()
            .min_by(|a, b| a.mean_real_age_years.total_cmp(&b.mean_real_age_years)),
    ) {
        writeln!(out, "{}", "⏳ Longevity".bright_yellow().bold())?;
        writeln!(out, "{}", "===========".yellow())?;
        writeln!(
            out,
            "Longest lived: {} ({:.1}y)",
            longest.policy.label().green(),
            longest.mean_real_age_years
        )?;
        writeln!(
            out,
            "Shortest lived: {} ({:.1}y)",
            shortest.policy.label().yellow(),
            shortest.mean_real_age_years
        )?;
    }
    Ok(())
}

fn years_lost_label(years: f64) -> colored::ColoredString {
    let text = format!("{years:.1}y");
    if years > 10.0 {
        text.red()
    } else if years > 2.0 {
        text.yellow()
    } else {
        text.green()
    }
}

pub fn generate_json_report(out: &mut dyn Write, reports: &[PolicyReport]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(reports)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, reports: &[PolicyReport]) -> Result<()> {
    writeln!(out, "# Smokesim Lifestyle Results\n")?;

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Lifestyles**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}\n", total - passed)?;

    writeln!(
        out,
        "| Lifestyle | Lives | Real age | Bio age | Years lost | Units |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for report in reports {
        writeln!(
            out,
            "| {} | {} | {:.1} | {:.1} | {:.1} | {:.0} |",
            report.policy.label(),
            report.lives_run,
            report.mean_real_age_years,
            report.mean_bio_age_years,
            report.mean_years_lost,
            report.mean_units
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Detailed Results\n")?;
    for report in reports {
        let status = if report.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, report.policy.label())?;
        for (cause, count) in &report.causes {
            writeln!(out, "- {cause}: {count}")?;
        }
        if !report.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &report.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
