//! Shared printing for engine reports

use colored::Colorize;
use overlay_core::{BuildReport, LoadOutcome, MergeStats, VaultReport};

pub fn print_merge_line(label: &str, stats: &MergeStats) {
    println!(
        "   {} {:<16} {} linked, {} copied, {} overwritten, {} skipped",
        "+".green(),
        label,
        stats.linked,
        stats.copied,
        stats.overwritten,
        stats.skipped
    );
}

pub fn print_vault_report(report: &VaultReport) {
    println!(
        "{} Saved {} exception file(s)",
        "OK".green().bold(),
        report.saved.len()
    );
    for path in &report.saved {
        println!("   {} {}", "+".green(), path);
    }
    for failure in &report.failed {
        println!("   {} {}: {}", "!".red(), failure.path, failure.reason);
    }
}

pub fn print_load_outcome(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Absent => {
            println!("{} No exceptions vault, nothing to restore", "--".dimmed());
        }
        LoadOutcome::Restored(stats) => {
            println!(
                "{} Restored {} exception file(s)",
                "OK".green().bold(),
                stats.copied
            );
        }
    }
}

pub fn print_build_report(heading: &str, report: &BuildReport) {
    if let Some(saved) = &report.saved {
        print_vault_report(saved);
    }

    println!("{} {}:", "OK".green().bold(), heading);
    if let Some(core) = &report.core {
        print_merge_line("core", core);
    }
    for (name, stats) in &report.modules {
        print_merge_line(name, stats);
    }

    let totals = report.totals();
    println!(
        "   {} files projected, {} skipped",
        totals.projected().to_string().cyan(),
        totals.skipped
    );

    if let Some(outcome) = &report.exceptions {
        print_load_outcome(outcome);
    }
}
