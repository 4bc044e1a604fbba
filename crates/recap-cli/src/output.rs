//! Console output.

use chrono::Local;

use recap_runtime::{Collected, Report, SkipCounts};

const SHOWN_FILES: usize = 5;

/// Header and newest files, printed while the backend is still working.
pub fn print_summary(collected: &Collected, days: u32) {
    let files = &collected.discovery.files;

    println!();
    println!("=== Recent files ===");
    println!("Folder: {}", collected.discovery.root.display());
    println!("Period: last {} days", days);
    println!("Files updated: {}", files.len());

    if !files.is_empty() {
        println!();
        for file in files.iter().take(SHOWN_FILES) {
            println!(
                "- {} ({})",
                file.path.display(),
                file.modified_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }
        if files.len() > SHOWN_FILES {
            println!("... {} more", files.len() - SHOWN_FILES);
        }
    }

    print_skipped(&collected.skipped());
}

fn print_skipped(skipped: &SkipCounts) {
    if skipped.total() == 0 {
        return;
    }
    println!();
    println!(
        "Skipped {} entries (unreadable directory entries: {}, undecodable files: {}, too large: {})",
        skipped.total(),
        skipped.walk,
        skipped.unreadable,
        skipped.too_large
    );
}

pub fn print_analysis(report: &Report) {
    println!();
    println!("=== Analysis ({} / {}) ===", report.backend, report.model);
    println!("{}", report.analysis.trim_end());
}
