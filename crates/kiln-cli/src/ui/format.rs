//! Formatting utilities for sizes, durations and the build summary.

use std::time::Duration;

use console::Term;
use kiln_bundler::{AssetKind, BuildReport};
use owo_colors::OwoColorize;

use super::colors_enabled;

/// Format a byte count with the most appropriate unit.
///
/// ```
/// use kiln_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration as `ms`, seconds or `Xm Ys`.
///
/// ```
/// use std::time::Duration;
/// use kiln_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the emitted assets of a build to stderr.
pub fn print_build_summary(report: &BuildReport) {
    let width = (Term::stderr().size().1 as usize).clamp(20, 80);
    let rule = "─".repeat(width);

    if colors_enabled() {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{rule}");

    for asset in &report.assets {
        let label = match &asset.kind {
            AssetKind::Entry { name } => format!("entry {name}"),
            AssetKind::SourceMap { entry } => format!("map {entry}"),
            AssetKind::Auxiliary => "asset".to_string(),
        };
        let size = format_size(asset.size as u64);
        if colors_enabled() {
            eprintln!(
                "  {} {} {} {}",
                "▸".blue(),
                asset.filename.bright_white().bold(),
                size.dimmed(),
                format!("({label})").dimmed()
            );
        } else {
            eprintln!("  ▸ {} {size} ({label})", asset.filename);
        }
    }

    eprintln!("{rule}");
    let total = format_size(report.total_size() as u64);
    let elapsed = format_duration(report.duration);
    if colors_enabled() {
        eprintln!("  {} {} in {}", "Total:".bold(), total.green(), elapsed.green());
    } else {
        eprintln!("  Total: {total} in {elapsed}");
    }
}
