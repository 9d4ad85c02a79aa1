// Output formatting for CLI commands

use crate::rotation::Backup;
use colored::*;
use std::path::Path;

/// Print the result of a forced rotation
pub fn print_rotated(active: &Path) {
    println!("{}", "✓ Log file rotated".green().bold());
    println!("  {}: {}", "Active".bold(), active.display().to_string().cyan());
}

/// Print the backups of an active log file, newest first
pub fn print_backups(active: &Path, backups: &[Backup]) {
    println!("{}: {}", "Active".bold(), active.display().to_string().cyan());

    if backups.is_empty() {
        println!("{}", "No rotated backups".yellow());
        return;
    }

    for backup in backups {
        let name = backup
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let size = std::fs::metadata(&backup.path).map(|m| m.len()).unwrap_or(0);
        let kind = if backup.compressed {
            "gzip".dimmed()
        } else {
            "plain".normal()
        };

        println!(
            "  {}  {:>10}  {:<5}  {}",
            backup.time.format("%Y-%m-%d %H:%M:%S%.3f"),
            format_bytes(size),
            kind,
            name
        );
    }
}

/// Format a byte count in human-readable form
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
