use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use codepack_core::{PackSummary, PlannedFile};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::io::{self, Write};

pub fn print_summary(summary: &PackSummary, format: &str, quiet: bool) -> Result<()> {
    if format == "json" {
        return print_json(summary);
    }
    if quiet {
        return Ok(());
    }

    if summary.ignore_file_created {
        println!("{} Created default ignore file", "📝".yellow());
    }
    println!(
        "{} Output written to {}",
        "✅".green(),
        summary.output_path.display().to_string().blue()
    );
    println!(
        "{:<16} {}",
        "Files packed:".green(),
        summary.files_included.to_string().cyan()
    );
    println!(
        "{:<16} {}",
        "Content size:".green(),
        readable_size(summary.bytes_written).cyan()
    );

    let skipped = summary.files_not_text + summary.files_too_large + summary.files_unreadable;
    if skipped > 0 {
        println!(
            "{:<16} {} non-text, {} too large, {} unreadable",
            "Skipped:".yellow(),
            summary.files_not_text,
            summary.files_too_large,
            summary.files_unreadable
        );
    }
    if summary.rules_rejected > 0 {
        println!(
            "{} {} ignore rule(s) could not be parsed (run with -v for details)",
            "Warning:".yellow().bold(),
            summary.rules_rejected
        );
    }
    Ok(())
}

pub fn print_plan(planned: &[PlannedFile], format: &str, quiet: bool) -> Result<()> {
    if format == "json" {
        return print_json(&planned);
    }

    if planned.is_empty() {
        if !quiet {
            println!("{}", "(No files survive the ignore rules)".yellow());
        }
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
        Cell::new("Included").fg(Color::Green),
        Cell::new("Reason").fg(Color::Green),
    ]);
    for file in planned {
        let reason = if file.too_large {
            "over size limit".to_string()
        } else {
            file.decision.reason.to_string()
        };
        let (mark, mark_color) = if file.included {
            ("yes", Color::Green)
        } else {
            ("no", Color::Red)
        };
        table.add_row(vec![
            Cell::new(&file.path).fg(Color::Cyan),
            Cell::new(readable_size(file.size))
                .set_alignment(CellAlignment::Right)
                .fg(Color::DarkGrey),
            Cell::new(mark).fg(mark_color),
            Cell::new(reason),
        ]);
    }
    println!("{table}");

    if !quiet {
        let included = planned.iter().filter(|f| f.included).count();
        println!(
            "{} of {} candidate files would be packed.",
            included.to_string().cyan(),
            planned.len()
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let content =
        serde_json::to_string_pretty(data).context("Failed to serialize output as JSON")?;
    write_to_stdout(&content)
}

fn readable_size(bytes: u64) -> String {
    Byte::from_u64(bytes)
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
