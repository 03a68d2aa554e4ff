use crate::chart::{self, ChartData, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::core::{CleanOptions, FileReport, Pipeline};
use crate::error::{CleanError, CleanResult};
use crate::parser;
use crate::types::{Table, UploadedFile, Value};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Widest bar drawn by the terminal chart
const BAR_WIDTH: usize = 40;
/// Rows shown by the terminal chart
const CHART_ROWS: usize = 20;

/// Display text for a preview cell
fn cell_text(value: &Value) -> String {
    match value {
        Value::Missing => "NaN".to_string(),
        other => other.to_string(),
    }
}

/// Render a table as aligned text lines: header, separator, one line per row
fn format_table(table: &Table) -> Vec<String> {
    let index_width = table.row_count().saturating_sub(1).to_string().len();
    let rows: Vec<Vec<String>> = table
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            rows.iter()
                .map(|r| r[idx].chars().count())
                .chain(std::iter::once(col.name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| format!("{:>w$}", col.name, w = *w))
        .collect();
    lines.push(format!("{:>iw$}  {}", "", header.join("  "), iw = index_width));

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    lines.push(format!(
        "{:>iw$}  {}",
        "",
        separator.join("  "),
        iw = index_width
    ));

    for (idx, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:>w$}", cell, w = *w))
            .collect();
        lines.push(format!("{:>iw$}  {}", idx, cells.join("  "), iw = index_width));
    }

    lines
}

fn print_table(table: &Table) {
    if table.columns.is_empty() {
        println!("      (no columns)");
        return;
    }
    for (i, line) in format_table(table).iter().enumerate() {
        if i == 0 {
            println!("      {}", line.bold());
        } else {
            println!("      {}", line);
        }
    }
}

/// Horizontal bars, one line per (row, series), scaled to the largest magnitude
fn render_bars(chart: &ChartData, max_rows: usize) -> Vec<String> {
    let scale = chart
        .value_range()
        .map(|(lo, hi)| lo.abs().max(hi.abs()))
        .filter(|m| *m > 0.0)
        .unwrap_or(1.0);
    let name_width = chart
        .series
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);
    let index_width = chart.row_count.saturating_sub(1).to_string().len();

    let mut lines = Vec::new();
    for row in 0..chart.row_count.min(max_rows) {
        for series in &chart.series {
            let value = series.values.get(row).copied().flatten();
            let (bar, label) = match value {
                Some(v) if v.is_finite() => {
                    let len = ((v.abs() / scale) * BAR_WIDTH as f64).round() as usize;
                    let glyph = if v < 0.0 { "░" } else { "█" };
                    (glyph.repeat(len), Value::Float(v).to_string())
                }
                _ => (String::new(), "NaN".to_string()),
            };
            lines.push(format!(
                "{:>iw$} {:<nw$} │{} {}",
                row,
                series.name,
                bar,
                label,
                iw = index_width,
                nw = name_width
            ));
        }
    }
    if chart.row_count > max_rows {
        lines.push(format!("… {} more rows", chart.row_count - max_rows));
    }
    lines
}

fn print_chart(chart: &ChartData) {
    println!(
        "   {} {}",
        "📊 Chart:".bold().cyan(),
        chart.series_names().join(", ").bright_blue()
    );
    for line in render_bars(chart, CHART_ROWS) {
        println!("      {}", line);
    }
}

fn failure_summary(failed: usize, total: usize) -> CleanResult<()> {
    if failed == 0 {
        Ok(())
    } else {
        Err(CleanError::Validation(format!(
            "{} of {} file(s) could not be processed",
            failed, total
        )))
    }
}

/// Execute the preview command
pub fn preview(files: Vec<PathBuf>, rows: usize) -> CleanResult<()> {
    println!("{}", "🔍 tabclean - Preview".bold().green());
    println!();

    let mut failed = 0;
    for path in &files {
        match parser::parse_path(path) {
            Ok(table) => {
                println!(
                    "   {} {} ({} rows × {} columns)",
                    "📄".bold(),
                    path.display().to_string().bright_blue().bold(),
                    table.row_count(),
                    table.columns.len()
                );
                print_table(&table.head(rows));
            }
            Err(e) => {
                failed += 1;
                println!("   {} {}: {}", "❌".red(), path.display(), e.to_string().red());
            }
        }
        println!();
    }

    failure_summary(failed, files.len())
}

/// Execute the columns command - list names, types and missing counts
pub fn columns(files: Vec<PathBuf>) -> CleanResult<()> {
    println!("{}", "📋 tabclean - Columns".bold().green());
    println!();

    let mut failed = 0;
    for path in &files {
        let table = match parser::parse_path(path) {
            Ok(table) => table,
            Err(e) => {
                failed += 1;
                println!("   {} {}: {}", "❌".red(), path.display(), e.to_string().red());
                println!();
                continue;
            }
        };

        println!(
            "   {} ({} rows)",
            path.display().to_string().bright_blue().bold(),
            table.row_count()
        );
        let name_width = table
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0);
        for column in &table.columns {
            let missing = column.values.missing_count();
            let missing_text = format!("{} missing", missing);
            println!(
                "      {:<nw$}  {:<8}  {}",
                column.name.cyan(),
                column.values.type_name(),
                if missing > 0 {
                    missing_text.yellow()
                } else {
                    missing_text.normal()
                },
                nw = name_width
            );
        }
        println!();
    }

    failure_summary(failed, files.len())
}

fn print_report(report: &FileReport, out_dir: &Path, verbose: bool) -> CleanResult<()> {
    println!("   {}", "Preview:".cyan());
    print_table(&report.preview);

    if let Some(fill) = &report.fill {
        println!(
            "   {} Missing values filled with column mean ({} cells)",
            "✅".green(),
            fill.total_filled()
        );
        if verbose {
            for col in &fill.columns {
                println!(
                    "      {} ← mean {} ({} cells)",
                    col.name.cyan(),
                    Value::Float(col.mean),
                    col.filled
                );
            }
        }
        if let Some(filled) = &report.filled_preview {
            print_table(filled);
        }
    }

    if !report.dropped.is_empty() {
        println!(
            "   {} Dropped columns: {}",
            "✅".green(),
            report.dropped.join(", ")
        );
        if let Some(dropped) = &report.dropped_preview {
            print_table(dropped);
        }
    }

    if let Some(chart) = &report.chart {
        print_chart(chart);
    } else if report.chart_skipped {
        println!("   {}", "⚠️  No numeric columns to chart".yellow());
    }

    if let Some(download) = &report.download {
        fs::create_dir_all(out_dir)?;
        let target = out_dir.join(&download.file_name);
        fs::write(&target, &download.bytes)?;
        println!(
            "   {} {} ({}, {} bytes)",
            "📥".bold(),
            target.display().to_string().bold().green(),
            download.media_type,
            download.bytes.len()
        );
    }

    Ok(())
}

/// Execute the clean command over every file, writing downloads to `out_dir`
pub fn clean(
    files: Vec<PathBuf>,
    options: CleanOptions,
    out_dir: PathBuf,
    verbose: bool,
) -> CleanResult<()> {
    println!("{}", "🧹 tabclean - Cleaning files".bold().green());
    if verbose {
        println!("   Fill missing: {}", options.fill_missing);
        if !options.drop_columns.is_empty() {
            println!("   Drop: {}", options.drop_columns.join(", "));
        }
        println!("   Chart: {}", options.chart);
        match options.format {
            Some(format) => println!("   Format: {}", format.label()),
            None => println!("   Format: none (no output written)"),
        }
    }
    println!();

    let pipeline = Pipeline::new(options);
    let mut failed = 0;

    for path in &files {
        println!("{}", format!("📄 {}", path.display()).bright_blue().bold());

        let result = UploadedFile::from_path(path)
            .and_then(|upload| pipeline.process(&upload))
            .and_then(|report| print_report(&report, &out_dir, verbose));

        if let Err(e) = result {
            failed += 1;
            println!("   {} {}", "❌".red(), e.to_string().red());
        }
        println!();
    }

    if failed == 0 {
        println!("{}", "✅ All files processed".bold().green());
    }
    failure_summary(failed, files.len())
}

/// Execute the chart command
pub fn chart(file: PathBuf, svg: Option<PathBuf>) -> CleanResult<()> {
    println!("{}", "📊 tabclean - Chart".bold().green());
    println!("   File: {}\n", file.display());

    let table = parser::parse_path(&file)?;
    let Some(data) = chart::chart_data(&table) else {
        println!("{}", "⚠️  No numeric columns to chart".yellow());
        return Ok(());
    };

    match svg {
        Some(target) => {
            let document = chart::render_svg(&data, DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
            fs::write(&target, document)?;
            println!(
                "{} {}",
                "✅ Chart written:".bold().green(),
                target.display()
            );
        }
        None => print_chart(&data),
    }

    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
