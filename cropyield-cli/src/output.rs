use cropyield_trainer::TrainingReport;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

pub fn colored<W: Write>(out: &mut W, color: Color, text: &str) -> io::Result<()> {
    execute!(out, SetForegroundColor(color), Print(text), ResetColor)
}

pub fn line<W: Write>(out: &mut W, color: Color, text: &str) -> io::Result<()> {
    colored(out, color, text)?;
    writeln!(out)
}

/// Human-readable training summary.
pub fn training_summary<W: Write>(out: &mut W, report: &TrainingReport) -> io::Result<()> {
    line(out, Color::Cyan, "--- Training summary ---")?;
    writeln!(
        out,
        "rows: {} total, {} usable, {} sampled ({} train / {} test)",
        report.total_rows, report.usable_rows, report.sampled_rows, report.train_rows, report.test_rows
    )?;
    writeln!(out, "numeric:     {}", report.numeric_columns.join(", "))?;
    writeln!(out, "categorical: {}", report.categorical_columns.join(", "))?;

    for candidate in &report.candidates {
        let selected = candidate.kind == report.selected;
        let (marker, color) = if selected {
            (" ► ", Color::Green)
        } else {
            ("   ", Color::DarkGrey)
        };
        line(out, color, &format!("{marker}{:<18}{}", candidate.kind.name(), candidate.evaluation))?;
    }

    if let Some(path) = &report.artifact_path {
        colored(out, Color::DarkGrey, "saved to ")?;
        line(out, Color::White, &path.display().to_string())?;
    }
    Ok(())
}
