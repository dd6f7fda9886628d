use std::io::Write;

use owo_colors::OwoColorize;
use timetable_core::{Schedule, ScheduleEntry, Weekday};
use timetable_parsing::{Extraction, Strategy};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print which parser handled the text and how much it found.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    file_name: &str,
    extraction: &Extraction,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Extracted timetable from {}", file_name)?;
    writeln!(w, "Found {} classes", extraction.entries.len())?;

    if extraction.strategy == Strategy::Fallback {
        let msg = format!(
            "(Layout not recognized, {} classes from table structure; guessed days and times)",
            extraction.primary_count
        );
        if color.enabled() {
            writeln!(w, "{}", msg.yellow())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

fn print_entry(w: &mut dyn Write, entry: &ScheduleEntry, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "  {}  {:<28} {}  {}",
            entry.time.to_string().cyan(),
            entry.subject.bold(),
            entry.room,
            entry.id.dimmed()
        )
    } else {
        writeln!(
            w,
            "  {}  {:<28} {}  {}",
            entry.time, entry.subject, entry.room, entry.id
        )
    }
}

fn print_day_heading(w: &mut dyn Write, day: Weekday, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", day.name().bold().underline())
    } else {
        writeln!(w, "{}", day)
    }
}

/// Print entries as they were extracted, one line each.
pub fn print_entries(
    w: &mut dyn Write,
    entries: &[ScheduleEntry],
    color: ColorMode,
) -> std::io::Result<()> {
    for entry in entries {
        if color.enabled() {
            write!(w, "{:<10}", entry.day.name().bold())?;
        } else {
            write!(w, "{:<10}", entry.day)?;
        }
        print_entry(w, entry, color)?;
    }
    Ok(())
}

/// Print a schedule grouped by day, earliest class first.
///
/// With `only`, prints just that day. Days without classes are skipped.
pub fn print_schedule(
    w: &mut dyn Write,
    schedule: &Schedule,
    only: Option<Weekday>,
    color: ColorMode,
) -> std::io::Result<()> {
    if schedule.is_empty() {
        writeln!(w, "No classes scheduled.")?;
        return Ok(());
    }

    let days: Vec<Weekday> = match only {
        Some(day) => vec![day],
        None => Weekday::ALL.to_vec(),
    };

    let mut printed = 0;
    for day in days {
        let classes = schedule.classes_for_day(day);
        if classes.is_empty() {
            continue;
        }
        print_day_heading(w, day, color)?;
        for entry in classes {
            print_entry(w, entry, color)?;
            printed += 1;
        }
        writeln!(w)?;
    }

    if printed == 0
        && let Some(day) = only
    {
        writeln!(w, "No classes on {}.", day)?;
    }
    Ok(())
}

/// Print how many extracted classes were new and how many were already scheduled.
pub fn print_merge_summary(
    w: &mut dyn Write,
    accepted: usize,
    duplicates: usize,
    user: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    let sep = "=".repeat(40);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "  {} {}", "Added:".green(), accepted)?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "  Added: {}", accepted)?;
    }
    if duplicates > 0 {
        let msg = format!("Already scheduled (skipped): {}", duplicates);
        if color.enabled() {
            writeln!(w, "  {}", msg.dimmed())?;
        } else {
            writeln!(w, "  {}", msg)?;
        }
    }
    writeln!(w, "  Saved schedule for user {:?}", user)?;
    Ok(())
}

pub fn print_dry_run_banner(
    w: &mut dyn Write,
    file_name: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {} (nothing will be saved)\n", "DRY RUN:".bold().cyan(), file_name.bold())
    } else {
        writeln!(w, "DRY RUN: {} (nothing will be saved)\n", file_name)
    }
}
