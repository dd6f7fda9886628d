use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use timetable_core::{ClassTime, RecognizedText, ScheduleStore, TextRecognizer, Weekday};
use timetable_parsing::TimetableExtractor;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod output;
mod settings;

use output::ColorMode;
use settings::{EnvVars, Overrides, Settings};

/// Timetable importer - Turn photos of class timetables into a weekly schedule
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Whose schedule to work on
    #[arg(long, global = true)]
    user: Option<String>,

    /// Directory holding saved schedules
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recognize a timetable image (or .txt transcript) and add its classes
    Import {
        /// Path to the image or text file
        file_path: PathBuf,

        /// OCR program to run on images (default: tesseract)
        #[arg(long)]
        ocr_command: Option<String>,

        /// Dry run: print extracted classes without saving them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the saved schedule
    List {
        /// Only show this day
        #[arg(long)]
        day: Option<Weekday>,
    },

    /// Add a class by hand
    Add {
        #[arg(long)]
        day: Weekday,

        /// Start time, HH:MM
        #[arg(long)]
        time: ClassTime,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        room: String,
    },

    /// Remove a class by id
    Remove {
        /// Entry id as shown by `list`
        id: String,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the user config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let color = ColorMode(!cli.no_color);

    let ocr_command = match &cli.command {
        Command::Import { ocr_command, .. } => ocr_command.clone(),
        _ => None,
    };
    let settings = Settings::resolve(
        Overrides {
            user: cli.user,
            data_dir: cli.data_dir,
            ocr_command,
        },
        EnvVars::from_process(),
        timetable_core::config_file::load_config(),
    )?;
    tracing::debug!(
        user = %settings.user,
        data_dir = %settings.data_dir.display(),
        "resolved settings"
    );

    let mut out = std::io::stdout();
    match cli.command {
        Command::Import {
            file_path, dry_run, ..
        } => import(&settings, &file_path, dry_run, color, &mut out).await,
        Command::List { day } => list(&settings, day, color, &mut out),
        Command::Add {
            day,
            time,
            subject,
            room,
        } => add(&settings, day, time, &subject, &room, &mut out),
        Command::Remove { id } => remove(&settings, &id, &mut out),
        Command::Config { save } => show_config(&settings, save, &mut out),
    }
}

async fn import(
    settings: &Settings,
    file_path: &Path,
    dry_run: bool,
    color: ColorMode,
    w: &mut dyn Write,
) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }
    let extractor = TimetableExtractor::with_config(settings.parsing_config()?);

    let recognizer = timetable_ocr::recognizer_for(
        file_path,
        Some(settings.ocr_command.as_str()),
        settings.ocr_args.clone(),
    )?;

    let Some(text) = recognize(recognizer, file_path.to_path_buf()).await? else {
        writeln!(w, "Cancelled; nothing was imported.")?;
        w.flush()?;
        // The recognizer may still be running on its blocking thread.
        std::process::exit(130);
    };

    if text.is_blank() {
        tracing::warn!(file = %file_path.display(), "no text recognized");
    }

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());

    let extraction = extractor.extract_recognized(&text);

    if dry_run {
        output::print_dry_run_banner(w, &file_name, color)?;
        output::print_extraction_summary(w, &file_name, &extraction, color)?;
        output::print_entries(w, &extraction.entries, color)?;
        return Ok(());
    }

    output::print_extraction_summary(w, &file_name, &extraction, color)?;
    output::print_entries(w, &extraction.entries, color)?;

    if extraction.entries.is_empty() {
        writeln!(w, "No classes to import.")?;
        return Ok(());
    }

    let store = settings.store();
    let mut schedule = store.load(&settings.user)?;
    let total = extraction.entries.len();
    let accepted = schedule.merge(extraction.entries);
    store.save(&settings.user, &schedule)?;

    writeln!(w)?;
    output::print_merge_summary(w, accepted.len(), total - accepted.len(), &settings.user, color)?;
    Ok(())
}

/// Run `recognizer` on a blocking thread with a progress bar.
///
/// Returns `None` if Ctrl+C arrived first; the unfinished result is discarded.
async fn recognize(
    recognizer: Box<dyn TextRecognizer>,
    path: PathBuf,
) -> anyhow::Result<Option<RecognizedText>> {
    use indicatif::{ProgressBar, ProgressStyle};

    let style = ProgressStyle::with_template(
        "{spinner:.cyan} {msg} [{bar:40.cyan/dim}] {percent}% ({elapsed})",
    )
    .unwrap()
    .progress_chars("=> ");

    let bar = ProgressBar::new(100);
    bar.set_style(style);
    bar.set_message(format!("Recognizing with {}", recognizer.name()));
    bar.enable_steady_tick(Duration::from_millis(120));

    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let task_bar = bar.clone();
    let task = tokio::task::spawn_blocking(move || {
        recognizer.recognize(&path, &|p| task_bar.set_position(p.percent()))
    });

    tokio::select! {
        joined = task => {
            match joined? {
                Ok(text) => {
                    bar.finish_with_message("Recognition complete");
                    Ok(Some(text))
                }
                Err(e) => {
                    bar.abandon_with_message("Recognition failed");
                    Err(anyhow::anyhow!("Text recognition failed: {}", e))
                }
            }
        }
        _ = cancel.cancelled() => {
            bar.abandon_with_message("Cancelled");
            Ok(None)
        }
    }
}

fn list(
    settings: &Settings,
    day: Option<Weekday>,
    color: ColorMode,
    w: &mut dyn Write,
) -> anyhow::Result<()> {
    let schedule = settings.store().load(&settings.user)?;
    output::print_schedule(w, &schedule, day, color)?;
    Ok(())
}

fn add(
    settings: &Settings,
    day: Weekday,
    time: ClassTime,
    subject: &str,
    room: &str,
    w: &mut dyn Write,
) -> anyhow::Result<()> {
    let store = settings.store();
    let mut schedule = store.load(&settings.user)?;
    let entry = schedule.add_class(day, time, subject, room)?;
    store.save(&settings.user, &schedule)?;
    writeln!(
        w,
        "Added {} {} {} ({}) as {}",
        entry.day, entry.time, entry.subject, entry.room, entry.id
    )?;
    Ok(())
}

fn show_config(settings: &Settings, save: bool, w: &mut dyn Write) -> anyhow::Result<()> {
    let effective = settings.to_config_file();
    write!(w, "{}", timetable_core::config_file::to_toml(&effective)?)?;
    if save {
        let path = timetable_core::config_file::save_config(&effective)?;
        writeln!(w, "\nSaved configuration to {}", path.display())?;
    }
    Ok(())
}

fn remove(settings: &Settings, id: &str, w: &mut dyn Write) -> anyhow::Result<()> {
    let store = settings.store();
    let mut schedule = store.load(&settings.user)?;
    let Some(entry) = schedule.remove(id) else {
        anyhow::bail!("No class with id {} for user {:?}", id, settings.user);
    };
    store.save(&settings.user, &schedule)?;
    writeln!(w, "Removed {} {} {}", entry.day, entry.time, entry.subject)?;
    Ok(())
}
