use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod fallback;
pub mod structural;
pub mod time_slots;
mod tokens;
pub mod vocabulary;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::{Extraction, Strategy, TimetableExtractor};
pub use fallback::parse_fallback;
pub use structural::parse_structural;
pub use time_slots::{infer_time_slots, time_tokens};
pub use vocabulary::{SubjectVocabulary, find_weekday};
// Re-export domain types from core (canonical definitions live there)
pub use timetable_core::{ClassTime, RecognizedText, Schedule, ScheduleEntry, Weekday};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("invalid time {0:?}: expected H:MM or HH:MM")]
    InvalidTime(String),
}

/// Extract schedule entries from recognized timetable text.
///
/// Pipeline:
/// 1. Split the text into trimmed non-blank lines
/// 2. Infer the time slots (header row, else loose time tokens)
/// 3. Scan rows: weekday labels open a day, subjects pair with slots and rooms
/// 4. If that yields fewer than three entries, spread known subjects over
///    default days and slots instead
pub fn extract_entries(text: &str) -> Vec<ScheduleEntry> {
    TimetableExtractor::new().extract(text).entries
}

/// Extract entries from `text` and merge the new ones into `schedule`.
pub fn import_into(schedule: &mut Schedule, text: &str) -> Vec<ScheduleEntry> {
    TimetableExtractor::new().import_into(schedule, text)
}
