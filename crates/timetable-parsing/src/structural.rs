use timetable_core::{ClassTime, ScheduleEntry, Weekday, text_lines};

use crate::config::ParsingConfig;
use crate::time_slots::infer_time_slots_with_config;
use crate::{tokens, vocabulary};

/// Row-scan state: which day the lines currently being read belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayState {
    NoDayActive,
    DayActive(Weekday),
}

/// Accumulator threaded through the row scan.
#[derive(Debug)]
struct RowScan {
    state: DayState,
    entries: Vec<ScheduleEntry>,
}

impl RowScan {
    fn new() -> Self {
        Self {
            state: DayState::NoDayActive,
            entries: Vec::new(),
        }
    }

    /// Consume one line, returning the updated scan.
    fn step(mut self, line: &str, slots: &[ClassTime], config: &ParsingConfig) -> Self {
        if let Some(day) = vocabulary::find_weekday(line) {
            self.state = DayState::DayActive(day);
        }
        let DayState::DayActive(day) = self.state else {
            return self;
        };

        let rooms = tokens::find_rooms(line, config);
        let subjects = tokens::find_subjects(line, &rooms, config);

        for (i, subject) in subjects.into_iter().enumerate() {
            let time = slots
                .get(i)
                .or(slots.first())
                .copied()
                .unwrap_or(config.default_time);
            let room = rooms
                .get(i)
                .or(rooms.first())
                .map(|r| r.text.clone())
                .unwrap_or_else(|| ScheduleEntry::UNASSIGNED_ROOM.to_string());
            self.entries.push(ScheduleEntry::new(day, time, subject, room));
        }
        self
    }
}

/// Parse recognized text by following its table structure.
///
/// A weekday label opens a day; subjects and rooms on that line and the lines
/// after it (until the next weekday label) become entries for that day, paired
/// by position with the time slots of the header row.
pub fn parse_structural(text: &str) -> Vec<ScheduleEntry> {
    parse_structural_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`parse_structural`].
pub(crate) fn parse_structural_with_config(
    text: &str,
    config: &ParsingConfig,
) -> Vec<ScheduleEntry> {
    let lines: Vec<&str> = text_lines(text).collect();
    if lines.is_empty() {
        return Vec::new();
    }
    let slots = infer_time_slots_with_config(&lines, config);

    let scan = lines
        .iter()
        .fold(RowScan::new(), |scan, line| scan.step(line, &slots, config));

    tracing::debug!(
        lines = lines.len(),
        slots = slots.len(),
        entries = scan.entries.len(),
        "structural parse complete"
    );
    scan.entries
}
